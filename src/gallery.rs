//! Mounting a gallery on a window.
//!
//! [`Gallery::mount`] probes the GPU once. When any step of renderer creation fails the
//! gallery switches to the CPU fallback for its whole lifetime.

use std::num::NonZeroUsize;
use std::time::Instant;

use ahash::AHashMap;

use crate::cache::LabelCache;
use crate::config::GalleryConfig;
use crate::controller::{GalleryController, LoopHandle};
use crate::error::GalleryError;
use crate::fallback::{FallbackGallery, FallbackPresenter};
use crate::id::TextureId;
use crate::image_loader::{ImageLoad, ImageLoader};
use crate::input::InputEvent;
use crate::renderer::{DrawTile, GalleryRenderer, RendererOptions};
use crate::text::{LabelStyle, TextRasterizer};
use crate::viewport::Screen;

#[cfg(feature = "render_metrics")]
use crate::metrics::FrameMetrics;

const LABEL_CACHE_SIZE: usize = 64;

struct Accelerated {
    controller: GalleryController,
    renderer: GalleryRenderer<'static>,
    images: ImageLoader,
    image_textures: AHashMap<String, TextureId>,
    label_textures: AHashMap<u64, TextureId>,
    /// Label texture of each tile, by sequence index.
    tile_labels: Vec<Option<TextureId>>,
    rasterizer: TextRasterizer,
    labels: LabelCache,
    label_style: LabelStyle,
}

impl Accelerated {
    fn new(renderer: GalleryRenderer<'static>, config: GalleryConfig) -> Self {
        let (width, height) = renderer.size();
        let label_style = LabelStyle::new(config.font.clone(), config.text_color);
        let controller = GalleryController::new(config, Screen::new(width, height));

        let mut accelerated = Self {
            controller,
            renderer,
            images: ImageLoader::new(),
            image_textures: AHashMap::new(),
            label_textures: AHashMap::new(),
            tile_labels: Vec::new(),
            rasterizer: TextRasterizer::new(),
            labels: LabelCache::new(
                NonZeroUsize::new(LABEL_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
            ),
            label_style,
        };
        accelerated.prepare_tiles();
        accelerated
    }

    /// Rasterizes and uploads every caption and starts loading every image.
    fn prepare_tiles(&mut self) {
        let texts: Vec<(String, String)> = self
            .controller
            .sequence()
            .iter()
            .map(|item| (item.image.clone(), item.text.clone()))
            .collect();

        self.tile_labels = vec![None; texts.len()];
        for (tile, (image, text)) in texts.iter().enumerate() {
            self.images.request(image);

            let key = LabelCache::key(text, &self.label_style);
            let bitmap = self
                .labels
                .get_or_rasterize(&mut self.rasterizer, text, &self.label_style);
            let texture_manager = self.renderer.texture_manager_mut();
            let texture = *self.label_textures.entry(key).or_insert_with(|| {
                texture_manager
                    .allocate_texture_with_data((bitmap.width, bitmap.height), &bitmap.pixels)
            });

            self.tile_labels[tile] = Some(texture);
            self.controller
                .set_label_size(tile, bitmap.width, bitmap.height);
        }
    }

    fn poll_images(&mut self) {
        for load in self.images.poll() {
            let ImageLoad::Loaded { path, image } = load else {
                continue;
            };
            let dimensions = image.dimensions();
            let texture = self
                .renderer
                .texture_manager_mut()
                .allocate_texture_with_data(dimensions, image.as_raw());
            self.image_textures.insert(path.clone(), texture);
            self.controller
                .set_image_size(&path, dimensions.0, dimensions.1);
        }
    }

    fn draws(&self) -> Vec<DrawTile> {
        let tiles = self.controller.tiles();
        self.controller
            .draw_list()
            .iter()
            .map(|draw| {
                let texture = tiles
                    .get(draw.tile)
                    .and_then(|tile| self.image_textures.get(&tile.item.image))
                    .copied();
                let label = self.tile_labels.get(draw.tile).copied().flatten();
                DrawTile::from_tile_draw(draw, texture, label)
            })
            .collect()
    }

    fn frame(&mut self, now: Instant) -> Result<usize, GalleryError> {
        self.poll_images();
        let Some(report) = self.controller.begin_frame(now) else {
            return Ok(0);
        };
        let draws = self.draws();
        self.renderer.render(&draws)?;
        self.controller.end_frame();
        Ok(report.teleports)
    }
}

struct Fallback<W> {
    gallery: FallbackGallery,
    presenter: FallbackPresenter<W>,
    images: ImageLoader,
}

impl<W: wgpu::WindowHandle + Clone> Fallback<W> {
    fn new(window: W, physical_size: (u32, u32), config: &GalleryConfig) -> Result<Self, GalleryError> {
        let items = config.resolved_items();
        let mut gallery = FallbackGallery::new(items, physical_size, config.background);

        let style = LabelStyle::new(config.font.clone(), config.text_color);
        let mut rasterizer = TextRasterizer::new();
        let mut labels = LabelCache::new(
            NonZeroUsize::new(LABEL_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
        );
        let mut images = ImageLoader::new();
        let texts: Vec<(String, String)> = gallery
            .cards()
            .iter()
            .map(|card| (card.item.image.clone(), card.item.text.clone()))
            .collect();
        for (index, (image, text)) in texts.iter().enumerate() {
            images.request(image);
            gallery.set_label(index, labels.get_or_rasterize(&mut rasterizer, text, &style));
        }

        let presenter = FallbackPresenter::new(window, physical_size)?;
        Ok(Self {
            gallery,
            presenter,
            images,
        })
    }

    fn frame(&mut self) -> Result<(), GalleryError> {
        for load in self.images.poll() {
            if let ImageLoad::Loaded { path, image } = load {
                self.gallery.set_image(&path, &image);
            }
        }
        if !self.gallery.is_running() {
            return Ok(());
        }
        self.presenter.present(&self.gallery)
    }
}

enum Backend<W> {
    Accelerated(Box<Accelerated>),
    Fallback(Box<Fallback<W>>),
}

/// A gallery mounted on a window, rendered on the GPU or by the CPU fallback.
///
/// The host forwards the window's input with [`Gallery::handle_input`] and calls
/// [`Gallery::frame`] for every redraw while [`Gallery::is_running`] holds.
pub struct Gallery<W> {
    backend: Backend<W>,
    loop_handle: LoopHandle,
    #[cfg(feature = "render_metrics")]
    metrics: FrameMetrics,
}

impl<W: wgpu::WindowHandle + Clone + 'static> Gallery<W> {
    /// Validates `config` and mounts the gallery, falling back to CPU rendering when the GPU
    /// path cannot be set up.
    pub async fn mount(
        window: W,
        physical_size: (u32, u32),
        scale_factor: f64,
        config: GalleryConfig,
    ) -> Result<Self, GalleryError> {
        config.validate()?;

        let options = RendererOptions {
            vsync: config.vsync,
            background: config.background,
        };
        match GalleryRenderer::new(window.clone(), physical_size, scale_factor, options).await {
            Ok(renderer) => {
                let accelerated = Accelerated::new(renderer, config);
                tracing::info!(
                    tiles = accelerated.controller.tiles().len(),
                    "gallery mounted with GPU rendering"
                );
                let loop_handle = accelerated.controller.loop_handle();
                Ok(Self::with_backend(
                    Backend::Accelerated(Box::new(accelerated)),
                    loop_handle,
                ))
            }
            Err(error) => {
                tracing::warn!(%error, "GPU rendering unavailable, using the CPU fallback");
                Self::mount_fallback(window, physical_size, config)
            }
        }
    }

    /// Mounts the CPU fallback directly.
    pub fn mount_fallback(
        window: W,
        physical_size: (u32, u32),
        config: GalleryConfig,
    ) -> Result<Self, GalleryError> {
        config.validate()?;
        let fallback = Fallback::new(window, physical_size, &config)?;
        tracing::info!(
            cards = fallback.gallery.cards().len(),
            "gallery mounted with CPU fallback"
        );
        let loop_handle = fallback.gallery.loop_handle();
        Ok(Self::with_backend(
            Backend::Fallback(Box::new(fallback)),
            loop_handle,
        ))
    }

    fn with_backend(backend: Backend<W>, loop_handle: LoopHandle) -> Self {
        Self {
            backend,
            loop_handle,
            #[cfg(feature = "render_metrics")]
            metrics: FrameMetrics::new(),
        }
    }

    pub fn handle_input(&mut self, event: InputEvent, now: Instant) {
        match &mut self.backend {
            Backend::Accelerated(accelerated) => accelerated.controller.handle_input(event, now),
            Backend::Fallback(fallback) => {
                fallback.gallery.handle_input(event);
            }
        }
    }

    pub fn resize(&mut self, physical_size: (u32, u32)) -> Result<(), GalleryError> {
        match &mut self.backend {
            Backend::Accelerated(accelerated) => {
                accelerated.renderer.resize(physical_size);
                let (width, height) = accelerated.renderer.size();
                accelerated.controller.resize(Screen::new(width, height));
                Ok(())
            }
            Backend::Fallback(fallback) => {
                fallback.gallery.resize(physical_size);
                fallback.presenter.resize(physical_size)
            }
        }
    }

    pub fn change_scale_factor(&mut self, scale_factor: f64) {
        if let Backend::Accelerated(accelerated) = &mut self.backend {
            accelerated.renderer.change_scale_factor(scale_factor);
        }
    }

    /// Runs one frame: picks up finished image loads, advances the scroll and renders.
    pub fn frame(&mut self, now: Instant) -> Result<(), GalleryError> {
        #[cfg(feature = "render_metrics")]
        let started_at = Instant::now();

        let teleports = match &mut self.backend {
            Backend::Accelerated(accelerated) => accelerated.frame(now)?,
            Backend::Fallback(fallback) => {
                fallback.frame()?;
                0
            }
        };

        #[cfg(feature = "render_metrics")]
        self.metrics
            .record_frame(started_at, Instant::now(), teleports);
        #[cfg(not(feature = "render_metrics"))]
        let _ = teleports;

        Ok(())
    }
}

impl<W> Gallery<W> {
    pub fn is_running(&self) -> bool {
        self.loop_handle.is_running()
    }

    pub fn loop_handle(&self) -> LoopHandle {
        self.loop_handle.clone()
    }

    pub fn is_accelerated(&self) -> bool {
        matches!(self.backend, Backend::Accelerated(_))
    }

    /// The scene controller, when rendering on the GPU.
    pub fn controller(&self) -> Option<&GalleryController> {
        match &self.backend {
            Backend::Accelerated(accelerated) => Some(&accelerated.controller),
            Backend::Fallback(_) => None,
        }
    }

    /// The card row, when rendering on the CPU.
    pub fn fallback(&self) -> Option<&FallbackGallery> {
        match &self.backend {
            Backend::Accelerated(_) => None,
            Backend::Fallback(fallback) => Some(&fallback.gallery),
        }
    }

    #[cfg(feature = "render_metrics")]
    pub fn metrics(&self) -> &FrameMetrics {
        &self.metrics
    }

    /// Stops the loop and releases the surface together with every GPU resource.
    pub fn destroy(self) {
        tracing::info!("gallery destroyed");
        drop(self);
    }

    fn stop(&mut self) {
        self.loop_handle.cancel();
        match &mut self.backend {
            Backend::Accelerated(accelerated) => accelerated.controller.destroy(),
            Backend::Fallback(fallback) => fallback.gallery.destroy(),
        }
    }
}

impl<W> Drop for Gallery<W> {
    fn drop(&mut self) {
        self.stop();
    }
}
