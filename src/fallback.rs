//! CPU rendering for machines without a usable GPU.
//!
//! The fallback lays the items out once each as a horizontal row of cards and scrolls it
//! with drag and wheel input. There is no easing, no bend and no wraparound. Frames are
//! written as `0x00RRGGBB` pixels and presented with `softbuffer`.

use std::num::NonZeroU32;
use std::sync::Arc;

use image::RgbaImage;
use wgpu::rwh::{HasDisplayHandle, HasWindowHandle};

use crate::color::Color;
use crate::controller::{AnimationLoop, LoopHandle};
use crate::error::GalleryError;
use crate::input::{InputEvent, InputSettings, InputTracker, PointerId};
use crate::item::GalleryItem;
use crate::scroll::ScrollState;
use crate::text::LabelBitmap;
use crate::util::blend_over_argb;

pub const CARD_WIDTH: u32 = 256;
pub const CARD_HEIGHT: u32 = 320;
pub const CARD_GAP: u32 = 16;
pub const ROW_PADDING: u32 = 16;
/// Height of the image area at the top of a card. The label band fills the rest.
pub const IMAGE_HEIGHT: u32 = 272;
pub const HOVER_SCALE: f32 = 1.05;
/// Pixels scrolled per wheel notch.
pub const WHEEL_STEP_PX: f32 = 48.0;

const PLACEHOLDER: u32 = 0x002a_2a2a;

/// One item of the fallback row.
#[derive(Debug, Clone)]
pub struct FallbackCard {
    pub item: GalleryItem,
    pub image: Option<RgbaImage>,
    pub label: Option<Arc<LabelBitmap>>,
}

impl FallbackCard {
    fn new(item: GalleryItem) -> Self {
        Self {
            item,
            image: None,
            label: None,
        }
    }
}

/// A card rectangle in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CardRect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    fn scaled_about_center(&self, scale: f32) -> Self {
        let width = self.width * scale;
        let height = self.height * scale;
        Self {
            x: self.x - (width - self.width) / 2.0,
            y: self.y - (height - self.height) / 2.0,
            width,
            height,
        }
    }
}

/// Horizontally scrolling card row.
///
/// # Examples
///
/// ```rust
/// use circular_gallery::{Color, FallbackGallery, GalleryItem};
///
/// let items = vec![
///     GalleryItem::new("a.jpg", "A"),
///     GalleryItem::new("b.jpg", "B"),
/// ];
/// let gallery = FallbackGallery::new(items, (640, 360), Color::BLACK);
/// assert_eq!(gallery.cards().len(), 2);
///
/// let mut pixels = vec![0u32; 640 * 360];
/// gallery.render_into(&mut pixels, 640, 360);
/// ```
pub struct FallbackGallery {
    cards: Vec<FallbackCard>,
    background: Color,
    size: (u32, u32),
    scroll: ScrollState,
    input: InputTracker,
    pointer: Option<(f32, f32)>,
    animation: AnimationLoop,
}

impl FallbackGallery {
    pub fn new(items: Vec<GalleryItem>, size: (u32, u32), background: Color) -> Self {
        Self {
            cards: items.into_iter().map(FallbackCard::new).collect(),
            background,
            size: (size.0.max(1), size.1.max(1)),
            scroll: ScrollState::new(1.0),
            input: InputTracker::new(),
            pointer: None,
            animation: AnimationLoop::new(),
        }
    }

    pub fn cards(&self) -> &[FallbackCard] {
        &self.cards
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Attaches a decoded image to every card showing `path`. Returns how many cards changed.
    pub fn set_image(&mut self, path: &str, image: &RgbaImage) -> usize {
        let mut updated = 0;
        for card in self.cards.iter_mut().filter(|card| card.item.image == path) {
            card.image = Some(image.clone());
            updated += 1;
        }
        updated
    }

    pub fn set_label(&mut self, index: usize, label: Arc<LabelBitmap>) {
        if let Some(card) = self.cards.get_mut(index) {
            card.label = Some(label);
        }
    }

    /// Width of the whole row including its outer padding.
    pub fn content_width(&self) -> f32 {
        let count = self.cards.len() as u32;
        let gaps = count.saturating_sub(1) * CARD_GAP;
        (ROW_PADDING * 2 + count * CARD_WIDTH + gaps) as f32
    }

    pub fn max_offset(&self) -> f32 {
        (self.content_width() - self.size.0 as f32).max(0.0)
    }

    pub fn offset(&self) -> f32 {
        self.scroll.current
    }

    pub fn set_offset(&mut self, offset: f32) {
        let clamped = offset.clamp(0.0, self.max_offset());
        self.scroll.current = clamped;
        self.scroll.target = clamped;
    }

    pub fn resize(&mut self, size: (u32, u32)) {
        self.size = (size.0.max(1), size.1.max(1));
        self.set_offset(self.scroll.current);
    }

    /// Unscaled rectangle of card `index` at the current scroll offset.
    pub fn card_rect(&self, index: usize) -> CardRect {
        let x = ROW_PADDING as f32 + index as f32 * (CARD_WIDTH + CARD_GAP) as f32 - self.offset();
        CardRect {
            x,
            y: ROW_PADDING as f32,
            width: CARD_WIDTH as f32,
            height: CARD_HEIGHT as f32,
        }
    }

    /// Card under the last known pointer position.
    pub fn hovered(&self) -> Option<usize> {
        let (x, y) = self.pointer?;
        (0..self.cards.len()).find(|&index| self.card_rect(index).contains(x, y))
    }

    /// Applies drag and wheel input. Returns whether the row needs repainting.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        if !self.animation.is_running() {
            return false;
        }

        let hovered_before = self.hovered();
        match event {
            InputEvent::PointerDown { x, y, .. } | InputEvent::PointerMove { x, y, .. } => {
                self.pointer = Some((x, y));
            }
            InputEvent::PointerCancel {
                pointer: PointerId::Mouse,
            } => self.pointer = None,
            _ => {}
        }

        let offset_before = self.offset();
        let settings = InputSettings {
            wheel_step: WHEEL_STEP_PX,
            drag_sensitivity: 1.0,
        };
        self.input.apply(&event, &mut self.scroll, settings);
        self.set_offset(self.scroll.target);

        self.offset() != offset_before || self.hovered() != hovered_before
    }

    /// Writes the row into `buffer`, `width * height` pixels in `0x00RRGGBB` order.
    pub fn render_into(&self, buffer: &mut [u32], width: u32, height: u32) {
        if width == 0 {
            return;
        }
        let height = height.min((buffer.len() / width as usize) as u32);
        let background = self.background.to_argb_u32();
        buffer[..(width * height) as usize].fill(background);

        let mut canvas = Canvas {
            pixels: buffer,
            width,
            height,
        };
        let hovered = self.hovered();
        for (index, card) in self.cards.iter().enumerate() {
            let rect = self.card_rect(index);
            let rect = if hovered == Some(index) {
                rect.scaled_about_center(HOVER_SCALE)
            } else {
                rect
            };
            if rect.x >= width as f32 || rect.x + rect.width <= 0.0 {
                continue;
            }

            let scale = rect.height / CARD_HEIGHT as f32;
            let image_area = CardRect {
                height: IMAGE_HEIGHT as f32 * scale,
                ..rect
            };
            match &card.image {
                Some(image) => canvas.draw_cover(image, image_area),
                None => canvas.fill(image_area, PLACEHOLDER),
            }

            if let Some(label) = &card.label {
                let band = CardRect {
                    y: image_area.y + image_area.height,
                    height: rect.height - image_area.height,
                    ..rect
                };
                canvas.draw_label(label, band);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.animation.is_running()
    }

    pub fn loop_handle(&self) -> LoopHandle {
        self.animation.handle()
    }

    pub fn destroy(&mut self) {
        self.animation.cancel();
        self.input.reset();
        self.pointer = None;
    }
}

struct Canvas<'a> {
    pixels: &'a mut [u32],
    width: u32,
    height: u32,
}

impl Canvas<'_> {
    /// Pixel bounds of `rect` clipped to the canvas, as `x0..x1` and `y0..y1`.
    fn clip(&self, rect: CardRect) -> Option<(u32, u32, u32, u32)> {
        let x0 = rect.x.round().max(0.0) as u32;
        let y0 = rect.y.round().max(0.0) as u32;
        let x1 = ((rect.x + rect.width).round().max(0.0) as u32).min(self.width);
        let y1 = ((rect.y + rect.height).round().max(0.0) as u32).min(self.height);
        (x0 < x1 && y0 < y1).then_some((x0, x1, y0, y1))
    }

    fn fill(&mut self, rect: CardRect, color: u32) {
        let Some((x0, x1, y0, y1)) = self.clip(rect) else {
            return;
        };
        for y in y0..y1 {
            let row = (y * self.width) as usize;
            self.pixels[row + x0 as usize..row + x1 as usize].fill(color);
        }
    }

    /// Nearest-neighbour cover fit: the image fills `rect` and is cropped around its centre.
    fn draw_cover(&mut self, image: &RgbaImage, rect: CardRect) {
        let (image_width, image_height) = image.dimensions();
        if image_width == 0 || image_height == 0 || rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }
        let Some((x0, x1, y0, y1)) = self.clip(rect) else {
            return;
        };

        let scale = (rect.width / image_width as f32).max(rect.height / image_height as f32);
        let crop_x = (image_width as f32 - rect.width / scale) / 2.0;
        let crop_y = (image_height as f32 - rect.height / scale) / 2.0;

        for y in y0..y1 {
            let source_y = crop_y + (y as f32 + 0.5 - rect.y) / scale;
            let source_y = (source_y.max(0.0) as u32).min(image_height - 1);
            let row = (y * self.width) as usize;
            for x in x0..x1 {
                let source_x = crop_x + (x as f32 + 0.5 - rect.x) / scale;
                let source_x = (source_x.max(0.0) as u32).min(image_width - 1);
                let texel = image.get_pixel(source_x, source_y).0;
                let pixel = &mut self.pixels[row + x as usize];
                *pixel = blend_over_argb(*pixel, texel);
            }
        }
    }

    /// Blits `label` unscaled, centred in `band` and clipped to it.
    fn draw_label(&mut self, label: &LabelBitmap, band: CardRect) {
        let Some((x0, x1, y0, y1)) = self.clip(band) else {
            return;
        };
        let left = (band.x + (band.width - label.width as f32) / 2.0).round() as i64;
        let top = (band.y + (band.height - label.height as f32) / 2.0).round() as i64;

        for y in y0..y1 {
            let label_y = y as i64 - top;
            if label_y < 0 || label_y >= label.height as i64 {
                continue;
            }
            let row = (y * self.width) as usize;
            for x in x0..x1 {
                let label_x = x as i64 - left;
                if label_x < 0 {
                    continue;
                }
                let Some(texel) = label.pixel(label_x as u32, label_y as u32) else {
                    continue;
                };
                let pixel = &mut self.pixels[row + x as usize];
                *pixel = blend_over_argb(*pixel, texel);
            }
        }
    }
}

/// Presents fallback frames to a window through `softbuffer`.
pub struct FallbackPresenter<W> {
    _context: softbuffer::Context<W>,
    surface: softbuffer::Surface<W, W>,
    size: (u32, u32),
}

impl<W: HasDisplayHandle + HasWindowHandle + Clone> FallbackPresenter<W> {
    pub fn new(window: W, size: (u32, u32)) -> Result<Self, GalleryError> {
        let context = softbuffer::Context::new(window.clone())?;
        let surface = softbuffer::Surface::new(&context, window)?;
        let mut presenter = Self {
            _context: context,
            surface,
            size: (0, 0),
        };
        presenter.resize(size)?;
        Ok(presenter)
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn resize(&mut self, size: (u32, u32)) -> Result<(), GalleryError> {
        let (Some(width), Some(height)) = (NonZeroU32::new(size.0), NonZeroU32::new(size.1)) else {
            return Ok(());
        };
        self.surface.resize(width, height)?;
        self.size = size;
        Ok(())
    }

    pub fn present(&mut self, gallery: &FallbackGallery) -> Result<(), GalleryError> {
        let (width, height) = self.size;
        if width == 0 || height == 0 {
            return Ok(());
        }
        let mut buffer = self.surface.buffer_mut()?;
        gallery.render_into(&mut buffer, width, height);
        buffer.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(count: usize) -> Vec<GalleryItem> {
        (0..count)
            .map(|index| GalleryItem::new(format!("{index}.png"), format!("Item {index}")))
            .collect()
    }

    #[test]
    fn content_width_includes_gaps_and_padding() {
        let gallery = FallbackGallery::new(items(3), (400, 400), Color::BLACK);
        assert_eq!(gallery.content_width(), (16 * 2 + 3 * 256 + 2 * 16) as f32);
        assert_eq!(gallery.max_offset(), gallery.content_width() - 400.0);
    }

    #[test]
    fn narrow_rows_do_not_scroll() {
        let mut gallery = FallbackGallery::new(items(1), (800, 400), Color::BLACK);
        gallery.handle_input(InputEvent::Wheel { delta_y: 1.0 });
        assert_eq!(gallery.offset(), 0.0);
    }

    #[test]
    fn wheel_scrolls_and_clamps() {
        let mut gallery = FallbackGallery::new(items(10), (400, 400), Color::BLACK);
        assert!(gallery.handle_input(InputEvent::Wheel { delta_y: 1.0 }));
        assert_eq!(gallery.offset(), WHEEL_STEP_PX);

        gallery.handle_input(InputEvent::Wheel { delta_y: -1.0 });
        gallery.handle_input(InputEvent::Wheel { delta_y: -1.0 });
        assert_eq!(gallery.offset(), 0.0);

        gallery.set_offset(1.0e6);
        assert_eq!(gallery.offset(), gallery.max_offset());
    }

    #[test]
    fn drag_moves_one_to_one() {
        let mut gallery = FallbackGallery::new(items(10), (400, 400), Color::BLACK);
        let pointer = PointerId::Touch(1);
        gallery.handle_input(InputEvent::PointerDown {
            pointer,
            x: 300.0,
            y: 100.0,
        });
        gallery.handle_input(InputEvent::PointerMove {
            pointer,
            x: 180.0,
            y: 100.0,
        });
        assert_eq!(gallery.offset(), 120.0);

        gallery.handle_input(InputEvent::PointerUp { pointer });
        gallery.handle_input(InputEvent::PointerMove {
            pointer,
            x: 0.0,
            y: 100.0,
        });
        assert_eq!(gallery.offset(), 120.0);
    }

    #[test]
    fn hover_tracks_pointer_and_leaves_with_it() {
        let mut gallery = FallbackGallery::new(items(3), (900, 400), Color::BLACK);
        gallery.handle_input(InputEvent::PointerMove {
            pointer: PointerId::Mouse,
            x: 300.0,
            y: 50.0,
        });
        assert_eq!(gallery.hovered(), Some(1));

        gallery.handle_input(InputEvent::PointerCancel {
            pointer: PointerId::Mouse,
        });
        assert_eq!(gallery.hovered(), None);
    }

    #[test]
    fn missing_images_render_as_placeholder() {
        let gallery = FallbackGallery::new(items(1), (300, 360), Color::BLACK);
        let mut pixels = vec![0u32; 300 * 360];
        gallery.render_into(&mut pixels, 300, 360);

        assert_eq!(pixels[0], 0);
        assert_eq!(pixels[100 * 300 + 100], PLACEHOLDER);
    }

    #[test]
    fn short_buffers_are_clipped() {
        let gallery = FallbackGallery::new(items(2), (300, 360), Color::WHITE);
        let mut pixels = vec![0u32; 300 * 10];
        gallery.render_into(&mut pixels, 300, 360);
        assert_eq!(pixels[0], 0x00ff_ffff);
    }

    #[test]
    fn destroyed_gallery_ignores_input() {
        let mut gallery = FallbackGallery::new(items(10), (400, 400), Color::BLACK);
        let handle = gallery.loop_handle();
        gallery.destroy();
        assert!(!handle.is_running());
        assert!(!gallery.handle_input(InputEvent::Wheel { delta_y: 1.0 }));
        assert_eq!(gallery.offset(), 0.0);
    }
}
