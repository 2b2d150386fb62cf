use super::*;

impl<'a> GalleryRenderer<'a> {
    /// Creates a renderer presenting to `window`.
    ///
    /// Every failure along the way (no surface, no adapter, no device, no usable format) is
    /// returned as an error so the caller can fall back to CPU rendering.
    pub async fn new(
        window: impl Into<SurfaceTarget<'static>>,
        physical_size: (u32, u32),
        scale_factor: f64,
        options: RendererOptions,
    ) -> Result<GalleryRenderer<'static>, GalleryError> {
        let size = (physical_size.0.max(1), physical_size.1.max(1));

        let instance = wgpu::Instance::new(&InstanceDescriptor::default());
        let surface = instance
            .create_surface(window)
            .map_err(|error| GalleryError::SurfaceCreation(error.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|error| GalleryError::AdapterUnavailable(error.to_string()))?;

        let (device, queue) = Self::request_device(&adapter).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| {
                GalleryError::SurfaceCreation("surface reports no supported formats".to_string())
            })?;

        let transparent = options.background.0[3] < 255;
        let alpha_mode = if transparent
            && surface_caps
                .alpha_modes
                .contains(&CompositeAlphaMode::PreMultiplied)
        {
            CompositeAlphaMode::PreMultiplied
        } else if transparent
            && surface_caps
                .alpha_modes
                .contains(&CompositeAlphaMode::PostMultiplied)
        {
            CompositeAlphaMode::PostMultiplied
        } else {
            if transparent {
                tracing::warn!(
                    "Transparent background requested but no suitable alpha mode available, falling back to Opaque"
                );
            }
            CompositeAlphaMode::Opaque
        };

        tracing::info!(
            ?format,
            ?alpha_mode,
            adapter = %adapter.get_info().name,
            "configured gallery surface"
        );

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.0,
            height: size.1,
            present_mode: if options.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        Ok(GalleryRenderer::build_from_device(
            instance,
            Some(surface),
            device,
            queue,
            config,
            size,
            scale_factor,
            options.background,
        ))
    }

    /// Creates a renderer without a window. Frames are read back with
    /// [`GalleryRenderer::render_to_buffer`] as BGRA8.
    pub async fn new_headless(
        physical_size: (u32, u32),
        scale_factor: f64,
    ) -> Result<GalleryRenderer<'static>, GalleryError> {
        let size = (physical_size.0.max(1), physical_size.1.max(1));

        let instance = wgpu::Instance::new(&InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|error| GalleryError::AdapterUnavailable(error.to_string()))?;

        let (device, queue) = Self::request_device(&adapter).await?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            format: wgpu::TextureFormat::Bgra8UnormSrgb,
            width: size.0,
            height: size.1,
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode: CompositeAlphaMode::Opaque,
            view_formats: vec![],
        };

        Ok(GalleryRenderer::build_from_device(
            instance,
            None,
            device,
            queue,
            config,
            size,
            scale_factor,
            Color::TRANSPARENT,
        ))
    }

    pub fn texture_manager(&self) -> &TextureManager {
        &self.texture_manager
    }

    pub fn texture_manager_mut(&mut self) -> &mut TextureManager {
        &mut self.texture_manager
    }

    async fn request_device(
        adapter: &wgpu::Adapter,
    ) -> Result<(wgpu::Device, wgpu::Queue), GalleryError> {
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("circular_gallery_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|error| GalleryError::DeviceRequest(error.to_string()))
    }

    /// Shared constructor: takes the wgpu primitives produced by `new()` or
    /// `new_headless()` and builds the full renderer.
    #[allow(clippy::too_many_arguments)]
    fn build_from_device(
        instance: wgpu::Instance,
        surface: Option<wgpu::Surface<'a>>,
        device: wgpu::Device,
        queue: wgpu::Queue,
        config: wgpu::SurfaceConfiguration,
        physical_size: (u32, u32),
        scale_factor: f64,
        background: Color,
    ) -> Self {
        let tile_uniform_layout = create_uniform_bind_group_layout(
            &device,
            "tile_uniform_layout",
            std::mem::size_of::<TileUniforms>() as u64,
        );
        let label_uniform_layout = create_uniform_bind_group_layout(
            &device,
            "label_uniform_layout",
            std::mem::size_of::<LabelUniforms>() as u64,
        );
        let texture_layout = create_texture_bind_group_layout(&device);

        let tile_pipeline =
            create_tile_pipeline(&device, config.format, &tile_uniform_layout, &texture_layout);
        let label_pipeline = create_label_pipeline(
            &device,
            config.format,
            &label_uniform_layout,
            &texture_layout,
        );

        let tile_uniforms = UniformPool::new(
            &device,
            &tile_uniform_layout,
            "tile_uniforms",
            std::mem::size_of::<TileUniforms>() as u64,
            INITIAL_UNIFORM_SLOTS,
        );
        let label_uniforms = UniformPool::new(
            &device,
            &label_uniform_layout,
            "label_uniforms",
            std::mem::size_of::<LabelUniforms>() as u64,
            INITIAL_UNIFORM_SLOTS,
        );

        let tile_mesh = PlaneMesh::new(&device, "tile_plane", TILE_SEGMENTS);
        let label_mesh = PlaneMesh::new(&device, "label_plane", LABEL_SEGMENTS);

        let device = Arc::new(device);
        let queue = Arc::new(queue);
        let texture_manager = TextureManager::new(device.clone(), queue.clone(), texture_layout);

        Self {
            instance,
            surface,
            device,
            queue,
            config,
            physical_size,
            scale_factor,
            background,
            tile_pipeline,
            label_pipeline,
            tile_uniform_layout,
            label_uniform_layout,
            tile_uniforms,
            label_uniforms,
            tile_mesh,
            label_mesh,
            texture_manager,
            offscreen_texture: None,
            readback_buffer: None,
            readback_bytes: Vec::new(),
        }
    }
}
