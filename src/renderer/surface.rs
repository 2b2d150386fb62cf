use super::*;

impl<'a> GalleryRenderer<'a> {
    pub fn size(&self) -> (u32, u32) {
        self.physical_size
    }

    /// Size in logical pixels.
    pub fn logical_size(&self) -> (f32, f32) {
        to_logical(self.physical_size, self.scale_factor)
    }

    pub fn change_scale_factor(&mut self, new_scale_factor: f64) {
        self.scale_factor = new_scale_factor;
        self.resize(self.physical_size)
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn resize(&mut self, new_physical_size: (u32, u32)) {
        let new_physical_size = (new_physical_size.0.max(1), new_physical_size.1.max(1));
        self.physical_size = new_physical_size;
        self.config.width = new_physical_size.0;
        self.config.height = new_physical_size.1;

        if let Some(surface) = &self.surface {
            surface.configure(&self.device, &self.config);
        }

        // Readback targets are recreated lazily at the new size.
        self.offscreen_texture = None;
        self.readback_buffer = None;
    }

    /// Swaps in a new window surface, for example after the platform recreated the window.
    pub fn set_surface(
        &mut self,
        window: impl Into<SurfaceTarget<'static>>,
    ) -> Result<(), GalleryError> {
        let surface = self
            .instance
            .create_surface(window)
            .map_err(|error| GalleryError::SurfaceCreation(error.to_string()))?;
        surface.configure(&self.device, &self.config);
        self.surface = Some(surface);
        Ok(())
    }

    pub fn set_vsync(&mut self, vsync: bool) {
        self.config.present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        if let Some(surface) = &self.surface {
            surface.configure(&self.device, &self.config);
        }
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, background: Color) {
        self.background = background;
    }

    pub fn is_headless(&self) -> bool {
        self.surface.is_none()
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub(super) fn reconfigure_surface(&self) {
        if let Some(surface) = &self.surface {
            surface.configure(&self.device, &self.config);
        }
    }
}
