use super::*;

impl<'a> GalleryRenderer<'a> {
    /// Encodes and submits one frame into `texture_view`.
    ///
    /// Tiles are drawn in the order given, each immediately followed by its caption.
    pub(super) fn render_to_texture_view(
        &mut self,
        texture_view: &wgpu::TextureView,
        draws: &[DrawTile],
    ) {
        let label_count = draws.iter().filter(|draw| draw.label.is_some()).count();
        self.tile_uniforms
            .ensure_capacity(&self.device, &self.tile_uniform_layout, draws.len());
        self.label_uniforms
            .ensure_capacity(&self.device, &self.label_uniform_layout, label_count);

        let mut label_slot = 0;
        for (slot, draw) in draws.iter().enumerate() {
            self.tile_uniforms.write(&self.queue, slot, &draw.uniforms);
            if let Some(label) = &draw.label {
                self.label_uniforms
                    .write(&self.queue, label_slot, &label.uniforms);
                label_slot += 1;
            }
        }

        let [r, g, b, a] = self.background.normalize();
        let clear_color = wgpu::Color {
            r: (r * a) as f64,
            g: (g * a) as f64,
            b: (b * a) as f64,
            a: a as f64,
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("gallery_render_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("gallery_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut label_slot = 0;
            for (slot, draw) in draws.iter().enumerate() {
                render_pass.set_pipeline(&self.tile_pipeline);
                render_pass.set_bind_group(
                    0,
                    self.tile_uniforms.bind_group(),
                    &[self.tile_uniforms.offset(slot)],
                );
                render_pass.set_bind_group(1, self.texture_manager.bind_group(draw.texture), &[]);
                self.tile_mesh.draw(&mut render_pass);

                if let Some(label) = &draw.label {
                    render_pass.set_pipeline(&self.label_pipeline);
                    render_pass.set_bind_group(
                        0,
                        self.label_uniforms.bind_group(),
                        &[self.label_uniforms.offset(label_slot)],
                    );
                    render_pass.set_bind_group(
                        1,
                        self.texture_manager.bind_group(Some(label.texture)),
                        &[],
                    );
                    self.label_mesh.draw(&mut render_pass);
                    label_slot += 1;
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Renders and presents one frame to the window surface.
    ///
    /// A lost or outdated surface is reconfigured and the frame is skipped. Headless
    /// renderers have nothing to present and return immediately.
    pub fn render(&mut self, draws: &[DrawTile]) -> Result<(), GalleryError> {
        let Some(surface) = &self.surface else {
            return Ok(());
        };

        let output = match surface.get_current_texture() {
            Ok(output) => output,
            Err(error @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                tracing::warn!(%error, "surface needs reconfiguring, skipping frame");
                self.reconfigure_surface();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::debug!("timed out acquiring surface texture, skipping frame");
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        };

        let output_texture_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.render_to_texture_view(&output_texture_view, draws);

        output.present();
        Ok(())
    }
}
