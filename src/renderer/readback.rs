use super::*;

/// Where the rows of a headless frame live: `frame_row` bytes of tightly packed BGRA8 per row
/// on the CPU, `gpu_row` bytes per row in the mapped copy buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameLayout {
    height: u32,
    frame_row: u32,
    gpu_row: u32,
}

impl FrameLayout {
    fn new((width, height): (u32, u32)) -> Self {
        let (frame_row, gpu_row) = compute_padded_bytes_per_row(width, 4);
        Self {
            height,
            frame_row,
            gpu_row,
        }
    }

    fn mapped_len(&self) -> u64 {
        self.gpu_row as u64 * self.height as u64
    }

    fn frame_len(&self) -> usize {
        self.frame_row as usize * self.height as usize
    }

    /// Packs the mapped rows into `frame`, dropping the per-row alignment. `frame` is only
    /// touched when `mapped` holds the whole frame.
    fn pack_frame(&self, mapped: &[u8], frame: &mut Vec<u8>) -> Result<(), GalleryError> {
        if (mapped.len() as u64) < self.mapped_len() {
            return Err(GalleryError::Readback(format!(
                "mapped {} bytes, the frame needs {}",
                mapped.len(),
                self.mapped_len()
            )));
        }

        frame.clear();
        if self.frame_row == 0 {
            return Ok(());
        }
        frame.reserve(self.frame_len());
        for row in mapped.chunks(self.gpu_row as usize).take(self.height as usize) {
            frame.extend_from_slice(&row[..self.frame_row as usize]);
        }
        Ok(())
    }
}

/// Blocks until `buffer` is mapped and copies its contents into `bytes`.
fn map_frame_buffer(
    device: &wgpu::Device,
    buffer: &wgpu::Buffer,
    bytes: &mut Vec<u8>,
) -> Result<(), GalleryError> {
    let slice = buffer.slice(..);
    let (sender, receiver) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });

    device
        .poll(wgpu::PollType::Wait)
        .map_err(|error| GalleryError::Readback(error.to_string()))?;
    receiver
        .recv()
        .map_err(|_| GalleryError::Readback("map callback was dropped".to_string()))?
        .map_err(|error| GalleryError::Readback(error.to_string()))?;

    bytes.clear();
    bytes.extend_from_slice(&slice.get_mapped_range());
    buffer.unmap();
    Ok(())
}

impl<'a> GalleryRenderer<'a> {
    /// Renders one frame offscreen and copies it into `frame` as tightly packed rows in the
    /// renderer's format (BGRA8 for headless renderers).
    ///
    /// `frame` is left untouched when the readback fails.
    pub fn render_to_buffer(
        &mut self,
        draws: &[DrawTile],
        frame: &mut Vec<u8>,
    ) -> Result<(), GalleryError> {
        let (width, height) = self.physical_size;
        let layout = FrameLayout::new(self.physical_size);

        let texture = match self.offscreen_texture.take() {
            Some(texture) if texture.width() == width && texture.height() == height => texture,
            _ => create_offscreen_color_texture(&self.device, (width, height), self.config.format),
        };
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.render_to_texture_view(&view, draws);

        let copy_buffer = match self.readback_buffer.take() {
            Some(existing) if existing.size() >= layout.mapped_len() => existing,
            _ => create_readback_buffer(
                &self.device,
                Some("gallery_frame_copy"),
                layout.mapped_len(),
            ),
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("gallery_frame_copy_encoder"),
            });
        encode_copy_texture_to_buffer(
            &mut encoder,
            &texture,
            &copy_buffer,
            width,
            height,
            layout.gpu_row,
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let mut mapped = std::mem::take(&mut self.readback_bytes);
        let copied = map_frame_buffer(&self.device, &copy_buffer, &mut mapped)
            .and_then(|()| layout.pack_frame(&mapped, frame));

        self.offscreen_texture = Some(texture);
        self.readback_buffer = Some(copy_buffer);
        self.readback_bytes = mapped;

        if let Err(error) = &copied {
            tracing::warn!(%error, width, height, "headless frame readback failed");
        }
        copied
    }
}

#[cfg(test)]
mod tests {
    use super::FrameLayout;

    /// A mapped copy of a `width` x `height` frame whose pixel `(x, y)` is `[x, y, 0, 255]`,
    /// with the row tails filled with a marker byte.
    fn mapped_frame(layout: &FrameLayout, width: u32) -> Vec<u8> {
        let mut mapped = vec![0xEE; layout.mapped_len() as usize];
        for y in 0..layout.height {
            for x in 0..width {
                let offset = (y * layout.gpu_row + x * 4) as usize;
                mapped[offset..offset + 4].copy_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        mapped
    }

    #[test]
    fn narrow_frame_drops_row_alignment() {
        let layout = FrameLayout::new((10, 3));
        assert_eq!(layout.frame_row, 40);
        assert_eq!(layout.gpu_row, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);

        let mut frame = Vec::new();
        layout
            .pack_frame(&mapped_frame(&layout, 10), &mut frame)
            .unwrap();

        assert_eq!(frame.len(), 10 * 3 * 4);
        assert!(!frame.contains(&0xEE));
        assert_eq!(frame[..4], [0, 0, 0, 255]);
        let last = frame.len() - 4;
        assert_eq!(frame[last..], [9, 2, 0, 255]);
    }

    #[test]
    fn oversized_copy_buffer_after_shrinking() {
        let layout = FrameLayout::new((64, 2));
        assert_eq!(layout.frame_row, layout.gpu_row);

        let mut mapped = mapped_frame(&layout, 64);
        // A copy buffer kept from a larger frame.
        mapped.extend_from_slice(&[0xEE; 4096]);

        let mut frame = Vec::new();
        layout.pack_frame(&mapped, &mut frame).unwrap();
        assert_eq!(frame.len(), layout.frame_len());
        assert!(!frame.contains(&0xEE));
    }

    #[test]
    fn short_copy_leaves_the_frame_alone() {
        let layout = FrameLayout::new((10, 3));
        let mapped = mapped_frame(&layout, 10);
        let mut frame = vec![7u8; 4];

        let result = layout.pack_frame(&mapped[..mapped.len() - 1], &mut frame);
        assert!(result.is_err());
        assert_eq!(frame, vec![7u8; 4]);
    }

    #[test]
    fn empty_frame_packs_to_nothing() {
        let layout = FrameLayout::new((0, 4));
        let mut frame = vec![1u8; 8];
        layout.pack_frame(&[], &mut frame).unwrap();
        assert!(frame.is_empty());
    }
}
