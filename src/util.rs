pub fn normalize_rgba_color(color: &[u8; 4]) -> [f32; 4] {
    [
        color[0] as f32 / 255.0,
        color[1] as f32 / 255.0,
        color[2] as f32 / 255.0,
        color[3] as f32 / 255.0,
    ]
}

pub fn to_logical(physical_size: (u32, u32), scale_factor: f64) -> (f32, f32) {
    let (physical_width, physical_height) = physical_size;
    let logical_width = physical_width as f64 / scale_factor;
    let logical_height = physical_height as f64 / scale_factor;
    (logical_width as f32, logical_height as f32)
}

/// Texture-to-buffer copies need rows padded to `COPY_BYTES_PER_ROW_ALIGNMENT`.
/// Returns `(unpadded, padded)` bytes per row.
pub(crate) fn compute_padded_bytes_per_row(width: u32, bytes_per_pixel: u32) -> (u32, u32) {
    let unpadded_bytes_per_row = width * bytes_per_pixel;
    let alignment = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(alignment) * alignment;
    (unpadded_bytes_per_row, padded_bytes_per_row)
}

/// Source-over blend of a straight-alpha RGBA source onto a straight-alpha RGBA destination.
#[inline]
pub(crate) fn blend_rgba_over(destination: &mut [u8], source: [u8; 4]) {
    let source_alpha = source[3] as f32 / 255.0;
    if source_alpha <= 0.0 {
        return;
    }
    let destination_alpha = destination[3] as f32 / 255.0;
    let out_alpha = source_alpha + destination_alpha * (1.0 - source_alpha);
    if out_alpha <= 0.0 {
        return;
    }

    for channel in 0..3 {
        let source_channel = source[channel] as f32;
        let destination_channel = destination[channel] as f32;
        let blended = (source_channel * source_alpha
            + destination_channel * destination_alpha * (1.0 - source_alpha))
            / out_alpha;
        destination[channel] = blended.round().clamp(0.0, 255.0) as u8;
    }
    destination[3] = (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Blends a straight-alpha RGBA source onto an opaque `0x00RRGGBB` pixel.
#[inline]
pub(crate) fn blend_over_argb(destination: u32, source: [u8; 4]) -> u32 {
    let alpha = source[3] as u32;
    if alpha == 0 {
        return destination;
    }
    if alpha == 255 {
        return ((source[0] as u32) << 16) | ((source[1] as u32) << 8) | source[2] as u32;
    }

    let mix = |source_channel: u8, shift: u32| {
        let destination_channel = (destination >> shift) & 0xff;
        (source_channel as u32 * alpha + destination_channel * (255 - alpha) + 127) / 255
    };

    (mix(source[0], 16) << 16) | (mix(source[1], 8) << 8) | mix(source[2], 0)
}
