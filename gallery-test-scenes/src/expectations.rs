/// A single pixel-color expectation to validate after rendering.
pub struct PixelExpectation {
    pub x: u32,
    pub y: u32,
    pub expected_r: u8,
    pub expected_g: u8,
    pub expected_b: u8,
    /// Only checked against buffers that carry alpha.
    pub expected_a: u8,
    /// Per-channel tolerance for comparison (default 5).
    pub tolerance: u8,
    /// Human-readable label for failure messages.
    pub label: String,
}

impl PixelExpectation {
    pub fn new(x: u32, y: u32, rgba: [u8; 4], label: impl Into<String>) -> Self {
        Self {
            x,
            y,
            expected_r: rgba[0],
            expected_g: rgba[1],
            expected_b: rgba[2],
            expected_a: rgba[3],
            tolerance: 5,
            label: label.into(),
        }
    }

    pub fn with_tolerance(mut self, tolerance: u8) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Convenience: expect a fully opaque color.
    pub fn opaque(x: u32, y: u32, r: u8, g: u8, b: u8, label: impl Into<String>) -> Self {
        Self::new(x, y, [r, g, b, 255], label)
    }

    /// Convenience: expect a fully transparent pixel.
    pub fn transparent(x: u32, y: u32, label: impl Into<String>) -> Self {
        Self::new(x, y, [0, 0, 0, 0], label)
    }
}

/// Validates expectations against `0x00RRGGBB` pixels as written by the CPU fallback.
///
/// Returns a list of human-readable failure descriptions. An empty list means
/// all expectations passed.
pub fn check_pixels(
    pixels: &[u32],
    width: u32,
    height: u32,
    expectations: &[PixelExpectation],
) -> Vec<String> {
    check_with(width, height, expectations, false, |x, y| {
        let pixel = *pixels.get(y as usize * width as usize + x as usize)?;
        Some([(pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8, 255])
    })
}

/// Validates expectations against BGRA8 bytes from `GalleryRenderer::render_to_buffer`.
pub fn check_bgra_pixels(
    pixel_data: &[u8],
    width: u32,
    height: u32,
    expectations: &[PixelExpectation],
) -> Vec<String> {
    let stride = width as usize * 4;
    check_with(width, height, expectations, true, |x, y| {
        let offset = y as usize * stride + x as usize * 4;
        let texel = pixel_data.get(offset..offset + 4)?;
        Some([texel[2], texel[1], texel[0], texel[3]])
    })
}

fn check_with(
    width: u32,
    height: u32,
    expectations: &[PixelExpectation],
    check_alpha: bool,
    read: impl Fn(u32, u32) -> Option<[u8; 4]>,
) -> Vec<String> {
    let mut failures = Vec::new();

    for expectation in expectations {
        if expectation.x >= width || expectation.y >= height {
            failures.push(format!(
                "[{}] pixel ({},{}) is outside canvas {}×{}",
                expectation.label, expectation.x, expectation.y, width, height,
            ));
            continue;
        }

        let Some([actual_r, actual_g, actual_b, actual_a]) = read(expectation.x, expectation.y)
        else {
            failures.push(format!(
                "[{}] pixel ({},{}) is out of bounds of the buffer",
                expectation.label, expectation.x, expectation.y,
            ));
            continue;
        };

        let tolerance = expectation.tolerance as i16;
        let matches = channel_matches(actual_r, expectation.expected_r, tolerance)
            && channel_matches(actual_g, expectation.expected_g, tolerance)
            && channel_matches(actual_b, expectation.expected_b, tolerance)
            && (!check_alpha || channel_matches(actual_a, expectation.expected_a, tolerance));

        if !matches {
            failures.push(format!(
                "[{}] pixel ({},{}) expected rgba({},{},{},{}) ±{} but got rgba({},{},{},{})",
                expectation.label,
                expectation.x,
                expectation.y,
                expectation.expected_r,
                expectation.expected_g,
                expectation.expected_b,
                expectation.expected_a,
                expectation.tolerance,
                actual_r,
                actual_g,
                actual_b,
                actual_a,
            ));
        }
    }

    failures
}

fn channel_matches(actual: u8, expected: u8, tolerance: i16) -> bool {
    let diff = (actual as i16) - (expected as i16);
    diff.abs() <= tolerance
}
