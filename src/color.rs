use crate::error::GalleryError;
use crate::util::normalize_rgba_color;

/// Represents a color in RGBA format.
///
/// Each channel is an 8-bit unsigned integer. Colors used for label text and backgrounds are
/// usually written as CSS strings in the configuration and parsed with [`Color::parse`].
///
/// # Examples
///
/// ```
/// use circular_gallery::Color;
///
/// let red = Color::rgb(255, 0, 0);
/// assert_eq!(red.normalize(), [1.0, 0.0, 0.0, 1.0]);
///
/// let teal = Color::parse("#00808080").unwrap();
/// assert_eq!(teal.to_array(), [0, 128, 128, 128]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub [u8; 4]);

impl Color {
    /// A fully transparent color.
    pub const TRANSPARENT: Self = Self([0, 0, 0, 0]);
    /// Opaque black.
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    /// Opaque white.
    pub const WHITE: Self = Self([255, 255, 255, 255]);

    /// Creates a new color with the specified RGB values and full opacity.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    /// Creates a new color with the specified RGBA values.
    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Parses a CSS-like color string.
    ///
    /// Supported forms are `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
    /// `rgba(r, g, b, a)` with `a` in `0..=1`, and the keywords `black`, `white` and
    /// `transparent`.
    ///
    /// ```
    /// use circular_gallery::Color;
    ///
    /// assert_eq!(Color::parse("#fff").unwrap(), Color::WHITE);
    /// assert_eq!(Color::parse("rgba(0, 0, 0, 0.5)").unwrap(), Color::rgba(0, 0, 0, 128));
    /// assert!(Color::parse("chartreuse-ish").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self, GalleryError> {
        let trimmed = value.trim();
        let invalid = || GalleryError::InvalidColor(value.to_string());

        match trimmed.to_ascii_lowercase().as_str() {
            "black" => return Ok(Self::BLACK),
            "white" => return Ok(Self::WHITE),
            "transparent" => return Ok(Self::TRANSPARENT),
            _ => {}
        }

        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }

        let lower = trimmed.to_ascii_lowercase();
        let arguments = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;

        let parts: Vec<&str> = arguments.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(invalid());
        }

        let mut channels = [0u8; 4];
        for (channel, part) in channels.iter_mut().zip(&parts[..3]) {
            *channel = part.parse::<u8>().map_err(|_| invalid())?;
        }
        channels[3] = match parts.get(3) {
            Some(alpha) => {
                let alpha = alpha.parse::<f32>().map_err(|_| invalid())?;
                if !(0.0..=1.0).contains(&alpha) {
                    return Err(invalid());
                }
                (alpha * 255.0).round() as u8
            }
            None => 255,
        };

        Ok(Self(channels))
    }

    /// Normalizes the color values to the range [0.0, 1.0].
    pub fn normalize(&self) -> [f32; 4] {
        normalize_rgba_color(&self.0)
    }

    /// Returns the color as an array of 4 `u8` values.
    pub fn to_array(&self) -> [u8; 4] {
        self.0
    }

    /// Packs the color as `0x00RRGGBB`, the pixel layout softbuffer presents.
    /// Alpha is dropped.
    pub fn to_argb_u32(&self) -> u32 {
        let [r, g, b, _] = self.0;
        ((r as u32) << 16) | ((g as u32) << 8) | b as u32
    }

    /// Relative luminance in [0.0, 1.0], ignoring alpha.
    pub fn luminance(&self) -> f32 {
        let [r, g, b, _] = self.normalize();
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }

    /// The color drawn around label glyphs so text stays legible over any image.
    ///
    /// Light text gets a dark outline and dark text a light one.
    pub fn outline_contrast(&self) -> Self {
        if self.luminance() > 0.5 {
            Self::rgba(0, 0, 0, 160)
        } else {
            Self::rgba(255, 255, 255, 160)
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let nibble = |index: usize| u8::from_str_radix(&hex[index..index + 1], 16).ok();
    let byte = |index: usize| u8::from_str_radix(&hex[index..index + 2], 16).ok();

    match hex.len() {
        3 => Some(Color::rgb(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17)),
        4 => Some(Color::rgba(
            nibble(0)? * 17,
            nibble(1)? * 17,
            nibble(2)? * 17,
            nibble(3)? * 17,
        )),
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(Color::parse("#545050").unwrap(), Color::rgb(0x54, 0x50, 0x50));
        assert_eq!(Color::parse("#0f08").unwrap(), Color::rgba(0, 255, 0, 136));
    }

    #[test]
    fn parses_functional_notation() {
        assert_eq!(
            Color::parse("rgb(12, 34, 56)").unwrap(),
            Color::rgb(12, 34, 56)
        );
        assert!(Color::parse("rgba(1, 2, 3, 1.5)").is_err());
        assert!(Color::parse("rgb(1, 2)").is_err());
    }

    #[test]
    fn outline_opposes_text_color() {
        assert_eq!(Color::WHITE.outline_contrast().to_array()[..3], [0, 0, 0]);
        assert_eq!(
            Color::BLACK.outline_contrast().to_array()[..3],
            [255, 255, 255]
        );
    }

    #[test]
    fn argb_packing_drops_alpha() {
        assert_eq!(Color::rgba(0x12, 0x34, 0x56, 0x00).to_argb_u32(), 0x0012_3456);
    }
}
