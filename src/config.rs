//! Gallery configuration.
//!
//! [`GalleryConfig`] carries every knob the gallery exposes, with defaults matching the
//! stock circular gallery: a bend of 3, white bold labels and a 200ms snap debounce.
//!
//! ```
//! use circular_gallery::{Color, GalleryConfig, GalleryItem};
//!
//! let config = GalleryConfig::default()
//!     .with_items(vec![GalleryItem::new("assets/a.jpg", "Harbour View")])
//!     .with_bend(0.0)
//!     .with_text_color(Color::BLACK)
//!     .with_font("600 24px Inter")
//!     .unwrap();
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.font.size_px, 24.0);
//! ```

use std::time::Duration;

use crate::color::Color;
use crate::error::GalleryError;
use crate::item::GalleryItem;

/// Family part of a [`FontSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FontFamily {
    SansSerif,
    Serif,
    Monospace,
    Named(String),
}

/// A font parsed from CSS shorthand, e.g. `"bold 30px Figtree"`.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// CSS numeric weight, 100..=900.
    pub weight: u16,
    pub size_px: f32,
    pub family: FontFamily,
}

impl FontSpec {
    pub const DEFAULT: &'static str = "bold 30px Figtree";

    /// Parses CSS font shorthand. Style keywords (`italic`, `oblique`) are accepted and
    /// ignored; the size token must be expressed in `px`.
    pub fn parse(value: &str) -> Result<Self, GalleryError> {
        let invalid = || GalleryError::InvalidFont(value.to_string());
        let mut weight = 400;
        let mut tokens = value.split_whitespace();
        let mut size_px = None;

        for token in tokens.by_ref() {
            let lower = token.to_ascii_lowercase();
            match lower.as_str() {
                "normal" | "italic" | "oblique" => continue,
                "bold" | "bolder" => {
                    weight = 700;
                    continue;
                }
                "lighter" => {
                    weight = 300;
                    continue;
                }
                _ => {}
            }

            if let Ok(numeric) = lower.parse::<u16>() {
                if (100..=900).contains(&numeric) && numeric % 100 == 0 {
                    weight = numeric;
                    continue;
                }
                return Err(invalid());
            }

            // "30px/1.2" carries a line height we do not use.
            let size_token = lower.split('/').next().unwrap_or_default();
            let size = size_token
                .strip_suffix("px")
                .and_then(|number| number.parse::<f32>().ok())
                .filter(|size| size.is_finite() && *size > 0.0)
                .ok_or_else(invalid)?;
            size_px = Some(size);
            break;
        }

        let size_px = size_px.ok_or_else(invalid)?;
        let families = tokens.collect::<Vec<_>>().join(" ");
        let first_family = families
            .split(',')
            .next()
            .map(|family| family.trim().trim_matches(|c| c == '"' || c == '\''))
            .unwrap_or_default();

        let family = match first_family.to_ascii_lowercase().as_str() {
            "" | "sans-serif" => FontFamily::SansSerif,
            "serif" => FontFamily::Serif,
            "monospace" => FontFamily::Monospace,
            _ => FontFamily::Named(first_family.to_string()),
        };

        Ok(Self {
            weight,
            size_px,
            family,
        })
    }

    /// Line height used by the label rasterizer.
    pub fn line_height(&self) -> f32 {
        self.size_px * 1.2
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            weight: 700,
            size_px: 30.0,
            family: FontFamily::Named("Figtree".to_string()),
        }
    }
}

/// Everything a gallery instance can be configured with.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryConfig {
    /// Items to display. `None` or an empty list selects [`crate::default_items`].
    pub items: Option<Vec<GalleryItem>>,
    /// Curvature of the arc the tiles sit on. 0 lays them out flat, positive values sag,
    /// negative values arch.
    pub bend: f32,
    pub text_color: Color,
    /// Corner radius in plane UV units (0..0.5).
    pub border_radius: f32,
    pub font: FontSpec,
    /// Fraction of the remaining distance covered each frame.
    pub scroll_ease: f32,
    /// Scroll units added per wheel notch.
    pub wheel_step: f32,
    /// Scroll units per dragged pixel.
    pub drag_sensitivity: f32,
    /// Quiet period after the last gesture before the target snaps to a tile.
    pub snap_delay: Duration,
    pub camera_fov_degrees: f32,
    pub camera_distance: f32,
    pub background: Color,
    pub vsync: bool,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            items: None,
            bend: 3.0,
            text_color: Color::WHITE,
            border_radius: 0.05,
            font: FontSpec::default(),
            scroll_ease: 0.05,
            wheel_step: 2.0,
            drag_sensitivity: 0.05,
            snap_delay: Duration::from_millis(200),
            camera_fov_degrees: 45.0,
            camera_distance: 20.0,
            background: Color::TRANSPARENT,
            vsync: true,
        }
    }
}

impl GalleryConfig {
    pub fn with_items(mut self, items: Vec<GalleryItem>) -> Self {
        self.items = Some(items);
        self
    }

    pub fn with_bend(mut self, bend: f32) -> Self {
        self.bend = bend;
        self
    }

    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = color;
        self
    }

    pub fn with_border_radius(mut self, border_radius: f32) -> Self {
        self.border_radius = border_radius;
        self
    }

    /// Sets the label font from CSS shorthand.
    pub fn with_font(mut self, font: &str) -> Result<Self, GalleryError> {
        self.font = FontSpec::parse(font)?;
        Ok(self)
    }

    pub fn with_scroll_ease(mut self, ease: f32) -> Self {
        self.scroll_ease = ease;
        self
    }

    pub fn with_wheel_step(mut self, step: f32) -> Self {
        self.wheel_step = step;
        self
    }

    pub fn with_drag_sensitivity(mut self, sensitivity: f32) -> Self {
        self.drag_sensitivity = sensitivity;
        self
    }

    pub fn with_snap_delay(mut self, delay: Duration) -> Self {
        self.snap_delay = delay;
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// The items the gallery will actually show, before arrangement.
    pub fn resolved_items(&self) -> Vec<GalleryItem> {
        match &self.items {
            Some(items) if !items.is_empty() => items.clone(),
            _ => crate::item::default_items(),
        }
    }

    pub fn validate(&self) -> Result<(), GalleryError> {
        let invalid = |message: &str| Err(GalleryError::InvalidConfig(message.to_string()));

        if !self.bend.is_finite() {
            return invalid("bend must be finite");
        }
        if !(self.scroll_ease > 0.0 && self.scroll_ease <= 1.0) {
            return invalid("scroll_ease must be in (0, 1]");
        }
        if !self.border_radius.is_finite() || self.border_radius < 0.0 {
            return invalid("border_radius must be a non-negative number");
        }
        if !self.wheel_step.is_finite() || self.wheel_step <= 0.0 {
            return invalid("wheel_step must be positive");
        }
        if !self.drag_sensitivity.is_finite() || self.drag_sensitivity <= 0.0 {
            return invalid("drag_sensitivity must be positive");
        }
        if !(self.camera_fov_degrees > 0.0 && self.camera_fov_degrees < 180.0) {
            return invalid("camera_fov_degrees must be in (0, 180)");
        }
        if !self.camera_distance.is_finite() || self.camera_distance <= 0.0 {
            return invalid("camera_distance must be positive");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_font_shorthand() {
        let font = FontSpec::parse(FontSpec::DEFAULT).unwrap();
        assert_eq!(font, FontSpec::default());
    }

    #[test]
    fn parses_quoted_family_list_and_numeric_weight() {
        let font = FontSpec::parse("italic 500 18px/1.4 \"Open Sans\", sans-serif").unwrap();
        assert_eq!(font.weight, 500);
        assert_eq!(font.size_px, 18.0);
        assert_eq!(font.family, FontFamily::Named("Open Sans".to_string()));
    }

    #[test]
    fn generic_families_and_missing_family() {
        assert_eq!(
            FontSpec::parse("12px monospace").unwrap().family,
            FontFamily::Monospace
        );
        assert_eq!(FontSpec::parse("12px").unwrap().family, FontFamily::SansSerif);
    }

    #[test]
    fn rejects_missing_size() {
        assert!(FontSpec::parse("bold Figtree").is_err());
        assert!(FontSpec::parse("bold 2em Figtree").is_err());
        assert!(FontSpec::parse("").is_err());
    }

    #[test]
    fn empty_items_resolve_to_defaults() {
        let config = GalleryConfig::default().with_items(Vec::new());
        assert_eq!(config.resolved_items(), crate::item::default_items());
    }

    #[test]
    fn validation_catches_bad_ease() {
        assert!(GalleryConfig::default().validate().is_ok());
        assert!(GalleryConfig::default()
            .with_scroll_ease(0.0)
            .validate()
            .is_err());
        assert!(GalleryConfig::default()
            .with_bend(f32::NAN)
            .validate()
            .is_err());
    }
}
