//! Caption rasterization.
//!
//! Captions are shaped with `glyphon`'s cosmic-text and drawn on the CPU into straight-alpha
//! RGBA bitmaps, which are then uploaded as label textures (or blitted directly by the
//! fallback renderer).
//!
//! # Examples
//!
//! ```rust
//! use circular_gallery::{LabelStyle, TextRasterizer};
//!
//! let mut rasterizer = TextRasterizer::new();
//! let bitmap = rasterizer.rasterize("", &LabelStyle::default());
//! assert_eq!((bitmap.width, bitmap.height), (1, 1));
//! assert_eq!(bitmap.pixels, vec![0, 0, 0, 0]);
//! ```

use std::hash::{Hash, Hasher};

use glyphon::cosmic_text::Align;
use glyphon::{
    Attrs, Buffer as TextBuffer, Color as TextColor, Family, FontSystem, Metrics, Shaping,
    SwashCache, Weight,
};

use crate::color::Color;
use crate::config::{FontFamily, FontSpec};
use crate::util::blend_rgba_over;

/// How a caption is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub font: FontSpec,
    pub color: Color,
    /// Transparent margin around the text, in pixels.
    pub padding: u32,
    /// Distance of the contrasting outline from each glyph, in pixels.
    pub outline_px: u32,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font: FontSpec::default(),
            color: Color::WHITE,
            padding: 10,
            outline_px: 2,
        }
    }
}

impl LabelStyle {
    pub fn new(font: FontSpec, color: Color) -> Self {
        Self {
            font,
            color,
            ..Self::default()
        }
    }

    pub(crate) fn hash_into<H: Hasher>(&self, state: &mut H) {
        self.font.weight.hash(state);
        self.font.size_px.to_bits().hash(state);
        self.font.family.hash(state);
        self.color.hash(state);
        self.padding.hash(state);
        self.outline_px.hash(state);
    }
}

/// A rasterized caption. `pixels` holds `width * height` straight-alpha RGBA8 texels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelBitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl LabelBitmap {
    /// A bitmap of the given size with every texel transparent.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y * self.width + x) * 4) as usize;
        let texel = self.pixels.get(offset..offset + 4)?;
        Some([texel[0], texel[1], texel[2], texel[3]])
    }

    fn blend(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let offset = ((y as u32 * self.width + x as u32) * 4) as usize;
        blend_rgba_over(&mut self.pixels[offset..offset + 4], color);
    }
}

/// Canvas size for lines of the given measured widths: the widest line plus padding on each
/// side, and the stacked line heights plus padding.
pub fn label_canvas_size(line_widths: &[f32], style: &LabelStyle) -> (u32, u32) {
    let widest = line_widths.iter().copied().fold(0.0f32, f32::max);
    let lines = line_widths.len().max(1) as f32;
    let padding = style.padding * 2;

    (
        widest.ceil() as u32 + padding,
        (style.font.line_height() * lines).ceil() as u32 + padding,
    )
}

/// Owns the font database and glyph cache used for every caption of a gallery.
pub struct TextRasterizer {
    font_system: FontSystem,
    swash_cache: SwashCache,
}

impl TextRasterizer {
    /// Loads the system fonts.
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
        }
    }

    /// Registers an additional font, e.g. one bundled with the application.
    pub fn load_font_data(&mut self, data: Vec<u8>) {
        self.font_system.db_mut().load_font_data(data);
    }

    /// Width of every `\n`-separated line of `text`, in pixels.
    pub fn measure_lines(&mut self, text: &str, style: &LabelStyle) -> Vec<f32> {
        let buffer = self.shape(text, style, None);
        let mut widths = vec![0.0f32; text.split('\n').count()];
        for run in buffer.layout_runs() {
            if let Some(width) = widths.get_mut(run.line_i) {
                *width = width.max(run.line_w);
            }
        }
        widths
    }

    pub fn rasterize(&mut self, text: &str, style: &LabelStyle) -> LabelBitmap {
        if text.is_empty() {
            return LabelBitmap::transparent(1, 1);
        }

        let line_widths = self.measure_lines(text, style);
        let (width, height) = label_canvas_size(&line_widths, style);
        let content_width = (width - style.padding * 2) as f32;
        let buffer = self.shape(text, style, Some(content_width));

        let mut bitmap = LabelBitmap::transparent(width, height);
        let padding = style.padding as i32;
        let outline = style.outline_px as i32;
        let outline_color = style.color.outline_contrast();

        if outline > 0 {
            for (dx, dy) in outline_offsets(outline) {
                self.draw_buffer(
                    &buffer,
                    &mut bitmap,
                    outline_color,
                    padding + dx,
                    padding + dy,
                );
            }
        }
        self.draw_buffer(&buffer, &mut bitmap, style.color, padding, padding);

        bitmap
    }

    fn shape(&mut self, text: &str, style: &LabelStyle, width: Option<f32>) -> TextBuffer {
        let font = &style.font;
        let mut buffer = TextBuffer::new(
            &mut self.font_system,
            Metrics::new(font.size_px, font.line_height()),
        );
        buffer.set_size(&mut self.font_system, width, None);

        let family = match &font.family {
            FontFamily::SansSerif => Family::SansSerif,
            FontFamily::Serif => Family::Serif,
            FontFamily::Monospace => Family::Monospace,
            FontFamily::Named(name) => Family::Name(name),
        };
        let attrs = Attrs::new().family(family).weight(Weight(font.weight));
        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced);

        if width.is_some() {
            for line in buffer.lines.iter_mut() {
                line.set_align(Some(Align::Center));
            }
        }
        buffer.shape_until_scroll(&mut self.font_system, false);
        buffer
    }

    fn draw_buffer(
        &mut self,
        buffer: &TextBuffer,
        bitmap: &mut LabelBitmap,
        color: Color,
        offset_x: i32,
        offset_y: i32,
    ) {
        let [r, g, b, a] = color.to_array();
        buffer.draw(
            &mut self.font_system,
            &mut self.swash_cache,
            TextColor::rgba(r, g, b, a),
            |x, y, w, h, glyph_color| {
                let rgba = [
                    glyph_color.r(),
                    glyph_color.g(),
                    glyph_color.b(),
                    glyph_color.a(),
                ];
                for row in 0..h as i32 {
                    for column in 0..w as i32 {
                        bitmap.blend(offset_x + x + column, offset_y + y + row, rgba);
                    }
                }
            },
        );
    }
}

impl Default for TextRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

fn outline_offsets(distance: i32) -> [(i32, i32); 8] {
    [
        (-distance, -distance),
        (0, -distance),
        (distance, -distance),
        (-distance, 0),
        (distance, 0),
        (-distance, distance),
        (0, distance),
        (distance, distance),
    ]
}
