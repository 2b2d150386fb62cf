use std::sync::Arc;

use circular_gallery::fallback_layout::{CARD_HEIGHT, CARD_WIDTH, IMAGE_HEIGHT};
use circular_gallery::{
    Color, DrawTile, FallbackGallery, GalleryItem, GalleryRenderer, LabelBitmap, TileUniforms,
};
use futures::executor::block_on;
use image::{Rgba, RgbaImage};

use crate::expectations::PixelExpectation;

pub const CANVAS_WIDTH: u32 = 640;
pub const CANVAS_HEIGHT: u32 = 360;

/// Solid colours given to the images of consecutive cards.
pub const CARD_COLORS: [[u8; 4]; 4] = [
    [220, 40, 40, 255],
    [40, 180, 60, 255],
    [40, 80, 220, 255],
    [230, 200, 30, 255],
];

/// Colour of the stand-in caption bitmaps.
pub const LABEL_COLOR: [u8; 4] = [250, 250, 250, 255];
const LABEL_SIZE: (u32, u32) = (96, 20);

pub fn solid_image(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

/// A caption bitmap filled with one colour, so scenes do not depend on installed fonts.
pub fn marker_label(width: u32, height: u32, color: [u8; 4]) -> Arc<LabelBitmap> {
    Arc::new(LabelBitmap {
        width,
        height,
        pixels: color
            .iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect(),
    })
}

pub fn scene_items(count: usize) -> Vec<GalleryItem> {
    (0..count)
        .map(|index| GalleryItem::new(format!("scene/card-{index}.png"), format!("Card {index}")))
        .collect()
}

/// A fallback row of `count` cards on a black canvas, each with a solid image and a marker
/// caption.
pub fn build_fallback_scene(count: usize) -> FallbackGallery {
    let items = scene_items(count);
    let mut gallery = FallbackGallery::new(items.clone(), (CANVAS_WIDTH, CANVAS_HEIGHT), Color::BLACK);

    for (index, item) in items.iter().enumerate() {
        let color = CARD_COLORS[index % CARD_COLORS.len()];
        // Portrait and landscape sources both have to cover the image area.
        let image = if index % 2 == 0 {
            solid_image(90, 160, color)
        } else {
            solid_image(320, 120, color)
        };
        gallery.set_image(&item.image, &image);
        gallery.set_label(index, marker_label(LABEL_SIZE.0, LABEL_SIZE.1, LABEL_COLOR));
    }
    gallery
}

/// Expected image and caption colours at the centre of every card that is fully visible.
pub fn fallback_expectations(gallery: &FallbackGallery) -> Vec<PixelExpectation> {
    let mut expectations = Vec::new();
    for index in 0..gallery.cards().len() {
        let rect = gallery.card_rect(index);
        if rect.x < 0.0 || rect.x + rect.width > CANVAS_WIDTH as f32 {
            continue;
        }
        let center_x = (rect.x + CARD_WIDTH as f32 / 2.0) as u32;
        let image_center_y = (rect.y + IMAGE_HEIGHT as f32 / 2.0) as u32;
        let label_center_y = (rect.y + (IMAGE_HEIGHT + CARD_HEIGHT) as f32 / 2.0) as u32;

        let [r, g, b, _] = CARD_COLORS[index % CARD_COLORS.len()];
        expectations.push(PixelExpectation::opaque(
            center_x,
            image_center_y,
            r,
            g,
            b,
            format!("card {index} image"),
        ));
        let [r, g, b, _] = LABEL_COLOR;
        expectations.push(PixelExpectation::opaque(
            center_x,
            label_center_y,
            r,
            g,
            b,
            format!("card {index} caption"),
        ));
    }
    expectations
}

/// A headless renderer at canvas size, or `None` on machines without an adapter.
pub fn headless_renderer() -> Option<GalleryRenderer<'static>> {
    block_on(GalleryRenderer::new_headless((CANVAS_WIDTH, CANVAS_HEIGHT), 1.0)).ok()
}

/// One flat tile covering the middle half of the canvas, textured with a solid colour.
///
/// The matrix flattens depth so the ripple cannot push the plane out of the clip volume.
pub fn build_tile_scene(renderer: &mut GalleryRenderer<'_>) -> (Vec<DrawTile>, Vec<PixelExpectation>) {
    let color = CARD_COLORS[2];
    let image = solid_image(8, 8, color);
    let texture = renderer
        .texture_manager_mut()
        .allocate_texture_with_data(image.dimensions(), image.as_raw());

    let draw = DrawTile {
        uniforms: TileUniforms {
            mvp: [
                1.0, 0.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.5, 1.0,
            ],
            plane_sizes: [1.0, 1.0],
            image_sizes: [8.0, 8.0],
            time: 0.0,
            speed: 0.0,
            border_radius: 0.05,
            _pad: 0.0,
        },
        texture: Some(texture),
        label: None,
    };

    let [r, g, b, _] = color;
    let expectations = vec![
        PixelExpectation::opaque(CANVAS_WIDTH / 2, CANVAS_HEIGHT / 2, r, g, b, "tile centre"),
        PixelExpectation::transparent(4, 4, "clear corner"),
        PixelExpectation::transparent(CANVAS_WIDTH - 4, CANVAS_HEIGHT - 4, "clear far corner"),
    ];
    (vec![draw], expectations)
}
