pub mod expectations;
pub mod scene;

pub use expectations::{check_bgra_pixels, check_pixels, PixelExpectation};
pub use scene::{
    build_fallback_scene, build_tile_scene, fallback_expectations, headless_renderer,
    CANVAS_HEIGHT, CANVAS_WIDTH,
};
