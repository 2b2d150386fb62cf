/// GPU pixel tests for the tile and label pipelines.
///
/// These use the headless renderer and read the frame back as BGRA8. Machines without any
/// adapter skip them.
///
/// Run with:   cargo test --test headless_render
use gallery_test_scenes::{
    build_tile_scene, check_bgra_pixels, headless_renderer, PixelExpectation, CANVAS_HEIGHT,
    CANVAS_WIDTH,
};

macro_rules! renderer_or_skip {
    () => {
        match headless_renderer() {
            Some(renderer) => renderer,
            None => {
                eprintln!("no GPU adapter available, skipping");
                return;
            }
        }
    };
}

fn assert_no_failures(failures: Vec<String>) {
    if !failures.is_empty() {
        panic!(
            "{} pixel expectation(s) failed:\n{}",
            failures.len(),
            failures.join("\n"),
        );
    }
}

#[test]
fn flat_tile_pixel_expectations() {
    let mut renderer = renderer_or_skip!();
    let (draws, expectations) = build_tile_scene(&mut renderer);

    let mut pixel_buffer = Vec::new();
    renderer
        .render_to_buffer(&draws, &mut pixel_buffer)
        .expect("headless render");

    assert_eq!(
        pixel_buffer.len(),
        (CANVAS_WIDTH * CANVAS_HEIGHT * 4) as usize
    );
    assert_no_failures(check_bgra_pixels(
        &pixel_buffer,
        CANVAS_WIDTH,
        CANVAS_HEIGHT,
        &expectations,
    ));
}

/// An empty draw list still clears the frame.
#[test]
fn empty_draw_list() {
    let mut renderer = renderer_or_skip!();

    let mut pixel_buffer = Vec::new();
    renderer
        .render_to_buffer(&[], &mut pixel_buffer)
        .expect("headless render");

    assert!(!pixel_buffer.is_empty());
    assert!(pixel_buffer.iter().all(|&byte| byte == 0));
}

#[test]
fn tiles_without_textures_draw_the_placeholder() {
    let mut renderer = renderer_or_skip!();
    let (mut draws, _) = build_tile_scene(&mut renderer);
    for draw in &mut draws {
        draw.texture = None;
    }

    let mut pixel_buffer = Vec::new();
    renderer
        .render_to_buffer(&draws, &mut pixel_buffer)
        .expect("headless render");

    let failures = check_bgra_pixels(
        &pixel_buffer,
        CANVAS_WIDTH,
        CANVAS_HEIGHT,
        &[PixelExpectation::transparent(4, 4, "clear corner")],
    );
    assert_no_failures(failures);
}

#[test]
fn readback_follows_resize() {
    let mut renderer = renderer_or_skip!();
    let (draws, _) = build_tile_scene(&mut renderer);

    let mut pixel_buffer = Vec::new();
    renderer
        .render_to_buffer(&draws, &mut pixel_buffer)
        .expect("first render");

    renderer.resize((CANVAS_WIDTH / 2, CANVAS_HEIGHT / 2));
    assert_eq!(renderer.size(), (CANVAS_WIDTH / 2, CANVAS_HEIGHT / 2));
    renderer
        .render_to_buffer(&draws, &mut pixel_buffer)
        .expect("render after resize");

    assert_eq!(
        pixel_buffer.len(),
        (CANVAS_WIDTH / 2 * CANVAS_HEIGHT / 2 * 4) as usize
    );
    let [r, g, b, _] = gallery_test_scenes::scene::CARD_COLORS[2];
    assert_no_failures(check_bgra_pixels(
        &pixel_buffer,
        CANVAS_WIDTH / 2,
        CANVAS_HEIGHT / 2,
        &[PixelExpectation::opaque(
            CANVAS_WIDTH / 4,
            CANVAS_HEIGHT / 4,
            r,
            g,
            b,
            "tile centre after resize",
        )],
    ));
}

#[test]
fn headless_render_without_readback_is_a_no_op() {
    let mut renderer = renderer_or_skip!();
    assert!(renderer.is_headless());
    let (draws, _) = build_tile_scene(&mut renderer);
    renderer.render(&draws).expect("headless present");
}
