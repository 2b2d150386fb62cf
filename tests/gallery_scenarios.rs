/// End-to-end behaviour of the scene controller without a GPU.
///
/// Run with:   cargo test --test gallery_scenarios
use std::time::{Duration, Instant};

use circular_gallery::{
    arrange_sequence, cyclic_conflicts, GalleryConfig, GalleryController, GalleryItem,
    InputEvent, PointerId, Screen,
};

fn item(image: &str, text: &str) -> GalleryItem {
    GalleryItem::new(image, text)
}

fn controller_with(items: Vec<GalleryItem>, bend: f32) -> GalleryController {
    let config = GalleryConfig::default().with_items(items).with_bend(bend);
    GalleryController::new(config, Screen::new(1280, 720))
}

fn assert_near(actual: f32, expected: f32, tolerance: f32, what: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{what}: expected {expected} ± {tolerance}, got {actual}"
    );
}

#[test]
fn three_items_with_repeated_image_keep_the_seam_apart() {
    let mut controller = controller_with(
        vec![item("a.jpg", "A"), item("b.jpg", "B"), item("a.jpg", "A2")],
        0.0,
    );

    let sequence = controller.sequence();
    assert_eq!(sequence.len(), 6);
    assert_ne!(sequence[2].image, sequence[3].image);

    let start = Instant::now();
    for frame in 0..120 {
        let now = start + Duration::from_millis(16 * frame);
        if frame % 10 == 0 {
            controller.handle_input(InputEvent::Wheel { delta_y: 1.0 }, now);
        }
        controller.tick(now);
        for tile in controller.tiles() {
            assert_eq!(tile.y, 0.0);
            assert_eq!(tile.rotation_z, 0.0);
        }
    }
}

#[test]
fn scroll_converges_on_a_held_target_without_oscillating() {
    let mut controller = controller_with(Vec::new(), 3.0);
    let target = 5.0 * controller.tile_width();
    controller.scroll_mut().target = target;

    let start = Instant::now();
    let mut previous = controller.scroll().current;
    for frame in 0..500 {
        controller.tick(start + Duration::from_millis(16 * frame));
        let current = controller.scroll().current;
        assert!(current >= previous, "scroll moved backwards at frame {frame}");
        assert!(current <= target + 1e-3, "scroll overshot at frame {frame}");
        previous = current;
    }

    assert_near(controller.scroll().current, target, 0.01, "settled scroll");
    for frame in 500..520 {
        controller.tick(start + Duration::from_millis(16 * frame));
        assert_near(controller.scroll().current, target, 0.01, "held scroll");
    }
}

#[test]
fn arranged_sequences_avoid_adjacent_duplicates_when_possible() {
    let inputs = vec![
        vec![item("a", "1"), item("b", "2"), item("c", "3"), item("a", "4")],
        vec![
            item("a", "1"),
            item("a", "2"),
            item("b", "3"),
            item("c", "4"),
            item("d", "5"),
        ],
        vec![
            item("x", "1"),
            item("y", "2"),
            item("x", "3"),
            item("z", "4"),
            item("y", "5"),
            item("x", "6"),
        ],
    ];

    for items in inputs {
        let sequence = arrange_sequence(&items);
        assert_eq!(sequence.len(), items.len() * 2);
        assert_eq!(
            cyclic_conflicts(&sequence),
            0,
            "adjacent duplicates in {:?}",
            sequence.iter().map(|item| item.image.as_str()).collect::<Vec<_>>()
        );
    }
}

#[test]
fn teleports_move_tiles_by_whole_sequence_widths() {
    let mut controller = controller_with(Vec::new(), 3.0);
    let start = Instant::now();
    let mut teleports = 0;

    for frame in 0..1_500u64 {
        let now = start + Duration::from_millis(16 * frame);
        let delta_y = if frame < 900 { 1.0 } else { -1.0 };
        controller.handle_input(InputEvent::Wheel { delta_y }, now);
        let report = controller.tick(now).map(|report| report.teleports);
        teleports += report.unwrap_or(0);

        let current = controller.scroll().current;
        for tile in controller.tiles() {
            let width_total = tile.layout.width_total;
            let phase = (tile.layout.base_x - tile.extra_offset()).rem_euclid(width_total);
            let base_phase = tile.layout.base_x.rem_euclid(width_total);
            let drift = (phase - base_phase).abs();
            assert!(
                drift < 1e-2 || (width_total - drift) < 1e-2,
                "tile {} drifted by {drift}",
                tile.index
            );
            // A teleport lands in `wraps` and moves the tile on the next frame.
            let lag = (tile.x - (tile.layout.base_x - current - tile.extra_offset()))
                .rem_euclid(width_total);
            assert!(
                lag < 1e-2 || (width_total - lag) < 1e-2,
                "tile {} is off the scroll position by {lag}",
                tile.index
            );
        }
    }

    assert!(teleports > 0, "no tile ever wrapped around");
    assert!(controller.tiles().iter().any(|tile| tile.wraps != 0));
}

#[test]
fn resizing_twice_matches_resizing_once() {
    let mut once = controller_with(Vec::new(), 3.0);
    let mut twice = controller_with(Vec::new(), 3.0);

    once.resize(Screen::new(900, 1400));
    twice.resize(Screen::new(900, 1400));
    twice.resize(Screen::new(900, 1400));

    for (a, b) in once.tiles().iter().zip(twice.tiles()) {
        assert_eq!(a.layout, b.layout);
    }
    assert_eq!(once.viewport(), twice.viewport());
}

#[test]
fn scroll_target_snaps_to_tile_width_after_the_debounce() {
    let mut controller = controller_with(Vec::new(), 3.0);
    let tile_width = controller.tile_width();
    let start = Instant::now();

    controller.handle_input(
        InputEvent::PointerDown {
            pointer: PointerId::Mouse,
            x: 600.0,
            y: 300.0,
        },
        start,
    );
    controller.handle_input(
        InputEvent::PointerMove {
            pointer: PointerId::Mouse,
            x: 437.0,
            y: 310.0,
        },
        start + Duration::from_millis(20),
    );
    controller.handle_input(
        InputEvent::PointerUp {
            pointer: PointerId::Mouse,
        },
        start + Duration::from_millis(40),
    );
    for step in 0..3 {
        controller.handle_input(
            InputEvent::Wheel { delta_y: 1.0 },
            start + Duration::from_millis(60 + step * 30),
        );
    }

    let before = controller.tick(start + Duration::from_millis(150));
    assert_eq!(before.map(|report| report.snapped), Some(false));

    let after = controller.tick(start + Duration::from_millis(400));
    assert_eq!(after.map(|report| report.snapped), Some(true));

    let steps = controller.scroll().target / tile_width;
    assert_near(steps, steps.round(), 1e-4, "snapped target in tile widths");
}

#[test]
fn zero_bend_keeps_every_tile_flat() {
    let mut controller = controller_with(Vec::new(), 0.0);
    let start = Instant::now();

    for (frame, target) in [-250.0, -12.5, 0.0, 3.3, 47.0, 1_000.0].into_iter().enumerate() {
        controller.scroll_mut().target = target;
        for step in 0..30u64 {
            controller.tick(start + Duration::from_millis(16 * (frame as u64 * 30 + step)));
            for tile in controller.tiles() {
                assert_eq!(tile.y, 0.0);
                assert_eq!(tile.rotation_z, 0.0);
            }
        }
    }
}
