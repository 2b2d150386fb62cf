use std::time::{Duration, Instant};

use circular_gallery::{
    arrange_sequence, default_items, Color, FallbackGallery, GalleryConfig, GalleryController,
    InputEvent, Screen,
};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

fn controller_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("controller");

    group.bench_function("tick_while_scrolling", |b| {
        let mut controller = GalleryController::new(GalleryConfig::default(), Screen::new(1920, 1080));
        let start = Instant::now();
        let mut frame = 0u64;
        b.iter(|| {
            let now = start + Duration::from_millis(16 * frame);
            if frame % 8 == 0 {
                controller.handle_input(InputEvent::Wheel { delta_y: 1.0 }, now);
            }
            frame += 1;
            black_box(controller.tick(now));
            black_box(controller.draw_list().len());
        });
    });

    group.bench_function("resize", |b| {
        b.iter_batched(
            || GalleryController::new(GalleryConfig::default(), Screen::new(1280, 720)),
            |mut controller| {
                controller.resize(black_box(Screen::new(1920, 1080)));
                controller
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn sequence_arrangement(c: &mut Criterion) {
    let items = default_items();
    c.bench_function("arrange_sequence", |b| {
        b.iter(|| arrange_sequence(black_box(&items)))
    });
}

fn fallback_render(c: &mut Criterion) {
    let gallery = FallbackGallery::new(default_items(), (1280, 720), Color::BLACK);
    let mut pixels = vec![0u32; 1280 * 720];
    c.bench_function("fallback_render_1280x720", |b| {
        b.iter(|| gallery.render_into(black_box(&mut pixels), 1280, 720))
    });
}

criterion_group!(benches, controller_tick, sequence_arrangement, fallback_render);
criterion_main!(benches);
