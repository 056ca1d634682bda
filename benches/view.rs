//! Benchmark: cost of the per-turn vision updates.
//!
//! The view is recomputed every time the player moves, so a full sweep on
//! an open 198x66 level has to stay well inside a frame.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cavesight::entities::PlayerState;
use cavesight::vision::{update_flow, update_lite, update_view, VisionContext};
use cavesight::world::{Map, Position};
use cavesight::VisionConfig;

/// Open level: the worst case for the view sweep
fn bench_view_open(c: &mut Criterion) {
    c.bench_function("update_view_open_198x66", |b| {
        let mut map = Map::open(198, 66);
        let mut ctx = VisionContext::new(198, 66);
        let config = VisionConfig::default();
        let mut player = PlayerState::new(Position::new(99, 33));
        let mut step = 1;
        b.iter(|| {
            // Alternate between two cells so each run has real work
            player.pos = player.pos.offset(step, 0);
            step = -step;
            update_view(&mut ctx, &mut map, &player, &config);
            black_box(ctx.view().len());
        });
    });
}

/// Rooms and corridors, with the torch recomputed too
fn bench_view_and_lite_rooms(c: &mut Criterion) {
    c.bench_function("update_view_lite_test_map", |b| {
        let mut map = Map::test_map(1);
        let mut ctx = VisionContext::new(map.width, map.height);
        let config = VisionConfig::default();
        let mut player = PlayerState::new(map.start_pos).with_lite(3);
        let mut step = 1;
        b.iter(|| {
            player.pos = player.pos.offset(step, 0);
            step = -step;
            update_view(&mut ctx, &mut map, &player, &config);
            update_lite(&mut ctx, &mut map, &player);
            black_box(ctx.lite().len());
        });
    });
}

fn bench_flow(c: &mut Criterion) {
    c.bench_function("update_flow_test_map", |b| {
        let mut map = Map::test_map(1);
        let mut ctx = VisionContext::new(map.width, map.height);
        let config = VisionConfig::default();
        let player = PlayerState::new(map.start_pos);
        b.iter(|| {
            let report = update_flow(&mut ctx, &mut map, &player, &config);
            black_box(report.reached);
        });
    });
}

criterion_group!(benches, bench_view_open, bench_view_and_lite_rooms, bench_flow);
criterion_main!(benches);
