use cogkit_core::Task;
use cogkit_render::SkiaRenderer;
use cogkit_tasks::{
    ClockConfig, ClockTask, MazeConfig, MazeTask, NBackConfig, NBackTask, TrailConfig, TrailTask,
};
use cogkit_timing::{HighPrecisionTimer, ManualTimer};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

fn buffers(width: u32, height: u32) -> (SkiaRenderer, Vec<u8>, HighPrecisionTimer) {
    let r = SkiaRenderer::new(width, height).expect("renderer");
    let fb = vec![0u8; (width * height * 4) as usize];
    (r, fb, HighPrecisionTimer::new())
}

pub fn bench_maze(c: &mut Criterion) {
    let mut g = c.benchmark_group("render_scene");
    g.sample_size(50).warm_up_time(Duration::from_secs(2));

    for size in [15usize, 41] {
        let config = MazeConfig {
            maze_size: size,
            cell_size: 20,
            ..MazeConfig::default()
        };
        let task = MazeTask::new(config, ManualTimer::new(), StdRng::seed_from_u64(7))
            .expect("maze");
        let scene = task.scene();
        let px = (size * 20) as u32;
        let (mut r, mut fb, mut t) = buffers(px, px);
        g.bench_function(format!("maze_{size}"), |b| {
            b.iter(|| {
                let stats = r.render_frame(black_box(&scene), &mut fb, &mut t).unwrap();
                black_box(stats.total);
            });
        });
    }
    g.finish();
}

pub fn bench_nback(c: &mut Criterion) {
    let mut g = c.benchmark_group("render_scene");
    let mut task = NBackTask::new(
        NBackConfig::default(),
        ManualTimer::new(),
        StdRng::seed_from_u64(7),
    )
    .expect("nback");
    task.start();
    let scene = task.scene();
    let (mut r, mut fb, mut t) = buffers(400, 400);
    g.bench_function("nback_showing", |b| {
        b.iter(|| {
            let _ = black_box(r.render_frame(&scene, &mut fb, &mut t));
        });
    });
    g.finish();
}

pub fn bench_clock_and_trail(c: &mut Criterion) {
    let mut g = c.benchmark_group("render_scene");

    let clock = ClockTask::new(ClockConfig::default(), ManualTimer::new()).expect("clock");
    let clock_scene = clock.scene();
    let (mut r, mut fb, mut t) = buffers(300, 300);
    g.bench_function("clock", |b| {
        b.iter(|| {
            let _ = black_box(r.render_frame(&clock_scene, &mut fb, &mut t));
        });
    });

    let trail = TrailTask::new(
        TrailConfig {
            dot_count: 25,
            grid_size: 600,
        },
        ManualTimer::new(),
        StdRng::seed_from_u64(7),
    )
    .expect("trail");
    let trail_scene = trail.scene();
    let (mut r, mut fb, mut t) = buffers(600, 600);
    g.bench_function("trail_25", |b| {
        b.iter(|| {
            let _ = black_box(r.render_frame(&trail_scene, &mut fb, &mut t));
        });
    });
    g.finish();
}

criterion_group!(benches, bench_maze, bench_nback, bench_clock_and_trail);
criterion_main!(benches);
