//! Tick throughput for the face engine.
//!
//! Run with: cargo bench -p face-expression-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use face_expression_core::{
    builtins, interp::interpolate, EventPayload, FaceConfig, FaceEngine, LatestFrame,
};

fn bench_interpolate(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate");
    for expression in [builtins::happy(), builtins::look_around()] {
        let keys = expression.keyframes.clone();
        let method = expression.interpolation_method;
        group.bench_with_input(
            BenchmarkId::new("sample", &expression.name),
            &keys,
            |b, keys| b.iter(|| interpolate(black_box(keys), black_box(0.73), method)),
        );
    }
    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_tick");
    for backlog in [0usize, 16, 128] {
        group.bench_with_input(BenchmarkId::new("inbox", backlog), &backlog, |b, &backlog| {
            let mut engine = FaceEngine::new(FaceConfig {
                idle_seed: Some(1),
                ..FaceConfig::default()
            })
            .expect("default config");
            let sender = engine.sender();
            let mut sink = LatestFrame::default();
            b.iter(|| {
                for i in 0..backlog {
                    let _ = sender.emit(EventPayload::FaceTracked {
                        id: 1,
                        position: [i as f32 / backlog as f32, 0.5],
                        size: Some(0.2),
                    });
                }
                if engine.queue().is_empty() && engine.player().is_idle() {
                    let _ = engine.enqueue(builtins::LOVE);
                }
                black_box(engine.tick(1.0 / 60.0, &mut sink).events.len())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_interpolate, bench_tick);
criterion_main!(benches);
