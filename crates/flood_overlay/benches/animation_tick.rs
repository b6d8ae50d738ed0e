//! Benchmarks for the flood overlay's hot paths.
//!
//! A tick must stay O(points) and cheap enough to run at 20 Hz next to the
//! renderer; assembly runs once per simulation result.
//!
//! Run with: cargo bench -p flood_overlay

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;

use flood_overlay::animation::{tick, AnimationState};
use flood_overlay::config::{OverlayConfig, PulseParams};
use flood_overlay::pipeline::build_overlay;
use flood_overlay::render::points_collection;
use flood_overlay::topology::{NodeCoordinates, PipePolyline};
use flood_overlay::{OverlayRng, VulnerabilityRecord};

const CATEGORIES: [&str; 4] = ["High Risk", "Medium Risk", "Low Risk", "No Risk"];

/// A `side` x `side` grid of junctions, each joined to its right and upper
/// neighbour, every junction flooded with a random category.
fn build_network(side: usize) -> (Vec<VulnerabilityRecord>, NodeCoordinates, Vec<PipePolyline>) {
    let mut rng = OverlayRng::from_seed_u64(11);
    let spacing = 0.001;
    let id = |x: usize, y: usize| format!("J{x}-{y}");

    let mut nodes = NodeCoordinates::default();
    let mut records = Vec::with_capacity(side * side);
    let mut pipes = Vec::with_capacity(side * side * 2);
    for y in 0..side {
        for x in 0..side {
            let here = [x as f64 * spacing, y as f64 * spacing];
            nodes.insert(id(x, y), here);
            let label = CATEGORIES[rng.0.gen_range(0..CATEGORIES.len())];
            records.push(VulnerabilityRecord::new(id(x, y), label, rng.0.gen_range(0.1..60.0)));
            if x + 1 < side {
                let right = [here[0] + spacing, here[1]];
                if let Ok(pipe) = PipePolyline::new(format!("H{x}-{y}"), vec![here, right]) {
                    pipes.push(pipe);
                }
            }
            if y + 1 < side {
                let up = [here[0], here[1] + spacing];
                if let Ok(pipe) = PipePolyline::new(format!("V{x}-{y}"), vec![here, up]) {
                    pipes.push(pipe);
                }
            }
        }
    }
    (records, nodes, pipes)
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("animation_tick");
    let pulse = PulseParams::default();
    for side in [10usize, 30, 50] {
        let (records, nodes, pipes) = build_network(side);
        let build = build_overlay(
            &records,
            &nodes,
            Some(pipes.as_slice()),
            &OverlayConfig::default(),
            &mut OverlayRng::default().0,
        );
        let points = build.fields.len();
        let mut state = AnimationState::running(build.fields);
        let mut t = Duration::ZERO;
        group.bench_with_input(BenchmarkId::new("tick", points), &points, |b, _| {
            b.iter(|| {
                t += Duration::from_millis(50);
                state = tick(std::mem::take(&mut state), black_box(t), &pulse);
            });
        });
        group.bench_with_input(BenchmarkId::new("tick_and_serialize", points), &points, |b, _| {
            b.iter(|| {
                t += Duration::from_millis(50);
                state = tick(std::mem::take(&mut state), black_box(t), &pulse);
                black_box(points_collection(&state.fields.nodes));
                black_box(points_collection(&state.fields.lines));
            });
        });
    }
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_overlay");
    group.sample_size(20);
    for side in [10usize, 30] {
        let (records, nodes, pipes) = build_network(side);
        let config = OverlayConfig::default();
        group.bench_with_input(BenchmarkId::from_parameter(side * side), &side, |b, _| {
            b.iter(|| {
                let mut rng = OverlayRng::default();
                black_box(build_overlay(
                    &records,
                    &nodes,
                    Some(pipes.as_slice()),
                    &config,
                    &mut rng.0,
                ))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tick, bench_build);
criterion_main!(benches);
