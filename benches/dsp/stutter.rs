//! Benchmarks for stutter playback.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use glitch_dsp::dsp::stutter::StutterBuffer;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn looping(ratio: f32, duration: f32) -> StutterBuffer {
    let mut stutter = StutterBuffer::new(2, SAMPLE_RATE, SAMPLE_RATE as usize).unwrap();
    stutter.set_duration_samples(duration);
    stutter.set_repeats(1_000_000.0);
    stutter.set_ratio(ratio);
    stutter.set_enabled(true);
    stutter
}

pub fn bench_stutter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/stutter");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size * 2).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut buffer = input.clone();

        // Bypass: capture only
        let mut stutter = StutterBuffer::new(2, SAMPLE_RATE, SAMPLE_RATE as usize).unwrap();
        group.bench_with_input(BenchmarkId::new("bypass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                stutter.process(black_box(&mut buffer));
            })
        });

        // Integer read positions
        let mut stutter = looping(1.0, 12_000.0);
        group.bench_with_input(BenchmarkId::new("loop_unity", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                stutter.process(black_box(&mut buffer));
            })
        });

        // Fractional positions, mirrored
        let mut stutter = looping(-1.37, 12_000.0);
        group.bench_with_input(BenchmarkId::new("loop_reverse_stretch", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                stutter.process(black_box(&mut buffer));
            })
        });

        // Short loop: most frames sit in the seam crossfade
        let mut stutter = looping(0.8, 1_200.0);
        group.bench_with_input(BenchmarkId::new("loop_short_seams", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                stutter.process(black_box(&mut buffer));
            })
        });

        // A new ratio target every block keeps the ramps stepping
        let mut stutter = looping(1.0, 12_000.0);
        let mut flip = false;
        group.bench_with_input(BenchmarkId::new("loop_ramping", size), &size, |b, _| {
            b.iter(|| {
                flip = !flip;
                stutter.set_ratio(if flip { 1.5 } else { -0.5 });
                buffer.copy_from_slice(&input);
                stutter.process(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
