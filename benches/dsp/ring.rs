//! Benchmarks for ring buffer capture and snapshot copies.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use glitch_dsp::dsp::ring::RingBuffer;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_ring(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/ring");
    // Four seconds of stereo history, as a 1s max duration sizes it
    let capacity = SAMPLE_RATE as usize * 4;

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size * 2).map(|i| (i as f32 * 0.01).sin()).collect();

        let mut ring = RingBuffer::new(2, capacity);
        group.bench_with_input(BenchmarkId::new("write_stereo", size), &size, |b, _| {
            b.iter(|| ring.write_interleaved(black_box(&input)))
        });
    }

    // Snapshot copies are sized by duration, not block size
    let mut ring = RingBuffer::new(1, capacity);
    let fill: Vec<f32> = (0..capacity).map(|i| (i as f32 * 0.001).sin()).collect();
    ring.write_interleaved(&fill);

    for &ms in &[10usize, 100, 500, 1000] {
        let len = SAMPLE_RATE as usize * ms / 1000;
        let mut dest = vec![0.0f32; len];
        group.bench_with_input(BenchmarkId::new("copy_latest_ms", ms), &len, |b, _| {
            b.iter(|| ring.copy_latest(0, black_box(&mut dest)))
        });
    }

    group.finish();
}
