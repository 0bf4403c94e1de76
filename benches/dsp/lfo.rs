//! Benchmarks for the block-rate LFO.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use glitch_dsp::dsp::lfo::{Lfo, LfoWaveform};

use crate::SAMPLE_RATE;

pub fn bench_lfo(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/lfo");

    // One advance per block, so block size only changes the increment
    for waveform in LfoWaveform::ALL {
        let mut lfo = Lfo::new(SAMPLE_RATE)
            .with_waveform(waveform)
            .with_frequency(0.5);
        group.bench_with_input(BenchmarkId::new("advance", waveform.name()), &waveform, |b, _| {
            b.iter(|| {
                lfo.advance(black_box(256));
                black_box(lfo.value())
            })
        });
    }

    group.finish();
}
