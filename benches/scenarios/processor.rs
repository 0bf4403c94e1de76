//! Benchmarks for the complete processor.

use std::collections::VecDeque;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use glitch_dsp::{
    processor::{ControlMessage, GlitchProcessor, NoMessages},
    GlitchConfig, LfoWaveform, StutterParam,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn config() -> GlitchConfig {
    GlitchConfig {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        duration_ms: 250.0,
        repeats: 4,
        ..Default::default()
    }
}

pub fn bench_processor(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/processor");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size * 2).map(|i| (i as f32 * 0.02).sin()).collect();
        let mut buffer = input.clone();

        // === STATIC STUTTER ===
        let mut glitch = GlitchProcessor::new(&config(), NoMessages).unwrap();
        glitch.apply(ControlMessage::SetStutterEnabled(true));
        group.bench_with_input(BenchmarkId::new("stutter", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                glitch.process(black_box(&mut buffer));
            })
        });

        // === FULL MODULATION ===
        // Fast square LFO on all three targets: new ramps every block
        let mut glitch = GlitchProcessor::new(&config(), VecDeque::<ControlMessage>::new()).unwrap();
        for param in StutterParam::ALL {
            glitch.apply(ControlMessage::SetModulationDepth { param, depth: 0.8 });
        }
        glitch.apply(ControlMessage::SetLfoWaveform(LfoWaveform::Square));
        glitch.apply(ControlMessage::SetLfoFrequency(20.0));
        glitch.apply(ControlMessage::SetLfoEnabled(true));
        glitch.apply(ControlMessage::SetStutterEnabled(true));
        group.bench_with_input(BenchmarkId::new("modulated", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                glitch.process(black_box(&mut buffer));
            })
        });

        // === RECAPTURE EVERY BLOCK ===
        // Worst case: a 250ms snapshot copy on top of every render
        let mut glitch = GlitchProcessor::new(&config(), NoMessages).unwrap();
        glitch.apply(ControlMessage::SetStutterEnabled(true));
        group.bench_with_input(BenchmarkId::new("recapture", size), &size, |b, _| {
            b.iter(|| {
                glitch.apply(ControlMessage::Recapture);
                buffer.copy_from_slice(&input);
                glitch.process(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
