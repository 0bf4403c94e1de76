//! Benchmarks for the realtime primitives.

mod lfo;
mod ring;
mod stutter;

pub use lfo::bench_lfo;
pub use ring::bench_ring;
pub use stutter::bench_stutter;
