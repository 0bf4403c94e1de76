//! Whole-processor benchmarks.
//!
//! Stereo at 48kHz with the control paths a live performance exercises:
//! modulation every block, and frequent recaptures.

mod processor;

pub use processor::bench_processor;
