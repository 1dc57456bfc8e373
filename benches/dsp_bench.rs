//! Benchmarks for the logic primitives and complete modules.
//!
//! Run with: cargo bench
//!
//! Every module runs its logic N times per host sample, so the per-sample
//! cost matters more here than in a plain audio chain.
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Primitives (resampling, edge detection, ADAA, register)
//!   - scenarios/*  Bitfield, Bitmix and Nibbler under realistic patches

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    // Primitives
    dsp::bench_resample,
    dsp::bench_edge,
    dsp::bench_adaa,
    dsp::bench_accumulator,
    // Modules
    scenarios::bench_modules,
);
criterion_main!(benches);
