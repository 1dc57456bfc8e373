//! Benchmarks for the logic primitives.

mod accumulator;
mod adaa;
mod edge;
mod resample;

pub use accumulator::bench_accumulator;
pub use adaa::bench_adaa;
pub use edge::bench_edge;
pub use resample::bench_resample;
