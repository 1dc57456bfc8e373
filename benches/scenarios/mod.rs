//! Module-level benchmarks.
//!
//! These run the three processors with every input patched, the way a busy
//! rack would drive them.

mod modules;

pub use modules::bench_modules;
