//! Benchmarks for the shift-register accumulator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use nibble_dsp::dsp::{Accumulator, ClockMode, Nibble, RegisterInput};

use crate::BLOCK_SIZES;

pub fn bench_accumulator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/accumulator");

    for &size in BLOCK_SIZES {
        // One clock edge every 16 subsamples, shifting every fourth edge
        let inputs: Vec<RegisterInput> = (0..size * 8)
            .map(|i| RegisterInput {
                addend: Nibble::new((i / 16) as u8),
                clock_edge: i % 16 == 0,
                shift_enable: i % 64 == 0,
                shift_data: i % 128 == 0,
                ..RegisterInput::default()
            })
            .collect();

        for mode in [ClockMode::Sync, ClockMode::Async] {
            let mut register = Accumulator::new();
            let name = match mode {
                ClockMode::Sync => "sync",
                ClockMode::Async => "async",
            };
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    let mut acc = 0u32;
                    for input in &inputs {
                        let taps = register.tick(mode, black_box(input), [true, false]);
                        acc += taps.main as u32;
                    }
                    black_box(acc)
                })
            });
        }
    }

    group.finish();
}
