//! Benchmarks for second-order ADAA staircases.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use nibble_dsp::dsp::{Adaa2, Parity, Sawtooth};

use crate::BLOCK_SIZES;

pub fn bench_adaa(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/adaa");

    for &size in BLOCK_SIZES {
        // Full-range ramp at the subsample rate
        let input: Vec<f32> = (0..size * 8)
            .map(|i| (i as f32 / (size * 8) as f32) * 16.0)
            .collect();

        let mut parity = Adaa2::new(Parity);
        group.bench_with_input(BenchmarkId::new("parity", size), &size, |b, _| {
            b.iter(|| {
                let mut acc = 0.0;
                for &x in &input {
                    acc += parity.process_sample(black_box(x));
                }
                black_box(acc)
            })
        });

        let mut saw = Adaa2::new(Sawtooth);
        group.bench_with_input(BenchmarkId::new("sawtooth", size), &size, |b, _| {
            b.iter(|| {
                let mut acc = 0.0;
                for &x in &input {
                    acc += saw.process_sample(black_box(x));
                }
                black_box(acc)
            })
        });
    }

    group.finish();
}
