//! Benchmarks for the polyphase upsampler and decimator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use nibble_dsp::dsp::{Decimator, Upsampler};

use crate::BLOCK_SIZES;

pub fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/resample");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 10.0)
            .collect();

        // Default 8x, 4 host samples of kernel
        let mut up = Upsampler::<8, 4>::new().unwrap();
        let mut down = Decimator::<8, 4>::new().unwrap();
        group.bench_with_input(BenchmarkId::new("round_trip_8x4", size), &size, |b, _| {
            b.iter(|| {
                let mut acc = 0.0;
                for &x in &input {
                    let block = up.upsample(black_box(x));
                    acc += down.decimate(&block);
                }
                black_box(acc)
            })
        });

        // Longer kernel
        let mut up = Upsampler::<8, 8>::new().unwrap();
        let mut down = Decimator::<8, 8>::new().unwrap();
        group.bench_with_input(BenchmarkId::new("round_trip_8x8", size), &size, |b, _| {
            b.iter(|| {
                let mut acc = 0.0;
                for &x in &input {
                    let block = up.upsample(black_box(x));
                    acc += down.decimate(&block);
                }
                black_box(acc)
            })
        });

        // Cheap 2x
        let mut up = Upsampler::<2, 4>::new().unwrap();
        let mut down = Decimator::<2, 4>::new().unwrap();
        group.bench_with_input(BenchmarkId::new("round_trip_2x4", size), &size, |b, _| {
            b.iter(|| {
                let mut acc = 0.0;
                for &x in &input {
                    let block = up.upsample(black_box(x));
                    acc += down.decimate(&block);
                }
                black_box(acc)
            })
        });
    }

    group.finish();
}
