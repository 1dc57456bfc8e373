//! Benchmarks for the gate detectors, one per anti-alias strategy.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use nibble_dsp::dsp::{AntiAlias, DetectorSettings, GateDetector};
use nibble_dsp::ProcessorConfig;

use crate::BLOCK_SIZES;

pub fn bench_edge(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/edge");
    let settings = DetectorSettings::from_config(&ProcessorConfig::default(), 8);

    for &size in BLOCK_SIZES {
        // Subsample-rate square wave with soft edges, 8 subsamples per host sample
        let input: Vec<f32> = (0..size * 8)
            .map(|i| 5.0 + 5.0 * (i as f32 * 0.01).sin().clamp(-0.5, 0.5) * 2.0)
            .collect();

        for anti_alias in AntiAlias::ALL {
            let mut detector = GateDetector::new(anti_alias, &settings);
            group.bench_with_input(
                BenchmarkId::new(anti_alias.name(), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        let mut edges = 0u32;
                        for &x in &input {
                            edges += detector.step(black_box(x)).rose as u32;
                        }
                        black_box(edges)
                    })
                },
            );
        }
    }

    group.finish();
}
