//! Benchmarks for complete modules, one host block at a time.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use nibble_dsp::dsp::AntiAlias;
use nibble_dsp::modules::{
    Bitfield, BitfieldInputs, BitfieldOutputs, Bitmix, BitmixInputs, BitmixOutputs, BitmixParams,
    LogicModule, Nibbler, NibblerInputs, NibblerOutputs, NibblerParams,
};
use nibble_dsp::ProcessorConfig;

use crate::BLOCK_SIZES;

fn square(i: usize, period: usize) -> f32 {
    if (i / period) % 2 == 0 {
        10.0
    } else {
        0.0
    }
}

pub fn bench_modules(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/modules");

    for &size in BLOCK_SIZES {
        // === BITFIELD ===
        // Audio-rate ramp into the quantizer, every strategy
        let bitfield_inputs: Vec<BitfieldInputs> = (0..size)
            .map(|i| BitfieldInputs {
                input: Some((i % 100) as f32 * 0.1),
                cv: Some(1.0),
                ..BitfieldInputs::default()
            })
            .collect();

        for anti_alias in AntiAlias::ALL {
            let config = ProcessorConfig::default().anti_alias(anti_alias);
            let mut bitfield: Bitfield = Bitfield::new(config).unwrap();
            let mut outputs = vec![BitfieldOutputs::default(); size];
            group.bench_with_input(
                BenchmarkId::new(format!("bitfield/{}", anti_alias.name()), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        bitfield.render(black_box(&bitfield_inputs), &mut outputs);
                    })
                },
            );
        }

        // === BITMIX ===
        // Eight gates at different rates, XOR mode
        let bitmix_inputs: Vec<BitmixInputs> = (0..size)
            .map(|i| BitmixInputs {
                gates: std::array::from_fn(|lane| Some(square(i, 3 + lane * 5))),
                params: BitmixParams {
                    mode_a: true,
                    mode_b: true,
                    ..BitmixParams::default()
                },
            })
            .collect();

        let mut bitmix: Bitmix = Bitmix::new(ProcessorConfig::default()).unwrap();
        let mut outputs = vec![BitmixOutputs::default(); size];
        group.bench_with_input(BenchmarkId::new("bitmix/xor", size), &size, |b, _| {
            b.iter(|| {
                bitmix.render(black_box(&bitmix_inputs), &mut outputs);
            })
        });

        // === NIBBLER ===
        // Fast clock, slow shift gate, all add switches on
        let nibbler_inputs: Vec<NibblerInputs> = (0..size)
            .map(|i| NibblerInputs {
                gates: [Some(square(i, 40)), None, Some(square(i, 70)), None],
                clock: Some(square(i, 6)),
                shift: Some(square(i, 96)),
                shift_data: Some(square(i, 11)),
                params: NibblerParams {
                    add: [true; 4],
                    ..NibblerParams::default()
                },
                ..NibblerInputs::default()
            })
            .collect();

        let mut nibbler: Nibbler = Nibbler::new(ProcessorConfig::default()).unwrap();
        let mut outputs = vec![NibblerOutputs::default(); size];
        group.bench_with_input(BenchmarkId::new("nibbler/patched", size), &size, |b, _| {
            b.iter(|| {
                nibbler.render(black_box(&nibbler_inputs), &mut outputs);
            })
        });
    }

    group.finish();
}
