use std::f64::consts::PI;

use crate::error::{Error, Result};

/*
Oversampling Kernel
===================

Logic decisions (thresholds, floor(), bit masks) are discontinuous. Evaluated
once per host sample they throw harmonics far above Nyquist, which fold back
into the audible band as aliasing. Running the decisions N times per host
sample and filtering on the way back down pushes most of that energy above
the band before it can fold.

    host rate        N x host rate                         host rate
    ─────────┐      ┌─────────────────────────────────┐   ┌─────────
      x[n] ──┼──▶ upsample ──▶ logic per subsample ──▶ decimate ──▶ y[n]
             │      └─────────────────────────────────┘   │
             └── Q host samples of history ───── N·Q subsamples of history


The Kernel
----------

One FIR kernel of L = N·Q taps serves both directions: a Blackman-Harris
window multiplied by a sinc whose first zeros sit just outside the window.

    h[i] = 2fc · sinc(2fc · (i − (L−1)/2)) · w_bh(i),   fc = 1/L

Keeping only the sinc main lobe makes every tap positive. Interpolated
subsamples are then weighted averages of real input samples and can never
overshoot them, so a threshold downstream never sees filter ringing as a
transition that was not in the input.


Upsampling (polyphase)
----------------------

Zero-stuffing then filtering reduces to N interleaved sub-filters. Output
phase p of host sample n is

    y[nN + p] = g_p · Σ_j h[jN + p] · x[n − j],   j = 0..Q

where g_p = 1 / Σ_j h[jN + p] makes every phase pass DC at unity.


Decimation
----------

The last L subsamples are dotted with the kernel and scaled by 1 / Σ h. A
constant in therefore decimates to the same constant.


Latency
-------

Both filters are linear phase. Round trip, the signal comes back Q − 1 host
samples late.
*/

/// FIR taps shared by an [`Upsampler`] / [`Decimator`] pair.
#[derive(Debug, Clone)]
pub struct Kernel {
    taps: Box<[f32]>,
    gain: f32,
    oversample: usize,
    quality: usize,
}

impl Kernel {
    pub fn new(oversample: usize, quality: usize) -> Result<Self> {
        let degenerate = Error::DegenerateKernel {
            oversample,
            quality,
        };

        let len = oversample.checked_mul(quality).ok_or(degenerate.clone())?;
        if len == 0 {
            return Err(degenerate);
        }

        let cutoff = 1.0 / len as f64;
        let center = (len - 1) as f64 / 2.0;
        let taps: Box<[f32]> = (0..len)
            .map(|i| {
                let t = i as f64 - center;
                (2.0 * cutoff * sinc(2.0 * cutoff * t) * blackman_harris(i, len)) as f32
            })
            .collect();

        let sum: f32 = taps.iter().sum();
        if !sum.is_finite() || sum.abs() <= f32::EPSILON {
            return Err(degenerate);
        }

        Ok(Self {
            taps,
            gain: 1.0 / sum,
            oversample,
            quality,
        })
    }

    pub fn taps(&self) -> &[f32] {
        &self.taps
    }

    /// Normalization applied to every decimated sample (1 / Σ taps).
    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// Group delay of one pass through the kernel, in host samples.
    pub fn group_delay(&self) -> f32 {
        (self.len() - 1) as f32 / (2.0 * self.oversample as f32)
    }

    pub fn quality(&self) -> usize {
        self.quality
    }
}

fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

fn blackman_harris(i: usize, len: usize) -> f64 {
    if len < 2 {
        return 1.0;
    }
    let x = 2.0 * PI * i as f64 / (len - 1) as f64;
    0.35875 - 0.48829 * x.cos() + 0.14128 * (2.0 * x).cos() - 0.01168 * (3.0 * x).cos()
}

/// Turns one host sample into `N` subsamples.
pub struct Upsampler<const N: usize, const Q: usize> {
    kernel: Kernel,
    phase_gain: [f32; N],
    // history[j] = x[n - j]
    history: [f32; Q],
}

impl<const N: usize, const Q: usize> Upsampler<N, Q> {
    pub fn new() -> Result<Self> {
        let kernel = Kernel::new(N, Q)?;

        let mut phase_gain = [0.0; N];
        for (p, gain) in phase_gain.iter_mut().enumerate() {
            let sum: f32 = (0..Q).map(|j| kernel.taps[j * N + p]).sum();
            if !sum.is_finite() || sum <= f32::EPSILON {
                return Err(Error::DegenerateKernel {
                    oversample: N,
                    quality: Q,
                });
            }
            *gain = 1.0 / sum;
        }

        Ok(Self {
            kernel,
            phase_gain,
            history: [0.0; Q],
        })
    }

    pub fn upsample(&mut self, x: f32) -> [f32; N] {
        self.history.copy_within(0..Q - 1, 1);
        self.history[0] = x;

        let taps = &self.kernel.taps;
        let mut out = [0.0; N];
        for (p, sample) in out.iter_mut().enumerate() {
            let acc: f32 = self
                .history
                .iter()
                .enumerate()
                .map(|(j, &x)| x * taps[j * N + p])
                .sum();
            *sample = acc * self.phase_gain[p];
        }
        out
    }

    /// Delay of the subsample stream relative to the host stream, in host samples.
    pub fn latency(&self) -> f32 {
        self.kernel.group_delay()
    }

    pub fn reset(&mut self) {
        self.history = [0.0; Q];
    }
}

/// Turns `N` subsamples back into one host sample.
pub struct Decimator<const N: usize, const Q: usize> {
    kernel: Kernel,
    // history[0] is the newest subsample
    history: Box<[f32]>,
}

impl<const N: usize, const Q: usize> Decimator<N, Q> {
    pub fn new() -> Result<Self> {
        let kernel = Kernel::new(N, Q)?;
        let history = vec![0.0; kernel.len()].into_boxed_slice();
        Ok(Self { kernel, history })
    }

    pub fn decimate(&mut self, block: &[f32; N]) -> f32 {
        let len = self.history.len();
        self.history.copy_within(0..len - N, N);
        for (i, &sample) in block.iter().enumerate() {
            self.history[N - 1 - i] = sample;
        }

        let acc: f32 = self
            .history
            .iter()
            .zip(self.kernel.taps.iter())
            .map(|(x, h)| x * h)
            .sum();
        acc * self.kernel.gain
    }

    /// Delay added on the way down, in host samples. The newest subsample of
    /// a block sits (N − 1)/N of a host sample after the block start, which
    /// is why this can be smaller than the kernel's group delay.
    pub fn latency(&self) -> f32 {
        self.kernel.group_delay() - (N - 1) as f32 / N as f32
    }

    pub fn reset(&mut self) {
        self.history.fill(0.0);
    }
}

/// Round-trip delay of an `Upsampler<N, Q>` followed by a `Decimator<N, Q>`.
pub fn round_trip_latency<const N: usize, const Q: usize>() -> f32 {
    Q.saturating_sub(1) as f32
}
