use super::LevelDetector;

/*
Antiderivative Anti-Aliasing (second order)
===========================================

A staircase such as floor(x) mod 2 jumps instantly. Sampled directly, each
jump is a band-unlimited step and the harmonics above Nyquist fold back.
ADAA replaces the point sample f(x[n]) with the *average* of f over the
segment the input travelled since the previous sample, which is a cheap
low-pass on the nonlinearity itself.

Vocabulary
----------

  f     the nonlinearity (staircase, sawtooth, step)
  F     first antiderivative,  F' = f
  FF    second antiderivative, FF' = F

First order averages f over [x₋₁, x]:

    y = (F(x) − F(x₋₁)) / (x − x₋₁)

Second order applies the same idea to F, then differences the result:

    d(a, b) = (FF(a) − FF(b)) / (a − b)
    y       = 2 · (d(x, x₋₁) − d(x₋₁, x₋₂)) / (x − x₋₂)

Every division is guarded. When two inputs are closer than ε the divided
difference turns into the derivative it approximates: d(a, b) → F(midpoint),
and a vanishing outer span falls back to the first-order estimate.


Closed Forms
------------

All antiderivatives are built from n = floor(x) and the fractional part, so
they stay exact for arbitrarily long ramps (no accumulated integral). They
are evaluated in f64 because FF grows quadratically and the divided
differences subtract nearly equal numbers.

  Parity    f = floor(x) mod 2           x = 2m + u,  u ∈ [0, 2)
            F  = m + max(u − 1, 0)
            FF = m² − m/2 + m·u + max(u − 1, 0)² / 2

  Sawtooth  f = x − floor(x)             x = n + r,   r ∈ [0, 1)
            F  = n/2 + r²/2
            FF = n(n − 1)/4 + n/6 + n·r/2 + r³/6

  Step      f = [x ≥ t]
            F  = max(x − t, 0)
            FF = max(x − t, 0)² / 2
*/

/// Smallest input span treated as a real divided difference.
pub const ADAA_EPSILON: f64 = 1e-5;

/// A memoryless nonlinearity with closed-form first and second antiderivatives.
pub trait Antiderivative {
    fn eval(&self, x: f64) -> f64;
    fn ad1(&self, x: f64) -> f64;
    fn ad2(&self, x: f64) -> f64;

    /// Bounds of `eval`; ADAA output is clamped into this range.
    fn range(&self) -> (f64, f64) {
        (0.0, 1.0)
    }
}

/// `floor(x) mod 2`, the lowest bit of a staircase.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parity;

impl Antiderivative for Parity {
    fn eval(&self, x: f64) -> f64 {
        let n = x.floor();
        n - 2.0 * (n * 0.5).floor()
    }

    fn ad1(&self, x: f64) -> f64 {
        let m = (x * 0.5).floor();
        let u = x - 2.0 * m;
        m + (u - 1.0).max(0.0)
    }

    fn ad2(&self, x: f64) -> f64 {
        let m = (x * 0.5).floor();
        let u = x - 2.0 * m;
        let over = (u - 1.0).max(0.0);
        m * m - 0.5 * m + m * u + 0.5 * over * over
    }
}

/// `x − floor(x)`, the remainder left after quantization.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sawtooth;

impl Antiderivative for Sawtooth {
    fn eval(&self, x: f64) -> f64 {
        x - x.floor()
    }

    fn ad1(&self, x: f64) -> f64 {
        let n = x.floor();
        let r = x - n;
        0.5 * n + 0.5 * r * r
    }

    fn ad2(&self, x: f64) -> f64 {
        let n = x.floor();
        let r = x - n;
        0.25 * n * (n - 1.0) + n / 6.0 + 0.5 * n * r + r * r * r / 6.0
    }
}

/// Unit step at `threshold`.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub threshold: f64,
}

impl Step {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Antiderivative for Step {
    fn eval(&self, x: f64) -> f64 {
        if x >= self.threshold {
            1.0
        } else {
            0.0
        }
    }

    fn ad1(&self, x: f64) -> f64 {
        (x - self.threshold).max(0.0)
    }

    fn ad2(&self, x: f64) -> f64 {
        let d = (x - self.threshold).max(0.0);
        0.5 * d * d
    }
}

/// Second-order ADAA around any [`Antiderivative`].
#[derive(Debug, Clone)]
pub struct Adaa2<A: Antiderivative> {
    func: A,
    x1: f64,
    x2: f64,
    ad2_x1: f64,
    // divided difference d(x₋₁, x₋₂) from the previous call
    d12: f64,
    last: f32,
}

impl<A: Antiderivative> Adaa2<A> {
    pub fn new(func: A) -> Self {
        let ad2_x1 = func.ad2(0.0);
        let d12 = func.ad1(0.0);
        Self {
            func,
            x1: 0.0,
            x2: 0.0,
            ad2_x1,
            d12,
            last: 0.0,
        }
    }

    pub fn process_sample(&mut self, x: f32) -> f32 {
        let x0 = if x.is_finite() { x as f64 } else { 0.0 };
        let func = &self.func;

        let ad2_x0 = func.ad2(x0);
        let span01 = x0 - self.x1;
        let d01 = if span01.abs() < ADAA_EPSILON {
            func.ad1(0.5 * (x0 + self.x1))
        } else {
            (ad2_x0 - self.ad2_x1) / span01
        };

        let y = if span01.abs() < ADAA_EPSILON {
            func.eval(0.5 * (x0 + self.x1))
        } else {
            let span02 = x0 - self.x2;
            if span02.abs() < ADAA_EPSILON {
                (func.ad1(x0) - func.ad1(self.x1)) / span01
            } else {
                2.0 * (d01 - self.d12) / span02
            }
        };

        let (lo, hi) = func.range();
        let y = if y.is_finite() {
            y.clamp(lo, hi)
        } else {
            func.eval(x0)
        };

        self.x2 = self.x1;
        self.x1 = x0;
        self.ad2_x1 = ad2_x0;
        self.d12 = d01;
        self.last = y as f32;
        self.last
    }

    pub fn function(&self) -> &A {
        &self.func
    }

    pub fn last(&self) -> f32 {
        self.last
    }
}

impl<A: Antiderivative> LevelDetector for Adaa2<A> {
    fn process(&mut self, x: f32) -> f32 {
        self.process_sample(x)
    }

    fn is_high(&self) -> bool {
        self.last >= 0.5
    }

    fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.ad2_x1 = self.func.ad2(0.0);
        self.d12 = self.func.ad1(0.0);
        self.last = 0.0;
    }
}
