use super::adaa::{Adaa2, Antiderivative, Parity, Step};
use super::debounce::{hold_samples, Debouncer};
use super::edge::SubsampleSchmitt;
use super::{AntiAlias, LevelDetector, EDGE_EPSILON};
use crate::config::ProcessorConfig;

/// Threshold and timing settings shared by every detector in a module.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorSettings {
    pub low: f32,
    pub high: f32,
    /// Debounce hold in subsamples.
    pub hold_samples: u32,
}

impl DetectorSettings {
    pub fn from_config(config: &ProcessorConfig, oversample: usize) -> Self {
        Self {
            low: config.low_threshold,
            high: config.high_threshold,
            hold_samples: hold_samples(config.sample_rate, oversample, config.debounce_cutoff_hz),
        }
    }
}

/// Single-threshold comparator, the `None` strategy for gates.
#[derive(Debug, Clone)]
pub struct Comparator {
    threshold: f32,
    high: bool,
}

impl Comparator {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            high: false,
        }
    }
}

impl LevelDetector for Comparator {
    fn process(&mut self, x: f32) -> f32 {
        self.high = x.is_finite() && x > self.threshold;
        if self.high {
            1.0
        } else {
            0.0
        }
    }

    fn is_high(&self) -> bool {
        self.high
    }

    fn reset(&mut self) {
        self.high = false;
    }
}

#[derive(Debug, Clone)]
pub struct DebouncedComparator {
    comparator: Comparator,
    debouncer: Debouncer,
}

impl DebouncedComparator {
    pub fn new(threshold: f32, hold: u32) -> Self {
        Self {
            comparator: Comparator::new(threshold),
            debouncer: Debouncer::new(hold),
        }
    }
}

impl LevelDetector for DebouncedComparator {
    fn process(&mut self, x: f32) -> f32 {
        let level = self.comparator.process(x);
        self.debouncer.process(level)
    }

    fn is_high(&self) -> bool {
        self.debouncer.is_high()
    }

    fn reset(&mut self) {
        self.comparator.reset();
        self.debouncer.reset();
    }
}

/// One subsample of a resolved gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateSample {
    /// Fraction of the subsample spent high.
    pub level: f32,
    pub high: bool,
    pub rose: bool,
    pub fell: bool,
}

/// Gate input detector, one per patched gate/clock/reset input.
#[derive(Debug, Clone)]
pub enum GateDetector {
    None(Comparator),
    Debounce(DebouncedComparator),
    Adaa(Adaa2<Step>),
    AnalyticEdge(SubsampleSchmitt),
}

impl GateDetector {
    pub fn new(anti_alias: AntiAlias, settings: &DetectorSettings) -> Self {
        match anti_alias {
            AntiAlias::None => GateDetector::None(Comparator::new(settings.high)),
            AntiAlias::Debounce => GateDetector::Debounce(DebouncedComparator::new(
                settings.high,
                settings.hold_samples,
            )),
            AntiAlias::Adaa => GateDetector::Adaa(Adaa2::new(Step::new(settings.high as f64))),
            AntiAlias::AnalyticEdge => {
                GateDetector::AnalyticEdge(SubsampleSchmitt::new(settings.low, settings.high))
            }
        }
    }

    pub fn step(&mut self, x: f32) -> GateSample {
        let was_high = self.is_high();
        let level = self.process(x);
        let high = self.is_high();
        GateSample {
            level,
            high,
            rose: high && !was_high,
            fell: was_high && !high,
        }
    }

    pub fn set_hold(&mut self, hold: u32) {
        if let GateDetector::Debounce(d) = self {
            d.debouncer.set_hold(hold);
        }
    }

    pub fn strategy(&self) -> AntiAlias {
        match self {
            GateDetector::None(_) => AntiAlias::None,
            GateDetector::Debounce(_) => AntiAlias::Debounce,
            GateDetector::Adaa(_) => AntiAlias::Adaa,
            GateDetector::AnalyticEdge(_) => AntiAlias::AnalyticEdge,
        }
    }
}

impl LevelDetector for GateDetector {
    fn process(&mut self, x: f32) -> f32 {
        match self {
            GateDetector::None(d) => d.process(x),
            GateDetector::Debounce(d) => d.process(x),
            GateDetector::Adaa(d) => d.process(x),
            GateDetector::AnalyticEdge(d) => d.process(x),
        }
    }

    fn is_high(&self) -> bool {
        match self {
            GateDetector::None(d) => d.is_high(),
            GateDetector::Debounce(d) => d.is_high(),
            GateDetector::Adaa(d) => d.is_high(),
            GateDetector::AnalyticEdge(d) => d.is_high(),
        }
    }

    fn reset(&mut self) {
        match self {
            GateDetector::None(d) => d.reset(),
            GateDetector::Debounce(d) => d.reset(),
            GateDetector::Adaa(d) => d.reset(),
            GateDetector::AnalyticEdge(d) => d.reset(),
        }
    }
}

/// `floor(x) mod 2` sampled directly.
#[derive(Debug, Clone, Default)]
pub struct NaiveBit {
    high: bool,
}

impl LevelDetector for NaiveBit {
    fn process(&mut self, x: f32) -> f32 {
        let x = if x.is_finite() { x } else { 0.0 };
        self.high = Parity.eval(x as f64) >= 0.5;
        if self.high {
            1.0
        } else {
            0.0
        }
    }

    fn is_high(&self) -> bool {
        self.high
    }

    fn reset(&mut self) {
        self.high = false;
    }
}

#[derive(Debug, Clone)]
pub struct DebouncedBit {
    bit: NaiveBit,
    debouncer: Debouncer,
}

impl DebouncedBit {
    pub fn new(hold: u32) -> Self {
        Self {
            bit: NaiveBit::default(),
            debouncer: Debouncer::new(hold),
        }
    }
}

impl LevelDetector for DebouncedBit {
    fn process(&mut self, x: f32) -> f32 {
        let level = self.bit.process(x);
        self.debouncer.process(level)
    }

    fn is_high(&self) -> bool {
        self.debouncer.is_high()
    }

    fn reset(&mut self) {
        self.bit.reset();
        self.debouncer.reset();
    }
}

/// Bit with a fractional transition placed where a straight line through the
/// last two inputs crosses the integer boundary.
#[derive(Debug, Clone, Default)]
pub struct InterpolatedBit {
    x1: f32,
    high: bool,
}

impl LevelDetector for InterpolatedBit {
    fn process(&mut self, x: f32) -> f32 {
        let x = if x.is_finite() { x } else { 0.0 };
        let before = if self.high { 1.0 } else { 0.0 };
        let high = Parity.eval(x as f64) >= 0.5;
        let after = if high { 1.0 } else { 0.0 };

        let span = x - self.x1;
        let level = if high == self.high || span.abs() < EDGE_EPSILON {
            after
        } else {
            let boundary = if span > 0.0 {
                self.x1.floor() + 1.0
            } else {
                self.x1.floor()
            };
            let s = ((boundary - self.x1) / span).clamp(0.0, 1.0);
            before * s + after * (1.0 - s)
        };

        self.x1 = x;
        self.high = high;
        level
    }

    fn is_high(&self) -> bool {
        self.high
    }

    fn reset(&mut self) {
        self.x1 = 0.0;
        self.high = false;
    }
}

/// Generated bit detector, one per Bitfield output bit, fed `level / 2^k`.
#[derive(Debug, Clone)]
pub enum BitDetector {
    None(NaiveBit),
    Debounce(DebouncedBit),
    Adaa(Adaa2<Parity>),
    AnalyticEdge(InterpolatedBit),
}

impl BitDetector {
    pub fn new(anti_alias: AntiAlias, settings: &DetectorSettings) -> Self {
        match anti_alias {
            AntiAlias::None => BitDetector::None(NaiveBit::default()),
            AntiAlias::Debounce => BitDetector::Debounce(DebouncedBit::new(settings.hold_samples)),
            AntiAlias::Adaa => BitDetector::Adaa(Adaa2::new(Parity)),
            AntiAlias::AnalyticEdge => BitDetector::AnalyticEdge(InterpolatedBit::default()),
        }
    }

    pub fn set_hold(&mut self, hold: u32) {
        if let BitDetector::Debounce(d) = self {
            d.debouncer.set_hold(hold);
        }
    }
}

impl LevelDetector for BitDetector {
    fn process(&mut self, x: f32) -> f32 {
        match self {
            BitDetector::None(d) => d.process(x),
            BitDetector::Debounce(d) => d.process(x),
            BitDetector::Adaa(d) => d.process(x),
            BitDetector::AnalyticEdge(d) => d.process(x),
        }
    }

    fn is_high(&self) -> bool {
        match self {
            BitDetector::None(d) => d.is_high(),
            BitDetector::Debounce(d) => d.is_high(),
            BitDetector::Adaa(d) => d.is_high(),
            BitDetector::AnalyticEdge(d) => d.is_high(),
        }
    }

    fn reset(&mut self) {
        match self {
            BitDetector::None(d) => d.reset(),
            BitDetector::Debounce(d) => d.reset(),
            BitDetector::Adaa(d) => d.reset(),
            BitDetector::AnalyticEdge(d) => d.reset(),
        }
    }
}
