use super::{LevelDetector, EDGE_EPSILON};

/*
Subsample Schmitt Trigger
=========================

A plain comparator only knows that a threshold was crossed somewhere between
two samples. Reporting the transition at the sample boundary quantizes edge
timing to the sample grid, and that timing jitter is aliasing by another
name. This detector estimates *where* inside the interval the crossing
happened and reports the fraction of the interval spent high.

Local Quadratic Fit
-------------------

Three samples x₋₂, x₋₁, x₀ are fitted with p(s) = a·s² + b·s + c, placed so
that p(0) = x₋₁ and p(1) = x₀:

    c = x₋₁                       (position)
    b = (x₀ − x₋₂) / 2            (velocity, central difference)
    a = (x₀ − 2·x₋₁ + x₋₂) / 2    (acceleration, second difference)

The crossing is the root of p(s) − threshold in [0, 1]. With |a| ≈ 0 the fit
is a line and the linear root is used instead.

    volts
      │                 ●  x₀
      │              ╱
  hi ─┼─ ─ ─ ─ ─ ─ ✕ ─ ─ ─ ─     ✕ at s = 0.5 → level = 1 − s = 0.5
      │         ╱
      │      ●  x₋₁
      │   ╱
      │ ●  x₋₂
      └──────┴──────┴─────→ s
            0      1

Hysteresis
----------

Rising edges are confirmed only above `high`, falling edges only below
`low`, so a signal hovering around one threshold cannot chatter.

Degenerate fits (negative discriminant, no root inside the interval, zero
slope) mean the samples disagree with the decision already taken by the
comparison; the transition is then treated as happening at s = 0.
*/

/// Result of feeding one subsample through a [`SubsampleSchmitt`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSample {
    /// Fraction of the interval spent high, in [0, 1].
    pub level: f32,
    /// Latched state after this subsample.
    pub high: bool,
    /// Solved crossing position when the state changed in this interval.
    pub crossing: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct SubsampleSchmitt {
    low: f32,
    high: f32,
    x1: f32,
    x2: f32,
    is_high: bool,
    level: f32,
}

impl SubsampleSchmitt {
    pub fn new(low: f32, high: f32) -> Self {
        Self {
            low,
            high,
            x1: 0.0,
            x2: 0.0,
            is_high: false,
            level: 0.0,
        }
    }

    pub fn process_edge(&mut self, x: f32) -> EdgeSample {
        let x = if x.is_finite() { x } else { 0.0 };
        let mut crossing = None;

        if self.is_high {
            if x < self.low {
                let s = solve_crossing(self.x2, self.x1, x, self.low);
                self.level = s;
                self.is_high = false;
                crossing = Some(s);
            } else {
                self.level = 1.0;
            }
        } else if x > self.high {
            let s = solve_crossing(self.x2, self.x1, x, self.high);
            self.level = 1.0 - s;
            self.is_high = true;
            crossing = Some(s);
        } else {
            self.level = 0.0;
        }

        self.x2 = self.x1;
        self.x1 = x;

        EdgeSample {
            level: self.level,
            high: self.is_high,
            crossing,
        }
    }

    pub fn thresholds(&self) -> (f32, f32) {
        (self.low, self.high)
    }
}

impl LevelDetector for SubsampleSchmitt {
    fn process(&mut self, x: f32) -> f32 {
        self.process_edge(x).level
    }

    fn is_high(&self) -> bool {
        self.is_high
    }

    fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.is_high = false;
        self.level = 0.0;
    }
}

/// Position in [0, 1] where the quadratic through (x2, x1, x0) meets
/// `threshold`, measured from x1. Prefers the lower root.
pub fn solve_crossing(x2: f32, x1: f32, x0: f32, threshold: f32) -> f32 {
    let a = 0.5 * (x0 - 2.0 * x1 + x2);
    let b = 0.5 * (x0 - x2);
    let c = x1 - threshold;

    if a.abs() < EDGE_EPSILON {
        if b.abs() < EDGE_EPSILON {
            return 0.0;
        }
        return (-c / b).clamp(0.0, 1.0);
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return 0.0;
    }

    let sq = discriminant.sqrt();
    let r1 = (-b - sq) / (2.0 * a);
    let r2 = (-b + sq) / (2.0 * a);
    let (lo, hi) = if r1 <= r2 { (r1, r2) } else { (r2, r1) };

    if (0.0..=1.0).contains(&lo) {
        lo
    } else if (0.0..=1.0).contains(&hi) {
        hi
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn ramp_crossing_halfway_solves_to_half() {
        let mut trigger = SubsampleSchmitt::new(0.1, 1.5);
        trigger.process_edge(0.0);
        let before = trigger.process_edge(1.0);
        assert!(!before.high);

        let edge = trigger.process_edge(2.0);
        assert!(edge.high);
        assert_abs_diff_eq!(edge.crossing.unwrap(), 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(edge.level, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn falling_level_is_time_spent_high() {
        let mut trigger = SubsampleSchmitt::new(0.1, 1.5);
        let mut edge = trigger.process_edge(5.0);
        for _ in 0..3 {
            edge = trigger.process_edge(5.0);
        }
        assert!(edge.high);
        edge = trigger.process_edge(-0.2);
        assert!(!edge.high);
        let s = edge.crossing.unwrap();
        assert!(s > 0.0 && s < 1.0);
        assert_abs_diff_eq!(edge.level, s, epsilon = 1e-6);
    }

    #[test]
    fn hysteresis_ignores_chatter_between_thresholds() {
        let mut trigger = SubsampleSchmitt::new(0.1, 1.5);
        let mut edges = 0;
        for n in 0..200 {
            let x = 0.8 + 0.6 * (n as f32 * 0.7).sin();
            if trigger.process_edge(x).crossing.is_some() {
                edges += 1;
            }
        }
        assert_eq!(edges, 0);
        assert!(!trigger.is_high());
    }

    #[test]
    fn curved_approach_prefers_the_valid_root() {
        // x = t² sampled at t = 0.5, 1.0, 1.5. The fit is exact, so the
        // crossing of 1.5 lands at t = sqrt(1.5), i.e. s = (t - 1) / 0.5.
        let s = solve_crossing(0.25, 1.0, 2.25, 1.5);
        assert_abs_diff_eq!(s, (1.5f32.sqrt() - 1.0) * 2.0, epsilon = 1e-4);
    }

    #[test]
    fn degenerate_fits_fall_back_to_immediate_transition() {
        // Flat samples: no slope to solve with.
        assert_eq!(solve_crossing(1.0, 1.0, 1.0, 1.5), 0.0);
        // Parabola that never reaches the threshold.
        assert_eq!(solve_crossing(0.0, 1.0, 0.0, 5.0), 0.0);
    }

    #[test]
    fn level_stays_in_unit_range_for_wild_input() {
        let mut trigger = SubsampleSchmitt::new(0.1, 1.5);
        for n in 0..1000 {
            let x = match n % 7 {
                0 => f32::NAN,
                1 => 1e9,
                2 => -1e9,
                _ => (n as f32 * 1.3).sin() * 12.0,
            };
            let level = trigger.process(x);
            assert!((0.0..=1.0).contains(&level), "level {} at {}", level, n);
        }
    }
}
