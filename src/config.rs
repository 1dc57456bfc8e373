//! Processor configuration shared by all logic modules.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::AntiAlias;
use crate::error::{Error, Result};
use crate::{MAX_SAMPLE_RATE, MIN_SAMPLE_RATE};

/// Everything a module needs to know before its first `process` call.
///
/// Values are checked once by [`ProcessorConfig::validate`]; modules refuse to
/// build from an invalid configuration instead of clamping silently.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessorConfig {
    /// Host sample rate in Hz.
    pub sample_rate: f32,
    /// Discontinuity handling for gate inputs and generated bits.
    pub anti_alias: AntiAlias,
    /// Schmitt trigger falling threshold (volts).
    pub low_threshold: f32,
    /// Schmitt trigger rising threshold (volts).
    pub high_threshold: f32,
    /// Shortest pulse the debouncer lets through, expressed as a frequency.
    pub debounce_cutoff_hz: f32,
    /// DC blocker half-life in seconds.
    pub dc_halflife_seconds: f32,
    /// Run every output through the DC blocker before saturation.
    pub dc_block: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            anti_alias: AntiAlias::AnalyticEdge,
            low_threshold: 0.1,
            high_threshold: 1.5,
            debounce_cutoff_hz: 20_000.0,
            dc_halflife_seconds: 0.01,
            dc_block: false,
        }
    }
}

impl ProcessorConfig {
    pub fn with_sample_rate(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    pub fn anti_alias(mut self, anti_alias: AntiAlias) -> Self {
        self.anti_alias = anti_alias;
        self
    }

    pub fn dc_block(mut self, enabled: bool) -> Self {
        self.dc_block = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_sample_rate(self.sample_rate)?;

        if !(self.low_threshold.is_finite()
            && self.high_threshold.is_finite()
            && self.low_threshold < self.high_threshold)
        {
            return Err(Error::InvalidThresholds {
                low: self.low_threshold,
                high: self.high_threshold,
            });
        }

        if !(self.debounce_cutoff_hz.is_finite() && self.debounce_cutoff_hz > 0.0) {
            return Err(Error::InvalidCutoff(self.debounce_cutoff_hz));
        }

        if !(self.dc_halflife_seconds.is_finite() && self.dc_halflife_seconds > 0.0) {
            return Err(Error::InvalidHalfLife(self.dc_halflife_seconds));
        }

        Ok(())
    }
}

pub(crate) fn validate_sample_rate(sample_rate: f32) -> Result<()> {
    if sample_rate.is_finite() && (MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
        Ok(())
    } else {
        Err(Error::InvalidSampleRate(sample_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ProcessorConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let config = ProcessorConfig {
            low_threshold: 2.0,
            high_threshold: 1.0,
            ..ProcessorConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(Error::InvalidThresholds {
                low: 2.0,
                high: 1.0
            })
        );
    }

    #[test]
    fn rejects_sample_rate_extremes() {
        for rate in [0.0, -48_000.0, f32::NAN, f32::INFINITY, 10_000_000.0] {
            let config = ProcessorConfig::with_sample_rate(rate);
            assert!(config.validate().is_err(), "rate {} should be rejected", rate);
        }
    }

    #[test]
    fn rejects_non_positive_cutoff_and_halflife() {
        let config = ProcessorConfig {
            debounce_cutoff_hz: 0.0,
            ..ProcessorConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidCutoff(_))));

        let config = ProcessorConfig {
            dc_halflife_seconds: -1.0,
            ..ProcessorConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidHalfLife(_))));
    }
}
