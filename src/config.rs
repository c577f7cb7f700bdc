//! Configuration parameters for voice analysis

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Which part of the buffer the pitch estimator reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PitchScope {
    /// Every frame of the input buffer (the periodicity gate rejects silence)
    FullBuffer,
    /// Only the concatenated voiced segments
    VoicedOnly,
}

/// Analysis configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    // Framing
    /// Frame size for energy, autocorrelation and STFT (default: 2048)
    pub frame_size: usize,

    /// Hop size between frames (default: 512)
    pub hop_size: usize,

    // Voice activity
    /// Dynamic threshold as a fraction of the loudest frame RMS (default: 0.05)
    pub energy_threshold_ratio: f32,

    /// Minimum voiced segment duration in seconds (default: 0.1)
    pub min_segment_duration: f32,

    // Pitch
    /// Lowest plausible fundamental in Hz (default: 50.0)
    pub pitch_min_hz: f32,

    /// Highest plausible fundamental in Hz (default: 400.0)
    pub pitch_max_hz: f32,

    /// Autocorrelation peak must exceed this fraction of the zero-lag value (default: 0.3)
    pub periodicity_threshold: f32,

    /// Frames the pitch estimator reads (default: full buffer)
    pub pitch_scope: PitchScope,

    // Tempo
    /// Onset peaks must reach this fraction of the maximum flux (default: 0.3)
    pub onset_height_ratio: f32,

    /// Minimum spacing between onset peaks in seconds (default: 0.1)
    pub onset_min_distance_seconds: f32,

    // Loudness
    /// Band-pass corners in Hz for the band loudness (default: 500-2000)
    pub loudness_band_hz: (f32, f32),

    /// Butterworth prototype order of the band-pass (default: 2)
    pub loudness_filter_order: usize,

    /// Calibration offset added to the band loudness in dB (default: -0.691)
    pub loudness_offset_db: f32,

    /// Low and high amplitude percentiles for dynamic range (default: 10, 95)
    pub dynamic_range_percentiles: (f32, f32),

    // Input
    /// Inputs longer than this are rejected (default: 10.0 s)
    pub max_duration_seconds: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            energy_threshold_ratio: 0.05,
            min_segment_duration: 0.1,
            pitch_min_hz: 50.0,
            pitch_max_hz: 400.0,
            periodicity_threshold: 0.3,
            pitch_scope: PitchScope::FullBuffer,
            onset_height_ratio: 0.3,
            onset_min_distance_seconds: 0.1,
            loudness_band_hz: (500.0, 2000.0),
            loudness_filter_order: 2,
            loudness_offset_db: -0.691,
            dynamic_range_percentiles: (10.0, 95.0),
            max_duration_seconds: 10.0,
        }
    }
}

impl AnalysisConfig {
    /// Override the voice activity threshold ratio
    pub fn with_energy_threshold_ratio(mut self, ratio: f32) -> Self {
        self.energy_threshold_ratio = ratio;
        self
    }

    /// Override the minimum voiced segment duration
    pub fn with_min_segment_duration(mut self, seconds: f32) -> Self {
        self.min_segment_duration = seconds;
        self
    }

    /// Override the input duration cap
    pub fn with_max_duration(mut self, seconds: f32) -> Self {
        self.max_duration_seconds = seconds;
        self
    }

    /// Override the frames read by the pitch estimator
    pub fn with_pitch_scope(mut self, scope: PitchScope) -> Self {
        self.pitch_scope = scope;
        self
    }

    /// Check that the parameter set is usable at any sample rate.
    ///
    /// A loudness band that does not fit below the Nyquist frequency of a
    /// particular input is not a configuration error: the band-pass design
    /// fails for that request and only the band loudness is left undetermined.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.frame_size == 0 || self.hop_size == 0 {
            return Err(AnalysisError::InvalidConfig(
                "frame_size and hop_size must be > 0".to_string(),
            ));
        }
        if self.hop_size > self.frame_size {
            return Err(AnalysisError::InvalidConfig(format!(
                "hop_size ({}) larger than frame_size ({})",
                self.hop_size, self.frame_size
            )));
        }
        if !(self.energy_threshold_ratio > 0.0 && self.energy_threshold_ratio <= 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "energy_threshold_ratio must be in (0, 1], got {}",
                self.energy_threshold_ratio
            )));
        }
        if !(self.min_segment_duration >= 0.0) {
            return Err(AnalysisError::InvalidConfig(
                "min_segment_duration must be >= 0".to_string(),
            ));
        }
        if !(self.pitch_min_hz > 0.0 && self.pitch_min_hz < self.pitch_max_hz) {
            return Err(AnalysisError::InvalidConfig(format!(
                "invalid pitch range [{}, {}] Hz",
                self.pitch_min_hz, self.pitch_max_hz
            )));
        }
        if !(self.periodicity_threshold > 0.0 && self.periodicity_threshold <= 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "periodicity_threshold must be in (0, 1], got {}",
                self.periodicity_threshold
            )));
        }
        if !(self.onset_height_ratio > 0.0 && self.onset_height_ratio <= 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "onset_height_ratio must be in (0, 1], got {}",
                self.onset_height_ratio
            )));
        }
        if !(self.onset_min_distance_seconds >= 0.0) {
            return Err(AnalysisError::InvalidConfig(
                "onset_min_distance_seconds must be >= 0".to_string(),
            ));
        }
        let (low, high) = self.loudness_band_hz;
        if !(low > 0.0 && low < high) {
            return Err(AnalysisError::InvalidConfig(format!(
                "invalid loudness band [{}, {}] Hz",
                low, high
            )));
        }
        if self.loudness_filter_order == 0 {
            return Err(AnalysisError::InvalidConfig(
                "loudness_filter_order must be > 0".to_string(),
            ));
        }
        let (p_low, p_high) = self.dynamic_range_percentiles;
        if !(0.0..=100.0).contains(&p_low) || !(0.0..=100.0).contains(&p_high) || p_low >= p_high {
            return Err(AnalysisError::InvalidConfig(format!(
                "invalid dynamic range percentiles ({}, {})",
                p_low, p_high
            )));
        }
        if !(self.max_duration_seconds > 0.0) {
            return Err(AnalysisError::InvalidConfig(
                "max_duration_seconds must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_hop() {
        let config = AnalysisConfig {
            hop_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_inverted_ranges() {
        let config = AnalysisConfig {
            pitch_min_hz: 400.0,
            pitch_max_hz: 50.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            loudness_band_hz: (2000.0, 500.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            dynamic_range_percentiles: (95.0, 10.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_band_checked_independently_of_rate() {
        // Upper corner above a 4 kHz Nyquist is still a valid configuration
        let config = AnalysisConfig {
            loudness_band_hz: (500.0, 6000.0),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_ratio() {
        let config = AnalysisConfig::default().with_energy_threshold_ratio(1.5);
        assert!(config.validate().is_err());
        let config = AnalysisConfig::default().with_energy_threshold_ratio(f32::NAN);
        assert!(config.validate().is_err());
    }
}
