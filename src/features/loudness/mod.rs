//! Loudness measurement over voiced audio
//!
//! Three independent metrics are computed from the concatenated voice
//! segments:
//!
//! - **Level**: `20 * log10(rms)` in dBFS
//! - **Band loudness**: RMS of the signal band-passed (zero-phase Butterworth,
//!   500-2000 Hz by default) in dB, plus a fixed calibration offset. This is a
//!   coarse perceptual weighting, not a BS.1770 measurement.
//! - **Dynamic range**: `20 * log10(P95 / P10)` of absolute amplitude
//!
//! A metric that cannot be measured is `None`; a fault in the band-pass never
//! affects the level or the dynamic range.

pub mod filter;

use serde::{Deserialize, Serialize};

use self::filter::ButterworthBandpass;
use crate::analysis::result::VoiceSegment;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::statistics::{amplitude_to_db, percentile, rms};
use crate::preprocessing::voice_activity::voiced_samples;

/// Loudness analyzer output
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoudnessEstimate {
    /// RMS level of voiced audio in dBFS
    pub level_dbfs: Option<f32>,

    /// Band-limited loudness approximation (LUFS-like)
    pub band_loudness_lufs: Option<f32>,

    /// Ratio of high to low amplitude percentile in dB
    pub dynamic_range_db: Option<f32>,
}

/// Loudness analyzer
#[derive(Debug, Clone)]
pub struct LoudnessAnalyzer {
    /// Band-pass corners in Hz (default: 500-2000)
    pub band_hz: (f32, f32),

    /// Butterworth prototype order (default: 2)
    pub filter_order: usize,

    /// Offset added to the band level in dB (default: -0.691)
    pub offset_db: f32,

    /// Low and high percentiles for dynamic range (default: 10, 95)
    pub percentiles: (f32, f32),
}

impl Default for LoudnessAnalyzer {
    fn default() -> Self {
        Self {
            band_hz: (500.0, 2000.0),
            filter_order: 2,
            offset_db: -0.691,
            percentiles: (10.0, 95.0),
        }
    }
}

impl LoudnessAnalyzer {
    /// Build from the analysis configuration
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            band_hz: config.loudness_band_hz,
            filter_order: config.loudness_filter_order,
            offset_db: config.loudness_offset_db,
            percentiles: config.dynamic_range_percentiles,
        }
    }

    /// Measure loudness of the voiced segments of `samples`
    ///
    /// # Arguments
    ///
    /// * `samples` - Full mono buffer
    /// * `sample_rate` - Sample rate in Hz
    /// * `segments` - Voice segments from segmentation
    ///
    /// # Returns
    ///
    /// `LoudnessEstimate`; all metrics `None` when there are no segments
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` only for a zero sample rate.
    /// Band-pass faults are logged and leave `band_loudness_lufs` empty.
    pub fn estimate(
        &self,
        samples: &[f32],
        sample_rate: u32,
        segments: &[VoiceSegment],
    ) -> Result<LoudnessEstimate, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "Invalid sample rate: 0".to_string(),
            ));
        }
        if segments.is_empty() {
            return Ok(LoudnessEstimate::default());
        }

        let voiced = voiced_samples(samples, sample_rate, segments);
        if voiced.is_empty() {
            return Ok(LoudnessEstimate::default());
        }

        let level_dbfs = amplitude_to_db(rms(&voiced));

        let band_loudness_lufs = match self.band_loudness(&voiced, sample_rate) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Band loudness undetermined: {}", e);
                None
            }
        };

        let dynamic_range_db = self.dynamic_range(&voiced);

        log::debug!(
            "Loudness: level={:?} dBFS, band={:?}, range={:?} dB over {} samples",
            level_dbfs,
            band_loudness_lufs,
            dynamic_range_db,
            voiced.len()
        );

        Ok(LoudnessEstimate {
            level_dbfs,
            band_loudness_lufs,
            dynamic_range_db,
        })
    }

    /// Band-passed level plus the calibration offset
    ///
    /// `Ok(None)` when the filtered signal is silent.
    pub fn band_loudness(
        &self,
        voiced: &[f32],
        sample_rate: u32,
    ) -> Result<Option<f32>, AnalysisError> {
        let (low, high) = self.band_hz;
        let filter = ButterworthBandpass::design(self.filter_order, low, high, sample_rate)?;
        let filtered = filter.filtfilt(voiced)?;
        Ok(amplitude_to_db(rms(&filtered)).map(|db| db + self.offset_db))
    }

    /// Dynamic range in dB, `None` when the low percentile is zero
    pub fn dynamic_range(&self, voiced: &[f32]) -> Option<f32> {
        let magnitudes: Vec<f32> = voiced.iter().map(|x| x.abs()).collect();
        let (p_low, p_high) = self.percentiles;
        let low = percentile(&magnitudes, p_low)?;
        let high = percentile(&magnitudes, p_high)?;
        if !(low > 0.0) {
            return None;
        }
        amplitude_to_db(high / low)
    }
}

/// Measure loudness with the parameters of `config`
pub fn estimate_loudness(
    samples: &[f32],
    sample_rate: u32,
    segments: &[VoiceSegment],
    config: &AnalysisConfig,
) -> Result<LoudnessEstimate, AnalysisError> {
    LoudnessAnalyzer::from_config(config).estimate(samples, sample_rate, segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    const SR: u32 = 16000;

    fn sine(freq: f32, amplitude: f32, seconds: f32) -> Vec<f32> {
        let n = (seconds * SR as f32) as usize;
        (0..n)
            .map(|i| amplitude * (2.0 * PI * freq * i as f32 / SR as f32).sin())
            .collect()
    }

    fn whole(samples: &[f32]) -> Vec<VoiceSegment> {
        vec![VoiceSegment::new(0.0, samples.len() as f32 / SR as f32)]
    }

    #[test]
    fn test_sine_level() {
        let samples = sine(150.0, 0.5, 2.0);
        let estimate = LoudnessAnalyzer::default()
            .estimate(&samples, SR, &whole(&samples))
            .unwrap();
        let expected = 20.0 * (0.5 / 2f32.sqrt()).log10();
        assert_relative_eq!(estimate.level_dbfs.unwrap(), expected, epsilon = 0.05);
    }

    #[test]
    fn test_gain_shifts_level() {
        let quiet = sine(200.0, 0.05, 1.0);
        let loud: Vec<f32> = quiet.iter().map(|x| x * 10.0).collect();
        let analyzer = LoudnessAnalyzer::default();

        let a = analyzer.estimate(&quiet, SR, &whole(&quiet)).unwrap();
        let b = analyzer.estimate(&loud, SR, &whole(&loud)).unwrap();

        assert_relative_eq!(
            b.level_dbfs.unwrap() - a.level_dbfs.unwrap(),
            20.0,
            epsilon = 1e-3
        );
        assert_relative_eq!(
            b.band_loudness_lufs.unwrap() - a.band_loudness_lufs.unwrap(),
            20.0,
            epsilon = 1e-2
        );
    }

    #[test]
    fn test_band_loudness_weights_frequency() {
        let analyzer = LoudnessAnalyzer::default();
        let in_band = sine(1000.0, 0.5, 1.0);
        let below = sine(100.0, 0.5, 1.0);

        let a = analyzer.estimate(&in_band, SR, &whole(&in_band)).unwrap();
        let b = analyzer.estimate(&below, SR, &whole(&below)).unwrap();

        // In-band tone: level plus the offset
        assert_relative_eq!(
            a.band_loudness_lufs.unwrap(),
            a.level_dbfs.unwrap() - 0.691,
            epsilon = 0.3
        );
        assert!(b.band_loudness_lufs.unwrap() < a.band_loudness_lufs.unwrap() - 20.0);
    }

    #[test]
    fn test_no_segments_all_undetermined() {
        let samples = sine(150.0, 0.5, 1.0);
        let estimate = LoudnessAnalyzer::default()
            .estimate(&samples, SR, &[])
            .unwrap();
        assert_eq!(estimate, LoudnessEstimate::default());
    }

    #[test]
    fn test_silence_is_undetermined() {
        let samples = vec![0.0f32; 8000];
        let estimate = LoudnessAnalyzer::default()
            .estimate(&samples, SR, &whole(&samples))
            .unwrap();
        assert_eq!(estimate.level_dbfs, None);
        assert_eq!(estimate.band_loudness_lufs, None);
        assert_eq!(estimate.dynamic_range_db, None);
    }

    #[test]
    fn test_band_fault_keeps_level() {
        // Too short for the band-pass edge extension
        let samples = vec![0.25f32; 10];
        let segments = vec![VoiceSegment::new(0.0, 1.0)];
        let estimate = LoudnessAnalyzer::default()
            .estimate(&samples, SR, &segments)
            .unwrap();
        assert!(estimate.band_loudness_lufs.is_none());
        assert_relative_eq!(
            estimate.level_dbfs.unwrap(),
            20.0 * 0.25f32.log10(),
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_band_above_nyquist_is_contained() {
        let samples = sine(300.0, 0.5, 1.0);
        let estimate = LoudnessAnalyzer::default()
            .estimate(&samples, 3000, &[VoiceSegment::new(0.0, 1.0)])
            .unwrap();
        assert!(estimate.band_loudness_lufs.is_none());
        assert!(estimate.level_dbfs.is_some());
    }

    #[test]
    fn test_dynamic_range() {
        let analyzer = LoudnessAnalyzer::default();
        // |x| uniformly spread over 1..=100 -> P10 = 10.9, P95 = 95.05
        let values: Vec<f32> = (1..=100).map(|i| i as f32 / 100.0).collect();
        let range = analyzer.dynamic_range(&values).unwrap();
        assert_relative_eq!(range, 20.0 * (0.9505f32 / 0.109).log10(), epsilon = 1e-3);

        let mostly_silent: Vec<f32> = (0..100).map(|i| if i < 50 { 0.0 } else { 0.5 }).collect();
        assert_eq!(analyzer.dynamic_range(&mostly_silent), None);
    }
}
