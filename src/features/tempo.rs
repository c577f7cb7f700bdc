//! Speaking tempo estimation
//!
//! Counts spectral-flux onsets in the voiced-only audio and expresses them
//! as events per minute of voiced time. Silence between segments is removed
//! before analysis and excluded from the time base, so pauses do not dilute
//! the rate.
//!
//! # Algorithm
//!
//! 1. Concatenate the samples of every voice segment
//! 2. Magnitude STFT (`n_fft`, `hop_size`)
//! 3. Spectral flux: per transition, the count of bins that increased
//! 4. Peak-pick with height `height_ratio * max(flux)` and spacing
//!    `min_distance_seconds` converted to frames
//! 5. `tempo = onset_count / voiced_seconds * 60`

use serde::{Deserialize, Serialize};

use super::onset::spectral_flux::detect_spectral_flux_onsets;
use super::onset::stft::magnitude_spectrogram;
use crate::analysis::result::VoiceSegment;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::preprocessing::voice_activity::{total_voiced_duration, voiced_samples};

/// Tempo estimator output
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TempoEstimate {
    /// Onset events per minute of voiced audio; `None` when undefined
    pub events_per_minute: Option<f32>,

    /// Onsets detected in the voiced audio
    pub onset_count: usize,

    /// Sum of voice segment durations in seconds
    pub voiced_duration_seconds: f32,
}

impl TempoEstimate {
    /// Estimate with an undefined rate
    pub fn undetermined(voiced_duration_seconds: f32) -> Self {
        Self {
            events_per_minute: None,
            onset_count: 0,
            voiced_duration_seconds,
        }
    }
}

/// Spectral-flux tempo estimator
#[derive(Debug, Clone)]
pub struct TempoEstimator {
    /// STFT size (default: 2048)
    pub n_fft: usize,

    /// STFT hop (default: 512)
    pub hop_size: usize,

    /// Onset peaks must reach this fraction of the maximum flux (default: 0.3)
    pub height_ratio: f32,

    /// Minimum spacing between onsets in seconds (default: 0.1)
    pub min_distance_seconds: f32,
}

impl Default for TempoEstimator {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_size: 512,
            height_ratio: 0.3,
            min_distance_seconds: 0.1,
        }
    }
}

impl TempoEstimator {
    /// Build from the analysis configuration
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            n_fft: config.frame_size,
            hop_size: config.hop_size,
            height_ratio: config.onset_height_ratio,
            min_distance_seconds: config.onset_min_distance_seconds,
        }
    }

    /// Minimum onset spacing in STFT frames (at least 1)
    pub fn min_distance_frames(&self, sample_rate: u32) -> usize {
        let frames = (self.min_distance_seconds * sample_rate as f32 / self.hop_size as f32) as usize;
        frames.max(1)
    }

    /// Estimate speaking tempo over the voiced segments of `samples`
    ///
    /// # Arguments
    ///
    /// * `samples` - Full mono buffer
    /// * `sample_rate` - Sample rate in Hz
    /// * `segments` - Voice segments from segmentation
    ///
    /// # Returns
    ///
    /// `TempoEstimate`; undetermined when there are no segments, the voiced
    /// time is zero or the voiced audio is empty. Zero onsets over a positive
    /// voiced time is a genuine rate of 0.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError` for invalid parameters or when the voiced audio
    /// is too short to produce a flux trace
    pub fn estimate(
        &self,
        samples: &[f32],
        sample_rate: u32,
        segments: &[VoiceSegment],
    ) -> Result<TempoEstimate, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "Invalid sample rate: 0".to_string(),
            ));
        }

        if segments.is_empty() {
            return Ok(TempoEstimate::undetermined(0.0));
        }

        let voiced_duration = total_voiced_duration(segments);
        if !(voiced_duration > 0.0) {
            return Ok(TempoEstimate::undetermined(0.0));
        }

        let voiced = voiced_samples(samples, sample_rate, segments);
        if voiced.is_empty() {
            log::debug!("Voice segments map to no samples, tempo undetermined");
            return Ok(TempoEstimate::undetermined(voiced_duration));
        }

        let spectrogram = magnitude_spectrogram(&voiced, self.n_fft, self.hop_size)?;
        if spectrogram.len() < 2 {
            log::debug!(
                "Voiced audio ({} samples) yields {} STFT frame(s), tempo undetermined",
                voiced.len(),
                spectrogram.len()
            );
            return Ok(TempoEstimate::undetermined(voiced_duration));
        }

        let min_distance = self.min_distance_frames(sample_rate);
        let onsets = detect_spectral_flux_onsets(&spectrogram, self.height_ratio, min_distance)?;

        let onset_count = onsets.len();
        let rate = onset_count as f32 / voiced_duration * 60.0;

        log::debug!(
            "Tempo: {} onsets in {:.2}s voiced ({} samples) -> {:.1}/min",
            onset_count,
            voiced_duration,
            voiced.len(),
            rate
        );

        Ok(TempoEstimate {
            events_per_minute: rate.is_finite().then_some(rate),
            onset_count,
            voiced_duration_seconds: voiced_duration,
        })
    }
}

/// Estimate tempo with the parameters of `config`
pub fn estimate_tempo(
    samples: &[f32],
    sample_rate: u32,
    segments: &[VoiceSegment],
    config: &AnalysisConfig,
) -> Result<TempoEstimate, AnalysisError> {
    TempoEstimator::from_config(config).estimate(samples, sample_rate, segments)
}
