//! Autocorrelation pitch estimation
//!
//! Estimates the fundamental frequency of speech frame by frame and reduces
//! the accepted per-frame values to one representative pitch.
//!
//! # Algorithm
//!
//! 1. Split the buffer into frames (`frame_size`, `hop_size`, no padding)
//! 2. Autocorrelate each frame, keeping the non-negative lags
//! 3. Search lags `[round(sr / max_hz), round(sr / min_hz))` for the maximum
//! 4. Accept the lag only if its value exceeds `periodicity_threshold` times
//!    the zero-lag value (rejects noise and silence)
//! 5. Convert to `f0 = sr / lag` and keep values within `[min_hz, max_hz]`
//! 6. Aggregate with the median (robust to octave-error frames)
//!
//! # Example
//!
//! ```
//! use prosody_dsp::features::pitch::PitchEstimator;
//!
//! let sample_rate = 16000;
//! let samples: Vec<f32> = (0..sample_rate)
//!     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 200.0 * i as f32 / sample_rate as f32).sin())
//!     .collect();
//!
//! let estimate = PitchEstimator::default().estimate(&samples, sample_rate as u32)?;
//! assert!((estimate.frequency_hz.unwrap() - 200.0).abs() < 5.0);
//! # Ok::<(), prosody_dsp::AnalysisError>(())
//! ```

pub mod autocorrelation;

use serde::{Deserialize, Serialize};

use self::autocorrelation::FrameAutocorrelator;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::statistics::median;

/// Pitch estimator output
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PitchEstimate {
    /// Median fundamental in Hz, `None` when no frame passed the gate
    pub frequency_hz: Option<f32>,

    /// Frames examined
    pub frames_analyzed: usize,

    /// Frames that yielded a valid fundamental
    pub frames_accepted: usize,
}

impl PitchEstimate {
    /// Estimate with no valid measurement
    pub fn undetermined(frames_analyzed: usize) -> Self {
        Self {
            frequency_hz: None,
            frames_analyzed,
            frames_accepted: 0,
        }
    }
}

/// Autocorrelation pitch estimator
#[derive(Debug, Clone)]
pub struct PitchEstimator {
    /// Frame length in samples (default: 2048)
    pub frame_size: usize,

    /// Hop between frames in samples (default: 512)
    pub hop_size: usize,

    /// Lowest accepted fundamental in Hz (default: 50.0)
    pub min_hz: f32,

    /// Highest accepted fundamental in Hz (default: 400.0)
    pub max_hz: f32,

    /// Peak must exceed this fraction of the zero-lag value (default: 0.3)
    pub periodicity_threshold: f32,
}

impl Default for PitchEstimator {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            min_hz: 50.0,
            max_hz: 400.0,
            periodicity_threshold: 0.3,
        }
    }
}

impl PitchEstimator {
    /// Build from the analysis configuration
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            frame_size: config.frame_size,
            hop_size: config.hop_size,
            min_hz: config.pitch_min_hz,
            max_hz: config.pitch_max_hz,
            periodicity_threshold: config.periodicity_threshold,
        }
    }

    /// Lag search window `[min_period, max_period)` in samples
    pub fn lag_window(&self, sample_rate: u32) -> (usize, usize) {
        let sr = sample_rate as f32;
        let min_period = ((sr / self.max_hz).round() as usize).max(1);
        let max_period = (sr / self.min_hz).round() as usize;
        (min_period, max_period)
    }

    /// Fundamental of one frame given its autocorrelation, if the frame is
    /// periodic enough and the result lies in range
    pub fn frame_pitch(&self, acf: &[f32], sample_rate: u32) -> Option<f32> {
        let (min_period, max_period) = self.lag_window(sample_rate);

        if acf.len() <= max_period || min_period >= max_period {
            return None;
        }

        // First maximum wins on ties
        let mut peak_lag = min_period;
        let mut peak_value = acf[min_period];
        for (lag, &value) in acf.iter().enumerate().take(max_period).skip(min_period + 1) {
            if value > peak_value {
                peak_lag = lag;
                peak_value = value;
            }
        }

        if !(peak_value > self.periodicity_threshold * acf[0]) {
            return None;
        }

        let f0 = sample_rate as f32 / peak_lag as f32;
        (self.min_hz..=self.max_hz).contains(&f0).then_some(f0)
    }

    /// Estimate the representative pitch of `samples`
    ///
    /// # Arguments
    ///
    /// * `samples` - Mono samples in [-1.0, 1.0]
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Returns
    ///
    /// `PitchEstimate`, undetermined when the buffer is shorter than one frame
    /// or no frame passes the periodicity gate
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError` for invalid parameters or a numerical fault in
    /// the autocorrelation
    pub fn estimate(&self, samples: &[f32], sample_rate: u32) -> Result<PitchEstimate, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "Invalid sample rate: 0".to_string(),
            ));
        }
        if self.frame_size == 0 || self.hop_size == 0 {
            return Err(AnalysisError::InvalidInput(
                "Frame size and hop size must be > 0".to_string(),
            ));
        }

        if samples.len() < self.frame_size {
            log::debug!(
                "Buffer ({} samples) shorter than one pitch frame ({}), pitch undetermined",
                samples.len(),
                self.frame_size
            );
            return Ok(PitchEstimate::undetermined(0));
        }

        let num_frames = (samples.len() - self.frame_size) / self.hop_size + 1;
        let mut engine = FrameAutocorrelator::new(self.frame_size);
        let mut pitches = Vec::with_capacity(num_frames);

        for i in 0..num_frames {
            let start = i * self.hop_size;
            let frame = &samples[start..start + self.frame_size];
            let acf = engine.compute(frame)?;

            if let Some(f0) = self.frame_pitch(&acf, sample_rate) {
                pitches.push(f0);
            }
        }

        let (min_period, max_period) = self.lag_window(sample_rate);
        log::debug!(
            "Pitch: {}/{} frames accepted (lags {}..{})",
            pitches.len(),
            num_frames,
            min_period,
            max_period
        );

        Ok(PitchEstimate {
            frequency_hz: median(&pitches),
            frames_analyzed: num_frames,
            frames_accepted: pitches.len(),
        })
    }
}

/// Estimate pitch with the parameters of `config`
pub fn estimate_pitch(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<PitchEstimate, AnalysisError> {
    PitchEstimator::from_config(config).estimate(samples, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, amplitude: f32, seconds: f32, sample_rate: u32) -> Vec<f32> {
        let n = (seconds * sample_rate as f32) as usize;
        (0..n)
            .map(|i| amplitude * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    /// Deterministic pseudo-noise (xorshift) in [-amp, amp]
    fn noise(n: usize, amplitude: f32, mut state: u32) -> Vec<f32> {
        (0..n)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state as f32 / u32::MAX as f32 * 2.0 - 1.0) * amplitude
            })
            .collect()
    }

    #[test]
    fn test_pitch_150hz_sine() {
        let samples = sine(150.0, 0.5, 2.0, 16000);
        let estimate = PitchEstimator::default().estimate(&samples, 16000).unwrap();
        let f0 = estimate.frequency_hz.expect("sine should be voiced");
        assert!((f0 - 150.0).abs() < 5.0, "expected ~150 Hz, got {}", f0);
        assert_eq!(estimate.frames_accepted, estimate.frames_analyzed);
    }

    #[test]
    fn test_pitch_various_frequencies() {
        for &freq in &[80.0f32, 120.0, 220.0, 310.0] {
            let samples = sine(freq, 0.3, 1.0, 16000);
            let f0 = PitchEstimator::default()
                .estimate(&samples, 16000)
                .unwrap()
                .frequency_hz
                .unwrap();
            // One-sample lag quantization at 16 kHz
            let tolerance = freq * freq / 16000.0 + 1.0;
            assert!(
                (f0 - freq).abs() <= tolerance,
                "expected ~{} Hz, got {}",
                freq,
                f0
            );
        }
    }

    #[test]
    fn test_pitch_silence_undetermined() {
        let samples = vec![0.0f32; 16000];
        let estimate = PitchEstimator::default().estimate(&samples, 16000).unwrap();
        assert!(estimate.frequency_hz.is_none());
        assert!(estimate.frames_analyzed > 0);
        assert_eq!(estimate.frames_accepted, 0);
    }

    #[test]
    fn test_pitch_noise_mostly_rejected() {
        let samples = noise(32000, 0.5, 0x1234_5678);
        let estimate = PitchEstimator::default().estimate(&samples, 16000).unwrap();
        assert!(
            estimate.frames_accepted * 10 < estimate.frames_analyzed.max(1),
            "white noise should rarely pass the periodicity gate ({}/{})",
            estimate.frames_accepted,
            estimate.frames_analyzed
        );
    }

    #[test]
    fn test_pitch_short_buffer_undetermined() {
        let samples = sine(150.0, 0.5, 0.05, 16000); // 800 samples < 2048
        let estimate = PitchEstimator::default().estimate(&samples, 16000).unwrap();
        assert_eq!(estimate, PitchEstimate::undetermined(0));
    }

    #[test]
    fn test_pitch_bounds_hold() {
        // 30 Hz is below range: its period does not fit the lag window, so any
        // determinate answer must still lie inside [50, 400]
        for &freq in &[30.0f32, 450.0, 1000.0] {
            let samples = sine(freq, 0.5, 1.0, 16000);
            let estimate = PitchEstimator::default().estimate(&samples, 16000).unwrap();
            if let Some(f0) = estimate.frequency_hz {
                assert!((50.0..=400.0).contains(&f0), "{} Hz out of range", f0);
            }
        }
    }

    #[test]
    fn test_lag_window() {
        let estimator = PitchEstimator::default();
        assert_eq!(estimator.lag_window(16000), (40, 320));
        assert_eq!(estimator.lag_window(44100), (110, 882));
    }

    #[test]
    fn test_frame_pitch_gate() {
        let estimator = PitchEstimator::default();
        let mut acf = vec![0.0f32; 2048];
        acf[0] = 1.0;
        acf[100] = 0.29;
        assert_eq!(estimator.frame_pitch(&acf, 16000), None);
        acf[100] = 0.31;
        assert_eq!(estimator.frame_pitch(&acf, 16000), Some(160.0));
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(PitchEstimator::default().estimate(&[0.0; 4096], 0).is_err());
        let estimator = PitchEstimator {
            hop_size: 0,
            ..Default::default()
        };
        assert!(estimator.estimate(&[0.0; 4096], 16000).is_err());
    }
}
