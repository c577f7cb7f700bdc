//! Energy-based voice activity segmentation
//!
//! The buffer is framed with centered, zero-padded frames (frame `i` is
//! centered on sample `i * hop_size`) and each frame's RMS is compared with a
//! dynamic threshold, a fixed fraction of the loudest frame. Runs of frames
//! above the threshold become [`VoiceSegment`]s; runs shorter than the
//! minimum duration are dropped.

use crate::analysis::result::VoiceSegment;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;

/// RMS of one analysis frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameEnergy {
    /// Frame center in seconds
    pub time_seconds: f32,
    /// Frame RMS amplitude
    pub rms: f32,
}

/// Centered frame RMS values
///
/// Produces `1 + len / hop_size` frames for a non-empty buffer; samples
/// outside the buffer count as zero.
pub fn frame_energies(
    samples: &[f32],
    sample_rate: u32,
    frame_size: usize,
    hop_size: usize,
) -> Vec<FrameEnergy> {
    if samples.is_empty() || sample_rate == 0 || frame_size == 0 || hop_size == 0 {
        return Vec::new();
    }

    // Prefix sums of squares, so each frame costs O(1)
    let mut prefix = Vec::with_capacity(samples.len() + 1);
    prefix.push(0.0f64);
    let mut acc = 0.0f64;
    for &x in samples {
        acc += x as f64 * x as f64;
        prefix.push(acc);
    }

    let half = (frame_size / 2) as isize;
    let len = samples.len() as isize;
    let num_frames = 1 + samples.len() / hop_size;

    (0..num_frames)
        .map(|i| {
            let center = (i * hop_size) as isize;
            let start = (center - half).clamp(0, len) as usize;
            let end = (center - half + frame_size as isize).clamp(0, len) as usize;
            let energy = (prefix[end] - prefix[start]).max(0.0);
            FrameEnergy {
                time_seconds: (i * hop_size) as f32 / sample_rate as f32,
                rms: (energy / frame_size as f64).sqrt() as f32,
            }
        })
        .collect()
}

/// Energy-threshold voice activity detector
#[derive(Debug, Clone)]
pub struct VoiceActivityDetector {
    /// Frame size in samples (default: 2048)
    pub frame_size: usize,

    /// Hop size in samples (default: 512)
    pub hop_size: usize,

    /// Frames above this fraction of the maximum RMS are voiced (default: 0.05)
    pub threshold_ratio: f32,

    /// Shortest segment kept, in seconds (default: 0.1)
    pub min_duration: f32,
}

impl Default for VoiceActivityDetector {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            threshold_ratio: 0.05,
            min_duration: 0.1,
        }
    }
}

impl VoiceActivityDetector {
    /// Build from the analysis configuration
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            frame_size: config.frame_size,
            hop_size: config.hop_size,
            threshold_ratio: config.energy_threshold_ratio,
            min_duration: config.min_segment_duration,
        }
    }

    /// Find voiced segments in `samples`
    ///
    /// # Arguments
    ///
    /// * `samples` - Mono samples in [-1.0, 1.0]
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Returns
    ///
    /// Segments in chronological order, non-overlapping, each at least
    /// `min_duration` long. Empty when no frame exceeds the threshold
    /// (silence, empty buffer).
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` for a zero sample rate or
    /// zero frame/hop size
    pub fn detect(
        &self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<Vec<VoiceSegment>, AnalysisError> {
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

        let frames = frame_energies(samples, sample_rate, self.frame_size, self.hop_size);
        let max_rms = frames.iter().map(|f| f.rms).fold(0.0f32, f32::max);
        let threshold = max_rms * self.threshold_ratio;

        let mut segments = Vec::new();
        let mut start: Option<f32> = None;

        for frame in &frames {
            let voiced = frame.rms > threshold;
            match (voiced, start) {
                (true, None) => start = Some(frame.time_seconds),
                (false, Some(begin)) => {
                    self.close(&mut segments, begin, frame.time_seconds);
                    start = None;
                }
                _ => {}
            }
        }

        // A run reaching the end closes at the last frame time
        if let (Some(begin), Some(last)) = (start, frames.last()) {
            self.close(&mut segments, begin, last.time_seconds);
        }

        log::debug!(
            "Voice activity: {} segments from {} frames (threshold {:.5})",
            segments.len(),
            frames.len(),
            threshold
        );

        Ok(segments)
    }

    fn close(&self, segments: &mut Vec<VoiceSegment>, start: f32, end: f32) {
        let duration = end - start;
        if duration >= self.min_duration && duration > 0.0 {
            segments.push(VoiceSegment::new(start, end));
        } else {
            log::trace!("Dropping {:.3}s run at {:.3}s", duration, start);
        }
    }
}

/// Detect voice segments with the parameters of `config`
pub fn detect_voice_segments(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<Vec<VoiceSegment>, AnalysisError> {
    VoiceActivityDetector::from_config(config).detect(samples, sample_rate)
}

/// Concatenate the samples of every segment
pub fn voiced_samples(samples: &[f32], sample_rate: u32, segments: &[VoiceSegment]) -> Vec<f32> {
    let mut voiced = Vec::new();
    for segment in segments {
        voiced.extend_from_slice(&samples[segment.sample_range(sample_rate, samples.len())]);
    }
    voiced
}

/// Sum of segment durations in seconds
pub fn total_voiced_duration(segments: &[VoiceSegment]) -> f32 {
    segments.iter().map(VoiceSegment::duration).sum()
}
