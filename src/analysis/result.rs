//! Analysis result types

use serde::{Deserialize, Serialize};

use super::advisory::QualityNote;
use super::metadata::AnalysisMetadata;
use crate::error::AnalysisError;
use crate::features::loudness::LoudnessEstimate;
use crate::features::pitch::PitchEstimate;
use crate::features::tempo::TempoEstimate;

/// A contiguous voiced span, in seconds from the start of the buffer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSegment {
    /// Segment start
    pub start_seconds: f32,
    /// Segment end (exclusive, always > start)
    pub end_seconds: f32,
}

impl VoiceSegment {
    /// Create a segment
    pub fn new(start_seconds: f32, end_seconds: f32) -> Self {
        Self {
            start_seconds,
            end_seconds,
        }
    }

    /// Segment length in seconds
    pub fn duration(&self) -> f32 {
        self.end_seconds - self.start_seconds
    }

    /// Sample range `[start, end)` covered by this segment, clamped to `len`
    pub fn sample_range(&self, sample_rate: u32, len: usize) -> std::ops::Range<usize> {
        let start = ((self.start_seconds * sample_rate as f32) as usize).min(len);
        let end = ((self.end_seconds * sample_rate as f32) as usize).min(len);
        start..end.max(start)
    }
}

/// Terminal output of one analysis request
///
/// Either the numeric fields that could be determined (plus the duration) are
/// present, or `error_message` is present and every numeric field is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureReport {
    /// Median fundamental frequency in Hz
    #[serde(rename = "pitch_value")]
    pub pitch_hz: Option<f32>,

    /// Onset events per minute of voiced audio
    #[serde(rename = "tempo_value")]
    pub tempo_per_minute: Option<f32>,

    /// Level of voiced audio in dBFS
    #[serde(rename = "volume_value")]
    pub volume_dbfs: Option<f32>,

    /// Total buffer duration in seconds
    pub duration_seconds: Option<f32>,

    /// Human-readable reason the request failed
    #[serde(rename = "analysis_error_message")]
    pub error_message: Option<String>,
}

impl FeatureReport {
    /// Report for a request-fatal error; all numeric fields are absent
    pub fn failure(error: &AnalysisError) -> Self {
        Self {
            error_message: Some(error.to_string()),
            ..Default::default()
        }
    }

    /// True when the report carries numeric results
    pub fn is_success(&self) -> bool {
        self.error_message.is_none()
    }
}

/// Full outcome of a successful request, including the diagnostics the
/// [`FeatureReport`] leaves out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceAnalysis {
    /// The numeric report handed to the consumer
    pub report: FeatureReport,

    /// Voiced spans found by segmentation (never empty)
    pub segments: Vec<VoiceSegment>,

    /// Pitch estimator output
    pub pitch: PitchEstimate,

    /// Tempo estimator output
    pub tempo: TempoEstimate,

    /// Loudness analyzer output
    pub loudness: LoudnessEstimate,

    /// Advisory notes derived from fixed thresholds
    pub notes: Vec<QualityNote>,

    /// Run metadata
    pub metadata: AnalysisMetadata,
}
