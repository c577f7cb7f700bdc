//! Analysis metadata structures

use serde::{Deserialize, Serialize};

/// Analysis metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Algorithm version
    pub algorithm_version: String,

    /// Sample rate of the analyzed buffer in Hz
    pub sample_rate: u32,

    /// Number of voiced segments
    pub segment_count: usize,

    /// Sum of voiced segment durations in seconds
    pub voiced_duration_seconds: f32,

    /// Onsets counted by the tempo estimator
    pub onset_count: usize,

    /// Frames examined by the pitch estimator
    pub pitch_frames: usize,

    /// Frames that passed the periodicity gate and range check
    pub pitch_frames_accepted: usize,

    /// Processing time in milliseconds
    pub processing_time_ms: f32,

    /// Estimator faults that were contained and reported as undetermined
    pub contained_faults: Vec<String>,
}

impl Default for AnalysisMetadata {
    fn default() -> Self {
        Self {
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            sample_rate: 0,
            segment_count: 0,
            voiced_duration_seconds: 0.0,
            onset_count: 0,
            pitch_frames: 0,
            pitch_frames_accepted: 0,
            processing_time_ms: 0.0,
            contained_faults: vec![],
        }
    }
}
