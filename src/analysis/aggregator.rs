//! Feature aggregation
//!
//! Combines the stage outputs into the terminal report. Estimator faults are
//! contained here: the faulting metric is left undetermined, the fault is
//! logged and recorded in the metadata, and sibling metrics are reported
//! unchanged.

use super::advisory::quality_notes;
use super::metadata::AnalysisMetadata;
use super::result::{FeatureReport, VoiceAnalysis, VoiceSegment};
use crate::error::AnalysisError;
use crate::features::loudness::LoudnessEstimate;
use crate::features::pitch::PitchEstimate;
use crate::features::tempo::TempoEstimate;
use crate::preprocessing::voice_activity::total_voiced_duration;

/// Raw outputs of the three independent estimators
#[derive(Debug, Clone)]
pub struct StageResults {
    /// Pitch estimator outcome
    pub pitch: Result<PitchEstimate, AnalysisError>,
    /// Tempo estimator outcome
    pub tempo: Result<TempoEstimate, AnalysisError>,
    /// Loudness analyzer outcome
    pub loudness: Result<LoudnessEstimate, AnalysisError>,
}

fn contain<T: Default>(
    stage: &str,
    outcome: Result<T, AnalysisError>,
    faults: &mut Vec<String>,
) -> T {
    match outcome {
        Ok(value) => value,
        Err(e) => {
            log::warn!("{} estimation failed, reporting undetermined: {}", stage, e);
            faults.push(format!("{}: {}", stage, e));
            T::default()
        }
    }
}

/// Build the analysis of a request whose segmentation found speech
///
/// # Arguments
///
/// * `duration_seconds` - Total buffer duration
/// * `sample_rate` - Sample rate in Hz
/// * `segments` - Voice segments (non-empty)
/// * `stages` - Estimator outcomes
///
/// # Returns
///
/// A successful [`VoiceAnalysis`]; failed estimators appear as absent fields
pub fn aggregate(
    duration_seconds: f32,
    sample_rate: u32,
    segments: Vec<VoiceSegment>,
    stages: StageResults,
) -> VoiceAnalysis {
    let mut faults = Vec::new();

    let pitch = contain("pitch", stages.pitch, &mut faults);
    let mut tempo = contain("tempo", stages.tempo, &mut faults);
    let loudness = contain("loudness", stages.loudness, &mut faults);

    let voiced_duration = total_voiced_duration(&segments);
    if tempo.voiced_duration_seconds == 0.0 {
        tempo.voiced_duration_seconds = voiced_duration;
    }

    let report = FeatureReport {
        pitch_hz: finite(pitch.frequency_hz),
        tempo_per_minute: finite(tempo.events_per_minute),
        volume_dbfs: finite(loudness.level_dbfs),
        duration_seconds: Some(duration_seconds),
        error_message: None,
    };

    let notes = quality_notes(&report);

    let metadata = AnalysisMetadata {
        sample_rate,
        segment_count: segments.len(),
        voiced_duration_seconds: voiced_duration,
        onset_count: tempo.onset_count,
        pitch_frames: pitch.frames_analyzed,
        pitch_frames_accepted: pitch.frames_accepted,
        contained_faults: faults,
        ..Default::default()
    };

    VoiceAnalysis {
        report,
        segments,
        pitch,
        tempo,
        loudness,
        notes,
        metadata,
    }
}

fn finite(value: Option<f32>) -> Option<f32> {
    value.filter(|v| v.is_finite())
}
