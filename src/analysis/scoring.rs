//! Condition scoring
//!
//! Maps each metric onto a 0-100 score by its distance from an ideal value:
//! `max(0, round(100 - |value - ideal| / radius * 50))`. A value one radius
//! away from the ideal scores 50; two radii away scores 0.

use serde::{Deserialize, Serialize};

use super::result::FeatureReport;

/// Ideal speaking tempo in events per minute
pub const IDEAL_TEMPO_PER_MINUTE: f32 = 330.0;
/// Tolerance radius around the ideal tempo
pub const TEMPO_RADIUS: f32 = 30.0;
/// Ideal speaking level in dBFS
pub const IDEAL_VOLUME_DBFS: f32 = -20.0;
/// Tolerance radius around the ideal level
pub const VOLUME_RADIUS_DB: f32 = 5.0;

/// Speaker profile selecting the ideal pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VoiceProfile {
    /// Typical male speaking range
    Male,
    /// Typical female speaking range
    Female,
    /// No profile given
    #[default]
    Unspecified,
}

impl VoiceProfile {
    /// Ideal pitch and tolerance radius in Hz
    pub fn ideal_pitch(&self) -> (f32, f32) {
        match self {
            VoiceProfile::Male => (110.0, 25.0),
            VoiceProfile::Female => (220.0, 35.0),
            VoiceProfile::Unspecified => (165.0, 30.0),
        }
    }
}

impl std::str::FromStr for VoiceProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(VoiceProfile::Male),
            "female" | "f" => Ok(VoiceProfile::Female),
            "unspecified" | "other" | "none" => Ok(VoiceProfile::Unspecified),
            other => Err(format!("unknown voice profile: {other}")),
        }
    }
}

/// Per-metric condition scores (0-100)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionScores {
    /// Pitch score
    pub pitch: Option<u32>,
    /// Tempo score
    pub tempo: Option<u32>,
    /// Volume score
    pub volume: Option<u32>,
}

/// Score a value against an ideal and a tolerance radius
pub fn distance_score(value: f32, ideal: f32, radius: f32) -> Option<u32> {
    if !value.is_finite() || !(radius > 0.0) {
        return None;
    }
    let distance = (value - ideal).abs();
    let score = 100.0 - distance / radius * 50.0;
    Some(score.round().max(0.0) as u32)
}

/// Score every determinate metric of a successful report
pub fn score_report(report: &FeatureReport, profile: VoiceProfile) -> ConditionScores {
    if !report.is_success() {
        return ConditionScores::default();
    }

    let (ideal_pitch, pitch_radius) = profile.ideal_pitch();
    ConditionScores {
        pitch: report
            .pitch_hz
            .and_then(|p| distance_score(p, ideal_pitch, pitch_radius)),
        tempo: report
            .tempo_per_minute
            .and_then(|t| distance_score(t, IDEAL_TEMPO_PER_MINUTE, TEMPO_RADIUS)),
        volume: report
            .volume_dbfs
            .and_then(|v| distance_score(v, IDEAL_VOLUME_DBFS, VOLUME_RADIUS_DB)),
    }
}
