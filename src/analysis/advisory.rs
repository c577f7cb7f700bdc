//! Qualitative advisory notes
//!
//! Presentation-layer hints derived from fixed thresholds on each metric.
//! Notes never change whether a report succeeded; an absent metric simply
//! produces no note.

use serde::{Deserialize, Serialize};

use super::result::FeatureReport;

/// Pitch below this is reported as low (Hz)
pub const LOW_PITCH_HZ: f32 = 100.0;
/// Pitch above this is reported as high (Hz)
pub const HIGH_PITCH_HZ: f32 = 250.0;
/// Level below this is reported as quiet (dBFS)
pub const QUIET_VOLUME_DBFS: f32 = -30.0;
/// Level above this is reported as loud (dBFS)
pub const LOUD_VOLUME_DBFS: f32 = -10.0;
/// Tempo below this is reported as slow (events/min)
pub const SLOW_TEMPO_PER_MINUTE: f32 = 180.0;
/// Tempo above this is reported as fast (events/min)
pub const FAST_TEMPO_PER_MINUTE: f32 = 350.0;

/// Advisory note about one metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityNote {
    /// Pitch lower than usual
    LowPitch,
    /// Pitch higher than usual
    HighPitch,
    /// Voice quieter than usual
    QuietVolume,
    /// Voice louder than usual
    LoudVolume,
    /// Slow speaking rate
    SlowTempo,
    /// Fast speaking rate
    FastTempo,
}

impl QualityNote {
    /// Short human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            QualityNote::LowPitch => "pitch low",
            QualityNote::HighPitch => "pitch high",
            QualityNote::QuietVolume => "volume low",
            QualityNote::LoudVolume => "volume high",
            QualityNote::SlowTempo => "slow speech",
            QualityNote::FastTempo => "fast speech",
        }
    }
}

/// Derive advisory notes for a report, in pitch, volume, tempo order
pub fn quality_notes(report: &FeatureReport) -> Vec<QualityNote> {
    if !report.is_success() {
        return vec![];
    }

    let mut notes = Vec::new();

    if let Some(pitch) = report.pitch_hz {
        if pitch < LOW_PITCH_HZ {
            notes.push(QualityNote::LowPitch);
        } else if pitch > HIGH_PITCH_HZ {
            notes.push(QualityNote::HighPitch);
        }
    }

    if let Some(volume) = report.volume_dbfs {
        if volume < QUIET_VOLUME_DBFS {
            notes.push(QualityNote::QuietVolume);
        } else if volume > LOUD_VOLUME_DBFS {
            notes.push(QualityNote::LoudVolume);
        }
    }

    if let Some(tempo) = report.tempo_per_minute {
        if tempo < SLOW_TEMPO_PER_MINUTE {
            notes.push(QualityNote::SlowTempo);
        } else if tempo > FAST_TEMPO_PER_MINUTE {
            notes.push(QualityNote::FastTempo);
        }
    }

    notes
}
