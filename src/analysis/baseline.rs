//! Personal baseline over recent reports
//!
//! A baseline is the per-metric mean of a speaker's most recent successful
//! reports. Absent values are skipped metric by metric, so a report with an
//! undetermined pitch still contributes its tempo and volume.

use serde::{Deserialize, Serialize};

use super::result::FeatureReport;

/// Number of most recent reports a baseline covers
pub const BASELINE_WINDOW: usize = 30;

/// Per-metric baseline, rounded to two decimals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// Mean pitch in Hz
    pub pitch_hz: Option<f32>,
    /// Mean tempo in events per minute
    pub tempo_per_minute: Option<f32>,
    /// Mean level in dBFS
    pub volume_dbfs: Option<f32>,
}

impl Baseline {
    /// True when no metric could be averaged
    pub fn is_empty(&self) -> bool {
        self.pitch_hz.is_none() && self.tempo_per_minute.is_none() && self.volume_dbfs.is_none()
    }
}

/// Compute a baseline from reports ordered newest first.
///
/// Failed reports are skipped and do not count toward the window.
///
/// # Returns
///
/// `None` if no successful report is present.
pub fn compute_baseline<'a, I>(reports_newest_first: I) -> Option<Baseline>
where
    I: IntoIterator<Item = &'a FeatureReport>,
{
    let recent: Vec<&FeatureReport> = reports_newest_first
        .into_iter()
        .filter(|r| r.is_success())
        .take(BASELINE_WINDOW)
        .collect();

    if recent.is_empty() {
        return None;
    }

    log::debug!("Computing baseline over {} reports", recent.len());

    Some(Baseline {
        pitch_hz: rounded_mean(recent.iter().filter_map(|r| r.pitch_hz)),
        tempo_per_minute: rounded_mean(recent.iter().filter_map(|r| r.tempo_per_minute)),
        volume_dbfs: rounded_mean(recent.iter().filter_map(|r| r.volume_dbfs)),
    })
}

fn rounded_mean(values: impl Iterator<Item = f32>) -> Option<f32> {
    let (sum, count) = values.fold((0.0f64, 0usize), |(s, n), v| (s + v as f64, n + 1));
    if count == 0 {
        return None;
    }
    let mean = sum / count as f64;
    Some(((mean * 100.0).round() / 100.0) as f32)
}
