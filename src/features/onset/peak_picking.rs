//! Peak detection with height and distance criteria
//!
//! Finds local maxima in a 1D onset-strength trace:
//!
//! 1. A peak is a sample strictly greater than its left neighbour followed by
//!    a (possibly flat) run that ends strictly lower; flat tops report their
//!    middle index. The first and last samples are never peaks.
//! 2. Peaks lower than `min_height` are dropped.
//! 3. Peaks closer than `min_distance` samples are suppressed, keeping the
//!    highest first. Among equal heights the later peak is kept.

use std::cmp::Ordering;

/// Peak selection criteria
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakCriteria {
    /// Minimum peak height (inclusive); `None` disables the check
    pub min_height: Option<f32>,
    /// Minimum index distance between kept peaks (values below 1 act as 1)
    pub min_distance: usize,
}

impl Default for PeakCriteria {
    fn default() -> Self {
        Self {
            min_height: None,
            min_distance: 1,
        }
    }
}

/// All local maxima of `signal`, in index order
pub fn local_maxima(signal: &[f32]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if signal.len() < 3 {
        return peaks;
    }

    let i_max = signal.len() - 1;
    let mut i = 1;
    while i < i_max {
        if signal[i - 1] < signal[i] {
            let mut i_ahead = i + 1;
            while i_ahead < i_max && signal[i_ahead] == signal[i] {
                i_ahead += 1;
            }
            if signal[i_ahead] < signal[i] {
                let left = i;
                let right = i_ahead - 1;
                peaks.push((left + right) / 2);
                i = i_ahead;
            }
        }
        i += 1;
    }

    peaks
}

/// Find peaks in `signal` that satisfy `criteria`
///
/// # Returns
///
/// Peak indices sorted ascending
///
/// # Example
///
/// ```
/// use prosody_dsp::features::onset::peak_picking::{find_peaks, PeakCriteria};
///
/// let signal = vec![0.0, 0.5, 1.0, 0.7, 0.3, 0.9, 0.2];
/// let peaks = find_peaks(&signal, PeakCriteria { min_height: Some(0.5), min_distance: 2 });
/// assert_eq!(peaks, vec![2, 5]);
/// ```
pub fn find_peaks(signal: &[f32], criteria: PeakCriteria) -> Vec<usize> {
    let mut peaks = local_maxima(signal);

    if let Some(height) = criteria.min_height {
        peaks.retain(|&p| signal[p] >= height);
    }

    if criteria.min_distance > 1 && peaks.len() > 1 {
        peaks = select_by_distance(&peaks, signal, criteria.min_distance);
    }

    log::debug!(
        "Found {} peaks in signal of length {} (height={:?}, distance={})",
        peaks.len(),
        signal.len(),
        criteria.min_height,
        criteria.min_distance
    );

    peaks
}

/// Suppress peaks closer than `distance`, highest first
fn select_by_distance(peaks: &[usize], signal: &[f32], distance: usize) -> Vec<usize> {
    let n = peaks.len();
    let mut keep = vec![true; n];

    // Stable ascending order by height; walked from the top
    let mut by_priority: Vec<usize> = (0..n).collect();
    by_priority.sort_by(|&a, &b| {
        signal[peaks[a]]
            .partial_cmp(&signal[peaks[b]])
            .unwrap_or(Ordering::Equal)
    });

    for &j in by_priority.iter().rev() {
        if !keep[j] {
            continue;
        }

        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < distance {
            keep[k - 1] = false;
            k -= 1;
        }

        let mut k = j + 1;
        while k < n && peaks[k] - peaks[j] < distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, kept)| kept.then_some(p))
        .collect()
}
