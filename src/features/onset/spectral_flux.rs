//! Spectral flux onset detection
//!
//! Onset strength is measured per frame transition as the number of
//! frequency bins whose magnitude rose relative to the previous frame. This
//! rectified-difference count is cheaper than summing the flux energy and is
//! insensitive to the overall recording level.

use super::peak_picking::{find_peaks, PeakCriteria};
use crate::error::AnalysisError;

/// Spectral flux trace of a magnitude spectrogram
///
/// # Arguments
///
/// * `fft_magnitudes` - FFT magnitude spectrogram (n_frames × n_bins)
///
/// # Returns
///
/// `n_frames - 1` values; entry `t` counts bins that increased from frame `t`
/// to frame `t + 1`. Empty for fewer than two frames.
pub fn spectral_flux(fft_magnitudes: &[Vec<f32>]) -> Vec<f32> {
    fft_magnitudes
        .windows(2)
        .map(|pair| {
            pair[1]
                .iter()
                .zip(&pair[0])
                .filter(|(current, previous)| *current - *previous > 0.0)
                .count() as f32
        })
        .collect()
}

/// Detect onsets using the spectral flux method
///
/// # Arguments
///
/// * `fft_magnitudes` - FFT magnitude spectrogram (n_frames × n_bins)
/// * `height_ratio` - Peaks must reach this fraction of the maximum flux
/// * `min_distance_frames` - Minimum spacing between onsets in frames
///
/// # Returns
///
/// Onset indices into the flux trace, sorted by time
///
/// # Errors
///
/// Returns `AnalysisError::Processing` if the spectrogram has fewer than two
/// frames (no flux can be computed) and `AnalysisError::InvalidInput` for a
/// ratio outside (0, 1]
pub fn detect_spectral_flux_onsets(
    fft_magnitudes: &[Vec<f32>],
    height_ratio: f32,
    min_distance_frames: usize,
) -> Result<Vec<usize>, AnalysisError> {
    if !(height_ratio > 0.0 && height_ratio <= 1.0) {
        return Err(AnalysisError::InvalidInput(format!(
            "Height ratio must be in (0, 1], got {}",
            height_ratio
        )));
    }

    let flux = spectral_flux(fft_magnitudes);
    if flux.is_empty() {
        return Err(AnalysisError::Processing(format!(
            "Need at least 2 spectrogram frames for spectral flux, got {}",
            fft_magnitudes.len()
        )));
    }

    let max_flux = flux.iter().copied().fold(0.0f32, f32::max);
    let criteria = PeakCriteria {
        min_height: Some(max_flux * height_ratio),
        min_distance: min_distance_frames.max(1),
    };

    let onsets = find_peaks(&flux, criteria);

    log::debug!(
        "Spectral flux: {} transitions, max={}, {} onsets",
        flux.len(),
        max_flux,
        onsets.len()
    );

    Ok(onsets)
}
