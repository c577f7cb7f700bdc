//! Onset detection modules
//!
//! Spectral-flux onset detection used by the tempo estimator:
//! - STFT magnitude spectrogram
//! - Spectral flux (count of rising bins)
//! - Peak picking with height and distance suppression

pub mod peak_picking;
pub mod spectral_flux;
pub mod stft;
