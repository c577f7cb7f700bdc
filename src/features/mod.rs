//! Feature extraction modules
//!
//! This module contains the prosodic feature estimators:
//! - Pitch (frame autocorrelation, median aggregation)
//! - Tempo (spectral-flux onsets over voiced audio)
//! - Loudness (level, band loudness, dynamic range)
//! - Onset detection building blocks (STFT, flux, peak picking)

pub mod loudness;
pub mod onset;
pub mod pitch;
pub mod statistics;
pub mod tempo;
