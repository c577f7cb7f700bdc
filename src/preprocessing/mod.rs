//! Audio preprocessing modules
//!
//! This module prepares a buffer for feature extraction:
//! - Input validation (sample rate, duration cap, finite samples)
//! - Energy-based voice activity segmentation

pub mod validation;
pub mod voice_activity;
