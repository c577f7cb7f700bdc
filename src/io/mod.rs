//! Audio I/O modules
//!
//! Caller-side collaborators of the pipeline: decoding with Symphonia,
//! resampling with Rubato and the owned sample buffer they produce.

pub mod decoder;
pub mod resample;
pub mod sample_buffer;
