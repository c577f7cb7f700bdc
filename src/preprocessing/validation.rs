//! Buffer-level input checks that run before any analysis stage

use crate::error::AnalysisError;

/// Validate a sample buffer and return its duration in seconds
///
/// # Errors
///
/// - `AnalysisError::InvalidInput` for a zero sample rate or a non-finite sample
/// - `AnalysisError::AudioTooLong` when the duration exceeds `max_duration_seconds`
///
/// An empty buffer is valid here; it has no voiced frames and is rejected
/// by segmentation instead.
pub fn validate_input(
    samples: &[f32],
    sample_rate: u32,
    max_duration_seconds: f32,
) -> Result<f32, AnalysisError> {
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Invalid sample rate: 0".to_string(),
        ));
    }

    let duration = samples.len() as f32 / sample_rate as f32;
    if duration > max_duration_seconds {
        log::debug!(
            "Rejecting {:.2}s buffer (limit {:.1}s)",
            duration,
            max_duration_seconds
        );
        return Err(AnalysisError::AudioTooLong {
            duration_seconds: duration,
            max_seconds: max_duration_seconds,
        });
    }

    if let Some(index) = samples.iter().position(|x| !x.is_finite()) {
        return Err(AnalysisError::InvalidInput(format!(
            "Non-finite sample at index {}",
            index
        )));
    }

    Ok(duration)
}
