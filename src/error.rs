//! Error types for the voice analysis engine

use thiserror::Error;

/// Errors that can occur during voice analysis
///
/// Only the input-rejection group and [`AnalysisError::NoSpeechDetected`] are
/// fatal for a request. Numerical and processing faults raised inside an
/// estimator are contained by the aggregator and turn into an undetermined
/// metric.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Input longer than the configured duration cap
    #[error("Audio file too long. Maximum {max_seconds} seconds allowed.")]
    AudioTooLong {
        /// Measured duration of the rejected input
        duration_seconds: f32,
        /// Configured cap
        max_seconds: f32,
    },

    /// Invalid input parameters or unreadable sample data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Audio decoding error (caller-side collaborators only)
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Segmentation found no voiced span
    #[error("No speech detected in audio file")]
    NoSpeechDetected,

    /// Analysis configuration is not usable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Processing error inside a stage
    #[error("Processing error: {0}")]
    Processing(String),

    /// Numerical error (unstable filter, non-finite intermediate, etc.)
    #[error("Numerical error: {0}")]
    Numerical(String),
}

impl AnalysisError {
    /// True for the errors that reject a request before any stage runs.
    pub fn is_input_rejection(&self) -> bool {
        matches!(
            self,
            AnalysisError::AudioTooLong { .. }
                | AnalysisError::InvalidInput(_)
                | AnalysisError::Decoding(_)
        )
    }

    /// True for errors that abort the whole request.
    ///
    /// Everything else is an estimator fault and only degrades one metric.
    pub fn is_fatal(&self) -> bool {
        self.is_input_rejection()
            || matches!(
                self,
                AnalysisError::NoSpeechDetected | AnalysisError::InvalidConfig(_)
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_long_message() {
        let err = AnalysisError::AudioTooLong {
            duration_seconds: 11.0,
            max_seconds: 10.0,
        };
        assert_eq!(
            err.to_string(),
            "Audio file too long. Maximum 10 seconds allowed."
        );
        assert!(err.is_input_rejection());
        assert!(err.is_fatal());
    }

    #[test]
    fn test_no_speech_is_fatal_but_not_rejection() {
        let err = AnalysisError::NoSpeechDetected;
        assert_eq!(err.to_string(), "No speech detected in audio file");
        assert!(!err.is_input_rejection());
        assert!(err.is_fatal());
    }

    #[test]
    fn test_estimator_faults_are_not_fatal() {
        assert!(!AnalysisError::Numerical("unstable".into()).is_fatal());
        assert!(!AnalysisError::Processing("short".into()).is_fatal());
    }
}
