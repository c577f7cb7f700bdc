//! # Prosody DSP
//!
//! A voice prosody analysis engine: extracts fundamental pitch, speaking
//! tempo and loudness from a short mono speech recording.
//!
//! ## Features
//!
//! - **Voice Activity**: Energy-threshold segmentation with a dynamic threshold
//! - **Pitch**: Frame autocorrelation with a periodicity gate and median aggregation
//! - **Tempo**: Spectral-flux onsets over voiced audio, per minute of voiced time
//! - **Loudness**: dBFS level, band-limited loudness approximation and dynamic range
//! - **Assessment**: Advisory notes, condition scores and personal baselines
//!
//! ## Quick Start
//!
//! ```no_run
//! use prosody_dsp::analyze;
//!
//! // Load audio samples (mono, f32, normalized)
//! let samples: Vec<f32> = vec![]; // Your audio data
//! let sample_rate = 16000;
//!
//! let report = analyze(&samples, sample_rate);
//! match &report.error_message {
//!     Some(message) => println!("Analysis failed: {}", message),
//!     None => println!("Pitch: {:?} Hz, volume: {:?} dBFS", report.pitch_hz, report.volume_dbfs),
//! }
//! ```
//!
//! ## Architecture
//!
//! The analysis pipeline follows this flow:
//!
//! ```text
//! Samples → Validation → Voice Activity → { Pitch, Tempo, Loudness } → Aggregation → Report
//! ```
//!
//! Segmentation must find at least one voiced span; the three estimators are
//! then independent and, with the `parallel` feature, run concurrently. An
//! estimator fault only leaves its own metric undetermined.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;

// Re-export main types
pub use analysis::advisory::QualityNote;
pub use analysis::baseline::{compute_baseline, Baseline};
pub use analysis::metadata::AnalysisMetadata;
pub use analysis::result::{FeatureReport, VoiceAnalysis, VoiceSegment};
pub use analysis::scoring::{score_report, ConditionScores, VoiceProfile};
pub use config::{AnalysisConfig, PitchScope};
pub use error::AnalysisError;
pub use features::loudness::{estimate_loudness, LoudnessEstimate};
pub use features::pitch::{estimate_pitch, PitchEstimate};
pub use features::tempo::{estimate_tempo, TempoEstimate};
pub use io::sample_buffer::SampleBuffer;
pub use preprocessing::voice_activity::detect_voice_segments;

use analysis::aggregator::{aggregate, StageResults};
use preprocessing::validation::validate_input;
use preprocessing::voice_activity::voiced_samples;

/// Analyze a speech buffer with the default configuration
///
/// Never fails: request-fatal conditions (input too long, unreadable input,
/// no speech) come back as a report carrying only an error message.
///
/// # Arguments
///
/// * `samples` - Mono audio samples, normalized to [-1.0, 1.0]
/// * `sample_rate` - Sample rate in Hz (typically 16000)
///
/// # Example
///
/// ```
/// use prosody_dsp::analyze;
///
/// let silence = vec![0.0f32; 16000];
/// let report = analyze(&silence, 16000);
/// assert_eq!(report.error_message.as_deref(), Some("No speech detected in audio file"));
/// ```
pub fn analyze(samples: &[f32], sample_rate: u32) -> FeatureReport {
    analyze_with_config(samples, sample_rate, &AnalysisConfig::default())
}

/// Analyze a speech buffer with an explicit configuration
///
/// See [`analyze`]; an invalid configuration is reported as an error message.
pub fn analyze_with_config(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> FeatureReport {
    match analyze_voice(samples, sample_rate, config) {
        Ok(analysis) => analysis.report,
        Err(e) => FeatureReport::failure(&e),
    }
}

/// Analyze an owned [`SampleBuffer`]
pub fn analyze_buffer(buffer: &SampleBuffer, config: &AnalysisConfig) -> FeatureReport {
    analyze_with_config(buffer.samples(), buffer.sample_rate(), config)
}

/// Detailed analysis
///
/// Runs the full pipeline and returns the report together with the voice
/// segments, every estimator's output, advisory notes and run metadata.
///
/// # Arguments
///
/// * `samples` - Mono audio samples, normalized to [-1.0, 1.0]
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Analysis configuration parameters
///
/// # Errors
///
/// Returns `AnalysisError` only for request-fatal conditions: an invalid
/// configuration, a rejected input (zero sample rate, non-finite samples,
/// too long) or no voiced segment. Estimator faults are contained.
///
/// # Example
///
/// ```
/// use prosody_dsp::{analyze_voice, AnalysisConfig};
///
/// let sample_rate = 16000;
/// let tone: Vec<f32> = (0..2 * sample_rate)
///     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 150.0 * i as f32 / sample_rate as f32).sin())
///     .collect();
///
/// let analysis = analyze_voice(&tone, sample_rate as u32, &AnalysisConfig::default())?;
/// assert_eq!(analysis.segments.len(), 1);
/// assert!((analysis.report.pitch_hz.unwrap() - 150.0).abs() < 5.0);
/// # Ok::<(), prosody_dsp::AnalysisError>(())
/// ```
pub fn analyze_voice(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<VoiceAnalysis, AnalysisError> {
    use std::time::Instant;
    let start_time = Instant::now();

    log::debug!(
        "Starting voice analysis: {} samples at {} Hz",
        samples.len(),
        sample_rate
    );

    let duration_seconds = config
        .validate()
        .and_then(|_| validate_input(samples, sample_rate, config.max_duration_seconds))
        .map_err(|e| {
            log::warn!("Rejected input: {}", e);
            e
        })?;

    let segments = detect_voice_segments(samples, sample_rate, config)?;
    if segments.is_empty() {
        log::info!(
            "No speech detected in {:.2}s buffer",
            duration_seconds
        );
        return Err(AnalysisError::NoSpeechDetected);
    }

    let stages = run_estimators(samples, sample_rate, &segments, config);

    let mut analysis = aggregate(duration_seconds, sample_rate, segments, stages);
    analysis.metadata.processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;

    log::info!(
        "Analyzed {:.2}s ({} segments, {:.2}s voiced): pitch={:?} Hz, tempo={:?}/min, volume={:?} dBFS in {:.1} ms",
        duration_seconds,
        analysis.metadata.segment_count,
        analysis.metadata.voiced_duration_seconds,
        analysis.report.pitch_hz,
        analysis.report.tempo_per_minute,
        analysis.report.volume_dbfs,
        analysis.metadata.processing_time_ms
    );

    Ok(analysis)
}

fn pitch_stage(
    samples: &[f32],
    sample_rate: u32,
    segments: &[VoiceSegment],
    config: &AnalysisConfig,
) -> Result<PitchEstimate, AnalysisError> {
    match config.pitch_scope {
        PitchScope::FullBuffer => estimate_pitch(samples, sample_rate, config),
        PitchScope::VoicedOnly => {
            let voiced = voiced_samples(samples, sample_rate, segments);
            estimate_pitch(&voiced, sample_rate, config)
        }
    }
}

#[cfg(not(feature = "parallel"))]
fn run_estimators(
    samples: &[f32],
    sample_rate: u32,
    segments: &[VoiceSegment],
    config: &AnalysisConfig,
) -> StageResults {
    StageResults {
        pitch: pitch_stage(samples, sample_rate, segments, config),
        tempo: estimate_tempo(samples, sample_rate, segments, config),
        loudness: estimate_loudness(samples, sample_rate, segments, config),
    }
}

#[cfg(feature = "parallel")]
fn run_estimators(
    samples: &[f32],
    sample_rate: u32,
    segments: &[VoiceSegment],
    config: &AnalysisConfig,
) -> StageResults {
    let (pitch, (tempo, loudness)) = rayon::join(
        || pitch_stage(samples, sample_rate, segments, config),
        || {
            rayon::join(
                || estimate_tempo(samples, sample_rate, segments, config),
                || estimate_loudness(samples, sample_rate, segments, config),
            )
        },
    );
    StageResults {
        pitch,
        tempo,
        loudness,
    }
}
