//! Sample-rate conversion using a rubato `FastFixedIn` resampler
//!
//! Decoded files arrive at their native rate (commonly 44.1 or 48 kHz); the
//! analysis runs at [`ANALYSIS_SAMPLE_RATE`]. When the rates already match
//! the buffer is passed through untouched.

use rubato::{FastFixedIn, PolynomialDegree, Resampler};

use super::sample_buffer::SampleBuffer;
use crate::error::AnalysisError;

/// Rate the analysis pipeline is tuned for
pub const ANALYSIS_SAMPLE_RATE: u32 = 16_000;

/// Input frames per rubato call
const CHUNK_SIZE: usize = 1024;

fn resample_error(e: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::Decoding(format!("resampler: {e}"))
}

/// Convert `buffer` to `target_rate`
///
/// The output is aligned with the input (the resampler delay is removed) and
/// holds `round(len * target_rate / source_rate)` samples.
///
/// # Errors
///
/// Returns `AnalysisError::Decoding` if rubato fails to initialise or process,
/// and `AnalysisError::InvalidInput` for a zero target rate
pub fn resample_to(buffer: &SampleBuffer, target_rate: u32) -> Result<SampleBuffer, AnalysisError> {
    if target_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Invalid target sample rate: 0".to_string(),
        ));
    }
    if buffer.sample_rate() == target_rate || buffer.is_empty() {
        return SampleBuffer::new(buffer.samples().to_vec(), target_rate);
    }

    let ratio = target_rate as f64 / buffer.sample_rate() as f64;
    let mut resampler =
        FastFixedIn::<f32>::new(ratio, 1.0, PolynomialDegree::Cubic, CHUNK_SIZE, 1)
            .map_err(resample_error)?;

    let mut output_buf = vec![vec![0f32; resampler.output_frames_max()]; 1];
    let mut resampled = Vec::with_capacity((buffer.len() as f64 * ratio) as usize + CHUNK_SIZE);

    let mut chunks = buffer.samples().chunks_exact(CHUNK_SIZE);
    for chunk in &mut chunks {
        let (_, produced) = resampler
            .process_into_buffer(&[chunk], &mut output_buf, None)
            .map_err(resample_error)?;
        resampled.extend_from_slice(&output_buf[0][..produced]);
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        let (_, produced) = resampler
            .process_partial_into_buffer(Some(&[tail][..]), &mut output_buf, None)
            .map_err(resample_error)?;
        resampled.extend_from_slice(&output_buf[0][..produced]);
    }

    // Flush the samples still held back by the resampler delay
    let delay = resampler.output_delay();
    let expected = (buffer.len() as f64 * ratio).round() as usize;
    while resampled.len() < expected + delay {
        let (_, produced) = resampler
            .process_partial_into_buffer(None::<&[&[f32]]>, &mut output_buf, None)
            .map_err(resample_error)?;
        if produced == 0 {
            break;
        }
        resampled.extend_from_slice(&output_buf[0][..produced]);
    }

    let end = (delay + expected).min(resampled.len());
    let aligned = resampled.get(delay..end).unwrap_or(&[]).to_vec();

    log::debug!(
        "Resampled {} samples {} Hz -> {} samples {} Hz",
        buffer.len(),
        buffer.sample_rate(),
        aligned.len(),
        target_rate
    );

    SampleBuffer::new(aligned, target_rate)
}
