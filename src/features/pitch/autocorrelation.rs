//! FFT-accelerated frame autocorrelation
//!
//! Computes the linear (non-circular) autocorrelation of a frame through the
//! Wiener-Khinchin identity `ACF = IFFT(|FFT(x)|²)`, zero-padding to at least
//! twice the frame length so lags do not wrap around. Only the non-negative
//! lag half is returned; index `k` holds `sum_n x[n] * x[n + k]`.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::error::AnalysisError;

/// Reusable autocorrelation engine for frames of a fixed length
///
/// Plans the forward and inverse transforms once, so a whole buffer can be
/// processed frame by frame without re-planning.
pub struct FrameAutocorrelator {
    frame_size: usize,
    fft_size: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
}

impl FrameAutocorrelator {
    /// Create an engine for frames of `frame_size` samples
    pub fn new(frame_size: usize) -> Self {
        let fft_size = (2 * frame_size.max(1)).next_power_of_two();
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(fft_size);
        let inverse = planner.plan_fft_inverse(fft_size);

        Self {
            frame_size,
            fft_size,
            forward,
            inverse,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
        }
    }

    /// Autocorrelation of `frame` for lags `0..frame.len()`
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if the frame length differs from
    /// the planned length, and `AnalysisError::Numerical` if the transform
    /// produced non-finite values.
    pub fn compute(&mut self, frame: &[f32]) -> Result<Vec<f32>, AnalysisError> {
        if frame.len() != self.frame_size {
            return Err(AnalysisError::InvalidInput(format!(
                "Frame length {} does not match planned length {}",
                frame.len(),
                self.frame_size
            )));
        }

        for (slot, &x) in self.buffer.iter_mut().zip(frame) {
            *slot = Complex::new(x, 0.0);
        }
        for slot in &mut self.buffer[frame.len()..] {
            *slot = Complex::new(0.0, 0.0);
        }

        self.forward.process(&mut self.buffer);

        // Power spectrum
        for x in &mut self.buffer {
            *x = Complex::new(x.norm_sqr(), 0.0);
        }

        self.inverse.process(&mut self.buffer);

        let scale = 1.0 / self.fft_size as f32;
        let acf: Vec<f32> = self.buffer[..frame.len()]
            .iter()
            .map(|x| x.re * scale)
            .collect();

        if acf.iter().any(|v| !v.is_finite()) {
            return Err(AnalysisError::Numerical(
                "Non-finite autocorrelation value".to_string(),
            ));
        }

        Ok(acf)
    }
}

/// One-shot autocorrelation of an arbitrary signal
pub fn autocorrelation(signal: &[f32]) -> Result<Vec<f32>, AnalysisError> {
    if signal.is_empty() {
        return Ok(vec![]);
    }
    FrameAutocorrelator::new(signal.len()).compute(signal)
}
