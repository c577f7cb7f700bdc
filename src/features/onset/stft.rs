//! Short-time Fourier transform magnitudes
//!
//! Frames are centered: the signal is zero-padded by `n_fft / 2` on both
//! sides so frame `t` is centered on sample `t * hop_size`. Each frame is
//! weighted with a periodic Hann window before the FFT.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::AnalysisError;

/// Periodic Hann window of length `n`
pub fn hann_window(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| {
            let phase = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            (0.5 - 0.5 * phase.cos()) as f32
        })
        .collect()
}

/// Number of centered frames for a signal of `len` samples
pub fn num_centered_frames(len: usize, n_fft: usize, hop_size: usize) -> usize {
    if len == 0 || hop_size == 0 {
        return 0;
    }
    let padded = len + 2 * (n_fft / 2);
    if padded < n_fft {
        return 0;
    }
    (padded - n_fft) / hop_size + 1
}

/// Compute the magnitude spectrogram of `samples`
///
/// # Arguments
///
/// * `samples` - Mono samples
/// * `n_fft` - FFT size (frame length)
/// * `hop_size` - Hop between frame centers
///
/// # Returns
///
/// `n_frames × (n_fft / 2 + 1)` magnitudes, time-major; empty for empty input
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a zero FFT or hop size
pub fn magnitude_spectrogram(
    samples: &[f32],
    n_fft: usize,
    hop_size: usize,
) -> Result<Vec<Vec<f32>>, AnalysisError> {
    if n_fft == 0 || hop_size == 0 {
        return Err(AnalysisError::InvalidInput(
            "FFT size and hop size must be > 0".to_string(),
        ));
    }

    let num_frames = num_centered_frames(samples.len(), n_fft, hop_size);
    if num_frames == 0 {
        return Ok(vec![]);
    }

    let pad = n_fft / 2;
    let window = hann_window(n_fft);
    let n_bins = n_fft / 2 + 1;

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n_fft);
    let mut buffer = vec![Complex::new(0.0f32, 0.0); n_fft];

    let mut spectrogram = Vec::with_capacity(num_frames);

    for t in 0..num_frames {
        // Position of the frame's first sample in unpadded coordinates
        let origin = (t * hop_size) as isize - pad as isize;

        for (i, slot) in buffer.iter_mut().enumerate() {
            let idx = origin + i as isize;
            let x = if idx >= 0 && (idx as usize) < samples.len() {
                samples[idx as usize]
            } else {
                0.0
            };
            *slot = Complex::new(x * window[i], 0.0);
        }

        fft.process(&mut buffer);

        spectrogram.push(buffer[..n_bins].iter().map(|c| c.norm()).collect());
    }

    log::debug!(
        "STFT: {} samples -> {} frames x {} bins",
        samples.len(),
        num_frames,
        n_bins
    );

    Ok(spectrogram)
}
