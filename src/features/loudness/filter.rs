//! Butterworth band-pass design and zero-phase filtering
//!
//! The band-pass is designed as a cascade of second-order sections from the
//! analog Butterworth prototype (low-pass to band-pass transform, then the
//! bilinear transform with pre-warped corners). Zero-phase filtering runs the
//! cascade forward and backward over an odd-extended signal, with each pass
//! started from its steady-state response to the edge sample.

use rustfft::num_complex::Complex64;
use std::f64::consts::PI;

use crate::error::AnalysisError;

/// One second-order section, `b = [b0, b1, b2]`, `a = [1, a1, a2]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    /// Numerator coefficients
    pub b: [f64; 3],
    /// Denominator coefficients `a1`, `a2` (`a0` is 1)
    pub a: [f64; 2],
}

impl Biquad {
    /// Complex response at normalized angular frequency `omega` (rad/sample)
    pub fn response(&self, omega: f64) -> Complex64 {
        let z1 = Complex64::from_polar(1.0, -omega);
        let z2 = z1 * z1;
        let num = self.b[0] + z1 * self.b[1] + z2 * self.b[2];
        let den = 1.0 + z1 * self.a[0] + z2 * self.a[1];
        num / den
    }

    /// Gain for a constant input
    fn dc_gain(&self) -> f64 {
        (self.b[0] + self.b[1] + self.b[2]) / (1.0 + self.a[0] + self.a[1])
    }

    /// Transposed direct-form II state for a constant input of `level`
    fn steady_state(&self, level: f64) -> [f64; 2] {
        let g = self.dc_gain();
        [level * (g - self.b[0]), level * (self.b[2] - self.a[1] * g)]
    }

    fn run(&self, signal: &mut [f64], mut state: [f64; 2]) {
        let [b0, b1, b2] = self.b;
        let [a1, a2] = self.a;
        for x in signal.iter_mut() {
            let input = *x;
            let y = b0 * input + state[0];
            state[0] = b1 * input - a1 * y + state[1];
            state[1] = b2 * input - a2 * y;
            *x = y;
        }
    }
}

/// Digital Butterworth band-pass as a cascade of biquads
#[derive(Debug, Clone)]
pub struct ButterworthBandpass {
    sections: Vec<Biquad>,
    order: usize,
}

impl ButterworthBandpass {
    /// Design a band-pass with prototype `order` between `low_hz` and `high_hz`
    ///
    /// The resulting filter has `2 * order` poles and `order` sections, with
    /// unit gain at the geometric band center.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidConfig` when the corners are not
    /// `0 < low < high < sample_rate / 2`, and `AnalysisError::Numerical`
    /// if the design ends up with a pole outside the unit circle
    pub fn design(
        order: usize,
        low_hz: f32,
        high_hz: f32,
        sample_rate: u32,
    ) -> Result<Self, AnalysisError> {
        let fs = sample_rate as f64;
        let (low, high) = (low_hz as f64, high_hz as f64);

        if order == 0 {
            return Err(AnalysisError::InvalidConfig(
                "Band-pass order must be > 0".to_string(),
            ));
        }
        if !(low > 0.0 && low < high && high < fs / 2.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "Band-pass corners [{}, {}] Hz invalid for sample rate {} Hz",
                low_hz, high_hz, sample_rate
            )));
        }

        // Pre-warp the corners so the bilinear transform lands them exactly
        let warp = |f: f64| 2.0 * fs * (PI * f / fs).tan();
        let (w_low, w_high) = (warp(low), warp(high));
        let bandwidth = w_high - w_low;
        let center = (w_low * w_high).sqrt();

        let bilinear = |s: Complex64| (2.0 * fs + s) / (2.0 * fs - s);

        let mut sections = Vec::with_capacity(order);
        for k in 0..order {
            let angle = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
            let prototype = Complex64::from_polar(1.0, angle);

            // Lower half-plane poles are covered by their conjugates
            if prototype.im < -1e-12 {
                continue;
            }

            let scaled = prototype * (bandwidth / 2.0);
            let offset = (scaled * scaled - center * center).sqrt();
            let (upper, lower) = (scaled + offset, scaled - offset);

            if prototype.im > 1e-12 {
                for pole in [upper, lower] {
                    let z = bilinear(pole);
                    sections.push(Self::section(z, z.conj()));
                }
            } else {
                sections.push(Self::section(bilinear(upper), bilinear(lower)));
            }
        }

        // Unit gain per section at the digital image of the analog center
        let omega_center = 2.0 * (center / (2.0 * fs)).atan();
        for section in &mut sections {
            let gain = section.response(omega_center).norm();
            if !(gain.is_finite() && gain > 0.0) {
                return Err(AnalysisError::Numerical(format!(
                    "Band-pass section gain is {} at center",
                    gain
                )));
            }
            for b in &mut section.b {
                *b /= gain;
            }
        }

        let filter = Self { sections, order };
        filter.check_stability()?;

        log::debug!(
            "Designed order-{} band-pass {:.0}-{:.0} Hz at {} Hz ({} sections)",
            order,
            low_hz,
            high_hz,
            sample_rate,
            filter.sections.len()
        );

        Ok(filter)
    }

    /// Section whose poles are `p` and `q` and whose zeros sit at z = 1 and z = -1
    fn section(p: Complex64, q: Complex64) -> Biquad {
        Biquad {
            b: [1.0, 0.0, -1.0],
            a: [-(p + q).re, (p * q).re],
        }
    }

    fn check_stability(&self) -> Result<(), AnalysisError> {
        for section in &self.sections {
            let [a1, a2] = section.a;
            let disc = Complex64::new(a1 * a1 - 4.0 * a2, 0.0).sqrt();
            for root in [(-a1 + disc) / 2.0, (-a1 - disc) / 2.0] {
                if !(root.norm() < 1.0) {
                    return Err(AnalysisError::Numerical(format!(
                        "Unstable band-pass pole (|z| = {:.6})",
                        root.norm()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Second-order sections of the cascade
    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// Edge extension used by [`Self::filtfilt`]
    pub fn pad_length(&self) -> usize {
        3 * (2 * self.order + 1)
    }

    /// Magnitude response at `freq_hz`
    pub fn magnitude_at(&self, freq_hz: f32, sample_rate: u32) -> f64 {
        let omega = 2.0 * PI * freq_hz as f64 / sample_rate as f64;
        self.sections
            .iter()
            .map(|s| s.response(omega).norm())
            .product()
    }

    /// Filter once forward, starting from the steady state for the first sample
    fn forward(&self, signal: &mut [f64]) {
        let Some(&first) = signal.first() else {
            return;
        };
        let mut level = first;
        for section in &self.sections {
            section.run(signal, section.steady_state(level));
            level *= section.dc_gain();
        }
    }

    /// Zero-phase forward-backward filtering with odd edge extension
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::Processing` when `samples` is not longer than
    /// [`Self::pad_length`], and `AnalysisError::Numerical` if the output is
    /// not finite
    pub fn filtfilt(&self, samples: &[f32]) -> Result<Vec<f32>, AnalysisError> {
        let pad = self.pad_length();
        let n = samples.len();
        if n <= pad {
            return Err(AnalysisError::Processing(format!(
                "Signal of {} samples too short for zero-phase filtering (needs > {})",
                n, pad
            )));
        }

        let first = samples[0] as f64;
        let last = samples[n - 1] as f64;

        let mut extended = Vec::with_capacity(n + 2 * pad);
        extended.extend((1..=pad).rev().map(|i| 2.0 * first - samples[i] as f64));
        extended.extend(samples.iter().map(|&x| x as f64));
        extended.extend((1..=pad).map(|i| 2.0 * last - samples[n - 1 - i] as f64));

        self.forward(&mut extended);
        extended.reverse();
        self.forward(&mut extended);
        extended.reverse();

        let output: Vec<f32> = extended[pad..pad + n].iter().map(|&y| y as f32).collect();
        if output.iter().any(|y| !y.is_finite()) {
            return Err(AnalysisError::Numerical(
                "Non-finite value in band-pass output".to_string(),
            ));
        }
        Ok(output)
    }
}
