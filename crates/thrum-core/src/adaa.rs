//! Anti-Derivative Anti-Aliasing (ADAA) for static waveshapers.
//!
//! ADAA reduces aliasing in nonlinear waveshaping by reformulating the
//! waveshaper as a continuous-time convolution, then discretizing.  Instead
//! of evaluating `f(x)` directly, first-order ADAA computes:
//!
//! ```text
//! y[n] = (F(x[n]) − F(x[n−1])) / (x[n] − x[n−1])
//! ```
//!
//! where `F` is the first antiderivative of the waveshaping function `f`.
//! When consecutive inputs are nearly identical (`|x[n] − x[n−1]| < ε`),
//! the midpoint fallback `f((x[n] + x[n−1]) / 2)` is used to avoid
//! numerical instability from division by near-zero.
//!
//! This is equivalent to applying a rectangular-window anti-aliasing filter
//! in the continuous-time domain, significantly reducing aliased harmonics
//! at minimal computational cost (one extra function evaluation per sample).
//!
//! # Theory
//!
//! A memoryless waveshaper `y = f(x)` applied to a discrete signal creates
//! new harmonic content that can exceed the Nyquist frequency, folding back
//! as aliasing.  Oversampling reduces this but requires 4–8× the processing.
//!
//! ADAA exploits the fact that the *average* of a continuous function over
//! an interval `[x₀, x₁]` equals `(F(x₁) − F(x₀)) / (x₁ − x₀)`, where
//! `F` is the antiderivative.  This implicitly performs a box-filter
//! anti-aliasing on the waveshaper output, suppressing aliased harmonics by
//! approximately 6 dB/octave (first-order ADAA).
//!
//! First-order ADAA adds negligible latency (conceptually half a sample)
//! and requires only the antiderivative evaluation plus one division per
//! sample, making it far cheaper than oversampling for equivalent alias
//! rejection.
//!
//! # Reference
//!
//! Parker et al., "Reducing the Aliasing of Nonlinear Waveshaping Using
//! Continuous-Time Convolution", Proceedings of the 19th International
//! Conference on Digital Audio Effects (DAFx-2016), Brno, Czech Republic.
//!
//! # Example
//!
//! ```rust
//! use thrum_core::adaa::Adaa1;
//! use thrum_core::math::{soft_clip, soft_clip_ad};
//!
//! let mut adaa = Adaa1::new(soft_clip, soft_clip_ad);
//! let output = adaa.process(0.5);
//! assert!(output.abs() < 1.0);
//! ```

/// First-order ADAA processor for static waveshapers.
///
/// Wraps a waveshaping function `f` and its first antiderivative `F` to
/// produce anti-aliased output.  The generic parameters allow zero-cost
/// inlining when used with function pointers or non-capturing closures.
///
/// # Type Parameters
///
/// * `F` — The waveshaping function `f(x) → y`
/// * `AF` — Its first antiderivative `F(x)` such that `F'(x) = f(x)`
///
/// # Epsilon and Midpoint Fallback
///
/// When `|x[n] − x[n−1]| < 1e−7`, the finite-difference quotient becomes
/// numerically unstable.  The processor falls back to evaluating the
/// waveshaper at the midpoint `(x[n] + x[n−1]) / 2`, which is the
/// L'Hôpital limit of the ADAA formula as `x[n] → x[n−1]`.
///
/// # Parameterized Waveshapers
///
/// For waveshapers with parameters (e.g., [`hard_clip`](crate::hard_clip)
/// with threshold), pass a closure that captures the parameter:
///
/// ```rust
/// use thrum_core::adaa::Adaa1;
/// use thrum_core::math::{hard_clip, hard_clip_ad};
///
/// let threshold = 0.8;
/// let mut adaa = Adaa1::new(
///     move |x| hard_clip(x, threshold),
///     move |x| hard_clip_ad(x, threshold),
/// );
/// let output = adaa.process(0.5);
/// ```
pub struct Adaa1<F, AF>
where
    F: Fn(f32) -> f32,
    AF: Fn(f32) -> f32,
{
    /// The waveshaping function.
    waveshaper: F,
    /// First antiderivative of the waveshaper.
    antiderivative: AF,
    /// Previous input sample.
    prev_x: f32,
    /// Antiderivative evaluated at previous input.
    prev_ad: f32,
}

/// Minimum input difference for the finite-difference quotient.
///
/// Below this threshold, the ADAA formula `(F(x₁) − F(x₀)) / (x₁ − x₀)`
/// suffers from catastrophic cancellation and the processor falls back to
/// the midpoint evaluation `f((x₁ + x₀) / 2)`.
///
/// Chosen at approximately `f32` machine epsilon (`~1.19e−7`) to balance
/// alias rejection against numerical precision.
const ADAA_EPSILON: f32 = 1e-7;

impl<F, AF> Adaa1<F, AF>
where
    F: Fn(f32) -> f32,
    AF: Fn(f32) -> f32,
{
    /// Create a new first-order ADAA processor.
    ///
    /// # Arguments
    ///
    /// * `waveshaper` — The nonlinear function `f(x)`
    /// * `antiderivative` — Its first antiderivative `F(x)` where `F'(x) = f(x)`
    ///
    /// The processor starts with zero state (previous input = 0).
    pub fn new(waveshaper: F, antiderivative: AF) -> Self {
        let prev_ad = antiderivative(0.0);
        Self {
            waveshaper,
            antiderivative,
            prev_x: 0.0,
            prev_ad,
        }
    }

    /// Process a single sample through the anti-aliased waveshaper.
    ///
    /// Computes the first-order ADAA output:
    ///
    /// ```text
    /// y = (F(x) − F(x_prev)) / (x − x_prev)     if |x − x_prev| > ε
    /// y = f((x + x_prev) / 2)                     otherwise (midpoint fallback)
    /// ```
    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let ad = (self.antiderivative)(x);
        let diff = x - self.prev_x;

        let result = if diff.abs() > ADAA_EPSILON {
            // Normal ADAA: finite-difference of antiderivative
            (ad - self.prev_ad) / diff
        } else {
            // Midpoint fallback (L'Hôpital limit)
            (self.waveshaper)(0.5 * (x + self.prev_x))
        };

        self.prev_x = x;
        self.prev_ad = ad;
        result
    }

    /// Process a block of samples in-place.
    ///
    /// Equivalent to calling [`process`](Self::process) on each sample
    /// sequentially.
    #[inline]
    pub fn process_block(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Reset internal state to zero.
    ///
    /// Call this when the audio stream is interrupted (e.g., preset change,
    /// transport stop) to prevent the first sample of the new segment from
    /// computing a stale difference against the last sample of the old one.
    pub fn reset(&mut self) {
        self.prev_x = 0.0;
        self.prev_ad = (self.antiderivative)(0.0);
    }
}
