//! Waveform data types and numeric-sequence utilities.
//!
//! The oscilloscope delivers raw signed-byte samples plus five scaling
//! scalars per acquisition; this module holds the explicit transforms that
//! turn those into physical time/voltage vectors. Nothing here touches the
//! instrument: every function is pure and unit-testable.

use crate::error::{ScopeError, ScopeResult};

/// Unit of the time axis handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeUnit {
    /// Time axis in seconds.
    Seconds,
    /// Time axis in milliseconds (the unit the lab workflows plot in).
    #[default]
    Milliseconds,
}

impl TimeUnit {
    /// Number of this unit per second.
    pub fn per_second(self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Milliseconds => 1e3,
        }
    }

    /// Convert a value expressed in this unit to seconds.
    pub fn to_seconds(self, t: f64) -> f64 {
        t / self.per_second()
    }
}

/// A scaled waveform: equal-length time and amplitude vectors.
///
/// Invariants: `time.len() == amplitude.len()`, time strictly increasing
/// with uniform spacing, expressed in `unit`.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    /// Time axis, in `unit`.
    pub time: Vec<f64>,
    /// Amplitude axis, in volts.
    pub amplitude: Vec<f64>,
    /// Unit of the time axis.
    pub unit: TimeUnit,
}

impl Waveform {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// True if the waveform holds no samples.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// One completed capture: the scaled waveform plus the capture span.
#[derive(Debug, Clone, PartialEq)]
pub struct Acquisition {
    /// The scaled waveform.
    pub waveform: Waveform,
    /// Total capture duration in seconds (increment x sample count),
    /// independent of the waveform's time unit.
    pub total_time: f64,
}

/// Generate a uniformly spaced, half-open time axis of `count` points
/// starting at `start`: the endpoint `start + count * increment` is never
/// reached.
pub fn time_axis(start: f64, increment: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + increment * i as f64).collect()
}

/// Apply the digitizer's affine transform elementwise:
/// `amplitude = (raw - offset) * multiplier + zero`.
///
/// `offset` is the reference position in digitizer levels, `multiplier` the
/// volts-per-level factor and `zero` the reference voltage.
pub fn scale_amplitudes(raw: &[i8], offset: f64, multiplier: f64, zero: f64) -> Vec<f64> {
    raw.iter()
        .map(|&level| (f64::from(level) - offset) * multiplier + zero)
        .collect()
}

/// Multiply (mix) two waveforms elementwise, the lock-in mixing stage.
///
/// Returns [`ScopeError::LengthMismatch`] when the sequences differ in
/// length.
pub fn mix(first: &[f64], second: &[f64]) -> ScopeResult<Vec<f64>> {
    if first.len() != second.len() {
        return Err(ScopeError::LengthMismatch(first.len(), second.len()));
    }
    Ok(first.iter().zip(second).map(|(a, b)| a * b).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_time_axis_has_exact_count() {
        let axis = time_axis(0.0, 1e-6, 2500);
        assert_eq!(axis.len(), 2500);
    }

    #[test]
    fn test_time_axis_is_strictly_increasing_with_uniform_spacing() {
        let dt = 4e-7;
        let axis = time_axis(-1e-3, dt, 100);
        for pair in axis.windows(2) {
            assert!(pair[1] > pair[0]);
            assert!((pair[1] - pair[0] - dt).abs() < TOL);
        }
    }

    #[test]
    fn test_time_axis_is_half_open() {
        let axis = time_axis(0.0, 1e-6, 2500);
        let endpoint = 2500.0 * 1e-6;
        assert!(axis[2499] < endpoint);
        assert!((axis[2499] - (endpoint - 1e-6)).abs() < TOL);
    }

    #[test]
    fn test_time_axis_zero_count_is_empty() {
        assert!(time_axis(0.0, 1e-6, 0).is_empty());
    }

    #[test]
    fn test_scale_is_affine() {
        let scaled = scale_amplitudes(&[-128, 0, 127], 2.0, 0.5, 1.0);
        assert!((scaled[0] - ((-128.0 - 2.0) * 0.5 + 1.0)).abs() < TOL);
        assert!((scaled[1] - ((0.0 - 2.0) * 0.5 + 1.0)).abs() < TOL);
        assert!((scaled[2] - ((127.0 - 2.0) * 0.5 + 1.0)).abs() < TOL);
    }

    #[test]
    fn test_scale_of_raw_equal_offset_yields_zero_reference() {
        let scaled = scale_amplitudes(&[5], 5.0, 123.0, -0.7);
        assert!((scaled[0] - (-0.7)).abs() < TOL);
    }

    #[test]
    fn test_scale_empty_input() {
        assert!(scale_amplitudes(&[], 0.0, 1.0, 0.0).is_empty());
    }

    #[test]
    fn test_mix_elementwise() {
        let mixed = mix(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
        assert_eq!(mixed, vec![4.0, 10.0, 18.0]);
    }

    #[test]
    fn test_mix_length_mismatch() {
        let err = mix(&[1.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, ScopeError::LengthMismatch(1, 2)));
    }

    #[test]
    fn test_time_unit_conversion() {
        assert!((TimeUnit::Milliseconds.to_seconds(2.5) - 0.0025).abs() < TOL);
        assert!((TimeUnit::Seconds.to_seconds(2.5) - 2.5).abs() < TOL);
    }
}
