//! Phase alignment between two periodic waveforms.
//!
//! Two complementary methods are provided:
//!
//! - [`align_by_phase`]: sample-domain shifting. The second waveform is
//!   advanced by a whole number of samples and all three sequences are
//!   truncated to stay aligned index-for-index. Shifting by discrete
//!   samples only approximates a continuous phase shift: alignment
//!   accuracy is bounded by `360 / samples_per_period` degrees, a limit
//!   inherent to the method.
//! - [`synthetic_reference`]: an analytic `cos(2*pi*f*t + phi)` reference
//!   with perfect shape but dependent on an independently measured
//!   frequency.
//!
//! Both are pure functions; the instrument-facing wrappers that supply the
//! measured period/frequency live on the driver in [`crate::scope`].

use crate::waveform::{TimeUnit, Waveform};

/// Result of a sample-domain phase alignment: a shared time axis and the
/// two amplitude sequences, all of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    /// Truncated shared time axis.
    pub time: Vec<f64>,
    /// First waveform, final `shift` samples removed.
    pub first: Vec<f64>,
    /// Second waveform, first `shift` samples removed.
    pub second: Vec<f64>,
}

/// Normalize a phase shift in degrees into `[0, 360)` by floored modulo.
///
/// Negative inputs wrap rather than truncate: `-90` becomes `270`.
pub fn normalize_phase(phase_deg: f64) -> f64 {
    phase_deg.rem_euclid(360.0)
}

/// Number of discrete samples spanning one cycle of the measured signal,
/// rounded toward zero.
pub fn samples_per_period(period: f64, total_time: f64, sample_count: usize) -> usize {
    (period / total_time * sample_count as f64) as usize
}

/// Integer sample shift realizing `phase_deg` of the signal's period,
/// rounded toward zero.
pub fn shift_samples(phase_deg: f64, samples_per_period: usize) -> usize {
    (normalize_phase(phase_deg) / 360.0 * samples_per_period as f64) as usize
}

/// Shift `second` against `first` by `phase_deg` degrees in the sample
/// domain.
///
/// `time` is the shared time axis, `total_time` the capture span in seconds
/// and `period` the externally measured period (seconds) of the shifted
/// signal. A zero sample shift returns all three sequences unmodified.
/// Otherwise the time axis and `first` lose their final `shift` samples and
/// `second` loses its first `shift` samples, so every output has length
/// `len - shift` and the sequences remain mutually aligned.
pub fn align_by_phase(
    time: &[f64],
    first: &[f64],
    second: &[f64],
    total_time: f64,
    period: f64,
    phase_deg: f64,
) -> AlignedPair {
    let per_period = samples_per_period(period, total_time, second.len());
    let shift = shift_samples(phase_deg, per_period);

    if shift == 0 {
        return AlignedPair {
            time: time.to_vec(),
            first: first.to_vec(),
            second: second.to_vec(),
        };
    }

    // A shift beyond the record length empties the result, matching
    // open-ended slice semantics.
    let kept = time.len().saturating_sub(shift);
    AlignedPair {
        time: time[..kept].to_vec(),
        first: first[..kept].to_vec(),
        second: second.get(shift..).unwrap_or(&[]).to_vec(),
    }
}

/// Build the ideal cosine reference `cos(2*pi*f*t + phi)` over an existing
/// time axis.
///
/// `t` is converted to seconds per `unit` so it matches `frequency_hz`;
/// `phase_deg` is converted from degrees to radians.
pub fn synthetic_reference(
    time: &[f64],
    unit: TimeUnit,
    frequency_hz: f64,
    phase_deg: f64,
) -> Vec<f64> {
    let phi = phase_deg.to_radians();
    time.iter()
        .map(|&t| (2.0 * std::f64::consts::PI * frequency_hz * unit.to_seconds(t) + phi).cos())
        .collect()
}

/// Convenience wrapper building a full [`Waveform`] over the reference's
/// time axis.
pub fn synthetic_reference_waveform(
    reference: &Waveform,
    frequency_hz: f64,
    phase_deg: f64,
) -> Waveform {
    Waveform {
        time: reference.time.clone(),
        amplitude: synthetic_reference(&reference.time, reference.unit, frequency_hz, phase_deg),
        unit: reference.unit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_normalize_full_turns_collapse_to_zero() {
        assert!((normalize_phase(360.0)).abs() < TOL);
        assert!((normalize_phase(720.0)).abs() < TOL);
    }

    #[test]
    fn test_normalize_negative_wraps_not_truncates() {
        assert!((normalize_phase(-90.0) - 270.0).abs() < TOL);
        assert!((normalize_phase(-450.0) - 270.0).abs() < TOL);
    }

    #[test]
    fn test_normalize_in_range_passthrough() {
        assert!((normalize_phase(45.5) - 45.5).abs() < TOL);
    }

    #[test]
    fn test_samples_per_period_truncates() {
        // 2500 samples over 2.5 ms, 1 kHz signal: 1 ms period -> 1000 samples.
        assert_eq!(samples_per_period(1e-3, 2.5e-3, 2500), 1000);
        // Non-integer ratio rounds toward zero.
        assert_eq!(samples_per_period(0.9999e-3, 2.5e-3, 2500), 999);
    }

    #[test]
    fn test_shift_samples_truncates() {
        assert_eq!(shift_samples(90.0, 1000), 250);
        assert_eq!(shift_samples(90.1, 1000), 250);
        assert_eq!(shift_samples(-90.0, 1000), 750);
    }

    #[test]
    fn test_zero_shift_is_identity() {
        let time = vec![0.0, 1.0, 2.0, 3.0];
        let w1 = vec![1.0, 2.0, 3.0, 4.0];
        let w2 = vec![5.0, 6.0, 7.0, 8.0];
        let aligned = align_by_phase(&time, &w1, &w2, 4.0, 1.0, 360.0);
        assert_eq!(aligned.time, time);
        assert_eq!(aligned.first, w1);
        assert_eq!(aligned.second, w2);
    }

    #[test]
    fn test_truncation_preserves_mutual_alignment() {
        let n = 2500;
        let time: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let w1 = time.clone();
        let w2: Vec<f64> = time.iter().map(|t| t + 0.5).collect();
        // 1 kHz signal over 2.5 ms: 1000 samples/period, 90 deg -> 250.
        let aligned = align_by_phase(&time, &w1, &w2, 2.5e-3, 1e-3, 90.0);
        assert_eq!(aligned.time.len(), n - 250);
        assert_eq!(aligned.first.len(), n - 250);
        assert_eq!(aligned.second.len(), n - 250);
        // Second waveform starts at its shift-th original sample.
        assert!((aligned.second[0] - w2[250]).abs() < TOL);
        assert!((aligned.first[0] - w1[0]).abs() < TOL);
    }

    #[test]
    fn test_shift_beyond_record_yields_empty() {
        let time = vec![0.0, 1.0];
        let w = vec![0.0, 1.0];
        // Period ten times the record: 20 samples/period, 90 deg -> shift 5.
        let aligned = align_by_phase(&time, &w, &w, 1.0, 10.0, 90.0);
        assert!(aligned.time.is_empty());
        assert!(aligned.first.is_empty());
        assert!(aligned.second.is_empty());
    }

    #[test]
    fn test_reference_at_zero_phase_is_cosine() {
        let time = vec![0.0, 0.25e-3, 0.5e-3];
        let reference = synthetic_reference(&time, TimeUnit::Seconds, 1000.0, 0.0);
        assert!((reference[0] - 1.0).abs() < TOL); // cos(0)
        assert!(reference[1].abs() < TOL); // cos(pi/2)
        assert!((reference[2] + 1.0).abs() < TOL); // cos(pi)
    }

    #[test]
    fn test_reference_at_180_is_negation() {
        let time: Vec<f64> = (0..100).map(|i| i as f64 * 1e-5).collect();
        let zero = synthetic_reference(&time, TimeUnit::Seconds, 440.0, 0.0);
        let opposite = synthetic_reference(&time, TimeUnit::Seconds, 440.0, 180.0);
        for (a, b) in zero.iter().zip(&opposite) {
            assert!((a + b).abs() < TOL);
        }
    }

    #[test]
    fn test_reference_millisecond_axis_matches_second_axis() {
        let time_s = vec![0.0, 1e-4, 2e-4];
        let time_ms: Vec<f64> = time_s.iter().map(|t| t * 1e3).collect();
        let from_s = synthetic_reference(&time_s, TimeUnit::Seconds, 1234.0, 30.0);
        let from_ms = synthetic_reference(&time_ms, TimeUnit::Milliseconds, 1234.0, 30.0);
        for (a, b) in from_s.iter().zip(&from_ms) {
            assert!((a - b).abs() < TOL);
        }
    }
}
