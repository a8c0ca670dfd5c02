//! Adaptive-threshold peak detection over a frame energy series.

use ndarray::Array1;
use ndarray_stats::Quantile1dExt;
use ndarray_stats::interpolate::Midpoint;
use noisy_float::types::{N64, n64};

/// Multiplier applied to the median energy to form the peak threshold.
const MEDIAN_FACTOR: f64 = 1.2;

/// A local energy maximum, used as a cheap proxy for a syllable onset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnergyPeak {
    /// Frame start time in milliseconds.
    pub time_ms: f64,
    /// Mean absolute amplitude of the frame.
    pub energy: f32,
}

/// Median-based adaptive threshold over the finite energy values.
///
/// Returns zero when no finite value exists, so any positive local maximum
/// still qualifies.
fn adaptive_threshold(energy: &[f32]) -> f64 {
    let valid: Vec<N64> = energy
        .iter()
        .filter(|e| e.is_finite())
        .map(|&e| n64(e as f64))
        .collect();

    if valid.is_empty() {
        return 0.0;
    }

    let mut valid = Array1::from_vec(valid);
    match valid.quantile_mut(n64(0.5), &Midpoint) {
        Ok(median) => median.raw() * MEDIAN_FACTOR,
        // Only empty input errors, and that is checked above.
        Err(_) => 0.0,
    }
}

/// Extract local maxima exceeding the adaptive threshold.
///
/// A frame is a peak when its energy is strictly greater than both
/// neighbors and the threshold. Frames touching a non-finite energy or time
/// value are skipped rather than propagated. The result is ordered by time
/// and deterministic for identical input.
pub fn find_peaks(energy: &[f32], time_ms: &[f64]) -> Vec<EnergyPeak> {
    if energy.len() < 3 {
        return Vec::new();
    }

    let threshold = adaptive_threshold(energy);
    let mut peaks = Vec::new();

    for i in 1..energy.len() - 1 {
        let (prev, cur, next) = (energy[i - 1], energy[i], energy[i + 1]);
        if !prev.is_finite() || !cur.is_finite() || !next.is_finite() {
            continue;
        }

        let Some(&t) = time_ms.get(i) else {
            break;
        };
        if !t.is_finite() {
            continue;
        }

        if cur > prev && cur > next && cur as f64 > threshold {
            peaks.push(EnergyPeak {
                time_ms: t,
                energy: cur,
            });
        }
    }

    peaks.sort_by(|a, b| a.time_ms.total_cmp(&b.time_ms));
    peaks
}

/// Peaks whose time falls within `[start_ms, end_ms]`, inclusive.
pub fn peaks_in_window(peaks: &[EnergyPeak], start_ms: f64, end_ms: f64) -> Vec<EnergyPeak> {
    peaks
        .iter()
        .copied()
        .filter(|p| p.time_ms >= start_ms && p.time_ms <= end_ms)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_maximum_is_detected() {
        let peaks = find_peaks(&[1.0, 5.0, 1.0], &[0.0, 10.0, 20.0]);

        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].time_ms, 10.0);
        assert_eq!(peaks[0].energy, 5.0);
    }

    #[test]
    fn threshold_suppresses_weak_maxima() {
        // Median 1.0, threshold 1.2: the 1.1 bump is a local maximum but
        // stays below the threshold.
        let energy = [1.0, 1.1, 1.0, 1.0, 5.0, 1.0, 1.0];
        let time: Vec<f64> = (0..energy.len()).map(|i| i as f64 * 10.0).collect();

        let peaks = find_peaks(&energy, &time);

        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].time_ms, 40.0);
    }

    #[test]
    fn plateaus_are_not_peaks() {
        let energy = [0.0, 5.0, 5.0, 0.0];
        let time = [0.0, 10.0, 20.0, 30.0];

        assert!(find_peaks(&energy, &time).is_empty());
    }

    #[test]
    fn endpoints_are_never_peaks() {
        let energy = [9.0, 1.0, 9.5];
        let time = [0.0, 10.0, 20.0];

        assert!(find_peaks(&energy, &time).is_empty());
    }

    #[test]
    fn short_series_yield_no_peaks() {
        assert!(find_peaks(&[], &[]).is_empty());
        assert!(find_peaks(&[5.0], &[0.0]).is_empty());
        assert!(find_peaks(&[1.0, 5.0], &[0.0, 10.0]).is_empty());
    }

    #[test]
    fn non_finite_energies_are_skipped() {
        // The NaN frame and both frames adjacent to it are disqualified;
        // the clean maximum later in the series survives.
        let energy = [1.0, f32::NAN, 8.0, 1.0, 5.0, 1.0];
        let time: Vec<f64> = (0..energy.len()).map(|i| i as f64 * 10.0).collect();

        let peaks = find_peaks(&energy, &time);

        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].time_ms, 40.0);
    }

    #[test]
    fn non_finite_times_are_skipped() {
        let energy = [1.0, 5.0, 1.0, 6.0, 1.0];
        let time = [0.0, f64::NAN, 20.0, 30.0, 40.0];

        let peaks = find_peaks(&energy, &time);

        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].time_ms, 30.0);
    }

    #[test]
    fn median_ignores_non_finite_values() {
        // Finite values are [1, 1, 1, 1, 10]: median 1, threshold 1.2.
        let energy = [1.0, f32::INFINITY, 1.0, 1.0, 10.0, 1.0];
        let time: Vec<f64> = (0..energy.len()).map(|i| i as f64 * 10.0).collect();

        let peaks = find_peaks(&energy, &time);

        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].energy, 10.0);
    }

    #[test]
    fn peaks_are_ordered_and_deterministic() {
        let energy = [0.0, 3.0, 0.0, 4.0, 0.0, 5.0, 0.0];
        let time: Vec<f64> = (0..energy.len()).map(|i| i as f64 * 10.0).collect();

        let first = find_peaks(&energy, &time);
        let second = find_peaks(&energy, &time);

        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0].time_ms < w[1].time_ms));
    }

    #[test]
    fn even_count_median_uses_midpoint() {
        // Energies [1, 1, 2, 8]: median (1 + 2) / 2 = 1.5, threshold 1.8.
        // The interior 2.0 bump clears it; the 8.0 endpoint never counts.
        let energy = [1.0, 2.0, 1.0, 8.0];
        let time = [0.0, 10.0, 20.0, 30.0];

        let peaks = find_peaks(&energy, &time);

        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].time_ms, 10.0);
    }

    #[test]
    fn window_filter_is_inclusive() {
        let peaks = [
            EnergyPeak {
                time_ms: 900.0,
                energy: 1.0,
            },
            EnergyPeak {
                time_ms: 1_000.0,
                energy: 1.0,
            },
            EnergyPeak {
                time_ms: 2_000.0,
                energy: 1.0,
            },
            EnergyPeak {
                time_ms: 2_100.0,
                energy: 1.0,
            },
        ];

        let window = peaks_in_window(&peaks, 1_000.0, 2_000.0);

        assert_eq!(window.len(), 2);
        assert_eq!(window[0].time_ms, 1_000.0);
        assert_eq!(window[1].time_ms, 2_000.0);
    }
}
