//! Word-timestamp synthesis: mapping a line's characters onto time spans.
//!
//! Two strategies share one output shape. The peak-guided path distributes
//! characters over detected energy peaks; uniform subdivision splits the
//! line window into equal parts. Every failure of the peak path degrades to
//! uniform, so synthesis as a whole never fails.

use crate::peaks::EnergyPeak;
use crate::types::WordTimestamp;

/// Tuning parameters for word-timestamp synthesis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyncConfig {
    /// Minimum ratio of detected peaks to characters. Lines with fewer
    /// peaks than `chars * min_peak_ratio` use uniform subdivision.
    pub min_peak_ratio: f64,

    /// Assumed line duration in milliseconds when no following line
    /// provides an end.
    pub fallback_line_ms: f64,

    /// Synthetic window length in milliseconds substituted for zero-length
    /// or inverted line windows.
    pub degenerate_window_ms: f64,
}

impl SyncConfig {
    /// Gate at half a peak per character, with 10 s assumed for terminal
    /// lines and 1 s for repaired windows.
    pub const DEFAULT: Self = Self {
        min_peak_ratio: 0.5,
        fallback_line_ms: 10_000.0,
        degenerate_window_ms: 1_000.0,
    };
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Why a line's timing fell back to uniform subdivision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackReason {
    /// No decoded audio was available for the document.
    AudioUnavailable,

    /// Detected peak density was below the configured gate.
    SparsePeaks { peaks: usize, chars: usize },

    /// The line window was zero-length or inverted and a synthetic window
    /// was substituted.
    DegenerateWindow,
}

/// How a line's word timing was derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimingSource {
    /// Characters were aligned to detected energy peaks.
    PeakAligned,

    /// Characters were spread uniformly across the line window.
    Uniform(FallbackReason),
}

/// Synthesized timing for one line.
#[derive(Clone, Debug)]
pub struct LineTiming {
    /// One span per character, in text order.
    pub words: Vec<WordTimestamp>,
    /// Strategy that produced the spans.
    pub source: TimingSource,
}

/// Uniform subdivision of `[line_start, line_end)` across the characters.
///
/// Sub-interval boundaries are `line_start + k * duration / n`; consecutive
/// spans share boundaries exactly and the final span ends exactly at
/// `line_end`.
pub fn uniform_spans(chars: &[char], line_start: f64, line_end: f64) -> Vec<WordTimestamp> {
    let n = chars.len();
    if n == 0 {
        return Vec::new();
    }

    let duration = line_end - line_start;
    let boundary = |k: usize| {
        if k == n {
            line_end
        } else {
            line_start + k as f64 * duration / n as f64
        }
    };

    chars
        .iter()
        .enumerate()
        .map(|(k, &c)| WordTimestamp::new(c.to_string(), boundary(k), boundary(k + 1)))
        .collect()
}

/// Peak-guided assignment of characters to spans.
///
/// Character `w` of `n` maps to peak index `floor(w / n * peaks.len())`;
/// its span runs from that peak to the next, clamped into the line window
/// so spans never leak into neighboring lines. Candidates that are missing
/// or non-finite fall back per-field: the character's uniform boundary for
/// a start, the line end for an end.
///
/// Fails with the reason when peak density is below the gate; the caller is
/// expected to degrade to [`uniform_spans`].
pub fn peak_aligned_spans(
    chars: &[char],
    peaks: &[EnergyPeak],
    line_start: f64,
    line_end: f64,
    config: &SyncConfig,
) -> Result<Vec<WordTimestamp>, FallbackReason> {
    let n = chars.len();
    if (peaks.len() as f64) < n as f64 * config.min_peak_ratio {
        return Err(FallbackReason::SparsePeaks {
            peaks: peaks.len(),
            chars: n,
        });
    }

    let duration = line_end - line_start;
    let uniform_start = |k: usize| line_start + k as f64 * duration / n as f64;

    let words = chars
        .iter()
        .enumerate()
        .map(|(w, &c)| {
            let peak_index = (w as f64 / n as f64 * peaks.len() as f64) as usize;

            let candidate_start = match peaks.get(peak_index) {
                Some(p) if p.time_ms.is_finite() => p.time_ms,
                _ => uniform_start(w),
            };
            let candidate_end = match peaks.get(peak_index + 1) {
                Some(p) if p.time_ms.is_finite() => p.time_ms,
                _ => line_end,
            };

            let start_ms = candidate_start.max(line_start).min(line_end);
            let end_ms = candidate_end.min(line_end).max(start_ms);

            WordTimestamp::new(c.to_string(), start_ms, end_ms)
        })
        .collect();

    Ok(words)
}

/// Synthesize word timing for one line.
///
/// `peaks` must already be filtered to the line window and `line_start`
/// must precede `line_end`; the orchestrator corrects degenerate windows
/// before calling. Always yields one span per character.
pub fn synthesize_line(
    chars: &[char],
    peaks: &[EnergyPeak],
    line_start: f64,
    line_end: f64,
    config: &SyncConfig,
) -> LineTiming {
    match peak_aligned_spans(chars, peaks, line_start, line_end, config) {
        Ok(words) => LineTiming {
            words,
            source: TimingSource::PeakAligned,
        },
        Err(reason) => LineTiming {
            words: uniform_spans(chars, line_start, line_end),
            source: TimingSource::Uniform(reason),
        },
    }
}
