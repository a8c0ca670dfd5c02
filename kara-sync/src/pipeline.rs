//! Document-level orchestration of the synthesis pipeline.

use crate::audio::ShortTimeEnergy;
use crate::peaks::{EnergyPeak, find_peaks, peaks_in_window};
use crate::synth::{
    FallbackReason, LineTiming, SyncConfig, TimingSource, synthesize_line, uniform_spans,
};
use crate::types::LyricLine;
use serde::Serialize;

/// Per-document synthesis telemetry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Lines in the document.
    pub lines: usize,
    /// Lines aligned to energy peaks.
    pub peak_aligned: usize,
    /// Lines spread uniformly.
    pub uniform: usize,
    /// Lines left untouched (no usable timestamp or no characters).
    pub skipped: usize,
}

/// Attach word timing to every line of a document.
///
/// `peaks` is the document-wide peak list, or `None` when no audio is
/// available, in which case every line is spread uniformly. Each line's
/// window runs from its first timestamp to the next line's first timestamp
/// (or `fallback_line_ms` past its start for the last line); zero-length
/// and inverted windows are replaced by a synthetic window of
/// `degenerate_window_ms`.
///
/// `word_timestamps` is overwritten, never appended to, so re-running the
/// pipeline is idempotent. Lines without a usable start timestamp or
/// without characters are skipped, and a fallback on one line never affects
/// its neighbors.
pub fn sync_lines(
    lines: &mut [LyricLine],
    peaks: Option<&[EnergyPeak]>,
    config: &SyncConfig,
) -> SyncReport {
    let mut report = SyncReport {
        lines: lines.len(),
        ..Default::default()
    };

    for index in 0..lines.len() {
        let Some(line_start) = lines[index].start_ms() else {
            report.skipped += 1;
            continue;
        };

        let chars = lines[index].sync_chars();
        if chars.is_empty() {
            report.skipped += 1;
            continue;
        }

        let next_start = lines.get(index + 1).and_then(|next| next.start_ms());
        let line_end = next_start.unwrap_or(line_start + config.fallback_line_ms);

        let timing = if line_start >= line_end {
            let end = line_start + config.degenerate_window_ms;
            LineTiming {
                words: uniform_spans(&chars, line_start, end),
                source: TimingSource::Uniform(FallbackReason::DegenerateWindow),
            }
        } else {
            match peaks {
                Some(peaks) => {
                    let window = peaks_in_window(peaks, line_start, line_end);
                    synthesize_line(&chars, &window, line_start, line_end, config)
                }
                None => LineTiming {
                    words: uniform_spans(&chars, line_start, line_end),
                    source: TimingSource::Uniform(FallbackReason::AudioUnavailable),
                },
            }
        };

        match timing.source {
            TimingSource::PeakAligned => report.peak_aligned += 1,
            TimingSource::Uniform(reason) => {
                tracing::debug!(line = index, ?reason, "uniform fallback");
                report.uniform += 1;
            }
        }

        lines[index].word_timestamps = Some(timing.words);
    }

    tracing::info!(
        lines = report.lines,
        peak_aligned = report.peak_aligned,
        uniform = report.uniform,
        skipped = report.skipped,
        "word timing synthesized"
    );

    report
}

/// Extract energy, detect peaks, and attach word timing in one call.
///
/// An empty feature series (buffer shorter than one frame, degenerate
/// sample rate) behaves exactly like missing audio: the whole document
/// falls back to uniform subdivision.
pub fn sync_with_audio(
    lines: &mut [LyricLine],
    samples: &[f32],
    sample_rate: u32,
    config: &SyncConfig,
) -> SyncReport {
    let features = ShortTimeEnergy::STANDARD.extract(samples, sample_rate);

    if features.is_empty() {
        tracing::warn!(
            sample_rate,
            samples = samples.len(),
            "audio too short to analyze, spreading words uniformly"
        );
        return sync_lines(lines, None, config);
    }

    let peaks = find_peaks(&features.energy, &features.time_ms);
    tracing::debug!(
        frames = features.len(),
        peaks = peaks.len(),
        "energy analysis complete"
    );

    sync_lines(lines, Some(&peaks), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WordTimestamp;

    fn words_of(line: &LyricLine) -> &[WordTimestamp] {
        line.word_timestamps.as_deref().unwrap_or_default()
    }

    /// 1 kHz signal (one sample per millisecond) that is silent except for
    /// 20 ms bursts starting at the given offsets. Each burst fills one
    /// analysis frame exactly, producing a single clean peak per burst.
    fn burst_signal(len_ms: usize, bursts_at_ms: &[usize]) -> Vec<f32> {
        let mut samples = vec![0.0f32; len_ms];
        for &start in bursts_at_ms {
            for s in &mut samples[start..start + 20] {
                *s = 0.9;
            }
        }
        samples
    }

    #[test]
    fn windows_run_to_the_next_line() {
        let mut lines = vec![
            LyricLine::timed("abc", 1_000.0),
            LyricLine::timed("xy", 4_000.0),
        ];

        let report = sync_lines(&mut lines, Some(&[]), &SyncConfig::DEFAULT);

        assert_eq!(report.uniform, 2);
        assert_eq!(
            words_of(&lines[0]),
            &[
                WordTimestamp::new("a", 1_000.0, 2_000.0),
                WordTimestamp::new("b", 2_000.0, 3_000.0),
                WordTimestamp::new("c", 3_000.0, 4_000.0),
            ]
        );
    }

    #[test]
    fn last_line_gets_the_fallback_duration() {
        let mut lines = vec![LyricLine::timed("xy", 4_000.0)];

        sync_lines(&mut lines, Some(&[]), &SyncConfig::DEFAULT);

        assert_eq!(
            words_of(&lines[0]),
            &[
                WordTimestamp::new("x", 4_000.0, 9_000.0),
                WordTimestamp::new("y", 9_000.0, 14_000.0),
            ]
        );
    }

    #[test]
    fn missing_audio_spreads_every_line_uniformly() {
        let mut lines = vec![
            LyricLine::timed("abc", 0.0),
            LyricLine::timed("def", 3_000.0),
        ];

        let report = sync_lines(&mut lines, None, &SyncConfig::DEFAULT);

        assert_eq!(report.peak_aligned, 0);
        assert_eq!(report.uniform, 2);
        assert!(lines.iter().all(|l| l.word_timestamps.is_some()));
    }

    #[test]
    fn untimed_and_empty_lines_are_skipped() {
        let mut lines = vec![
            LyricLine::timed("abc", 1_000.0),
            LyricLine::new("no timing"),
            LyricLine::timed("   ", 5_000.0),
        ];

        let report = sync_lines(&mut lines, Some(&[]), &SyncConfig::DEFAULT);

        assert_eq!(report.skipped, 2);
        assert!(lines[1].word_timestamps.is_none());
        assert!(lines[2].word_timestamps.is_none());
    }

    #[test]
    fn untimed_successor_means_fallback_duration() {
        // The next *line* has no timestamp, so the window defaults instead
        // of reaching past it.
        let mut lines = vec![
            LyricLine::timed("ab", 1_000.0),
            LyricLine::new("untimed"),
            LyricLine::timed("cd", 3_000.0),
        ];

        sync_lines(&mut lines, Some(&[]), &SyncConfig::DEFAULT);

        assert_eq!(
            words_of(&lines[0]),
            &[
                WordTimestamp::new("a", 1_000.0, 6_000.0),
                WordTimestamp::new("b", 6_000.0, 11_000.0),
            ]
        );
    }

    #[test]
    fn degenerate_window_is_replaced_by_a_synthetic_one() {
        // Bilingual exports often repeat a timestamp on consecutive lines.
        let mut lines = vec![
            LyricLine::timed("ab", 5_000.0),
            LyricLine::timed("cd", 5_000.0),
        ];

        let report = sync_lines(&mut lines, Some(&[]), &SyncConfig::DEFAULT);

        assert_eq!(report.uniform, 2);
        assert_eq!(
            words_of(&lines[0]),
            &[
                WordTimestamp::new("a", 5_000.0, 5_500.0),
                WordTimestamp::new("b", 5_500.0, 6_000.0),
            ]
        );
    }

    #[test]
    fn inverted_window_is_treated_as_degenerate() {
        let mut lines = vec![
            LyricLine::timed("ab", 5_000.0),
            LyricLine::timed("cd", 2_000.0),
        ];

        sync_lines(&mut lines, Some(&[]), &SyncConfig::DEFAULT);

        let words = words_of(&lines[0]);
        assert_eq!(words[0].start_ms, 5_000.0);
        assert_eq!(words[1].end_ms, 6_000.0);
    }

    #[test]
    fn resync_replaces_spans_instead_of_appending() {
        let mut lines = vec![LyricLine::timed("abc", 1_000.0)];

        sync_lines(&mut lines, Some(&[]), &SyncConfig::DEFAULT);
        let first = lines[0].word_timestamps.clone();

        sync_lines(&mut lines, Some(&[]), &SyncConfig::DEFAULT);

        assert_eq!(lines[0].word_timestamps, first);
        assert_eq!(words_of(&lines[0]).len(), 3);
    }

    #[test]
    fn fallback_on_one_line_leaves_neighbors_peak_aligned() {
        let peaks = [
            EnergyPeak {
                time_ms: 1_200.0,
                energy: 0.9,
            },
            EnergyPeak {
                time_ms: 2_400.0,
                energy: 0.9,
            },
        ];
        // Line 0 sees two peaks for two chars; line 1 sees none for three.
        let mut lines = vec![
            LyricLine::timed("ab", 1_000.0),
            LyricLine::timed("cde", 4_000.0),
        ];

        let report = sync_lines(&mut lines, Some(&peaks), &SyncConfig::DEFAULT);

        assert_eq!(report.peak_aligned, 1);
        assert_eq!(report.uniform, 1);
        assert_eq!(words_of(&lines[0])[0].start_ms, 1_200.0);
        assert_eq!(words_of(&lines[1])[0].start_ms, 4_000.0);
    }

    #[test]
    fn report_counts_add_up() {
        let mut lines = vec![
            LyricLine::timed("abc", 1_000.0),
            LyricLine::new("untimed"),
            LyricLine::timed("de", 8_000.0),
        ];

        let report = sync_lines(&mut lines, None, &SyncConfig::DEFAULT);

        assert_eq!(report.lines, 3);
        assert_eq!(
            report.peak_aligned + report.uniform + report.skipped,
            report.lines
        );
    }

    #[test]
    fn audio_bursts_drive_peak_alignment() {
        // Bursts at 200 ms and 600 ms inside the single line's window.
        let samples = burst_signal(1_000, &[200, 600]);
        let mut lines = vec![LyricLine::timed("ab", 0.0)];

        let report = sync_with_audio(&mut lines, &samples, 1_000, &SyncConfig::DEFAULT);

        assert_eq!(report.peak_aligned, 1);
        let words = words_of(&lines[0]);
        assert!((words[0].start_ms - 200.0).abs() < 1.0);
        assert!((words[0].end_ms - 600.0).abs() < 1.0);
        assert!((words[1].start_ms - 600.0).abs() < 1.0);
        assert_eq!(words[1].end_ms, 10_000.0);
    }

    #[test]
    fn too_short_audio_behaves_like_no_audio() {
        let mut lines = vec![LyricLine::timed("abc", 1_000.0)];

        let report = sync_with_audio(&mut lines, &[0.1, 0.2], 44_100, &SyncConfig::DEFAULT);

        assert_eq!(report.uniform, 1);
        assert_eq!(words_of(&lines[0]).len(), 3);
    }

    #[test]
    fn custom_fallback_duration_is_honored() {
        let config = SyncConfig {
            fallback_line_ms: 2_000.0,
            ..SyncConfig::DEFAULT
        };
        let mut lines = vec![LyricLine::timed("ab", 1_000.0)];

        sync_lines(&mut lines, None, &config);

        assert_eq!(
            words_of(&lines[0]),
            &[
                WordTimestamp::new("a", 1_000.0, 2_000.0),
                WordTimestamp::new("b", 2_000.0, 3_000.0),
            ]
        );
    }
}
