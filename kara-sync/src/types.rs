//! Core types for lyric documents and synthesized word timing.

use serde::{Deserialize, Serialize};

/// One line of a lyric document.
///
/// All times are absolute milliseconds from the start of the track. A line
/// that occurs more than once (LRC `[..][..]text`) carries one timestamp per
/// occurrence; the first entry is the line's start.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    /// Original lyric text.
    pub text: String,

    /// Start times in milliseconds, ascending.
    #[serde(default)]
    pub timestamps: Vec<f64>,

    /// Translated text, populated by bilingual parsers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,

    /// Per-character timing, populated by the synthesizer or by parsers of
    /// formats with word-level syntax.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_timestamps: Option<Vec<WordTimestamp>>,
}

impl LyricLine {
    /// A line with text and no timing.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// A line with text and a single start timestamp.
    pub fn timed(text: impl Into<String>, start_ms: f64) -> Self {
        Self {
            text: text.into(),
            timestamps: vec![start_ms],
            ..Default::default()
        }
    }

    /// First start timestamp, or `None` when absent or non-finite.
    pub fn start_ms(&self) -> Option<f64> {
        self.timestamps.first().copied().filter(|t| t.is_finite())
    }

    /// Characters the synthesizer assigns spans to.
    ///
    /// Unicode scalar values of the trimmed text; interior spaces count and
    /// receive their own span.
    pub fn sync_chars(&self) -> Vec<char> {
        self.text.trim().chars().collect()
    }
}

/// Time span for a single character of a line.
///
/// The synthesizer emits one entry per character; parsers of karaoke formats
/// may produce multi-character segments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordTimestamp {
    /// The rendered text of the span.
    pub word: String,

    /// Span start in milliseconds.
    pub start_ms: f64,

    /// Span end in milliseconds, never before `start_ms`.
    pub end_ms: f64,
}

impl WordTimestamp {
    pub fn new(word: impl Into<String>, start_ms: f64, end_ms: f64) -> Self {
        Self {
            word: word.into(),
            start_ms,
            end_ms,
        }
    }

    /// Span length in milliseconds, zero for degenerate spans.
    pub fn duration_ms(&self) -> f64 {
        (self.end_ms - self.start_ms).max(0.0)
    }
}
