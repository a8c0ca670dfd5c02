//! Word-level karaoke timing synthesis for lyric documents.
//!
//! Given lyric lines that carry line-level start timestamps and (optionally)
//! a decoded waveform, this crate derives a start/end time for every
//! character of every line. Characters are aligned to short-time energy
//! peaks when the audio supports it; uniform subdivision of the line window
//! is the universal fallback, so the pipeline always produces usable timing.
//!
//! # Architecture
//!
//! Three pure stages plus an orchestrator:
//!
//! - [`audio::ShortTimeEnergy`] turns samples into a frame energy series
//! - [`peaks::find_peaks`] extracts local maxima above an adaptive threshold
//! - [`synth`] maps one line's characters onto time spans
//! - [`pipeline::sync_lines`] applies the synthesizer across a document
//!
//! # Quick Start
//!
//! ```
//! use kara_sync::pipeline::sync_with_audio;
//! use kara_sync::synth::SyncConfig;
//! use kara_sync::types::LyricLine;
//!
//! let mut lines = vec![LyricLine::timed("hello", 1_000.0)];
//! let samples = vec![0.0f32; 44_100];
//!
//! let report = sync_with_audio(&mut lines, &samples, 44_100, &SyncConfig::default());
//!
//! assert_eq!(report.uniform, 1);
//! assert_eq!(lines[0].word_timestamps.as_ref().map(Vec::len), Some(5));
//! ```

pub mod audio;
pub mod error;
pub mod peaks;
pub mod pipeline;
pub mod synth;
pub mod types;

pub use error::{Error, Result};
