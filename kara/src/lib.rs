//! Kara - lyric format conversion and karaoke word timing.
//!
//! The binary wires two subcommands over the library crates:
//! `sync` attaches word-level timing to a lyric file (peak-guided when a
//! WAV is supplied, uniform otherwise), `convert` translates between
//! lyric formats.

pub mod cli;
pub mod convert;
pub mod sync;
