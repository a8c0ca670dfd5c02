//! Audio loading and short-time energy extraction.

use crate::error::{AudioError, Result};
use hound::{SampleFormat, WavReader, WavSpec};
use std::path::Path;

/// Frame energy series extracted from a mono sample buffer.
///
/// `energy[k]` is the mean absolute amplitude of the frame starting at
/// `time_ms[k]`. Both vectors always have the same length and `time_ms` is
/// strictly increasing.
#[derive(Clone, Debug, Default)]
pub struct AudioFeatures {
    /// Mean absolute amplitude per frame.
    pub energy: Vec<f32>,
    /// Frame start times in milliseconds.
    pub time_ms: Vec<f64>,
    /// Sample rate the series was computed at.
    pub sample_rate: u32,
    /// Frame length in samples.
    pub frame_size: usize,
    /// Hop between frame starts in samples.
    pub hop_size: usize,
}

impl AudioFeatures {
    pub fn len(&self) -> usize {
        self.energy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy.is_empty()
    }
}

/// Short-time energy extractor.
///
/// Slides a fixed-length analysis frame over the signal and records the
/// mean absolute amplitude of each frame. No spectral analysis is
/// involved.
#[derive(Clone, Copy, Debug)]
pub struct ShortTimeEnergy {
    /// Analysis frame length in milliseconds.
    pub frame_ms: f64,
    /// Hop between frame starts in milliseconds.
    pub hop_ms: f64,
}

impl ShortTimeEnergy {
    /// 20 ms frames advancing by 10 ms (50% overlap).
    pub const STANDARD: Self = Self {
        frame_ms: 20.0,
        hop_ms: 10.0,
    };

    /// Frame length in samples at the given rate, rounded down.
    pub fn frame_size(&self, sample_rate: u32) -> usize {
        (sample_rate as f64 * self.frame_ms / 1000.0) as usize
    }

    /// Hop length in samples at the given rate, rounded down.
    pub fn hop_size(&self, sample_rate: u32) -> usize {
        (sample_rate as f64 * self.hop_ms / 1000.0) as usize
    }

    /// Extract the frame energy series from mono samples.
    ///
    /// Pure function of the inputs. Returns an empty series when the buffer
    /// is shorter than one frame or the rate is too low to form one; callers
    /// treat that the same as having no audio at all.
    pub fn extract(&self, samples: &[f32], sample_rate: u32) -> AudioFeatures {
        let frame_size = self.frame_size(sample_rate);
        let hop_size = self.hop_size(sample_rate);

        let mut features = AudioFeatures {
            sample_rate,
            frame_size,
            hop_size,
            ..Default::default()
        };

        if frame_size == 0 || hop_size == 0 || samples.len() < frame_size {
            return features;
        }

        let mut start = 0;
        while start + frame_size <= samples.len() {
            let frame = &samples[start..start + frame_size];
            let sum: f32 = frame.iter().map(|s| s.abs()).sum();

            features.energy.push(sum / frame_size as f32);
            features
                .time_ms
                .push(start as f64 * 1000.0 / sample_rate as f64);

            start += hop_size;
        }

        features
    }
}

impl Default for ShortTimeEnergy {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Load audio samples from a WAV file.
///
/// Returns interleaved samples and the stream's [`WavSpec`].
pub fn load_audio<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavSpec)> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<hound::Result<_>>()?,
        SampleFormat::Int => reader
            .samples::<i16>()
            .map(|s| s.map(|s| s as f32 / i16::MAX as f32))
            .collect::<hound::Result<_>>()?,
    };

    Ok((samples, spec))
}

/// Load a WAV file as a mono buffer plus its sample rate.
///
/// Multi-channel audio keeps only the first channel.
///
/// # Errors
///
/// Returns an error if the file cannot be read or reports zero channels.
pub fn read_first_channel<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, u32)> {
    let (samples, spec) = load_audio(path)?;

    if spec.channels == 0 {
        return Err(AudioError::InvalidChannels(spec.channels).into());
    }

    let channels = spec.channels as usize;
    let samples = if channels == 1 {
        samples
    } else {
        samples.into_iter().step_by(channels).collect()
    };

    Ok((samples, spec.sample_rate))
}
