// Sonify Audio - Tone playback
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Raw PCM tone output.
//!
//! Writes 16-bit little-endian mono PCM to any byte sink: an audio device
//! node, a FIFO read by a player, or a plain file. Writers may be
//! nonblocking; a sink that stays full fails the note after the write
//! timeout.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sonify::{check_frequency, Playback, PlaybackError, DEFAULT_SAMPLE_RATE};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::device::{open_nonblocking, write_all_within, DEFAULT_WRITE_TIMEOUT};
use crate::envelope::AdsrEnvelope;
use crate::generator::{generate_tone_with, normalize_samples, to_pcm16};

/// [`Playback`] synthesizing sine tones into a PCM stream
pub struct TonePlayback {
    out: Mutex<Box<dyn Write + Send>>,
    sample_rate: u32,
    envelope: AdsrEnvelope,
    write_timeout: Duration,
}

impl TonePlayback {
    /// Play into an arbitrary writer.
    pub fn with_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
            sample_rate: DEFAULT_SAMPLE_RATE,
            envelope: AdsrEnvelope::default(),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// Open `path` for nonblocking writes. Files are appended to, device
    /// nodes and FIFOs are written as streams. A FIFO with no reader is
    /// an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PlaybackError> {
        let path = path.as_ref();
        let file = open_nonblocking(path, true)?;
        info!("Tone output opened at {}", path.display());
        Ok(Self::with_writer(file))
    }

    /// Set sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate.max(1);
        self
    }

    /// Set envelope.
    pub fn with_envelope(mut self, envelope: AdsrEnvelope) -> Self {
        self.envelope = envelope;
        self
    }

    /// Set how long a note may wait on a full sink.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Render one note to PCM bytes
    pub fn render(&self, frequency: f64, duration: Duration) -> Vec<u8> {
        let mut samples = generate_tone_with(
            &self.envelope,
            frequency,
            duration.as_secs_f64(),
            self.sample_rate,
        );
        normalize_samples(&mut samples);
        to_pcm16(&samples)
    }

    async fn write_pcm(&self, pcm: &[u8]) -> Result<(), PlaybackError> {
        let mut out = self.out.lock().await;
        write_all_within(&mut **out, pcm, self.write_timeout).await
    }
}

#[async_trait]
impl Playback for TonePlayback {
    async fn play(&self, frequency: f64, duration: Duration) -> Result<(), PlaybackError> {
        check_frequency(frequency)?;
        let pcm = self.render(frequency, duration);
        debug!(
            "Playing tone at {} Hz for {:.2} seconds ({} bytes)",
            frequency,
            duration.as_secs_f64(),
            pcm.len()
        );
        self.write_pcm(&pcm).await?;
        // the sink consumes the stream in real time
        tokio::time::sleep(duration).await;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "tone"
    }
}
