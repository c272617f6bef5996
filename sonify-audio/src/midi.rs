// Sonify Audio - MIDI playback
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Raw MIDI note output.
//!
//! Notes are sent as note-on / note-off channel messages to a raw MIDI
//! device node (e.g. `/dev/snd/midiC0D0`). If the device rejects the
//! note-on, playback can fall back to another backend.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sonify::{check_frequency, Playback, PlaybackError};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::device::{open_nonblocking, write_all_within, DEFAULT_WRITE_TIMEOUT};

/// Note number of A4
pub const A4_NOTE: u8 = 69;
/// Frequency of A4 in Hz
pub const A4_FREQUENCY: f64 = 440.0;
/// Velocity used for note-on and note-off
pub const DEFAULT_VELOCITY: u8 = 64;

const NOTE_ON: u8 = 0x90;
const NOTE_OFF: u8 = 0x80;

/// Nearest MIDI note for `frequency`, clamped to `0..=127`
pub fn frequency_to_midi(frequency: f64) -> u8 {
    if !(frequency.is_finite() && frequency > 0.0) {
        return 0;
    }
    let note = A4_NOTE as f64 + 12.0 * (frequency / A4_FREQUENCY).log2();
    note.round().clamp(0.0, 127.0) as u8
}

/// Equal-tempered frequency of MIDI note `note`
pub fn midi_to_frequency(note: u8) -> f64 {
    A4_FREQUENCY * 2f64.powf((note as f64 - A4_NOTE as f64) / 12.0)
}

/// [`Playback`] sending MIDI note messages
pub struct MidiPlayback {
    out: Mutex<Box<dyn Write + Send>>,
    channel: u8,
    velocity: u8,
    write_timeout: Duration,
    fallback: Option<Box<dyn Playback>>,
}

impl MidiPlayback {
    /// Send messages to an arbitrary writer.
    pub fn with_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
            channel: 0,
            velocity: DEFAULT_VELOCITY,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            fallback: None,
        }
    }

    /// Open a raw MIDI device node for nonblocking writes.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PlaybackError> {
        let path = path.as_ref();
        let device = open_nonblocking(path, false)?;
        info!("MIDI output opened at {}", path.display());
        Ok(Self::with_writer(device))
    }

    /// Set MIDI channel (0-15).
    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel & 0x0F;
        self
    }

    /// Set note velocity (0-127).
    pub fn with_velocity(mut self, velocity: u8) -> Self {
        self.velocity = velocity.min(127);
        self
    }

    /// Set how long a message may wait on a busy device.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Backend used when the device rejects a note-on.
    pub fn with_fallback(mut self, fallback: Box<dyn Playback>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    async fn send(&self, message: [u8; 3]) -> Result<(), PlaybackError> {
        let mut out = self.out.lock().await;
        write_all_within(&mut **out, &message, self.write_timeout).await
    }
}

#[async_trait]
impl Playback for MidiPlayback {
    async fn play(&self, frequency: f64, duration: Duration) -> Result<(), PlaybackError> {
        check_frequency(frequency)?;
        let note = frequency_to_midi(frequency);
        debug!(
            "Playing MIDI note {} for {:.2} seconds",
            note,
            duration.as_secs_f64()
        );

        if let Err(e) = self.send([NOTE_ON | self.channel, note, self.velocity]).await {
            return match &self.fallback {
                Some(fallback) => {
                    warn!(
                        "Error playing MIDI note: {}; falling back to {}",
                        e,
                        fallback.backend_name()
                    );
                    fallback.play(midi_to_frequency(note), duration).await
                }
                None => Err(e),
            };
        }

        tokio::time::sleep(duration).await;
        // the note already sounded; a failed note-off is reported, not replayed
        self.send([NOTE_OFF | self.channel, note, self.velocity]).await
    }

    fn backend_name(&self) -> &'static str {
        "midi"
    }
}
