// Sonify Audio - Playback backends
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Sonify Audio
//!
//! Playback backends for Sonify signals.
//!
//! - [`TonePlayback`]: enveloped sine tones as 16-bit PCM
//! - [`MidiPlayback`]: raw MIDI note messages, with optional fallback
//!
//! Device outputs are nonblocking: a sink that stops draining fails the
//! note after [`DEFAULT_WRITE_TIMEOUT`] instead of stalling the caller.
//!
//! ## Example
//!
//! ```rust
//! use sonify_audio::{generate_tone, normalize_samples, to_pcm16};
//!
//! let mut samples = generate_tone(440.0, 0.5, 44_100);
//! normalize_samples(&mut samples);
//! let pcm = to_pcm16(&samples);
//! assert_eq!(pcm.len(), 44_100);
//! ```

pub mod device;
pub mod envelope;
pub mod generator;
pub mod midi;
pub mod tone;

pub use device::DEFAULT_WRITE_TIMEOUT;
pub use envelope::AdsrEnvelope;
pub use generator::{generate_tone, generate_tone_with, normalize_samples, to_pcm16, HEADROOM};
pub use midi::{frequency_to_midi, midi_to_frequency, MidiPlayback, DEFAULT_VELOCITY};
pub use tone::TonePlayback;
