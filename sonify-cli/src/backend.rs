// Sonify CLI - Backend selection
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Sampler and playback construction from configuration.

use std::path::Path;

use sonify::{AudioConfig, Config, Playback, Sampler, SilentPlayback, SoundBackend, SourceKind};
use sonify_audio::{MidiPlayback, TonePlayback};
use sonify_cluster::{ClusterClient, ClusterConfig, ClusterSampler};
use sonify_testdata::{load_profiles, SimulatedSampler};
use tracing::{info, warn};

/// Raw MIDI port used when no device is configured
pub const DEFAULT_MIDI_DEVICE: &str = "/dev/snd/midiC0D0";

/// Build the configured sampler.
///
/// The cluster source connects eagerly; an unreachable cluster is an error.
/// So is an unreadable simulation profile file.
pub async fn build_sampler(config: &Config) -> sonify::Result<Box<dyn Sampler>> {
    match config.source {
        SourceKind::Simulated => {
            let mut sampler =
                SimulatedSampler::new().with_failure_rate(config.simulation.failure_rate);
            if let Some(seed) = config.simulation.seed {
                sampler = sampler.with_seed(seed);
            }
            if let Some(path) = &config.simulation.profiles {
                let profiles = load_profiles(Path::new(path))?;
                info!("Loaded {} simulation profiles from {}", profiles.len(), path);
                sampler = sampler.with_profiles(profiles);
            }
            info!("Using simulated metrics");
            Ok(Box::new(sampler))
        }
        SourceKind::Cluster => {
            let cluster = ClusterConfig::from_settings(&config.cluster);
            let client = ClusterClient::connect(&cluster, &config.cluster.namespace).await?;
            Ok(Box::new(ClusterSampler::new(client)))
        }
    }
}

/// Build the configured playback backend.
///
/// Never fails: a backend that cannot be opened degrades to the next one
/// (MIDI, then tone, then silent).
pub fn build_playback(audio: &AudioConfig) -> Box<dyn Playback> {
    if !audio.enabled {
        info!("Audio disabled, notes are logged only");
        return Box::new(SilentPlayback);
    }

    match audio.backend {
        SoundBackend::Midi => {
            let device = audio.device.as_deref().unwrap_or(DEFAULT_MIDI_DEVICE);
            match MidiPlayback::open(device) {
                Ok(midi) => Box::new(midi.with_fallback(tone_or_silent(None))),
                Err(e) => {
                    warn!("MIDI unavailable ({}), using tone playback", e);
                    tone_or_silent(None)
                }
            }
        }
        SoundBackend::Tone => tone_or_silent(audio.device.as_deref()),
    }
}

fn tone_or_silent(device: Option<&str>) -> Box<dyn Playback> {
    match device {
        Some(path) => match TonePlayback::open(path) {
            Ok(tone) => Box::new(tone),
            Err(e) => {
                warn!("Tone output unavailable ({}), notes are logged only", e);
                Box::new(SilentPlayback)
            }
        },
        None => {
            info!("No audio output configured, notes are logged only");
            Box::new(SilentPlayback)
        }
    }
}
