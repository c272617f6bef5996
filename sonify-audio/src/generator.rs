// Sonify Audio - Tone generator
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Sine tone synthesis and PCM conversion.

use std::f64::consts::PI;

use crate::envelope::{sample_count, AdsrEnvelope};

/// Peak amplitude after normalization
pub const HEADROOM: f32 = 0.95;

/// Sine tone shaped by the default envelope.
pub fn generate_tone(frequency: f64, duration: f64, sample_rate: u32) -> Vec<f32> {
    generate_tone_with(&AdsrEnvelope::default(), frequency, duration, sample_rate)
}

/// Sine tone shaped by `envelope`.
pub fn generate_tone_with(
    envelope: &AdsrEnvelope,
    frequency: f64,
    duration: f64,
    sample_rate: u32,
) -> Vec<f32> {
    let total = sample_count(duration, sample_rate);
    let rate = sample_rate as f64;
    (0..total)
        .map(|i| {
            let t = i as f64 / rate;
            ((2.0 * PI * frequency * t).sin() * envelope.amplitude(t, duration)) as f32
        })
        .collect()
}

/// Scale samples so the peak sits at [`HEADROOM`]. Silence is left as is.
pub fn normalize_samples(samples: &mut [f32]) {
    let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    if peak > 0.0 && peak.is_finite() {
        let scale = HEADROOM / peak;
        for sample in samples.iter_mut() {
            *sample *= scale;
        }
    }
}

/// Convert to signed 16-bit little-endian PCM
pub fn to_pcm16(samples: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}
