// Sonify Audio - ADSR envelope
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Attack-decay-sustain-release amplitude envelope.

/// Linear ADSR envelope. Times are in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrEnvelope {
    pub attack: f64,
    pub decay: f64,
    /// Sustain level in `[0, 1]`
    pub sustain: f64,
    pub release: f64,
}

impl Default for AdsrEnvelope {
    fn default() -> Self {
        Self {
            attack: 0.05,
            decay: 0.05,
            sustain: 0.8,
            release: 0.1,
        }
    }
}

impl AdsrEnvelope {
    pub fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            attack: attack.max(0.0),
            decay: decay.max(0.0),
            sustain: sustain.clamp(0.0, 1.0),
            release: release.max(0.0),
        }
    }

    /// Amplitude at time `t` of a note lasting `duration` seconds.
    ///
    /// Zero-length phases are skipped. When the note is shorter than the
    /// release, the release starts at `t = 0`.
    pub fn amplitude(&self, t: f64, duration: f64) -> f64 {
        if !(t >= 0.0 && t < duration) {
            return 0.0;
        }

        let level = if t < self.attack {
            t / self.attack
        } else if t < self.attack + self.decay {
            1.0 - (1.0 - self.sustain) * (t - self.attack) / self.decay
        } else {
            self.sustain
        };

        let release_start = (duration - self.release).max(0.0);
        if self.release > 0.0 && t >= release_start {
            level * (duration - t) / (duration - release_start)
        } else {
            level
        }
    }

    /// Envelope sampled at `sample_rate` over `duration` seconds
    pub fn samples(&self, duration: f64, sample_rate: u32) -> Vec<f32> {
        let total = sample_count(duration, sample_rate);
        (0..total)
            .map(|i| self.amplitude(i as f64 / sample_rate as f64, duration) as f32)
            .collect()
    }
}

/// Number of samples covering `duration` seconds
pub(crate) fn sample_count(duration: f64, sample_rate: u32) -> usize {
    if duration.is_finite() && duration > 0.0 {
        (duration * sample_rate as f64) as usize
    } else {
        0
    }
}
