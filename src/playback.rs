//! Playback interface
//!
//! The poll loop hands each resolved note to a [`Playback`] backend. Real
//! backends live in `sonify-audio`; [`SilentPlayback`] is the non-interactive
//! backend used in test mode and when no audio device is available.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::error::PlaybackError;

/// Audio output for resolved notes
#[async_trait]
pub trait Playback: Send + Sync {
    /// Play `frequency` Hz for `duration`. Must return within a bounded time.
    async fn play(&self, frequency: f64, duration: Duration) -> Result<(), PlaybackError>;

    /// Backend name for logs
    fn backend_name(&self) -> &'static str;
}

/// Reject frequencies no backend can play
pub fn check_frequency(frequency: f64) -> Result<(), PlaybackError> {
    if frequency.is_finite() && frequency > 0.0 {
        Ok(())
    } else {
        Err(PlaybackError::InvalidFrequency(frequency))
    }
}

/// No-op backend that logs what it would have played
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentPlayback;

#[async_trait]
impl Playback for SilentPlayback {
    async fn play(&self, frequency: f64, duration: Duration) -> Result<(), PlaybackError> {
        check_frequency(frequency)?;
        info!(
            "Playing note at {} Hz for {:.2} seconds (silent)",
            frequency,
            duration.as_secs_f64()
        );
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "silent"
    }
}
