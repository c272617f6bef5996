//! # Sonify - cluster health you can hear
//!
//! Sonify polls a small set of cluster-health metrics and maps every reading
//! onto a discrete signal: a musical note, a display color and a status line.
//!
//! ## Key Features
//!
//! - **Deterministic mapping**: continuous readings are clamped and bucketed
//!   linearly onto a per-metric palette; categorical states map through a
//!   fixed table with a defined fallback
//! - **Immutable registry**: metric definitions are validated once at startup
//! - **Resilient polling**: a failing metric is skipped for one cycle, never
//!   fatal; only cancellation stops the loop
//!
//! ## Quick Start
//!
//! ```rust
//! use sonify::{resolve, Registry, SampleResult};
//!
//! let registry = Registry::cluster_defaults().unwrap();
//! let cpu = registry.lookup("cpu_usage").unwrap();
//!
//! let sample = SampleResult::new(50.0);
//! let index = cpu.index_for(sample.value);
//! let signal = resolve(cpu, index, &sample);
//!
//! assert_eq!(index, 3);
//! assert_eq!(signal.label, "F4");
//! assert_eq!(signal.color.to_string(), "#126E82");
//! ```
//!
//! ## Modules
//!
//! - [`registry`]: Metric definitions and the registry
//! - [`mapper`]: Value-to-index mapping
//! - [`signal`]: Note/color resolution and status lines
//! - [`sample`]: Sampler interface
//! - [`playback`]: Playback interface
//! - [`present`]: Presentation sinks
//! - [`poll`]: The poll loop and cancellation
//! - [`config`]: Layered configuration

// Modules
pub mod color;
pub mod config;
pub mod error;
pub mod mapper;
pub mod playback;
pub mod poll;
pub mod present;
pub mod registry;
pub mod sample;
pub mod signal;

// Re-exports for convenient access
pub use color::{colorize, Color, NEUTRAL_COLOR};
pub use config::{
    AudioConfig, ClusterSettings, Config, MetricsConfig, MonitoringConfig, SimulationConfig,
    SoundBackend, SourceKind,
};
pub use error::{
    ColorError, ConfigError, CycleError, PlaybackError, RegistryError, Result, SampleError,
    SonifyError,
};
pub use mapper::{map_categorical, map_continuous, map_preresolved, FALLBACK_INDEX};
pub use playback::{check_frequency, Playback, SilentPlayback};
pub use poll::{
    CycleReport, LoopState, LoopSummary, MetricOutcome, PollLoop, PollSettings, Shutdown,
    SkipReason,
};
pub use present::{ConsoleSink, SignalSink};
pub use registry::{Domain, MetricDefinition, MetricDefinitionBuilder, Note, Registry};
pub use sample::{SampleResult, Sampler};
pub use signal::{resolve, resolve_color, resolve_note, Signal};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sample rate used by synthesized tones
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_basic_pipeline() {
        let registry = Registry::cluster_defaults().unwrap();
        let pods = registry.lookup("pod_status").unwrap();

        let sample =
            SampleResult::new(pods.state_index("Pending") as f64).with_aux("status", "Pending");
        let signal = resolve(pods, pods.index_for(sample.value), &sample);

        assert_eq!(signal.index, 1);
        assert_eq!(signal.frequency, 262.0);
        assert!(signal.message.contains("status=Pending"));
    }
}
