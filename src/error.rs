//! Error types for Sonify
//!
//! This module defines all error types used throughout the library. Only
//! registry and configuration errors are fatal; sampling and playback
//! failures are recovered by the poll loop.

use thiserror::Error;

/// Result type alias for Sonify operations
pub type Result<T> = std::result::Result<T, SonifyError>;

/// Main error type for Sonify operations
#[derive(Error, Debug)]
pub enum SonifyError {
    /// Registry construction or lookup error
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Sampling error
    #[error("Sampling error: {0}")]
    Sample(#[from] SampleError),

    /// Playback error
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    /// Cycle-level error
    #[error("Cycle error: {0}")]
    Cycle(#[from] CycleError),
}

/// Errors raised while building or querying the metric registry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// No metric definitions were supplied
    #[error("Registry must contain at least one metric")]
    EmptyRegistry,

    /// Two definitions share a name
    #[error("Duplicate metric: {0}")]
    DuplicateMetric(String),

    /// Palette has no notes
    #[error("Metric {metric} has an empty palette")]
    EmptyPalette { metric: String },

    /// Color list is empty
    #[error("Metric {metric} has an empty color list")]
    EmptyColors { metric: String },

    /// A color string failed validation
    #[error("Metric {metric} has invalid color {color:?}: {source}")]
    InvalidColor {
        metric: String,
        color: String,
        source: ColorError,
    },

    /// A note frequency is not a positive finite number
    #[error("Metric {metric} has invalid frequency {frequency}")]
    InvalidFrequency { metric: String, frequency: f64 },

    /// Domain bounds are not finite or the domain is missing
    #[error("Metric {metric} has an invalid domain: {reason}")]
    InvalidDomain { metric: String, reason: String },

    /// A categorical state points outside the palette
    #[error("Metric {metric} maps state {state:?} to index {index}, palette has {len} notes")]
    StateOutOfRange {
        metric: String,
        state: String,
        index: usize,
        len: usize,
    },

    /// Lookup miss
    #[error("Unknown metric: {0}")]
    NotFound(String),
}

/// Errors parsing a color string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    /// Wrong number of hex digits
    #[error("expected 6 hex digits, got {0}")]
    Length(usize),

    /// Non-hex character
    #[error("invalid hex digits in {0:?}")]
    Hex(String),
}

/// Per-metric sampling failures, recovered by skipping the metric for a cycle
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SampleError {
    /// The sampler does not know how to produce this metric
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// The source had no data for this metric
    #[error("No data available for metric: {0}")]
    NoData(String),

    /// The source call failed
    #[error("Failed to sample {metric}: {reason}")]
    Failed { metric: String, reason: String },

    /// The data source is not initialized or not reachable
    #[error("Data source unavailable: {0}")]
    SourceUnavailable(String),
}

impl SampleError {
    /// Shorthand for a failed sample
    pub fn failed(metric: impl Into<String>, reason: impl ToString) -> Self {
        Self::Failed {
            metric: metric.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors from a playback backend
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// Frequency is not a positive finite number
    #[error("Invalid frequency: {0}")]
    InvalidFrequency(f64),

    /// Output device could not be used
    #[error("Audio device error: {0}")]
    Device(String),

    /// IO error while writing to the device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Unanticipated failures that abort the remainder of a cycle
#[derive(Error, Debug)]
pub enum CycleError {
    /// A presentation sink failed to write
    #[error("Presentation sink failed: {0}")]
    Presentation(#[from] std::io::Error),
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not read the config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid YAML for [`crate::Config`]
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
