//! Configuration management
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! environment variables, then command-line flags (applied by the binary).

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::poll::PollSettings;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Cluster connection settings
    pub cluster: ClusterSettings,
    /// Polling and output settings
    pub monitoring: MonitoringConfig,
    /// Playback settings
    pub audio: AudioConfig,
    /// Metric selection
    pub metrics: MetricsConfig,
    /// Where readings come from
    pub source: SourceKind,
    /// Simulated source settings
    pub simulation: SimulationConfig,
}

/// Cluster connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClusterSettings {
    /// Namespace to monitor
    pub namespace: String,
    /// API server URL; overrides kubeconfig and in-cluster discovery
    pub api_url: Option<String>,
    /// Load connection settings from a kubeconfig (falls back to in-cluster)
    pub use_kubeconfig: bool,
    /// Kubeconfig path; `$KUBECONFIG` or `~/.kube/config` when unset
    pub kubeconfig: Option<String>,
    /// Bearer token file (defaults to the service-account token in-cluster)
    pub token_path: Option<String>,
    /// Skip TLS verification (development clusters only)
    pub insecure_skip_tls_verify: bool,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            api_url: None,
            use_kubeconfig: true,
            kubeconfig: None,
            token_path: None,
            insecure_skip_tls_verify: false,
            request_timeout_secs: 10,
        }
    }
}

/// Polling and output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Seconds between cycles
    pub poll_interval: u64,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Print ANSI-colored status lines
    pub use_color: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            poll_interval: 5,
            log_level: "info".to_string(),
            use_color: false,
        }
    }
}

/// Sound backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SoundBackend {
    /// Synthesized sine tone
    #[default]
    Tone,
    /// MIDI note-on/note-off
    Midi,
}

/// Playback settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    /// Disabled audio runs the silent backend (test mode)
    pub enabled: bool,
    pub backend: SoundBackend,
    /// Note length in seconds
    pub note_duration: f64,
    /// Output device: PCM sink for tones, raw MIDI port for MIDI
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: SoundBackend::Tone,
            note_duration: 0.5,
            device: None,
        }
    }
}

/// Metric selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    /// Metric names to poll
    pub enabled: Vec<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: [
                "cpu_usage",
                "memory_usage",
                "pod_status",
                "http_latency",
                "errors_per_second",
                "replicas",
                "node_pressure",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Source of readings
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Live Kubernetes API
    #[default]
    Cluster,
    /// Random generator
    Simulated,
}

impl std::str::FromStr for SourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cluster" | "live" => Ok(SourceKind::Cluster),
            "simulated" | "sim" | "synthetic" => Ok(SourceKind::Simulated),
            other => Err(ConfigError::Invalid(format!("unknown source {:?}", other))),
        }
    }
}

/// Simulated source settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed for reproducible runs
    pub seed: Option<u64>,
    /// Probability (0-1) that a sample fails
    pub failure_rate: f64,
    /// YAML file of per-metric profile overrides
    pub profiles: Option<String>,
}

fn is_true(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

impl Config {
    /// Parse a YAML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load from `path` if it exists, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// Merge process environment variables
    pub fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Merge variables from `lookup`.
    ///
    /// Recognized: `K8S_NAMESPACE`, `K8S_API_URL`, `USE_KUBE_CONFIG`, `POLL_INTERVAL`,
    /// `LOG_LEVEL`, `SHOW_COLOR`, `USE_MIDI`, `TEST_MODE`, `SONIFY_SOURCE`.
    /// Unparseable values are ignored.
    pub fn merge_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(ns) = lookup("K8S_NAMESPACE") {
            self.cluster.namespace = ns;
        }
        if let Some(url) = lookup("K8S_API_URL") {
            self.cluster.api_url = Some(url);
        }
        if let Some(kubeconfig) = lookup("USE_KUBE_CONFIG") {
            self.cluster.use_kubeconfig = is_true(&kubeconfig);
        }
        if let Some(val) = lookup("POLL_INTERVAL").and_then(|v| v.trim().parse().ok()) {
            self.monitoring.poll_interval = val;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.monitoring.log_level = level.to_lowercase();
        }
        if let Some(color) = lookup("SHOW_COLOR") {
            self.monitoring.use_color = is_true(&color);
        }
        if let Some(midi) = lookup("USE_MIDI") {
            if is_true(&midi) {
                self.audio.backend = SoundBackend::Midi;
            }
        }
        if let Some(test_mode) = lookup("TEST_MODE") {
            if is_true(&test_mode) {
                self.audio.enabled = false;
            }
        }
        if let Some(source) = lookup("SONIFY_SOURCE").and_then(|v| v.parse().ok()) {
            self.source = source;
        }
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monitoring.poll_interval == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval must be at least 1 second".to_string(),
            ));
        }
        if !self.audio.note_duration.is_finite() || self.audio.note_duration <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "note_duration must be positive, got {}",
                self.audio.note_duration
            )));
        }
        if !(0.0..=1.0).contains(&self.simulation.failure_rate) {
            return Err(ConfigError::Invalid(format!(
                "failure_rate must be within 0-1, got {}",
                self.simulation.failure_rate
            )));
        }
        if self.metrics.enabled.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one metric must be enabled".to_string(),
            ));
        }
        Ok(())
    }

    /// Poll loop settings derived from this config
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(self.monitoring.poll_interval),
            namespace: self.cluster.namespace.clone(),
            note_duration: Duration::from_secs_f64(self.audio.note_duration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.cluster.namespace, "default");
        assert_eq!(config.monitoring.poll_interval, 5);
        assert!(!config.monitoring.use_color);
        assert!(config.audio.enabled);
        assert_eq!(config.audio.backend, SoundBackend::Tone);
        assert_eq!(config.metrics.enabled.len(), 7);
        assert_eq!(config.source, SourceKind::Cluster);
        assert!(config.cluster.use_kubeconfig);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_kubeconfig_toggle() {
        let config = Config::default().merge_vars(vars(&[("USE_KUBE_CONFIG", "false")]));
        assert!(!config.cluster.use_kubeconfig);

        let config = Config::from_yaml("cluster:\n  kubeconfig: /etc/sonify/kubeconfig\n")
            .unwrap()
            .merge_vars(vars(&[("USE_KUBE_CONFIG", "1")]));
        assert!(config.cluster.use_kubeconfig);
        assert_eq!(config.cluster.kubeconfig.as_deref(), Some("/etc/sonify/kubeconfig"));
    }

    #[test]
    fn test_merge_vars() {
        let config = Config::default().merge_vars(vars(&[
            ("K8S_NAMESPACE", "monitoring"),
            ("POLL_INTERVAL", "12"),
            ("TEST_MODE", "True"),
            ("SHOW_COLOR", "true"),
            ("USE_MIDI", "true"),
            ("SONIFY_SOURCE", "simulated"),
            ("LOG_LEVEL", "DEBUG"),
        ]));

        assert_eq!(config.cluster.namespace, "monitoring");
        assert_eq!(config.monitoring.poll_interval, 12);
        assert!(!config.audio.enabled);
        assert!(config.monitoring.use_color);
        assert_eq!(config.audio.backend, SoundBackend::Midi);
        assert_eq!(config.source, SourceKind::Simulated);
        assert_eq!(config.monitoring.log_level, "debug");
    }

    #[test]
    fn test_merge_vars_ignores_garbage() {
        let config = Config::default().merge_vars(vars(&[
            ("POLL_INTERVAL", "soon"),
            ("SONIFY_SOURCE", "carrier-pigeon"),
            ("TEST_MODE", "false"),
        ]));
        assert_eq!(config.monitoring.poll_interval, 5);
        assert_eq!(config.source, SourceKind::Cluster);
        assert!(config.audio.enabled);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            "monitoring:\n  poll_interval: 2\naudio:\n  backend: midi\nsource: simulated\n",
        )
        .unwrap();
        assert_eq!(config.monitoring.poll_interval, 2);
        assert_eq!(config.audio.backend, SoundBackend::Midi);
        assert_eq!(config.audio.note_duration, 0.5);
        assert_eq!(config.source, SourceKind::Simulated);
        assert_eq!(config.cluster.namespace, "default");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cluster:\n  namespace: kube-system").unwrap();
        writeln!(file, "metrics:\n  enabled: [cpu_usage, pod_status]").unwrap();
        file.flush().unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.cluster.namespace, "kube-system");
        assert_eq!(config.metrics.enabled, vec!["cpu_usage", "pod_status"]);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let config = Config::load(Some(Path::new("/nonexistent/sonify.yaml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_yaml() {
        let result = Config::from_yaml("monitoring: [not, a, map]");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        config.monitoring.poll_interval = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.audio.note_duration = -0.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.simulation.failure_rate = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.metrics.enabled.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_settings() {
        let mut config = Config::default();
        config.monitoring.poll_interval = 3;
        config.audio.note_duration = 0.25;
        let settings = config.poll_settings();
        assert_eq!(settings.interval, Duration::from_secs(3));
        assert_eq!(settings.note_duration, Duration::from_millis(250));
        assert_eq!(settings.namespace, "default");
    }

    #[test]
    fn test_source_kind_parse() {
        assert_eq!("Simulated".parse::<SourceKind>().unwrap(), SourceKind::Simulated);
        assert_eq!("live".parse::<SourceKind>().unwrap(), SourceKind::Cluster);
        assert!("other".parse::<SourceKind>().is_err());
    }
}
