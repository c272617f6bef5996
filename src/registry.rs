//! Metric registry
//!
//! Each metric is described by an immutable [`MetricDefinition`]: its
//! presentation strings, an ordered note palette, a parallel color list and
//! the [`Domain`] its readings live in. The [`Registry`] is built once at
//! startup and exposes no mutation, so iteration order (declaration order)
//! is stable for the lifetime of the process.

use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use crate::color::Color;
use crate::error::RegistryError;
use crate::mapper;

/// One palette entry: a frequency and its note label
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    /// Frequency in Hz
    pub frequency: f64,
    /// Note label (e.g. "C4")
    pub label: String,
}

impl Note {
    pub fn new(frequency: f64, label: &str) -> Self {
        Self {
            frequency,
            label: label.to_string(),
        }
    }
}

/// Valid input space for a metric's readings
#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    /// Numeric range, mapped linearly onto the palette
    Continuous { min: f64, max: f64 },
    /// Finite set of named states, each pinned to a palette index
    Categorical { states: BTreeMap<String, usize> },
}

impl Domain {
    /// Build a categorical domain from `(state, index)` pairs
    pub fn categorical<'a>(states: impl IntoIterator<Item = (&'a str, usize)>) -> Self {
        Domain::Categorical {
            states: states
                .into_iter()
                .map(|(name, index)| (name.to_string(), index))
                .collect(),
        }
    }

    /// Whether this is a categorical domain
    pub fn is_categorical(&self) -> bool {
        matches!(self, Domain::Categorical { .. })
    }
}

/// Immutable definition of one metric
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDefinition {
    name: String,
    display_name: String,
    unit: String,
    palette: Vec<Note>,
    colors: Vec<Color>,
    domain: Domain,
}

impl MetricDefinition {
    /// Start building a definition for `name`
    pub fn builder(name: &str) -> MetricDefinitionBuilder {
        MetricDefinitionBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn palette(&self) -> &[Note] {
        &self.palette
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Palette index for a sampled value.
    ///
    /// Continuous metrics go through [`mapper::map_continuous`]; categorical
    /// metrics carry a pre-resolved index and go through
    /// [`mapper::map_preresolved`].
    pub fn index_for(&self, value: f64) -> usize {
        match &self.domain {
            Domain::Continuous { min, max } => {
                mapper::map_continuous(value, self.palette.len(), *min, *max)
            }
            Domain::Categorical { .. } => mapper::map_preresolved(value, self.palette.len()),
        }
    }

    /// Palette index for a categorical state; `0` for unknown states and
    /// for continuous metrics.
    pub fn state_index(&self, state: &str) -> usize {
        match &self.domain {
            Domain::Categorical { states } => mapper::map_categorical(state, states),
            Domain::Continuous { .. } => mapper::FALLBACK_INDEX,
        }
    }

    /// Palette entry at `index`, clamped to the last note
    pub fn note(&self, index: usize) -> &Note {
        // palette is non-empty by construction
        &self.palette[index.min(self.palette.len() - 1)]
    }
}

/// Validating builder for [`MetricDefinition`]
#[derive(Debug, Clone)]
pub struct MetricDefinitionBuilder {
    name: String,
    display_name: Option<String>,
    unit: String,
    palette: Vec<Note>,
    colors: Vec<String>,
    domain: Option<Domain>,
}

impl MetricDefinitionBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: None,
            unit: String::new(),
            palette: Vec::new(),
            colors: Vec::new(),
            domain: None,
        }
    }

    /// Human-readable name (defaults to the metric name)
    pub fn display_name(mut self, display_name: &str) -> Self {
        self.display_name = Some(display_name.to_string());
        self
    }

    /// Unit shown after the value
    pub fn unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    /// Append one palette entry
    pub fn note(mut self, frequency: f64, label: &str) -> Self {
        self.palette.push(Note::new(frequency, label));
        self
    }

    /// Append several palette entries
    pub fn notes(mut self, notes: &[(f64, &str)]) -> Self {
        self.palette
            .extend(notes.iter().map(|(frequency, label)| Note::new(*frequency, label)));
        self
    }

    /// Set the color list (hex strings, validated on build)
    pub fn colors(mut self, colors: &[&str]) -> Self {
        self.colors = colors.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Continuous `[min, max]` domain
    pub fn continuous(mut self, min: f64, max: f64) -> Self {
        self.domain = Some(Domain::Continuous { min, max });
        self
    }

    /// Categorical domain from `(state, index)` pairs
    pub fn categorical(mut self, states: &[(&str, usize)]) -> Self {
        self.domain = Some(Domain::categorical(states.iter().copied()));
        self
    }

    /// Validate and freeze the definition
    pub fn build(self) -> Result<MetricDefinition, RegistryError> {
        let metric = self.name;

        if self.palette.is_empty() {
            return Err(RegistryError::EmptyPalette { metric });
        }
        if let Some(bad) = self
            .palette
            .iter()
            .find(|note| !note.frequency.is_finite() || note.frequency <= 0.0)
        {
            return Err(RegistryError::InvalidFrequency {
                frequency: bad.frequency,
                metric,
            });
        }

        if self.colors.is_empty() {
            return Err(RegistryError::EmptyColors { metric });
        }
        let mut colors = Vec::with_capacity(self.colors.len());
        for raw in &self.colors {
            match Color::parse(raw) {
                Ok(color) => colors.push(color),
                Err(source) => {
                    return Err(RegistryError::InvalidColor {
                        metric,
                        color: raw.clone(),
                        source,
                    })
                }
            }
        }
        if colors.len() != self.palette.len() {
            warn!(
                "Metric {} has {} colors for {} notes; out-of-range colors clamp to the last entry",
                metric,
                colors.len(),
                self.palette.len()
            );
        }

        let domain = match self.domain {
            Some(domain) => domain,
            None => {
                return Err(RegistryError::InvalidDomain {
                    metric,
                    reason: "no domain configured".to_string(),
                })
            }
        };
        match &domain {
            Domain::Continuous { min, max } => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(RegistryError::InvalidDomain {
                        metric,
                        reason: format!("bounds must be finite, got [{}, {}]", min, max),
                    });
                }
                if max > min && !(max - min).is_finite() {
                    return Err(RegistryError::InvalidDomain {
                        metric,
                        reason: format!("range [{}, {}] overflows", min, max),
                    });
                }
                if max <= min {
                    warn!(
                        "Metric {} has degenerate domain [{}, {}]; every reading maps to index 0",
                        metric, min, max
                    );
                }
            }
            Domain::Categorical { states } => {
                if let Some((state, index)) = states
                    .iter()
                    .find(|(_, index)| **index >= self.palette.len())
                {
                    return Err(RegistryError::StateOutOfRange {
                        state: state.clone(),
                        index: *index,
                        len: self.palette.len(),
                        metric,
                    });
                }
            }
        }

        Ok(MetricDefinition {
            display_name: self.display_name.unwrap_or_else(|| metric.clone()),
            name: metric,
            unit: self.unit,
            palette: self.palette,
            colors,
            domain,
        })
    }
}

/// Ordered, read-only collection of metric definitions
#[derive(Debug, Clone)]
pub struct Registry {
    metrics: Vec<MetricDefinition>,
    by_name: HashMap<String, usize>,
}

impl Registry {
    /// Build a registry; order of `metrics` is the iteration order.
    pub fn new(metrics: Vec<MetricDefinition>) -> Result<Self, RegistryError> {
        if metrics.is_empty() {
            return Err(RegistryError::EmptyRegistry);
        }

        let mut by_name = HashMap::with_capacity(metrics.len());
        for (position, metric) in metrics.iter().enumerate() {
            if by_name.insert(metric.name.clone(), position).is_some() {
                return Err(RegistryError::DuplicateMetric(metric.name.clone()));
            }
        }

        Ok(Self { metrics, by_name })
    }

    /// Look up a definition by name
    pub fn lookup(&self, name: &str) -> Result<&MetricDefinition, RegistryError> {
        self.by_name
            .get(name)
            .map(|&position| &self.metrics[position])
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All definitions in declaration order
    pub fn all(&self) -> &[MetricDefinition] {
        &self.metrics
    }

    /// Metric names in declaration order
    pub fn names(&self) -> Vec<String> {
        self.metrics.iter().map(|m| m.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Restrict to `enabled` names.
    ///
    /// Known names come back in registry order; unknown names are appended
    /// in the order given so the poll loop can report them each cycle.
    /// Duplicates are dropped.
    pub fn select<S: AsRef<str>>(&self, enabled: &[S]) -> Vec<String> {
        let mut selection: Vec<String> = self
            .metrics
            .iter()
            .filter(|m| enabled.iter().any(|e| e.as_ref() == m.name))
            .map(|m| m.name.clone())
            .collect();

        for name in enabled.iter().map(AsRef::as_ref) {
            if !self.contains(name) && !selection.iter().any(|s| s == name) {
                selection.push(name.to_string());
            }
        }
        selection
    }

    /// The seven standard cluster-health metrics
    pub fn cluster_defaults() -> Result<Self, RegistryError> {
        let metrics = vec![
            MetricDefinition::builder("cpu_usage")
                .display_name("CPU Usage")
                .unit("%")
                .notes(&[
                    (262.0, "C4"),
                    (294.0, "D4"),
                    (330.0, "E4"),
                    (349.0, "F4"),
                    (392.0, "G4"),
                    (440.0, "A4"),
                    (494.0, "B4"),
                    (523.0, "C5"),
                ])
                .colors(&[
                    "#88E0EF", "#39C0ED", "#218380", "#126E82", "#145DA0", "#0F4C75", "#3282B8",
                    "#118AB2",
                ])
                .continuous(0.0, 100.0)
                .build()?,
            MetricDefinition::builder("memory_usage")
                .display_name("Memory Usage")
                .unit("%")
                .notes(&[
                    (277.0, "C#4"),
                    (311.0, "D#4"),
                    (349.0, "F4"),
                    (370.0, "F#4"),
                    (415.0, "G#4"),
                    (466.0, "A#4"),
                    (523.0, "C5"),
                    (554.0, "C#5"),
                ])
                .colors(&[
                    "#D4F5FF", "#A7E9FF", "#56CCF2", "#29ADB2", "#247BA0", "#1E3A8A", "#2A9D8F",
                    "#81B29A",
                ])
                .continuous(0.0, 100.0)
                .build()?,
            MetricDefinition::builder("pod_status")
                .display_name("Pod Status")
                .notes(&[(220.0, "A3"), (262.0, "C4"), (330.0, "E4"), (392.0, "G4")])
                .colors(&["#86EF7D", "#22C55E", "#16A34A", "#065F46"])
                .categorical(&[
                    ("Running", 3),
                    ("Succeeded", 3),
                    ("Pending", 1),
                    ("Failed", 0),
                    ("Unknown", 0),
                ])
                .build()?,
            MetricDefinition::builder("http_latency")
                .display_name("HTTP Latency")
                .unit("ms")
                .notes(&[
                    (294.0, "D4"),
                    (330.0, "E4"),
                    (370.0, "F#4"),
                    (415.0, "G#4"),
                    (466.0, "A#4"),
                    (523.0, "C5"),
                    (587.0, "D5"),
                    (659.0, "E5"),
                ])
                .colors(&[
                    "#FFE5D9", "#FFCAD4", "#F4ACB7", "#F46036", "#E5383B", "#B22222", "#8B0000",
                    "#DC143C",
                ])
                .continuous(0.0, 500.0)
                .build()?,
            MetricDefinition::builder("errors_per_second")
                .display_name("Errors/Second")
                .unit("err/s")
                .notes(&[
                    (131.0, "C3"),
                    (147.0, "D3"),
                    (165.0, "E3"),
                    (175.0, "F3"),
                    (196.0, "G3"),
                    (220.0, "A3"),
                    (247.0, "B3"),
                    (262.0, "C4"),
                ])
                .colors(&[
                    "#FFF2CC", "#FFD65E", "#FFA41B", "#F94144", "#F3722C", "#F8961E", "#F9C74F",
                    "#90BE6D",
                ])
                .continuous(0.0, 10.0)
                .build()?,
            MetricDefinition::builder("replicas")
                .display_name("Replica Count")
                .unit("Count")
                .notes(&[
                    (262.0, "C4"),
                    (277.0, "C#4"),
                    (294.0, "D4"),
                    (311.0, "D#4"),
                    (330.0, "E4"),
                    (349.0, "F4"),
                    (370.0, "F#4"),
                    (392.0, "G4"),
                ])
                .colors(&[
                    "#E0F7FA", "#B2EBF2", "#80DEEA", "#4DD0E1", "#26C6DA", "#00BCD4", "#00ACC1",
                    "#0097A7",
                ])
                .continuous(0.0, 5.0)
                .build()?,
            MetricDefinition::builder("node_pressure")
                .display_name("Node Pressure")
                .notes(&[(262.0, "C4"), (294.0, "D4"), (330.0, "E4"), (349.0, "F4")])
                .colors(&["#FFFFFF", "#F0F4C3", "#D4E157", "#A4A71D"])
                .categorical(&[("False", 0), ("True", 3)])
                .build()?,
        ];

        Registry::new(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple(name: &str) -> MetricDefinition {
        MetricDefinition::builder(name)
            .notes(&[(220.0, "A3"), (440.0, "A4")])
            .colors(&["#000000", "#FFFFFF"])
            .continuous(0.0, 1.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_cluster_defaults_complete() {
        let registry = Registry::cluster_defaults().unwrap();
        assert_eq!(
            registry.names(),
            vec![
                "cpu_usage",
                "memory_usage",
                "pod_status",
                "http_latency",
                "errors_per_second",
                "replicas",
                "node_pressure",
            ]
        );
        for metric in registry.all() {
            assert_eq!(metric.palette().len(), metric.colors().len(), "{}", metric.name());
        }
    }

    #[test]
    fn test_cpu_palette() {
        let registry = Registry::cluster_defaults().unwrap();
        let cpu = registry.lookup("cpu_usage").unwrap();
        assert_eq!(cpu.palette().len(), 8);
        assert_eq!(cpu.palette()[0].frequency, 262.0);
        assert_eq!(cpu.palette()[7].frequency, 523.0);
        assert_eq!(cpu.display_name(), "CPU Usage");
        assert_eq!(cpu.unit(), "%");
    }

    #[test]
    fn test_lookup_miss() {
        let registry = Registry::cluster_defaults().unwrap();
        assert_eq!(
            registry.lookup("disk_usage"),
            Err(RegistryError::NotFound("disk_usage".to_string()))
        );
    }

    #[test]
    fn test_iteration_order_is_stable() {
        let registry = Registry::cluster_defaults().unwrap();
        let first = registry.names();
        for _ in 0..10 {
            assert_eq!(registry.names(), first);
        }
    }

    #[test]
    fn test_duplicate_rejected() {
        let result = Registry::new(vec![simple("a"), simple("a")]);
        assert_eq!(result.unwrap_err(), RegistryError::DuplicateMetric("a".to_string()));
    }

    #[test]
    fn test_empty_registry_rejected() {
        assert_eq!(Registry::new(vec![]).unwrap_err(), RegistryError::EmptyRegistry);
    }

    #[test]
    fn test_builder_rejects_empty_palette() {
        let result = MetricDefinition::builder("x")
            .colors(&["#000000"])
            .continuous(0.0, 1.0)
            .build();
        assert!(matches!(result, Err(RegistryError::EmptyPalette { .. })));
    }

    #[test]
    fn test_builder_rejects_empty_colors() {
        let result = MetricDefinition::builder("x")
            .note(440.0, "A4")
            .continuous(0.0, 1.0)
            .build();
        assert!(matches!(result, Err(RegistryError::EmptyColors { .. })));
    }

    #[test]
    fn test_builder_normalizes_colors() {
        let metric = MetricDefinition::builder("x")
            .note(440.0, "A4")
            .colors(&["86ef7d"])
            .continuous(0.0, 1.0)
            .build()
            .unwrap();
        assert_eq!(metric.colors()[0].to_string(), "#86EF7D");
    }

    #[test]
    fn test_builder_rejects_bad_color() {
        let result = MetricDefinition::builder("x")
            .note(440.0, "A4")
            .colors(&["#12345"])
            .continuous(0.0, 1.0)
            .build();
        assert!(matches!(result, Err(RegistryError::InvalidColor { .. })));
    }

    #[test]
    fn test_builder_rejects_bad_frequency() {
        let result = MetricDefinition::builder("x")
            .note(0.0, "silence")
            .colors(&["#000000"])
            .continuous(0.0, 1.0)
            .build();
        assert!(matches!(result, Err(RegistryError::InvalidFrequency { .. })));
    }

    #[test]
    fn test_builder_rejects_state_out_of_range() {
        let result = MetricDefinition::builder("x")
            .notes(&[(220.0, "A3"), (440.0, "A4")])
            .colors(&["#000000", "#FFFFFF"])
            .categorical(&[("Up", 1), ("Down", 2)])
            .build();
        assert!(matches!(
            result,
            Err(RegistryError::StateOutOfRange { index: 2, len: 2, .. })
        ));
    }

    #[test]
    fn test_builder_requires_domain() {
        let result = MetricDefinition::builder("x")
            .note(440.0, "A4")
            .colors(&["#000000"])
            .build();
        assert!(matches!(result, Err(RegistryError::InvalidDomain { .. })));
    }

    #[test]
    fn test_builder_accepts_degenerate_domain() {
        let metric = MetricDefinition::builder("x")
            .notes(&[(220.0, "A3"), (440.0, "A4")])
            .colors(&["#000000", "#FFFFFF"])
            .continuous(10.0, 10.0)
            .build()
            .unwrap();
        assert_eq!(metric.index_for(50.0), 0);
    }

    #[test]
    fn test_builder_rejects_overflowing_range() {
        let result = MetricDefinition::builder("x")
            .notes(&[(220.0, "A3"), (440.0, "A4")])
            .colors(&["#000000", "#FFFFFF"])
            .continuous(-1e308, 1e308)
            .build();
        assert!(matches!(result, Err(RegistryError::InvalidDomain { .. })));
    }

    #[test]
    fn test_display_name_defaults_to_name() {
        assert_eq!(simple("latency").display_name(), "latency");
    }

    #[test]
    fn test_select_orders_by_registry() {
        let registry = Registry::cluster_defaults().unwrap();
        let selection = registry.select(&["replicas", "disk_usage", "cpu_usage", "replicas"]);
        assert_eq!(selection, vec!["cpu_usage", "replicas", "disk_usage"]);
    }

    #[test]
    fn test_state_index() {
        let registry = Registry::cluster_defaults().unwrap();
        let pods = registry.lookup("pod_status").unwrap();
        assert_eq!(pods.state_index("Running"), 3);
        assert_eq!(pods.state_index("Pending"), 1);
        assert_eq!(pods.state_index("Crashed"), 0);

        let cpu = registry.lookup("cpu_usage").unwrap();
        assert_eq!(cpu.state_index("Running"), 0);
    }
}
