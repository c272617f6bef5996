// Sonify Testdata - Metric value profiles
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Value distributions for simulated metrics.

use std::collections::HashMap;
use std::path::Path;

use rand::prelude::*;
use rand_distr::Exp;
use serde::{Deserialize, Serialize};
use sonify::{ConfigError, Domain, MetricDefinition};

/// How a simulated metric draws its readings.
///
/// Profiles can be overridden per metric from YAML:
///
/// ```yaml
/// cpu_usage:
///   uniform: { min: 60, max: 100 }
/// pod_status:
///   states: { states: [Failed, Pending] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricProfile {
    /// Uniform over `[min, max]`.
    Uniform { min: f64, max: f64 },

    /// Exponential with the given mean.
    Exponential { mean: f64 },

    /// Uniform integer in `[min, max]`.
    IntegerRange { min: i64, max: i64 },

    /// Uniform choice among named states.
    ///
    /// The chosen state is reported as auxiliary data under `aux_key`.
    States {
        states: Vec<String>,
        #[serde(default = "default_aux_key")]
        aux_key: String,
    },
}

fn default_aux_key() -> String {
    "state".to_string()
}

/// One draw from a profile
#[derive(Debug, Clone, PartialEq)]
pub enum Draw {
    Value(f64),
    State { key: String, state: String },
}

impl MetricProfile {
    /// Profile for a categorical metric from its named states
    pub fn states(states: &[&str], aux_key: &str) -> Self {
        MetricProfile::States {
            states: states.iter().map(|s| s.to_string()).collect(),
            aux_key: aux_key.to_string(),
        }
    }

    /// Built-in profile for the well-known cluster metrics.
    pub fn builtin(metric: &str) -> Option<Self> {
        let profile = match metric {
            "cpu_usage" | "memory_usage" => MetricProfile::Uniform {
                min: 0.0,
                max: 100.0,
            },
            "pod_status" => MetricProfile::states(
                &["Running", "Pending", "Succeeded", "Failed", "Unknown"],
                "status",
            ),
            "http_latency" => MetricProfile::Exponential { mean: 200.0 },
            "errors_per_second" => MetricProfile::IntegerRange { min: 0, max: 5 },
            "replicas" => MetricProfile::IntegerRange { min: 1, max: 5 },
            "node_pressure" => MetricProfile::states(&["False", "True"], "pressure"),
            _ => return None,
        };
        Some(profile)
    }

    /// Profile derived from a metric's domain.
    ///
    /// Continuous metrics draw uniformly over their range, categorical
    /// metrics pick one of their states.
    pub fn from_definition(metric: &MetricDefinition) -> Self {
        match metric.domain() {
            Domain::Continuous { min, max } => MetricProfile::Uniform {
                min: *min,
                max: *max,
            },
            Domain::Categorical { states } => MetricProfile::States {
                states: states.keys().cloned().collect(),
                aux_key: default_aux_key(),
            },
        }
    }

    /// Draw one reading.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Draw {
        match self {
            MetricProfile::Uniform { min, max } => Draw::Value(uniform(rng, *min, *max)),
            MetricProfile::Exponential { mean } => match Exp::new(1.0 / mean) {
                Ok(exp) if *mean > 0.0 => Draw::Value(exp.sample(rng)),
                _ => Draw::Value(0.0),
            },
            MetricProfile::IntegerRange { min, max } => {
                if max > min {
                    Draw::Value(rng.gen_range(*min..=*max) as f64)
                } else {
                    Draw::Value(*min as f64)
                }
            }
            MetricProfile::States { states, aux_key } => match states.choose(rng) {
                Some(state) => Draw::State {
                    key: aux_key.clone(),
                    state: state.clone(),
                },
                None => Draw::Value(0.0),
            },
        }
    }
}

/// Profile overrides keyed by metric name
pub type ProfileSet = HashMap<String, MetricProfile>;

/// Read profile overrides from a YAML file.
pub fn load_profiles(path: &Path) -> Result<ProfileSet, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    if !min.is_finite() || !max.is_finite() {
        return 0.0;
    }
    if max <= min {
        return min;
    }
    if (max - min).is_finite() {
        rng.gen_range(min..=max)
    } else {
        // span overflows f64; interpolate instead
        let t: f64 = rng.gen();
        min * (1.0 - t) + max * t
    }
}
