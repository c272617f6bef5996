// Sonify Testdata - Simulated sampler
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Simulated metric source.
//!
//! Produces plausible readings without a cluster, for demos and test mode.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use rand::prelude::*;
use rand::rngs::StdRng;
use sonify::{Domain, MetricDefinition, SampleError, SampleResult, Sampler};
use tracing::debug;

use crate::profile::{Draw, MetricProfile, ProfileSet};

/// [`Sampler`] drawing random readings from per-metric profiles.
///
/// Metrics without an explicit or built-in profile fall back to a profile
/// derived from their domain, so any registered metric can be simulated.
pub struct SimulatedSampler {
    rng: Mutex<StdRng>,
    profiles: HashMap<String, MetricProfile>,
    failure_rate: f64,
}

impl Default for SimulatedSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSampler {
    /// Create a sampler seeded from entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            profiles: HashMap::new(),
            failure_rate: 0.0,
        }
    }

    /// Set random seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Override the profile for one metric.
    pub fn with_profile(mut self, metric: &str, profile: MetricProfile) -> Self {
        self.profiles.insert(metric.to_string(), profile);
        self
    }

    /// Override the profiles of several metrics.
    pub fn with_profiles(mut self, profiles: ProfileSet) -> Self {
        self.profiles.extend(profiles);
        self
    }

    /// Fail this fraction of samples, clamped to `[0, 1]`.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = if rate.is_finite() {
            rate.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    /// Profile used for `metric`
    pub fn profile_for(&self, metric: &MetricDefinition) -> MetricProfile {
        self.profiles
            .get(metric.name())
            .cloned()
            .or_else(|| MetricProfile::builtin(metric.name()))
            .unwrap_or_else(|| MetricProfile::from_definition(metric))
    }

    fn draw(&self, metric: &MetricDefinition) -> Result<SampleResult, SampleError> {
        let profile = self.profile_for(metric);
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| SampleError::SourceUnavailable("simulator state poisoned".to_string()))?;

        if self.failure_rate > 0.0 && rng.gen_bool(self.failure_rate) {
            return Err(SampleError::failed(metric.name(), "simulated failure"));
        }

        let sample = match profile.draw(&mut *rng) {
            Draw::Value(value) => SampleResult::new(value),
            Draw::State { key, state } => {
                SampleResult::new(metric.state_index(&state) as f64).with_aux(&key, state)
            }
        };
        Ok(sample)
    }
}

#[async_trait]
impl Sampler for SimulatedSampler {
    async fn sample(
        &self,
        metric: &MetricDefinition,
        _namespace: &str,
    ) -> Result<SampleResult, SampleError> {
        let sample = self.draw(metric)?;
        debug!("Simulated {} = {:.2}", metric.name(), sample.value);
        Ok(sample)
    }

    fn source_name(&self) -> &str {
        "simulated"
    }
}

/// Whether `sample` lies inside `metric`'s domain.
///
/// Categorical readings must be a valid palette index.
pub fn in_domain(metric: &MetricDefinition, sample: &SampleResult) -> bool {
    match metric.domain() {
        Domain::Continuous { min, max } => sample.value >= *min && sample.value <= *max,
        Domain::Categorical { .. } => {
            sample.value >= 0.0
                && sample.value.fract() == 0.0
                && (sample.value as usize) < metric.palette().len()
        }
    }
}
