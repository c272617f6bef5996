//! Sampling interface
//!
//! A [`Sampler`] produces one reading per metric per cycle. Implementations
//! live outside the core (a live cluster client, a simulator); the poll loop
//! only sees the trait.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::SampleError;
use crate::registry::MetricDefinition;

/// One reading for one metric
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleResult {
    /// Raw value; a pre-resolved palette index for categorical metrics
    pub value: f64,
    /// Side-channel data rendered as `key=value` pairs
    pub auxiliary: BTreeMap<String, String>,
}

impl SampleResult {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            auxiliary: BTreeMap::new(),
        }
    }

    /// Attach one auxiliary entry
    pub fn with_aux(mut self, key: &str, value: impl ToString) -> Self {
        self.auxiliary.insert(key.to_string(), value.to_string());
        self
    }
}

/// Source of metric readings
#[async_trait]
pub trait Sampler: Send + Sync {
    /// Sample `metric` in `namespace`.
    ///
    /// Failures are recoverable: the poll loop skips the metric for the
    /// current cycle and tries again on the next one.
    async fn sample(
        &self,
        metric: &MetricDefinition,
        namespace: &str,
    ) -> Result<SampleResult, SampleError>;

    /// Short name of the source for logs (e.g. "cluster", "simulated")
    fn source_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_result_aux() {
        let sample = SampleResult::new(3.0)
            .with_aux("status", "Running")
            .with_aux("count", 4);
        assert_eq!(sample.value, 3.0);
        assert_eq!(sample.auxiliary.get("status").map(String::as_str), Some("Running"));
        assert_eq!(sample.auxiliary.get("count").map(String::as_str), Some("4"));
    }
}
