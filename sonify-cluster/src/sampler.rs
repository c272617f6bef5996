// Sonify Cluster - Cluster sampler
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! [`Sampler`] over the live cluster.

use async_trait::async_trait;
use sonify::{MetricDefinition, SampleError, SampleResult, Sampler};
use tracing::debug;

use crate::client::ClusterClient;
use crate::error::ClusterError;
use crate::summary::{average_replicas, node_pressure, pod_phase, resource_usage};

/// Metrics this sampler knows how to derive
pub const SUPPORTED_METRICS: [&str; 7] = [
    "cpu_usage",
    "memory_usage",
    "pod_status",
    "http_latency",
    "errors_per_second",
    "replicas",
    "node_pressure",
];

/// Reads the cluster metrics through a [`ClusterClient`].
///
/// CPU, memory, latency and error rate are estimates derived from pod
/// requests and phases, not measured values.
pub struct ClusterSampler {
    client: ClusterClient,
}

impl ClusterSampler {
    pub fn new(client: ClusterClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ClusterClient {
        &self.client
    }

    async fn read(
        &self,
        metric: &MetricDefinition,
        namespace: &str,
    ) -> Result<SampleResult, ClusterError> {
        let sample = match metric.name() {
            "cpu_usage" => {
                let usage = resource_usage(&self.client.list_pods(namespace).await?);
                SampleResult::new(usage.cpu_percent).with_aux("containers", usage.containers)
            }
            "memory_usage" => {
                let usage = resource_usage(&self.client.list_pods(namespace).await?);
                SampleResult::new(usage.memory_percent).with_aux("containers", usage.containers)
            }
            "pod_status" => {
                let phase = pod_phase(&self.client.list_pods(namespace).await?);
                SampleResult::new(metric.state_index(&phase.phase) as f64)
                    .with_aux("status", &phase.phase)
                    .with_aux("count", phase.pods)
            }
            "http_latency" => {
                let phase = pod_phase(&self.client.list_pods(namespace).await?);
                SampleResult::new(phase.latency_estimate()).with_aux("estimated", true)
            }
            "errors_per_second" => {
                let phase = pod_phase(&self.client.list_pods(namespace).await?);
                SampleResult::new(phase.error_estimate()).with_aux("estimated", true)
            }
            "replicas" => {
                let summary = average_replicas(&self.client.list_deployments(namespace).await?);
                SampleResult::new(summary.average).with_aux("deployments", summary.deployments)
            }
            "node_pressure" => {
                let pressure = node_pressure(&self.client.list_nodes().await?);
                SampleResult::new(metric.state_index(pressure.state()) as f64)
                    .with_aux("pressure", pressure.state())
                    .with_aux("nodes", pressure.nodes)
            }
            // unreachable: checked by the caller
            other => {
                return Err(ClusterError::InvalidConfig(format!(
                    "unsupported metric {}",
                    other
                )))
            }
        };
        Ok(sample)
    }
}

#[async_trait]
impl Sampler for ClusterSampler {
    async fn sample(
        &self,
        metric: &MetricDefinition,
        namespace: &str,
    ) -> Result<SampleResult, SampleError> {
        if !SUPPORTED_METRICS.contains(&metric.name()) {
            return Err(SampleError::UnknownMetric(metric.name().to_string()));
        }
        let sample = self
            .read(metric, namespace)
            .await
            .map_err(|e| SampleError::failed(metric.name(), e))?;
        debug!("Sampled {} = {:.2} in {}", metric.name(), sample.value, namespace);
        Ok(sample)
    }

    fn source_name(&self) -> &str {
        "cluster"
    }
}
