// Sonify Cluster - Resource summaries
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Reduction of API list responses to metric readings.
//!
//! All functions here are pure so they can be tested against fixtures.

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Node, Pod};

use crate::quantity::{parse_cpu, parse_memory};

/// Phase reported when there are no pods or the phase is missing
pub const UNKNOWN_PHASE: &str = "Unknown";

/// Node conditions that count as pressure when `"True"`
pub const PRESSURE_CONDITIONS: [&str; 4] = [
    "MemoryPressure",
    "DiskPressure",
    "PIDPressure",
    "NetworkUnavailable",
];

/// CPU usage reported when no container has resource requests
pub const DEFAULT_CPU_PERCENT: f64 = 30.0;
/// Memory usage reported when no container has resource requests
pub const DEFAULT_MEMORY_PERCENT: f64 = 40.0;

/// Representative pod phase
#[derive(Debug, Clone, PartialEq)]
pub struct PodPhase {
    /// Phase of the first pod
    pub phase: String,
    pub pods: usize,
}

impl PodPhase {
    /// Health rank of the phase: 3 running or done, 1 pending, 0 otherwise
    pub fn rank(&self) -> f64 {
        match self.phase.as_str() {
            "Running" | "Succeeded" => 3.0,
            "Pending" => 1.0,
            _ => 0.0,
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self.phase.as_str(), "Running" | "Succeeded")
    }

    /// Latency estimate in ms; grows as pod health drops
    pub fn latency_estimate(&self) -> f64 {
        50.0 + (3.0 - self.rank()) * 100.0
    }

    /// Error-rate estimate: none while healthy, 5/s otherwise
    pub fn error_estimate(&self) -> f64 {
        if self.is_healthy() {
            0.0
        } else {
            5.0
        }
    }
}

/// The first pod's phase stands in for the namespace.
pub fn pod_phase(pods: &[Pod]) -> PodPhase {
    let phase = pods
        .first()
        .and_then(|pod| pod.status.as_ref())
        .and_then(|status| status.phase.clone())
        .unwrap_or_else(|| UNKNOWN_PHASE.to_string());
    PodPhase {
        phase,
        pods: pods.len(),
    }
}

/// Usage estimated from container resource requests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceUsage {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    /// Containers that declare requests
    pub containers: usize,
}

/// Estimate CPU and memory usage from requests.
///
/// CPU is average requested cores times 20, memory is average requested
/// MiB over 10, both capped at 100. No pods reads as idle; pods without
/// any requests read as the fixed defaults.
pub fn resource_usage(pods: &[Pod]) -> ResourceUsage {
    if pods.is_empty() {
        return ResourceUsage {
            cpu_percent: 0.0,
            memory_percent: 0.0,
            containers: 0,
        };
    }

    let mut cpu = 0.0;
    let mut memory = 0.0;
    let mut containers = 0usize;
    let requests = pods
        .iter()
        .filter_map(|pod| pod.spec.as_ref())
        .flat_map(|spec| spec.containers.iter())
        .filter_map(|c| c.resources.as_ref().and_then(|r| r.requests.as_ref()));
    for request in requests {
        if let Some(q) = request.get("cpu") {
            cpu += parse_cpu(&q.0);
        }
        if let Some(q) = request.get("memory") {
            memory += parse_memory(&q.0);
        }
        containers += 1;
    }

    if containers == 0 {
        return ResourceUsage {
            cpu_percent: DEFAULT_CPU_PERCENT,
            memory_percent: DEFAULT_MEMORY_PERCENT,
            containers,
        };
    }

    let n = containers as f64;
    ResourceUsage {
        cpu_percent: (cpu / n * 20.0).min(100.0),
        memory_percent: (memory / n / 10.0).min(100.0),
        containers,
    }
}

/// Average desired replicas across deployments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplicaSummary {
    pub average: f64,
    pub deployments: usize,
}

/// Average of `spec.replicas`; 1 when there are no deployments.
///
/// Deployments without a replica count add nothing to the sum but still
/// count in the average.
pub fn average_replicas(deployments: &[Deployment]) -> ReplicaSummary {
    let count = deployments.len();
    if count == 0 {
        return ReplicaSummary {
            average: 1.0,
            deployments: 0,
        };
    }
    let total: i64 = deployments
        .iter()
        .filter_map(|d| d.spec.as_ref().and_then(|s| s.replicas))
        .map(i64::from)
        .sum();
    ReplicaSummary {
        average: total as f64 / count as f64,
        deployments: count,
    }
}

/// Pressure across all nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodePressure {
    pub under_pressure: bool,
    pub nodes: usize,
}

impl NodePressure {
    /// `"True"` or `"False"`, as in node conditions
    pub fn state(&self) -> &'static str {
        if self.under_pressure {
            "True"
        } else {
            "False"
        }
    }
}

/// Whether any node reports a pressure condition
pub fn node_pressure(nodes: &[Node]) -> NodePressure {
    let under_pressure = nodes
        .iter()
        .filter_map(|node| node.status.as_ref())
        .filter_map(|status| status.conditions.as_ref())
        .flatten()
        .any(|c| PRESSURE_CONDITIONS.contains(&c.type_.as_str()) && c.status == "True");
    NodePressure {
        under_pressure,
        nodes: nodes.len(),
    }
}
