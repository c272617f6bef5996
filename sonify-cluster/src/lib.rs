// Sonify Cluster - Kubernetes metric source
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Sonify Cluster
//!
//! Live metric source reading a Kubernetes API server.
//!
//! The client connects through the user's kubeconfig, an explicit API URL
//! or the in-cluster service account, lists pods, deployments and nodes,
//! and the [`summary`] functions reduce those lists to metric readings:
//!
//! | Metric              | Source                                         |
//! |---------------------|------------------------------------------------|
//! | `cpu_usage`         | average container CPU request                  |
//! | `memory_usage`      | average container memory request               |
//! | `pod_status`        | phase of the first pod                         |
//! | `http_latency`      | estimate from the pod phase                    |
//! | `errors_per_second` | estimate from the pod phase                    |
//! | `replicas`          | average desired replicas per deployment        |
//! | `node_pressure`     | any node with a pressure condition             |
//!
//! ## Example
//!
//! ```rust,no_run
//! use sonify_cluster::{ClusterClient, ClusterConfig, ClusterSampler};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClusterConfig::infer();
//! let client = ClusterClient::connect(&config, "default").await?;
//! let sampler = ClusterSampler::new(client);
//! # let _ = sampler;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod quantity;
pub mod sampler;
pub mod summary;

pub use client::{ClusterClient, ClusterConfig, ConfigSource};
pub use error::{ClusterError, ClusterResult};
pub use quantity::{parse_cpu, parse_memory};
pub use sampler::{ClusterSampler, SUPPORTED_METRICS};
pub use summary::{NodePressure, PodPhase, ReplicaSummary, ResourceUsage};
