// Sonify Cluster - Error types
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

use thiserror::Error;

/// Errors from the cluster API client
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Transport, TLS or decoding error from the client
    #[error("Kubernetes client error: {0}")]
    Kube(kube::Error),

    /// Non-success API response
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Kubeconfig missing or unusable
    #[error("Kubeconfig error: {0}")]
    Kubeconfig(String),

    /// In-cluster configuration requested outside a cluster
    #[error("Not running in a cluster: {0}")]
    NotInCluster(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<kube::Error> for ClusterError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) => ClusterError::Api {
                status: response.code,
                message: response.message,
            },
            other => ClusterError::Kube(other),
        }
    }
}

/// Result type for cluster operations
pub type ClusterResult<T> = Result<T, ClusterError>;
