// Sonify Cluster - API client
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Read-only Kubernetes client.

use std::path::PathBuf;
use std::time::Duration;

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Node, Pod};
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client};
use sonify::{ClusterSettings, SampleError};
use tracing::{debug, info};

use crate::error::{ClusterError, ClusterResult};

/// Where connection parameters come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicit API server URL
    Url(String),
    /// Kubeconfig file at a fixed path
    Kubeconfig(PathBuf),
    /// `$KUBECONFIG` or `~/.kube/config`, then the in-cluster service account
    Infer,
    /// In-cluster service account only
    InCluster,
}

/// Connection parameters for the API server
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    pub source: ConfigSource,
    /// Bearer token file, re-read when it changes
    pub token_file: Option<String>,
    pub insecure_skip_tls_verify: bool,
    pub timeout: Duration,
}

impl ClusterConfig {
    fn with_source(source: ConfigSource) -> Self {
        Self {
            source,
            token_file: None,
            insecure_skip_tls_verify: false,
            timeout: Duration::from_secs(10),
        }
    }

    /// Explicit API server URL, e.g. `https://10.96.0.1:443`.
    pub fn new(api_url: &str) -> Self {
        Self::with_source(ConfigSource::Url(
            api_url.trim_end_matches('/').to_string(),
        ))
    }

    /// Kubeconfig discovery with in-cluster fallback.
    pub fn infer() -> Self {
        Self::with_source(ConfigSource::Infer)
    }

    /// Kubeconfig at `path`, using its current context.
    pub fn kubeconfig(path: impl Into<PathBuf>) -> Self {
        Self::with_source(ConfigSource::Kubeconfig(path.into()))
    }

    /// Service-account mount only.
    pub fn in_cluster() -> Self {
        Self::with_source(ConfigSource::InCluster)
    }

    /// Set bearer token file.
    pub fn with_token_file(mut self, path: &str) -> Self {
        self.token_file = Some(path.to_string());
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configuration from the `cluster` config section.
    ///
    /// An explicit `api_url` wins, then the kubeconfig (when enabled), then
    /// in-cluster discovery.
    pub fn from_settings(settings: &ClusterSettings) -> Self {
        let mut config = match (&settings.api_url, settings.use_kubeconfig) {
            (Some(url), _) => Self::new(url),
            (None, true) => match &settings.kubeconfig {
                Some(path) => Self::kubeconfig(path),
                None => Self::infer(),
            },
            (None, false) => Self::in_cluster(),
        };
        config.token_file = settings.token_path.clone();
        config.insecure_skip_tls_verify = settings.insecure_skip_tls_verify;
        config.timeout = Duration::from_secs(settings.request_timeout_secs.max(1));
        config
    }

    /// Resolve into a client configuration.
    pub async fn load(&self) -> ClusterResult<kube::Config> {
        let mut config = match &self.source {
            ConfigSource::Url(url) => {
                let uri = url.parse::<http::Uri>().map_err(|e| {
                    ClusterError::InvalidConfig(format!("API URL {:?}: {}", url, e))
                })?;
                kube::Config::new(uri)
            }
            ConfigSource::Kubeconfig(path) => {
                info!("Loading kubeconfig from {}", path.display());
                let kubeconfig = Kubeconfig::read_from(path)
                    .map_err(|e| ClusterError::Kubeconfig(e.to_string()))?;
                kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .map_err(|e| ClusterError::Kubeconfig(e.to_string()))?
            }
            ConfigSource::Infer => {
                info!("Loading kubeconfig (in-cluster fallback)");
                kube::Config::infer()
                    .await
                    .map_err(|e| ClusterError::Kubeconfig(e.to_string()))?
            }
            ConfigSource::InCluster => {
                info!("Loading in-cluster configuration");
                kube::Config::incluster().map_err(|e| ClusterError::NotInCluster(e.to_string()))?
            }
        };

        if let Some(path) = &self.token_file {
            config.auth_info.token_file = Some(path.clone());
        }
        if self.insecure_skip_tls_verify {
            config.accept_invalid_certs = true;
        }
        config.connect_timeout = Some(self.timeout);
        config.read_timeout = Some(self.timeout);
        Ok(config)
    }
}

/// Client for the resources the sampler reads
#[derive(Clone)]
pub struct ClusterClient {
    client: Client,
    cluster_url: String,
}

impl ClusterClient {
    /// Build a client without contacting the server.
    pub async fn new(config: &ClusterConfig) -> ClusterResult<Self> {
        let config = config.load().await?;
        let cluster_url = config.cluster_url.to_string();
        let client = Client::try_from(config)?;
        Ok(Self {
            client,
            cluster_url,
        })
    }

    /// Build a client and test the connection by listing pods in
    /// `namespace`.
    pub async fn connect(config: &ClusterConfig, namespace: &str) -> Result<Self, SampleError> {
        let client = Self::new(config)
            .await
            .map_err(|e| SampleError::SourceUnavailable(e.to_string()))?;
        client
            .list_pods(namespace)
            .await
            .map_err(|e| SampleError::SourceUnavailable(e.to_string()))?;
        info!("Successfully connected to cluster at {}", client.cluster_url);
        Ok(client)
    }

    pub fn cluster_url(&self) -> &str {
        &self.cluster_url
    }

    pub async fn list_pods(&self, namespace: &str) -> ClusterResult<Vec<Pod>> {
        debug!("Listing pods in {}", namespace);
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        Ok(pods.list(&ListParams::default()).await?.items)
    }

    pub async fn list_deployments(&self, namespace: &str) -> ClusterResult<Vec<Deployment>> {
        debug!("Listing deployments in {}", namespace);
        let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        Ok(deployments.list(&ListParams::default()).await?.items)
    }

    pub async fn list_nodes(&self) -> ClusterResult<Vec<Node>> {
        debug!("Listing nodes");
        let nodes: Api<Node> = Api::all(self.client.clone());
        Ok(nodes.list(&ListParams::default()).await?.items)
    }
}
