// Sonify Cluster - API client tests
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Client and sampler tests against an in-process mock API server.

use std::path::Path;

use axum::{http::HeaderMap, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use sonify::{ClusterSettings, Registry, SampleError, Sampler};
use sonify_cluster::{ClusterClient, ClusterConfig, ClusterError, ClusterSampler};
use tempfile::TempDir;
use tokio::net::TcpListener;

// ============================================================================
// Mock API server
// ============================================================================

const TOKEN: &str = "test-token";

type ApiResponse = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn check_token(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false);
    if authorized {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "kind": "Status",
                "apiVersion": "v1",
                "metadata": {},
                "status": "Failure",
                "message": "Unauthorized",
                "reason": "Unauthorized",
                "code": 401
            })),
        ))
    }
}

async fn pods(headers: HeaderMap) -> ApiResponse {
    check_token(&headers)?;
    Ok(Json(json!({
        "kind": "PodList",
        "apiVersion": "v1",
        "metadata": {"resourceVersion": "1"},
        "items": [
            {
                "apiVersion": "v1",
                "kind": "Pod",
                "metadata": {"name": "web-0"},
                "spec": {"containers": [
                    {"name": "web", "resources": {"requests": {"cpu": "1", "memory": "512Mi"}}},
                    {"name": "sidecar", "resources": {"requests": {"cpu": "200m", "memory": "128Mi"}}}
                ]},
                "status": {"phase": "Pending"}
            },
            {
                "apiVersion": "v1",
                "kind": "Pod",
                "metadata": {"name": "web-1"},
                "spec": {"containers": [{"name": "web"}]},
                "status": {"phase": "Running"}
            }
        ]
    })))
}

async fn deployments(headers: HeaderMap) -> ApiResponse {
    check_token(&headers)?;
    let deployment = |name: &str, replicas: i32| {
        json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {"name": name},
            "spec": {"replicas": replicas, "selector": {}, "template": {}}
        })
    };
    Ok(Json(json!({
        "kind": "DeploymentList",
        "apiVersion": "apps/v1",
        "metadata": {"resourceVersion": "1"},
        "items": [deployment("web", 2), deployment("worker", 4)]
    })))
}

async fn nodes(headers: HeaderMap) -> ApiResponse {
    check_token(&headers)?;
    Ok(Json(json!({
        "kind": "NodeList",
        "apiVersion": "v1",
        "metadata": {"resourceVersion": "1"},
        "items": [
            {
                "apiVersion": "v1",
                "kind": "Node",
                "metadata": {"name": "node-a"},
                "status": {"conditions": [
                    {"type": "Ready", "status": "True"},
                    {"type": "MemoryPressure", "status": "True"}
                ]}
            }
        ]
    })))
}

async fn start_server() -> String {
    let app = Router::new()
        .route("/api/v1/namespaces/:ns/pods", get(pods))
        .route("/apis/apps/v1/namespaces/:ns/deployments", get(deployments))
        .route("/api/v1/nodes", get(nodes));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn write_token(dir: &TempDir, token: &str) -> String {
    let path = dir.path().join("token");
    std::fs::write(&path, token).unwrap();
    path.display().to_string()
}

fn write_kubeconfig(dir: &Path, server: &str, token: &str) -> std::path::PathBuf {
    let path = dir.join("kubeconfig");
    let contents = format!(
        "apiVersion: v1\n\
         kind: Config\n\
         clusters:\n\
         - name: mock\n  cluster:\n    server: {server}\n\
         contexts:\n\
         - name: mock\n  context:\n    cluster: mock\n    user: tester\n    namespace: default\n\
         current-context: mock\n\
         users:\n\
         - name: tester\n  user:\n    token: {token}\n"
    );
    std::fs::write(&path, contents).unwrap();
    path
}

async fn sampler() -> ClusterSampler {
    let url = start_server().await;
    let dir = tempfile::tempdir().unwrap();
    let config = ClusterConfig::kubeconfig(write_kubeconfig(dir.path(), &url, TOKEN));
    ClusterSampler::new(ClusterClient::connect(&config, "default").await.unwrap())
}

// ============================================================================
// Client tests
// ============================================================================

#[tokio::test]
async fn test_connect_through_kubeconfig() {
    let url = start_server().await;
    let dir = tempfile::tempdir().unwrap();
    let config = ClusterConfig::kubeconfig(write_kubeconfig(dir.path(), &url, TOKEN));
    let client = ClusterClient::connect(&config, "default").await.unwrap();

    assert_eq!(client.list_pods("default").await.unwrap().len(), 2);
    assert_eq!(client.list_deployments("default").await.unwrap().len(), 2);
    assert_eq!(client.list_nodes().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_connect_through_settings_kubeconfig() {
    let url = start_server().await;
    let dir = tempfile::tempdir().unwrap();
    let settings = ClusterSettings {
        kubeconfig: Some(
            write_kubeconfig(dir.path(), &url, TOKEN)
                .display()
                .to_string(),
        ),
        ..Default::default()
    };
    let config = ClusterConfig::from_settings(&settings);
    assert!(ClusterClient::connect(&config, "default").await.is_ok());
}

#[tokio::test]
async fn test_connect_with_url_and_token_file() {
    let url = start_server().await;
    let dir = tempfile::tempdir().unwrap();
    let config = ClusterConfig::new(&url).with_token_file(&write_token(&dir, TOKEN));
    let client = ClusterClient::connect(&config, "default").await.unwrap();
    assert!(client.cluster_url().starts_with("http://127.0.0.1"));
}

#[tokio::test]
async fn test_connect_unauthorized() {
    let url = start_server().await;
    let dir = tempfile::tempdir().unwrap();
    let config = ClusterConfig::kubeconfig(write_kubeconfig(dir.path(), &url, "wrong"));
    let result = ClusterClient::connect(&config, "default").await;
    assert!(matches!(result, Err(SampleError::SourceUnavailable(_))));
}

#[tokio::test]
async fn test_api_error_status() {
    let url = start_server().await;
    let client = ClusterClient::new(&ClusterConfig::new(&url)).await.unwrap();
    match client.list_nodes().await {
        Err(ClusterError::Api { status, .. }) => assert_eq!(status, 401),
        other => panic!("expected API error, got {:?}", other.map(|nodes| nodes.len())),
    }
}

#[tokio::test]
async fn test_connect_unreachable() {
    // bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClusterConfig::new(&format!("http://{}", addr));
    let result = ClusterClient::connect(&config, "default").await;
    assert!(matches!(result, Err(SampleError::SourceUnavailable(_))));
}

// ============================================================================
// Sampler tests
// ============================================================================

#[tokio::test]
async fn test_sampler_reads_all_metrics() {
    let sampler = sampler().await;
    let registry = Registry::cluster_defaults().unwrap();

    let read = |name: &'static str| {
        let metric = registry.lookup(name).unwrap().clone();
        let sampler = &sampler;
        async move { sampler.sample(&metric, "default").await.unwrap() }
    };

    // avg 0.6 cores * 20
    let cpu = read("cpu_usage").await;
    assert!((cpu.value - 12.0).abs() < 1e-9);
    assert_eq!(cpu.auxiliary.get("containers").map(String::as_str), Some("2"));

    // avg 320 MiB / 10
    let memory = read("memory_usage").await;
    assert!((memory.value - 32.0).abs() < 1e-9);

    let pods = read("pod_status").await;
    assert_eq!(pods.value, 1.0);
    assert_eq!(pods.auxiliary.get("status").map(String::as_str), Some("Pending"));
    assert_eq!(pods.auxiliary.get("count").map(String::as_str), Some("2"));

    assert_eq!(read("http_latency").await.value, 250.0);
    assert_eq!(read("errors_per_second").await.value, 5.0);
    assert_eq!(read("replicas").await.value, 3.0);

    let pressure = read("node_pressure").await;
    assert_eq!(pressure.value, 3.0);
    assert_eq!(
        pressure.auxiliary.get("pressure").map(String::as_str),
        Some("True")
    );
}

#[tokio::test]
async fn test_sampler_unknown_metric() {
    let sampler = sampler().await;
    let disk = sonify::MetricDefinition::builder("disk_usage")
        .note(262.0, "C4")
        .colors(&["#000000"])
        .continuous(0.0, 100.0)
        .build()
        .unwrap();
    assert!(matches!(
        sampler.sample(&disk, "default").await,
        Err(SampleError::UnknownMetric(_))
    ));
    assert_eq!(sampler.source_name(), "cluster");
}
