//! Full startup and shutdown with the dry-run platform.

use chirp_bot::{AgentConfig, AgentServer};
use chirp_error::{ChirpErrorKind, EndpointErrorKind};
use chirp_memory::{JsonFileMemoryStore, MemoryStore};
use chirp_social::NoOpPlatform;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::oneshot;

fn write_library(dir: &TempDir) -> std::path::PathBuf {
    fs::write(dir.path().join("cat.png"), b"png").unwrap();
    let path = dir.path().join("library.json");
    fs::write(
        &path,
        r#"{
            "images": { "cat": { "file": "cat.png", "alt": "A cat" } },
            "posts": [
                { "text": "one", "image": "cat" },
                { "text": "two", "image": "cat" },
                { "text": "three", "image": "cat" }
            ],
            "replies": []
        }"#,
    )
    .unwrap();
    path
}

fn config(dir: &TempDir) -> AgentConfig {
    AgentConfig::from_toml_str(
        r#"
        handle = "catbot"
        access_token = "secret"
        port = 0
        post_frequency = 60
        memory_duration = 2
        memory_posts_id = "posts"
        "#,
    )
    .unwrap()
    .with_library_path(write_library(dir))
    .with_memory_dir(dir.path().join("memory"))
}

async fn wait_until(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}

#[tokio::test]
async fn test_posts_on_startup_and_serves_health() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileMemoryStore::new(dir.path().join("memory"));
    store.put_memory("posts", &[9, 0, 1]).await.unwrap();

    let platform = Arc::new(NoOpPlatform::new());
    let (bound_tx, bound_rx) = oneshot::channel();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let server = AgentServer::new(config(&dir), platform.clone(), platform).notify_bound(bound_tx);
    let metrics = server.metrics();
    let running = tokio::spawn(server.run(async {
        let _ = stop_rx.await;
    }));

    let addr = bound_rx.await.unwrap();
    let body: serde_json::Value = reqwest::get(format!("http://127.0.0.1:{}/health", addr.port()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");

    // Fixed-interval mode posts immediately.
    wait_until(|| metrics.posts_published() == 1).await;

    // Restored [0, 1] (newest two of three), so the post must be index 2,
    // and the store now holds [1, 2].
    let store = JsonFileMemoryStore::new(dir.path().join("memory"));
    let mut saved = None;
    for _ in 0..200 {
        saved = store.get_memory("posts").await.unwrap();
        if saved.as_deref() == Some(&[1, 2][..]) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(saved, Some(vec![1, 2]));

    let metrics_body: serde_json::Value =
        reqwest::get(format!("http://127.0.0.1:{}/metrics", addr.port()))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    assert_eq!(metrics_body["posts_published"], 1);

    stop_tx.send(()).unwrap();
    running.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_missing_library_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir).with_library_path(dir.path().join("nope.json"));
    let platform = Arc::new(NoOpPlatform::new());

    let err = AgentServer::new(config, platform.clone(), platform)
        .run(async {})
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), ChirpErrorKind::Library(_)));
    assert!(err.kind().is_fatal());
}

#[tokio::test]
async fn test_taken_port_is_fatal() {
    let dir = TempDir::new().unwrap();
    let taken = tokio::net::TcpListener::bind("0.0.0.0:0").await.unwrap();
    let port = taken.local_addr().unwrap().port();
    let config = config(&dir).with_port(port);
    let platform = Arc::new(NoOpPlatform::new());

    let err = AgentServer::new(config, platform.clone(), platform)
        .run(async {})
        .await
        .unwrap_err();
    let ChirpErrorKind::Endpoint(endpoint) = err.kind() else {
        panic!("expected an endpoint error, got {}", err);
    };
    assert!(matches!(
        &endpoint.kind,
        EndpointErrorKind::Bind { port: p, .. } if *p == port
    ));
    assert!(err.kind().is_fatal());
}
