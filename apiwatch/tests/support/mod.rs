//! Shared helpers for apiwatch integration and contract tests.

#![allow(dead_code)]

use apiwatch::monitor::Monitor;
use apiwatch::probe::{ProbeError, ProbeExecutor};
use apiwatch::shutdown::ShutdownController;
use apiwatch::store::JsonFileStore;
use apiwatch::{api, AppState};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

pub const SUCCESS_MARKER: &str = "成功";

pub const TWO_ENDPOINTS: &str = r#"{
  "endpoints": [
    {
      "name": "relay-a",
      "apiBase": "https://relay-a.example.com",
      "apiKey": "sk-relay-a",
      "testInterval": 5,
      "inviteLink": "https://relay-a.example.com/invite"
    },
    {
      "name": "relay-b",
      "apiBase": "https://relay-b.example.com",
      "apiKey": "sk-relay-b"
    }
  ],
  "defaultTestInterval": 10,
  "timeout": 30
}
"#;

/// Probe whose reply depends on the API key it is given.
#[derive(Default)]
pub struct ScriptedProbe {
    replies: Mutex<HashMap<String, Result<String, ProbeError>>>,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, api_key: &str, reply: Result<String, ProbeError>) {
        self.replies
            .lock()
            .unwrap()
            .insert(api_key.to_string(), reply);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProbeExecutor for ScriptedProbe {
    async fn run(&self, api_key: &str, _api_base: &str) -> Result<String, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .get(api_key)
            .cloned()
            .unwrap_or_else(|| Ok(SUCCESS_MARKER.to_string()))
    }
}

pub struct TestApp {
    pub app: Router,
    pub monitor: Monitor,
    pub probe: Arc<ScriptedProbe>,
    pub config_path: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    pub fn config_contents(&self) -> String {
        std::fs::read_to_string(&self.config_path).unwrap()
    }
}

pub fn write_config(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

pub fn monitor_for(path: &Path, probe: Arc<ScriptedProbe>) -> Monitor {
    Monitor::new(Arc::new(JsonFileStore::new(path)), probe, SUCCESS_MARKER)
}

pub async fn build_app(config: &str) -> TestApp {
    let (dir, config_path) = write_config(config);
    let probe = ScriptedProbe::new();
    let monitor = monitor_for(&config_path, probe.clone());
    monitor.load_config().await.expect("load test configuration");

    let state = AppState {
        monitor: monitor.clone(),
        shutdown: ShutdownController::default(),
    };
    TestApp {
        app: api::create_app(state),
        monitor,
        probe,
        config_path,
        _dir: dir,
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}
