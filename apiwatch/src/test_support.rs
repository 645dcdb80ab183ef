//! ユニットテスト用のフェイク

use crate::error::MonitorError;
use crate::probe::{ProbeError, ProbeExecutor};
use crate::store::ConfigSource;
use apiwatch_common::config::MonitorConfig;
use apiwatch_common::types::Endpoint;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) fn endpoint(name: &str, interval: Option<u64>) -> Endpoint {
    Endpoint {
        name: name.to_string(),
        api_base: format!("https://{name}.example.com"),
        api_key: format!("sk-{name}"),
        test_interval: interval,
        invite_link: None,
    }
}

pub(crate) fn config(endpoints: Vec<Endpoint>, default_interval: Option<u64>) -> MonitorConfig {
    MonitorConfig {
        endpoints,
        default_test_interval: default_interval,
        timeout: None,
        extra: Default::default(),
    }
}

/// 固定の応答を返すプローブ
pub(crate) struct FakeProbe {
    reply: Mutex<Result<String, ProbeError>>,
    delay: Duration,
    calls: AtomicUsize,
    keys: Mutex<Vec<String>>,
}

impl FakeProbe {
    pub(crate) fn replying(output: &str) -> Arc<Self> {
        Arc::new(Self::new(Ok(output.to_string())))
    }

    pub(crate) fn failing(error: ProbeError) -> Arc<Self> {
        Arc::new(Self::new(Err(error)))
    }

    fn new(reply: Result<String, ProbeError>) -> Self {
        Self {
            reply: Mutex::new(reply),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            keys: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_delay(self: Arc<Self>, delay: Duration) -> Arc<Self> {
        let reply = self.reply.lock().unwrap().clone();
        Arc::new(Self {
            delay,
            ..Self::new(reply)
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn keys_seen(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProbeExecutor for FakeProbe {
    async fn run(&self, api_key: &str, _api_base: &str) -> Result<String, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.keys.lock().unwrap().push(api_key.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply.lock().unwrap().clone()
    }
}

/// メモリ上の設定ソース
#[derive(Default)]
pub(crate) struct MemorySource {
    config: Mutex<Option<MonitorConfig>>,
    loads: AtomicUsize,
}

impl MemorySource {
    pub(crate) fn with(config: MonitorConfig) -> Arc<Self> {
        let source = Self::default();
        source.set(Some(config));
        Arc::new(source)
    }

    pub(crate) fn set(&self, config: Option<MonitorConfig>) {
        *self.config.lock().unwrap() = config;
    }

    pub(crate) fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ConfigSource for MemorySource {
    fn load(&self) -> Result<MonitorConfig, MonitorError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.config
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| MonitorError::ConfigLoad("no configuration".to_string()))
    }

    fn append_endpoint(&self, endpoint: Endpoint) -> Result<MonitorConfig, MonitorError> {
        let mut guard = self.config.lock().unwrap();
        let config = guard
            .as_mut()
            .ok_or_else(|| MonitorError::ConfigLoad("no configuration".to_string()))?;
        if config.contains(&endpoint.name) {
            return Err(MonitorError::DuplicateName(endpoint.name));
        }
        config.endpoints.push(endpoint);
        Ok(config.clone())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
