//! エンドポイントテスター
//!
//! 1エンドポイントのテスト（プローブ実行 → 判定 → キャッシュ更新）と、
//! 複数エンドポイントの並列テストを行う。

pub mod inflight;

pub use inflight::{InFlightGuard, InFlightSet};

use crate::cache::ResultCache;
use crate::classifier::classify;
use crate::probe::ProbeExecutor;
use apiwatch_common::types::{Endpoint, TestResult, TestStatus};
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// ログに残す出力の最大文字数
const OUTPUT_PREVIEW_CHARS: usize = 200;

/// エンドポイントテスター
#[derive(Clone)]
pub struct EndpointTester {
    probe: Arc<dyn ProbeExecutor>,
    cache: ResultCache,
    in_flight: InFlightSet,
    success_marker: Arc<str>,
}

impl EndpointTester {
    /// 新しいテスターを作成
    pub fn new(probe: Arc<dyn ProbeExecutor>, success_marker: &str) -> Self {
        Self {
            probe,
            cache: ResultCache::new(),
            in_flight: InFlightSet::new(),
            success_marker: Arc::from(success_marker),
        }
    }

    /// 結果キャッシュ
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// 実行中テストの集合
    pub fn in_flight(&self) -> &InFlightSet {
        &self.in_flight
    }

    /// 1エンドポイントをテストする
    ///
    /// 同じ名前のテストが実行中なら新たにプローブを起動せず、
    /// キャッシュ済みの結果（無ければ `testing` プレースホルダー）を返す。
    /// プローブの失敗は `offline` 結果になり、呼び出し側へは伝播しない。
    pub async fn test_endpoint(&self, endpoint: &Endpoint) -> TestResult {
        let Some(_guard) = self.in_flight.try_acquire(&endpoint.name) else {
            warn!(endpoint = %endpoint.name, "Test already in progress, skipping");
            return self
                .cache
                .get(&endpoint.name)
                .await
                .unwrap_or_else(|| TestResult::testing(endpoint));
        };

        info!(
            endpoint = %endpoint.name,
            api_base = %endpoint.api_base,
            "Starting endpoint test"
        );

        let started = Instant::now();
        let outcome = self
            .probe
            .run(&endpoint.api_key, &endpoint.api_base)
            .await;
        let response_time = started.elapsed().as_millis() as u64;

        let mut result = TestResult::new(endpoint, TestStatus::Unknown);
        result.response_time = Some(response_time);
        result.last_checked = Some(Utc::now());

        match outcome {
            Ok(output) => {
                debug!(
                    endpoint = %endpoint.name,
                    output = %preview(&output),
                    "Probe output"
                );
                let classification = classify(&output, &self.success_marker);
                result.status = classification.status;
                result.error = classification.error;
                match result.status {
                    TestStatus::Online => info!(
                        endpoint = %endpoint.name,
                        response_time_ms = response_time,
                        "Endpoint online"
                    ),
                    status => warn!(
                        endpoint = %endpoint.name,
                        status = %status,
                        response_time_ms = response_time,
                        detail = %preview(result.error.as_deref().unwrap_or_default()),
                        "Endpoint test did not succeed"
                    ),
                }
            }
            Err(e) => {
                error!(
                    endpoint = %endpoint.name,
                    error = %e,
                    response_time_ms = response_time,
                    "Probe failed"
                );
                result.status = TestStatus::Offline;
                result.error = Some(e.to_string());
            }
        }

        // written before the in-flight guard drops
        self.cache.insert(result.clone()).await;
        result
    }

    /// 複数エンドポイントを並列にテストする
    ///
    /// 結果は入力順。個々のテストタスクが異常終了した場合は `offline` で埋める。
    pub async fn test_many(&self, endpoints: Vec<Endpoint>) -> Vec<TestResult> {
        info!(count = endpoints.len(), "Testing endpoints in parallel");

        let (endpoints, handles): (Vec<_>, Vec<_>) = endpoints
            .into_iter()
            .map(|endpoint| {
                let tester = self.clone();
                let handle = tokio::spawn({
                    let endpoint = endpoint.clone();
                    async move { tester.test_endpoint(&endpoint).await }
                });
                (endpoint, handle)
            })
            .unzip();

        let results: Vec<TestResult> = endpoints
            .into_iter()
            .zip(join_all(handles).await)
            .map(|(endpoint, joined)| match joined {
                Ok(result) => result,
                Err(e) => {
                    error!(endpoint = %endpoint.name, error = %e, "Endpoint test task failed");
                    let mut result = TestResult::new(&endpoint, TestStatus::Offline);
                    result.error = Some(e.to_string());
                    result.last_checked = Some(Utc::now());
                    result
                }
            })
            .collect();

        let online = results
            .iter()
            .filter(|r| r.status == TestStatus::Online)
            .count();
        info!(
            total = results.len(),
            online,
            not_online = results.len() - online,
            "Parallel endpoint test completed"
        );
        results
    }
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= OUTPUT_PREVIEW_CHARS {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(OUTPUT_PREVIEW_CHARS).collect();
    cut.push_str("...");
    cut
}
