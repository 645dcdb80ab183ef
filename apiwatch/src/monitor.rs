//! 監視サービス
//!
//! 設定ソース・スケジューラー・テスターをまとめ、HTTP層とCLIに操作を提供する。
//! 現在の設定はここだけが保持し、定期的な再読込で更新される。

use crate::error::MonitorError;
use crate::probe::ProbeExecutor;
use crate::schedule::{decide_rebuild, Scheduler, SharedConfig, SyncOutcome};
use crate::shutdown::ShutdownController;
use crate::store::ConfigSource;
use crate::tester::EndpointTester;
use apiwatch_common::config::MonitorConfig;
use apiwatch_common::types::{Endpoint, TestResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

/// 監視サービス
#[derive(Clone)]
pub struct Monitor {
    source: Arc<dyn ConfigSource>,
    config: SharedConfig,
    scheduler: Scheduler,
}

impl Monitor {
    /// 新しい監視サービスを作成
    pub fn new(
        source: Arc<dyn ConfigSource>,
        probe: Arc<dyn ProbeExecutor>,
        success_marker: &str,
    ) -> Self {
        let config = SharedConfig::default();
        Self {
            source,
            scheduler: Scheduler::new(EndpointTester::new(probe, success_marker), config.clone()),
            config,
        }
    }

    /// スケジューラー
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    fn tester(&self) -> &EndpointTester {
        self.scheduler.tester()
    }

    /// 設定を読み直す
    ///
    /// 失敗した場合は直前の設定を保持したままエラーを返す。
    pub async fn load_config(&self) -> Result<usize, MonitorError> {
        let config = match self.source.load() {
            Ok(config) => config,
            Err(e) => {
                error!(
                    source = %self.source.describe(),
                    error = %e,
                    "Failed to load configuration, keeping previous"
                );
                return Err(e);
            }
        };

        let duplicates = config.duplicate_names();
        if !duplicates.is_empty() {
            warn!(names = ?duplicates, "Duplicate endpoint names in configuration");
        }

        let count = config.endpoints.len();
        *self.config.write().await = Some(config);
        debug!(endpoints = count, "Configuration loaded");
        Ok(count)
    }

    /// 現在の設定（一度も読めていなければ `None`）
    pub async fn current_config(&self) -> Option<MonitorConfig> {
        self.config.read().await.clone()
    }

    /// 1エンドポイントをテスト
    pub async fn test_endpoint(&self, endpoint: &Endpoint) -> TestResult {
        self.tester().test_endpoint(endpoint).await
    }

    /// 設定を読み直して全エンドポイントを並列テストする
    ///
    /// 再読込に失敗した場合は直前の設定で続行する。結果は設定順。
    pub async fn test_all_endpoints(&self) -> Vec<TestResult> {
        if self.load_config().await.is_err() {
            warn!("Testing with the last known configuration");
        }
        let Some(config) = self.current_config().await else {
            warn!("No configuration loaded, nothing to test");
            return Vec::new();
        };
        self.tester().test_many(config.endpoints).await
    }

    /// 現在の結果一覧
    ///
    /// 設定が読めていれば設定順（未テストは `unknown`）、
    /// 読めていなければキャッシュの内容をそのまま返す。
    pub async fn get_results(&self) -> Vec<TestResult> {
        let config = self.config.read().await;
        match config.as_ref() {
            Some(config) => self.tester().cache().results_for(&config.endpoints).await,
            None => self.tester().cache().all().await,
        }
    }

    /// エンドポイントを登録する
    ///
    /// 設定ファイルに追記してから設定を読み直し、全エンドポイントのテストを
    /// バックグラウンドで起動する。タイマーは次の同期サイクルで張られる。
    pub async fn register_endpoint(&self, endpoint: Endpoint) -> Result<Endpoint, MonitorError> {
        self.source.append_endpoint(endpoint.clone())?;
        info!(
            endpoint = %endpoint.name,
            api_base = %endpoint.api_base,
            "Endpoint registered"
        );

        if let Err(e) = self.load_config().await {
            warn!(error = %e, "Registered endpoint but could not reload configuration");
        }

        let monitor = self.clone();
        tokio::spawn(async move {
            monitor.test_all_endpoints().await;
        });

        Ok(endpoint)
    }

    /// 設定から全タイマーを作り直す
    pub async fn start_all_timers(&self) -> usize {
        match self.current_config().await {
            Some(config) => self.scheduler.rebuild(&config),
            None => {
                warn!("No configuration loaded, no timers started");
                0
            }
        }
    }

    /// 同期サイクルを1回実行する
    pub async fn sync_once(&self) -> SyncOutcome {
        if self.load_config().await.is_err() {
            return SyncOutcome::LoadFailed;
        }
        let Some(config) = self.current_config().await else {
            return SyncOutcome::LoadFailed;
        };

        match decide_rebuild(&config, &self.scheduler.snapshot()) {
            Some(reason) => {
                info!(reason = %reason, "Configuration change detected, restarting timers");
                self.scheduler.rebuild(&config);
                SyncOutcome::Rebuilt(reason)
            }
            None => {
                debug!("Configuration unchanged");
                SyncOutcome::Unchanged
            }
        }
    }

    /// 初回読込・タイマー起動を行い、同期ループをバックグラウンドで開始する
    ///
    /// 初回読込に失敗してもループは動き続け、次のサイクルで再試行する。
    pub async fn start(
        &self,
        sync_interval: Duration,
        shutdown: ShutdownController,
    ) -> JoinHandle<()> {
        match self.load_config().await {
            Ok(count) => {
                info!(endpoints = count, "Starting endpoint monitoring");
                self.start_all_timers().await;
            }
            Err(_) => error!("Initial configuration load failed, retrying on next sync cycle"),
        }
        self.spawn_sync_loop(sync_interval, shutdown)
    }

    /// 同期ループを開始する
    ///
    /// シャットダウン要求でループを抜け、全タイマーを停止する。
    pub fn spawn_sync_loop(
        &self,
        sync_interval: Duration,
        shutdown: ShutdownController,
    ) -> JoinHandle<()> {
        let monitor = self.clone();
        tokio::spawn(async move {
            let mut timer = interval(sync_interval.max(Duration::from_secs(1)));
            info!(
                interval_secs = sync_interval.as_secs(),
                "Configuration sync loop started"
            );

            // skip the immediate tick, startup already loaded the configuration
            timer.tick().await;

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        let outcome = monitor.sync_once().await;
                        debug!(outcome = ?outcome, "Sync cycle finished");
                    }
                    _ = shutdown.wait() => {
                        let stopped = monitor.scheduler.stop_all_timers();
                        info!(timers = stopped, "Configuration sync loop stopped");
                        break;
                    }
                }
            }
        })
    }
}
