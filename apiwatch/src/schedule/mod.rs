//! エンドポイント別スケジューラー
//!
//! エンドポイントごとに独立したタイマーを持ち、開始時に1回即時テストしてから
//! 以後は設定間隔ごとにテストを起動する。
//! 発火時のエンドポイント情報（APIキー・ベースURL）は共有中の最新設定から引き直す。

pub mod sync;

pub use sync::{decide_rebuild, RebuildReason, SyncOutcome};

use crate::tester::EndpointTester;
use apiwatch_common::config::MonitorConfig;
use apiwatch_common::types::Endpoint;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// 読み込み済みの設定（監視サービスと共有）
pub type SharedConfig = Arc<RwLock<Option<MonitorConfig>>>;

struct ScheduleEntry {
    handle: JoinHandle<()>,
    interval_minutes: u64,
    generation: u64,
}

/// 稼働中タイマーの情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerInfo {
    /// エンドポイント名
    pub name: String,
    /// 間隔（分）
    pub interval_minutes: u64,
    /// 起動ごとに増える世代番号
    pub generation: u64,
}

/// エンドポイント別スケジューラー
#[derive(Clone)]
pub struct Scheduler {
    tester: EndpointTester,
    config: SharedConfig,
    timers: Arc<Mutex<HashMap<String, ScheduleEntry>>>,
    next_generation: Arc<AtomicU64>,
}

impl Scheduler {
    /// 新しいスケジューラーを作成
    pub fn new(tester: EndpointTester, config: SharedConfig) -> Self {
        Self {
            tester,
            config,
            timers: Arc::new(Mutex::new(HashMap::new())),
            next_generation: Arc::new(AtomicU64::new(1)),
        }
    }

    fn timers(&self) -> MutexGuard<'_, HashMap<String, ScheduleEntry>> {
        self.timers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// エンドポイントのタイマーを開始する
    ///
    /// 即時テストを1回起動し、`interval_minutes` 分ごとの繰り返しタイマーを登録する。
    /// 同名のタイマーが既にあれば置き換える。
    /// 間隔は呼び出し側が [`MonitorConfig::effective_interval`] で解決して渡す。
    pub fn start_endpoint_timer(&self, endpoint: &Endpoint, interval_minutes: u64) {
        let interval_minutes = interval_minutes.max(1);
        info!(
            endpoint = %endpoint.name,
            interval_minutes,
            "Starting endpoint timer"
        );

        tokio::spawn({
            let tester = self.tester.clone();
            let endpoint = endpoint.clone();
            async move {
                tester.test_endpoint(&endpoint).await;
            }
        });

        let handle = tokio::spawn(run_timer(
            self.tester.clone(),
            self.config.clone(),
            endpoint.clone(),
            Duration::from_secs(interval_minutes.saturating_mul(60)),
        ));
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);

        let previous = self.timers().insert(
            endpoint.name.clone(),
            ScheduleEntry {
                handle,
                interval_minutes,
                generation,
            },
        );
        if let Some(previous) = previous {
            debug!(endpoint = %endpoint.name, "Replacing existing timer");
            previous.handle.abort();
        }
    }

    /// 全タイマーを停止する。実行中のテストはそのまま完了させる
    pub fn stop_all_timers(&self) -> usize {
        let stopped: Vec<_> = self.timers().drain().collect();
        for (_, entry) in &stopped {
            entry.handle.abort();
        }
        if !stopped.is_empty() {
            info!(count = stopped.len(), "Stopped all endpoint timers");
        }
        stopped.len()
    }

    /// 全タイマーを止めて設定から作り直す
    ///
    /// 同名のエンドポイントが複数ある場合は後のものが残る。
    pub fn rebuild(&self, config: &MonitorConfig) -> usize {
        self.stop_all_timers();
        for endpoint in &config.endpoints {
            self.start_endpoint_timer(endpoint, config.effective_interval(endpoint));
        }
        let count = self.timer_count();
        info!(timers = count, "Endpoint timers rebuilt");
        count
    }

    /// 稼働中タイマー数
    pub fn timer_count(&self) -> usize {
        self.timers().len()
    }

    /// 稼働中タイマーの一覧（名前順）
    pub fn snapshot(&self) -> Vec<TimerInfo> {
        let mut infos: Vec<_> = self
            .timers()
            .iter()
            .map(|(name, entry)| TimerInfo {
                name: name.clone(),
                interval_minutes: entry.interval_minutes,
                generation: entry.generation,
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// テスター
    pub fn tester(&self) -> &EndpointTester {
        &self.tester
    }
}

/// 繰り返しタイマー
///
/// 発火ごとにテストを別タスクで起動するので、長いプローブが次の発火を遅らせない。
/// 前回のテストがまだ終わっていなければテスター側で弾かれる。
async fn run_timer(
    tester: EndpointTester,
    config: SharedConfig,
    armed: Endpoint,
    period: Duration,
) {
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // the immediate test is started separately
    timer.tick().await;

    loop {
        timer.tick().await;
        debug!(endpoint = %armed.name, "Scheduled test triggered");
        let endpoint = current_endpoint(&config, &armed).await;
        let tester = tester.clone();
        tokio::spawn(async move {
            tester.test_endpoint(&endpoint).await;
        });
    }
}

/// 最新設定の同名エンドポイント（重複時は後のもの）。無ければ起動時の内容
async fn current_endpoint(config: &SharedConfig, armed: &Endpoint) -> Endpoint {
    config
        .read()
        .await
        .as_ref()
        .and_then(|config| {
            config
                .endpoints
                .iter()
                .rev()
                .find(|ep| ep.name == armed.name)
                .cloned()
        })
        .unwrap_or_else(|| armed.clone())
}
