//! 設定変更の検出
//!
//! 再読込した設定と稼働中タイマーを比べ、タイマーを作り直すべきかを決める。

use super::TimerInfo;
use apiwatch_common::config::MonitorConfig;
use std::collections::HashMap;
use std::fmt;

/// タイマー再構築の理由
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildReason {
    /// エンドポイント数が変わった
    EndpointCountChanged {
        /// 稼働中タイマー数
        running: usize,
        /// 設定上のエンドポイント数（名前の重複は除く）
        configured: usize,
    },
    /// タイマーの無いエンドポイントがある（追加・改名）
    TimerMissing {
        /// エンドポイント名
        name: String,
    },
    /// 間隔が変わった
    IntervalChanged {
        /// エンドポイント名
        name: String,
        /// 稼働中の間隔（分）
        running: u64,
        /// 設定上の間隔（分）
        configured: u64,
    },
}

impl fmt::Display for RebuildReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndpointCountChanged {
                running,
                configured,
            } => write!(f, "endpoint count changed ({running} -> {configured})"),
            Self::TimerMissing { name } => write!(f, "no timer for endpoint {name}"),
            Self::IntervalChanged {
                name,
                running,
                configured,
            } => write!(
                f,
                "interval of {name} changed ({running}m -> {configured}m)"
            ),
        }
    }
}

/// 同期サイクル1回の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// 変更なし
    Unchanged,
    /// タイマーを作り直した
    Rebuilt(RebuildReason),
    /// 設定を読めなかった（タイマーはそのまま）
    LoadFailed,
}

/// タイマーを作り直すべきか判定する
///
/// 比較順はエンドポイント数、次に各エンドポイントのタイマー有無と間隔。
/// 同名エンドポイントは後に出たものの間隔で比べる（再構築時と同じ規則）。
/// APIキーやURLだけの変更は検出しない。
pub fn decide_rebuild(config: &MonitorConfig, timers: &[TimerInfo]) -> Option<RebuildReason> {
    let configured = config.distinct_endpoint_count();
    if configured != timers.len() {
        return Some(RebuildReason::EndpointCountChanged {
            running: timers.len(),
            configured,
        });
    }

    let wanted: HashMap<&str, u64> = config
        .endpoints
        .iter()
        .map(|ep| (ep.name.as_str(), config.effective_interval(ep)))
        .collect();
    let running: HashMap<&str, u64> = timers
        .iter()
        .map(|t| (t.name.as_str(), t.interval_minutes))
        .collect();

    for ep in &config.endpoints {
        let name = ep.name.as_str();
        let configured = wanted[name];
        match running.get(name) {
            None => {
                return Some(RebuildReason::TimerMissing {
                    name: name.to_string(),
                })
            }
            Some(&running) if running != configured => {
                return Some(RebuildReason::IntervalChanged {
                    name: name.to_string(),
                    running,
                    configured,
                })
            }
            Some(_) => {}
        }
    }
    None
}
