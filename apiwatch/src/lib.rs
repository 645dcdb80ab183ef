//! apiwatch Server
//!
//! Anthropic互換APIリレーの疎通状況をエンドポイントごとに監視するサーバー

#![warn(missing_docs)]

/// REST APIハンドラー
pub mod api;

/// テスト結果キャッシュ
pub mod cache;

/// プローブ出力の判定
pub mod classifier;

/// CLIインターフェース
pub mod cli;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// エラー型
pub mod error;

/// ロギング初期化ユーティリティ
pub mod logging;

/// 監視サービス（設定同期・全体テスト・登録）
pub mod monitor;

/// 外部コマンドによるプローブ
pub mod probe;

/// エンドポイント別スケジューラー
pub mod schedule;

/// サーバー起動・シャットダウン
pub mod server;

/// 協調シャットダウン
pub mod shutdown;

/// 設定ファイルの読み書き
pub mod store;

/// エンドポイントテスター
pub mod tester;

#[cfg(test)]
mod test_support;

use crate::config::ProbeConfig;
use crate::monitor::Monitor;
use crate::probe::CommandProbe;
use crate::shutdown::ShutdownController;
use crate::store::JsonFileStore;
use std::path::PathBuf;
use std::sync::Arc;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// 監視サービス
    pub monitor: Monitor,
    /// 協調シャットダウン
    pub shutdown: ShutdownController,
}

/// 設定ファイルと外部コマンドプローブを使う監視サービスを組み立てる
pub fn build_monitor(config_path: impl Into<PathBuf>, probe: ProbeConfig) -> Monitor {
    let marker = probe.success_marker.clone();
    Monitor::new(
        Arc::new(JsonFileStore::new(config_path)),
        Arc::new(CommandProbe::new(probe)),
        &marker,
    )
}
