//! check サブコマンド
//!
//! 全エンドポイントを1回だけテストし、結果をJSONで標準出力に書き出す。

use crate::build_monitor;
use crate::config::{get_config_path, ProbeConfig};
use anyhow::Context;
use apiwatch_common::protocol::StatusResponse;
use clap::Args;
use std::path::{Path, PathBuf};

/// check サブコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Endpoint configuration file
    #[arg(short, long, env = "APIWATCH_CONFIG")]
    pub config: Option<PathBuf>,
}

/// check サブコマンドを実行
pub async fn execute(args: &CheckArgs) -> anyhow::Result<()> {
    let path = args.config.clone().unwrap_or_else(get_config_path);
    let response = run(&path, ProbeConfig::from_env()).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// 設定を読み込んで全エンドポイントをテストする
pub async fn run(path: &Path, probe: ProbeConfig) -> anyhow::Result<StatusResponse> {
    let monitor = build_monitor(path, probe);
    monitor
        .load_config()
        .await
        .with_context(|| format!("Cannot load configuration from {}", path.display()))?;
    Ok(StatusResponse::new(monitor.test_all_endpoints().await))
}
