//! serve サブコマンド
//!
//! 監視サーバーを起動します。未指定の値は環境変数（旧名を含む）から解決する。

use clap::Args;
use std::path::PathBuf;

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long, env = "APIWATCH_PORT")]
    pub port: Option<u16>,

    /// Bind address
    #[arg(short = 'H', long, env = "APIWATCH_HOST")]
    pub host: Option<String>,

    /// Endpoint configuration file
    #[arg(short, long, env = "APIWATCH_CONFIG")]
    pub config: Option<PathBuf>,
}
