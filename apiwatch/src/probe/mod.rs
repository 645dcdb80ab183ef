//! 外部コマンドによる疎通プローブ
//!
//! エンドポイントごとに短命な子プロセスを1つ起動し、その標準出力と標準エラーを
//! 連結した文字列を返す。判定は [`crate::classifier`] が行う。

pub mod command;

pub use command::{CommandProbe, Termination};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 認証トークンを渡す環境変数名
pub const AUTH_TOKEN_ENV: &str = "ANTHROPIC_AUTH_TOKEN";

/// ベースURLを渡す環境変数名
pub const BASE_URL_ENV: &str = "ANTHROPIC_BASE_URL";

/// プローブ実行エラー
///
/// スケジューラー境界で `offline` ステータスに吸収され、上位には伝播しない。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    /// プロセスを起動できなかった
    #[error("Failed to launch probe command: {0}")]
    LaunchFailure(String),

    /// 制限時間内に終了しなかった
    #[error("Probe timed out after {0:?}")]
    Timeout(Duration),

    /// 非ゼロ終了かつ出力なし
    #[error("Probe exited with {0} and produced no output")]
    NonZeroExit(String),
}

/// プローブ実行器
///
/// テストではフェイク実装に差し替える。
#[async_trait]
pub trait ProbeExecutor: Send + Sync {
    /// 1エンドポイントに対してプローブを実行し、連結済み出力を返す
    async fn run(&self, api_key: &str, api_base: &str) -> Result<String, ProbeError>;
}
