//! ロギング初期化
//!
//! コンソール（stderr）へのfmt出力に加え、`APIWATCH_LOG_DIR` が設定されていれば
//! 日次ローテーションのファイル出力を追加する。`check` サブコマンドが結果JSONを
//! stdoutに出すため、コンソール側はstderrに書く。

use crate::config::get_env_with_fallback_or;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ログファイル名の接頭辞
const LOG_FILE_PREFIX: &str = "apiwatch.log";

/// ファイル出力のフラッシュを保証するガード。プロセス終了まで保持すること
#[must_use]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// `RUST_LOG` が無いときのフィルタ文字列
pub fn log_level() -> String {
    get_env_with_fallback_or("APIWATCH_LOG_LEVEL", "LOG_LEVEL", "info")
}

/// ファイル出力先ディレクトリ
pub fn log_dir() -> Option<PathBuf> {
    std::env::var("APIWATCH_LOG_DIR")
        .ok()
        .filter(|dir| !dir.trim().is_empty())
        .map(PathBuf::from)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level()))
}

/// グローバルsubscriberを設定する
pub fn init() -> Result<LoggingGuard, tracing_subscriber::util::TryInitError> {
    let console = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let (file, guard) = match log_dir() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter())
        .with(console)
        .with(file)
        .try_init()?;

    Ok(LoggingGuard { _file: guard })
}
