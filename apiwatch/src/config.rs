//! Configuration management via environment variables
//!
//! Provides helper functions for reading environment variables with fallback
//! to legacy variable names with warning logs, plus the probe and sync settings
//! derived from them.

use std::path::PathBuf;
use std::time::Duration;

/// Default probe program
pub const DEFAULT_PROBE_COMMAND: &str = "claude";

/// Default prompt passed to the probe program
pub const DEFAULT_PROBE_PROMPT: &str = "请回复\"成功\"";

/// Default success marker expected in the probe output
pub const DEFAULT_SUCCESS_MARKER: &str = "成功";

/// Default hard timeout of one probe (seconds)
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 300;

/// Default grace period between SIGTERM and SIGKILL (seconds)
pub const DEFAULT_PROBE_GRACE_SECS: u64 = 5;

/// Default configuration reload cycle (seconds)
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 300;

/// 既定の待ち受けアドレス
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Get an environment variable with fallback to a legacy name
///
/// If the new variable name is set, returns its value.
/// If only the legacy variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use apiwatch::config::get_env_with_fallback;
///
/// let port = get_env_with_fallback("APIWATCH_PORT", "PORT");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Returns `default` if neither variable is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn get_env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// 設定ファイルのパスを取得
///
/// `APIWATCH_CONFIG`（旧: `CONFIG_PATH`）、未設定なら `config.json`。
pub fn get_config_path() -> PathBuf {
    PathBuf::from(get_env_with_fallback_or(
        "APIWATCH_CONFIG",
        "CONFIG_PATH",
        "config.json",
    ))
}

/// 待ち受けアドレスを取得
///
/// `APIWATCH_HOST` のみ参照する（シェルが設定しがちな `HOST` は見ない）。
pub fn get_host() -> String {
    get_env_or("APIWATCH_HOST", DEFAULT_HOST)
}

/// 設定再読込サイクルの間隔を取得
///
/// 0 は無効値として既定値に戻す。
pub fn get_sync_interval() -> Duration {
    match get_env_parse("APIWATCH_SYNC_INTERVAL_SECS", DEFAULT_SYNC_INTERVAL_SECS) {
        0 => {
            tracing::warn!("APIWATCH_SYNC_INTERVAL_SECS must be positive, using default");
            Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS)
        }
        secs => Duration::from_secs(secs),
    }
}

/// Probe invocation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Program to execute
    pub program: String,
    /// Arguments passed to the program
    pub args: Vec<String>,
    /// Marker whose presence means the endpoint answered
    pub success_marker: String,
    /// Hard wall-clock limit of one probe
    pub timeout: Duration,
    /// Time allowed between graceful termination and force kill
    pub grace_period: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROBE_COMMAND.to_string(),
            args: vec!["--print".to_string(), DEFAULT_PROBE_PROMPT.to_string()],
            success_marker: DEFAULT_SUCCESS_MARKER.to_string(),
            timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            grace_period: Duration::from_secs(DEFAULT_PROBE_GRACE_SECS),
        }
    }
}

impl ProbeConfig {
    /// Load probe settings from environment variables.
    pub fn from_env() -> Self {
        let prompt = get_env_or("APIWATCH_PROBE_PROMPT", DEFAULT_PROBE_PROMPT);
        Self {
            program: get_env_or("APIWATCH_PROBE_COMMAND", DEFAULT_PROBE_COMMAND),
            args: vec!["--print".to_string(), prompt],
            success_marker: get_env_or("APIWATCH_SUCCESS_MARKER", DEFAULT_SUCCESS_MARKER),
            timeout: Duration::from_secs(get_env_parse(
                "APIWATCH_PROBE_TIMEOUT_SECS",
                DEFAULT_PROBE_TIMEOUT_SECS,
            )),
            grace_period: Duration::from_secs(get_env_parse(
                "APIWATCH_PROBE_GRACE_SECS",
                DEFAULT_PROBE_GRACE_SECS,
            )),
        }
    }
}
