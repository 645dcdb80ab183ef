//! 子プロセスによるプローブ実装

use super::{ProbeError, ProbeExecutor, AUTH_TOKEN_ENV, BASE_URL_ENV};
use crate::config::ProbeConfig;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

/// タイムアウト時の停止結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// SIGTERMで猶予期間内に終了した
    Graceful,
    /// 猶予期間を過ぎたため強制終了した
    Forced,
}

/// 外部コマンドを起動するプローブ
#[derive(Debug, Clone)]
pub struct CommandProbe {
    config: ProbeConfig,
}

impl CommandProbe {
    /// 設定からプローブを作成
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    /// 現在の設定
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    fn build_command(&self, api_key: &str, api_base: &str) -> Command {
        let mut command = Command::new(&self.config.program);
        command
            .args(&self.config.args)
            .env(AUTH_TOKEN_ENV, api_key)
            .env(BASE_URL_ENV, api_base)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl ProbeExecutor for CommandProbe {
    async fn run(&self, api_key: &str, api_base: &str) -> Result<String, ProbeError> {
        debug!(
            program = %self.config.program,
            api_base = %api_base,
            "Launching probe command"
        );

        let mut child = self
            .build_command(api_key, api_base)
            .spawn()
            .map_err(|e| ProbeError::LaunchFailure(format!("{}: {}", self.config.program, e)))?;

        let mut stdout = child.stdout.take();
        let mut stderr = child.stderr.take();

        let completed = timeout(self.config.timeout, async {
            tokio::join!(
                child.wait(),
                read_stream(stdout.as_mut()),
                read_stream(stderr.as_mut())
            )
        })
        .await;

        let (status, out, err) = match completed {
            Ok(parts) => parts,
            Err(_) => {
                drop(stdout);
                drop(stderr);
                let termination = terminate(&mut child, self.config.grace_period).await;
                warn!(
                    api_base = %api_base,
                    timeout_secs = self.config.timeout.as_secs(),
                    termination = ?termination,
                    "Probe command timed out"
                );
                return Err(ProbeError::Timeout(self.config.timeout));
            }
        };

        let status = status
            .map_err(|e| ProbeError::LaunchFailure(format!("failed to wait for probe: {e}")))?;

        let output = format!("{out}{err}");
        debug!(
            exit_status = %status,
            output_len = output.len(),
            "Probe command finished"
        );

        if !status.success() && output.is_empty() {
            return Err(ProbeError::NonZeroExit(status.to_string()));
        }
        Ok(output)
    }
}

async fn read_stream<R: AsyncRead + Unpin>(stream: Option<&mut R>) -> String {
    let mut buf = Vec::new();
    if let Some(stream) = stream {
        if let Err(e) = stream.read_to_end(&mut buf).await {
            debug!(error = %e, "Failed to read probe output stream");
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// 子プロセスを2段階で停止する
///
/// SIGTERMを送り、`grace` 以内に終了しなければSIGKILLで強制終了する。
/// Unix以外では即座に強制終了する。
pub async fn terminate(child: &mut Child, grace: Duration) -> Termination {
    if request_graceful_exit(child) {
        if let Ok(Ok(_)) = timeout(grace, child.wait()).await {
            return Termination::Graceful;
        }
    }
    if let Err(e) = child.kill().await {
        warn!(error = %e, "Failed to force-kill probe command");
    }
    Termination::Forced
}

#[cfg(unix)]
fn request_graceful_exit(child: &Child) -> bool {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return false;
    };
    match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        Ok(()) => true,
        Err(e) => {
            debug!(pid, error = %e, "Failed to send SIGTERM to probe command");
            false
        }
    }
}

#[cfg(not(unix))]
fn request_graceful_exit(_child: &Child) -> bool {
    false
}
