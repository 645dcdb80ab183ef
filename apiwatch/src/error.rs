//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! プローブ単位の失敗（[`crate::probe::ProbeError`]）はテスト結果に吸収されるため、
//! ここに現れるのは設定の読み書きとエンドポイント登録に関するものだけ。

use apiwatch_common::error::CommonError;
use axum::http::StatusCode;
use thiserror::Error;

/// monitor error type
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Configuration could not be read or parsed
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(String),

    /// Configuration could not be persisted
    #[error("Failed to write configuration: {0}")]
    ConfigWrite(String),

    /// Endpoint name already registered
    #[error("Endpoint name already exists: {0}")]
    DuplicateName(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MonitorError {
    /// Returns the message shown to API clients.
    ///
    /// Validation and duplicate-name errors are descriptive so the dashboard can show them;
    /// I/O failures are summarized and the details stay in the server log.
    pub fn external_message(&self) -> String {
        match self {
            Self::Common(CommonError::Validation(message)) => message.clone(),
            Self::Common(_) => "Request error".to_string(),
            Self::DuplicateName(_) => self.to_string(),
            Self::ConfigLoad(_) => "Configuration unavailable".to_string(),
            Self::ConfigWrite(_) => "Failed to save configuration".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Common(_) => StatusCode::BAD_REQUEST,
            Self::DuplicateName(_) => StatusCode::BAD_REQUEST,
            Self::ConfigLoad(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigWrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
