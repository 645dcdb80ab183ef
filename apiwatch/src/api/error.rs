//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use crate::error::MonitorError;
use apiwatch_common::error::CommonError;
use apiwatch_common::protocol::ErrorResponse;
use axum::{extract::rejection::JsonRejection, response::IntoResponse, Json};
use tracing::{error, warn};

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(pub MonitorError);

impl From<MonitorError> for AppError {
    fn from(err: MonitorError) -> Self {
        AppError(err)
    }
}

impl From<CommonError> for AppError {
    fn from(err: CommonError) -> Self {
        AppError(MonitorError::Common(err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(MonitorError::Common(CommonError::Validation(
            rejection.body_text(),
        )))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();
        // full details stay in the log, clients get external_message()
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        } else {
            warn!(error = %self.0, "Request rejected");
        }
        (status, Json(ErrorResponse::new(self.0.external_message()))).into_response()
    }
}
