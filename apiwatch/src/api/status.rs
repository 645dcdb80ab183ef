//! テスト結果API

use super::error::AppError;
use crate::error::MonitorError;
use crate::AppState;
use apiwatch_common::protocol::{ConfigResponse, ConfigSummary, StatusResponse};
use axum::{extract::State, Json};
use tracing::info;

/// GET /api/status - キャッシュ済み結果の一覧
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse::new(state.monitor.get_results().await))
}

/// POST /api/test - 全エンドポイントを今すぐテスト
///
/// すべてのプローブが終わるまで応答しない。
pub async fn trigger_test(State(state): State<AppState>) -> Json<StatusResponse> {
    info!("Manual test of all endpoints requested");
    Json(StatusResponse::new(state.monitor.test_all_endpoints().await))
}

/// GET /api/config - APIキーを除いた設定概要
pub async fn get_config(State(state): State<AppState>) -> Result<Json<ConfigResponse>, AppError> {
    let config = state.monitor.current_config().await.ok_or_else(|| {
        MonitorError::ConfigLoad("configuration has not been loaded yet".to_string())
    })?;
    Ok(Json(ConfigResponse {
        success: true,
        data: ConfigSummary::from(&config),
    }))
}
