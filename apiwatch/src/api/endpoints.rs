//! エンドポイント登録API

use super::error::AppError;
use crate::AppState;
use apiwatch_common::protocol::{
    RegisterEndpointRequest, RegisterEndpointResponse, RegisteredEndpoint,
};
use axum::{extract::rejection::JsonRejection, extract::State, Json};

/// POST /api/endpoint - エンドポイント登録
///
/// 検証 → 重複チェック → 設定ファイルへ追記 → 再読込 → 全体テスト（非同期）。
/// 重複や検証エラーのときは設定ファイルに触れない。
pub async fn register_endpoint(
    State(state): State<AppState>,
    payload: Result<Json<RegisterEndpointRequest>, JsonRejection>,
) -> Result<Json<RegisterEndpointResponse>, AppError> {
    let Json(req) = payload?;
    let endpoint = req.into_endpoint()?;
    let endpoint = state.monitor.register_endpoint(endpoint).await?;

    Ok(Json(RegisterEndpointResponse {
        success: true,
        message: "Endpoint added".to_string(),
        data: RegisteredEndpoint::from(&endpoint),
    }))
}
