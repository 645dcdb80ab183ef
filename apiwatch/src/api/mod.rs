//! REST APIハンドラー
//!
//! ダッシュボード向けの結果取得・手動テスト・設定参照・エンドポイント登録

pub mod endpoints;
pub mod error;
pub mod health;
pub mod status;

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// APIルーターを作成
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(status::get_status))
        .route("/api/test", post(status::trigger_test))
        .route("/api/config", get(status::get_config))
        .route("/api/endpoint", post(endpoints::register_endpoint))
        .route("/health", get(health::health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
