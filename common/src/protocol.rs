//! 通信プロトコル定義
//!
//! ダッシュボード↔サーバー間のHTTPメッセージ

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::MonitorConfig;
use crate::error::CommonError;
use crate::types::{Endpoint, TestResult};

/// テスト結果一覧レスポンス（`GET /api/status`, `POST /api/test`）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    /// 成功フラグ
    pub success: bool,
    /// エンドポイントごとの結果
    pub data: Vec<TestResult>,
    /// 応答生成時刻
    pub timestamp: DateTime<Utc>,
}

impl StatusResponse {
    /// 現在時刻で成功レスポンスを作成
    pub fn new(data: Vec<TestResult>) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now(),
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// 常に false
    pub success: bool,
    /// エラーメッセージ
    pub error: String,
}

impl ErrorResponse {
    /// メッセージからエラーレスポンスを作成
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// APIキーを除いたエンドポイント概要
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSummary {
    /// エンドポイント名
    pub name: String,
    /// APIベースURL
    pub api_base: String,
}

/// 公開用の設定概要
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSummary {
    /// エンドポイント一覧
    pub endpoints: Vec<EndpointSummary>,
    /// デフォルトテスト間隔（分）
    pub default_test_interval: Option<u64>,
    /// タイムアウト（参考値）
    pub timeout: Option<u64>,
}

impl From<&MonitorConfig> for ConfigSummary {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            endpoints: config
                .endpoints
                .iter()
                .map(|ep| EndpointSummary {
                    name: ep.name.clone(),
                    api_base: ep.api_base.clone(),
                })
                .collect(),
            default_test_interval: config.default_test_interval,
            timeout: config.timeout,
        }
    }
}

/// 設定概要レスポンス（`GET /api/config`）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigResponse {
    /// 成功フラグ
    pub success: bool,
    /// 設定概要
    pub data: ConfigSummary,
}

/// エンドポイント登録リクエスト（`POST /api/endpoint`）
///
/// `testInterval` は数値と数値文字列の両方を受け付ける。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterEndpointRequest {
    /// エンドポイント名
    #[serde(default)]
    pub name: Option<String>,
    /// APIベースURL
    #[serde(default)]
    pub api_base: Option<String>,
    /// APIキー
    #[serde(default)]
    pub api_key: Option<String>,
    /// テスト間隔（分）
    #[serde(default)]
    pub test_interval: Option<serde_json::Value>,
    /// 招待リンク
    #[serde(default)]
    pub invite_link: Option<String>,
}

impl RegisterEndpointRequest {
    /// 必須項目を検証して `Endpoint` に変換する
    pub fn into_endpoint(self) -> Result<Endpoint, CommonError> {
        let name = non_empty(self.name);
        let api_base = non_empty(self.api_base);
        let api_key = non_empty(self.api_key);
        let test_interval = self.test_interval.filter(|v| !is_blank(v));

        let mut missing = Vec::new();
        if name.is_none() {
            missing.push("name");
        }
        if api_base.is_none() {
            missing.push("apiBase");
        }
        if api_key.is_none() {
            missing.push("apiKey");
        }
        if test_interval.is_none() {
            missing.push("testInterval");
        }
        let (Some(name), Some(api_base), Some(api_key), Some(test_interval)) =
            (name, api_base, api_key, test_interval)
        else {
            return Err(CommonError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        };

        let minutes = parse_interval(&test_interval).ok_or_else(|| {
            CommonError::Validation(format!(
                "testInterval must be a positive integer (minutes), got {test_interval}"
            ))
        })?;

        Ok(Endpoint {
            name,
            api_base,
            api_key,
            test_interval: Some(minutes),
            invite_link: non_empty(self.invite_link),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn is_blank(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.trim().is_empty(),
        serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

fn parse_interval(value: &serde_json::Value) -> Option<u64> {
    let minutes = match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    (minutes > 0).then_some(minutes)
}

/// 登録済みエンドポイント（APIキーを除く）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredEndpoint {
    /// エンドポイント名
    pub name: String,
    /// APIベースURL
    pub api_base: String,
    /// テスト間隔（分）
    pub test_interval: Option<u64>,
    /// 招待リンク
    pub invite_link: String,
}

impl From<&Endpoint> for RegisteredEndpoint {
    fn from(endpoint: &Endpoint) -> Self {
        Self {
            name: endpoint.name.clone(),
            api_base: endpoint.api_base.clone(),
            test_interval: endpoint.test_interval,
            invite_link: endpoint.invite_link.clone().unwrap_or_default(),
        }
    }
}

/// エンドポイント登録レスポンス
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterEndpointResponse {
    /// 成功フラグ
    pub success: bool,
    /// メッセージ
    pub message: String,
    /// 登録内容
    pub data: RegisteredEndpoint,
}

/// ライブネスレスポンス（`GET /health`）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    /// 常に "ok"
    pub status: String,
}
