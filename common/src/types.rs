//! 共通型定義
//!
//! Endpoint, TestStatus, TestResult等のコアデータ型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 監視対象エンドポイント（設定ファイルの1要素）
///
/// `api_key` は外部へ出してはいけないため、`Debug` 出力でも伏せ字にする。
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// エンドポイント名（設定全体で一意）
    pub name: String,
    /// APIベースURL
    pub api_base: String,
    /// APIキー
    pub api_key: String,
    /// テスト間隔（分）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_interval: Option<u64>,
    /// 招待リンク
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invite_link: Option<String>,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("name", &self.name)
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .field("test_interval", &self.test_interval)
            .field("invite_link", &self.invite_link)
            .finish()
    }
}

/// テストステータス
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// 未テスト
    Unknown,
    /// テスト実行中
    Testing,
    /// 成功応答あり
    Online,
    /// HTTPエラー検出・プローブ失敗
    Offline,
    /// 成功マーカー未検出
    Error,
}

impl TestStatus {
    /// 文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Unknown => "unknown",
            TestStatus::Testing => "testing",
            TestStatus::Online => "online",
            TestStatus::Offline => "offline",
            TestStatus::Error => "error",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// テスト中プレースホルダーのエラー文言
pub const TESTING_PLACEHOLDER_MESSAGE: &str = "test in progress";

/// エンドポイントごとの最新テスト結果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// エンドポイント名
    pub name: String,
    /// APIベースURL
    pub api_base: String,
    /// 招待リンク（未設定時は空文字）
    #[serde(default)]
    pub invite_link: String,
    /// ステータス
    pub status: TestStatus,
    /// 応答時間（ミリ秒）
    pub response_time: Option<u64>,
    /// エラー詳細
    pub error: Option<String>,
    /// 最終チェック時刻
    pub last_checked: Option<DateTime<Utc>>,
}

impl TestResult {
    /// 指定ステータスで空の結果を作成
    pub fn new(endpoint: &Endpoint, status: TestStatus) -> Self {
        Self {
            name: endpoint.name.clone(),
            api_base: endpoint.api_base.clone(),
            invite_link: endpoint.invite_link.clone().unwrap_or_default(),
            status,
            response_time: None,
            error: None,
            last_checked: None,
        }
    }

    /// 一度もテストされていないエンドポイントのプレースホルダー
    pub fn unknown(endpoint: &Endpoint) -> Self {
        Self::new(endpoint, TestStatus::Unknown)
    }

    /// テスト実行中でキャッシュが無い場合のプレースホルダー
    pub fn testing(endpoint: &Endpoint) -> Self {
        Self {
            error: Some(TESTING_PLACEHOLDER_MESSAGE.to_string()),
            last_checked: Some(Utc::now()),
            ..Self::new(endpoint, TestStatus::Testing)
        }
    }
}
