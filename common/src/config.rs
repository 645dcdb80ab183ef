//! 設定ドキュメント
//!
//! 監視対象エンドポイント一覧とデフォルト間隔を保持するJSON設定の構造体

use crate::error::CommonError;
use crate::types::Endpoint;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 間隔が設定されていない場合に使う最終フォールバック（分）
pub const FALLBACK_TEST_INTERVAL_MINUTES: u64 = 1;

/// 監視設定ドキュメント
///
/// 未知のトップレベルキーは `extra` に保持し、書き戻し時に失わないようにする。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonitorConfig {
    /// 監視対象エンドポイント（順序を保持）
    pub endpoints: Vec<Endpoint>,
    /// エンドポイント個別の間隔が無い場合のテスト間隔（分）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_test_interval: Option<u64>,
    /// タイムアウト（参考値）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// その他のキー
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MonitorConfig {
    /// JSON文字列から読み込む
    pub fn from_json_str(content: &str) -> Result<Self, CommonError> {
        Ok(serde_json::from_str(content)?)
    }

    /// 整形済みJSONに変換
    pub fn to_json_pretty(&self) -> Result<String, CommonError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// エンドポイントの実効テスト間隔（分）
    ///
    /// エンドポイント個別値 → `defaultTestInterval` → 1分の順に、0でない最初の値を使う。
    pub fn effective_interval(&self, endpoint: &Endpoint) -> u64 {
        endpoint
            .test_interval
            .filter(|minutes| *minutes > 0)
            .or(self.default_test_interval.filter(|minutes| *minutes > 0))
            .unwrap_or(FALLBACK_TEST_INTERVAL_MINUTES)
    }

    /// 名前でエンドポイントを検索
    pub fn find(&self, name: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|ep| ep.name == name)
    }

    /// 指定名のエンドポイントが存在するか
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// 重複を除いたエンドポイント名の数
    pub fn distinct_endpoint_count(&self) -> usize {
        self.endpoints
            .iter()
            .map(|ep| ep.name.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// 重複しているエンドポイント名（出現順）
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for ep in &self.endpoints {
            if !seen.insert(ep.name.as_str()) && !duplicates.contains(&ep.name) {
                duplicates.push(ep.name.clone());
            }
        }
        duplicates
    }
}
