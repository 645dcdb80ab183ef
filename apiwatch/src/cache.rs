//! テスト結果キャッシュ
//!
//! エンドポイント名ごとに最新の結果を1件だけ保持する。プロセス内のみで永続化しない。

use apiwatch_common::types::{Endpoint, TestResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// エンドポイント名 → 最新結果
#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    results: Arc<RwLock<HashMap<String, TestResult>>>,
}

impl ResultCache {
    /// 空のキャッシュを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 最新結果を取得
    pub async fn get(&self, name: &str) -> Option<TestResult> {
        self.results.read().await.get(name).cloned()
    }

    /// 結果を上書き保存
    pub async fn insert(&self, result: TestResult) {
        self.results
            .write()
            .await
            .insert(result.name.clone(), result);
    }

    /// 保持件数
    pub async fn len(&self) -> usize {
        self.results.read().await.len()
    }

    /// 空かどうか
    pub async fn is_empty(&self) -> bool {
        self.results.read().await.is_empty()
    }

    /// 設定順に結果を並べる
    ///
    /// 未テストのエンドポイントは `unknown` のプレースホルダーで埋める。
    /// 設定から外れたエンドポイントの古い結果は返さない。
    pub async fn results_for(&self, endpoints: &[Endpoint]) -> Vec<TestResult> {
        let results = self.results.read().await;
        endpoints
            .iter()
            .map(|ep| {
                results
                    .get(&ep.name)
                    .cloned()
                    .unwrap_or_else(|| TestResult::unknown(ep))
            })
            .collect()
    }

    /// 保持している全結果（名前順）
    pub async fn all(&self) -> Vec<TestResult> {
        let mut all: Vec<TestResult> = self.results.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }
}
