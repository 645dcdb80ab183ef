//! 実行中テストの集合
//!
//! 同じエンドポイントに対してプローブが同時に2つ走らないようにする。
//! ガードを落とすと名前が集合から外れるので、プローブがパニックしても取り残されない。

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// 実行中エンドポイント名の集合
#[derive(Debug, Clone, Default)]
pub struct InFlightSet {
    names: Arc<Mutex<HashSet<String>>>,
}

impl InFlightSet {
    /// 空の集合を作成
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.names.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 実行権を取得する。既に実行中なら `None`
    pub fn try_acquire(&self, name: &str) -> Option<InFlightGuard> {
        if !self.lock().insert(name.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            names: self.names.clone(),
            name: name.to_string(),
        })
    }

    /// 実行中かどうか
    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    /// 実行中の件数
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// 実行中のものが無いか
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// 実行権。Drop時に集合から外れる
#[derive(Debug)]
pub struct InFlightGuard {
    names: Arc<Mutex<HashSet<String>>>,
    name: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.names
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.name);
    }
}
