//! apiwatch 共通型定義
//!
//! エンドポイント設定・テスト結果・HTTPレスポンス形式など、
//! サーバー本体とツール類で共有する型をまとめる。

#![warn(missing_docs)]

/// 設定ドキュメント
pub mod config;

/// エラー型
pub mod error;

/// HTTP API のリクエスト/レスポンス形式
pub mod protocol;

/// コアデータ型
pub mod types;
