//! プローブ出力の判定

use apiwatch_common::types::TestStatus;
use once_cell::sync::Lazy;
use regex::Regex;

/// 成功マーカーもHTTPエラーも見つからなかったときのエラー詳細
pub const NO_SUCCESS_MARKER_MESSAGE: &str = "no success marker detected";

/// 4xx/5xx ステータスコード（前後が数字でない3桁）
static HTTP_ERROR_STATUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^0-9])([45][0-9]{2})(?:[^0-9]|$)").expect("valid regex"));

/// 判定結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// 判定ステータス
    pub status: TestStatus,
    /// エラー詳細（online 以外）
    pub error: Option<String>,
}

/// 出力中の最初の4xx/5xxステータスコードを返す
pub fn find_http_error_status(output: &str) -> Option<u16> {
    HTTP_ERROR_STATUS
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// プローブ出力を判定する
///
/// HTTPエラーコードの検出が成功マーカーより優先される。
/// エラー詳細には出力全体をそのまま入れる。
pub fn classify(output: &str, success_marker: &str) -> Classification {
    if find_http_error_status(output).is_some() {
        return Classification {
            status: TestStatus::Offline,
            error: Some(output.to_string()),
        };
    }
    if !success_marker.is_empty() && output.contains(success_marker) {
        return Classification {
            status: TestStatus::Online,
            error: None,
        };
    }
    Classification {
        status: TestStatus::Error,
        error: Some(NO_SUCCESS_MARKER_MESSAGE.to_string()),
    }
}
