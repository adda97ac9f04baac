//! クエリログストア Outbound ポート
//!
//! 識別子の完全一致で絞り込んだドキュメントを返す。並び替えは呼び出し側が保証する。

use crate::domain::Identifier;
use crate::error::Error;
use serde_json::Value;

/// ログストア（Outbound ポート）
///
/// 実装は `HttpLogStore`（Data API 形式）・`JsonlLogStore`（ローカル JSONL）など。
pub trait LogStore: Send + Sync {
    /// 識別子が一致するドキュメントを返す。0 件は空 Vec（エラーではない）。
    fn find_by_identifier(&self, identifier: &Identifier) -> Result<Vec<Value>, Error>;
}
