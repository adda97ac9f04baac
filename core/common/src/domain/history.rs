//! クエリ履歴レコード
//!
//! ログストアに別経路で書き込まれたドキュメントを読み取り専用で保持する。
//! 既知フィールド以外は extra にそのまま残す。

use crate::domain::Identifier;
use crate::error::Error;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};

/// ドキュメント内の識別子フィールド名
pub const IDENTIFIER_FIELD: &str = "unique_id";
/// ドキュメント内のクエリ本文フィールド名
pub const QUERY_FIELD: &str = "query";
/// ドキュメント内のタイムスタンプフィールド名（ソートキー）
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// epoch 数値をミリ秒とみなす下限（これ未満は秒）
const EPOCH_MS_THRESHOLD: i64 = 100_000_000_000;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub identifier: Identifier,
    pub query_text: String,
    pub timestamp: DateTime<Utc>,
    pub extra: Map<String, Value>,
}

impl HistoryRecord {
    /// ログストアのドキュメント 1 件を解釈する。
    ///
    /// タイムスタンプが無い・解釈できない場合は Err（呼び出し側で除外する）。
    /// 識別子フィールドが無い場合は検索条件の識別子を使う。
    pub fn from_document(doc: &Value, queried: &Identifier) -> Result<Self, Error> {
        let obj = doc
            .as_object()
            .ok_or_else(|| Error::Json("history document is not an object".to_string()))?;

        let timestamp = obj
            .get(TIMESTAMP_FIELD)
            .and_then(parse_timestamp)
            .ok_or_else(|| Error::Json("history document has no valid timestamp".to_string()))?;

        let identifier = match obj.get(IDENTIFIER_FIELD).and_then(Value::as_str) {
            Some(s) => Identifier::parse(s).unwrap_or_else(|_| queried.clone()),
            None => queried.clone(),
        };

        let query_text = obj
            .get(QUERY_FIELD)
            .or_else(|| obj.get("query_text"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let extra = obj
            .iter()
            .filter(|(k, _)| {
                !matches!(
                    k.as_str(),
                    IDENTIFIER_FIELD | QUERY_FIELD | "query_text" | TIMESTAMP_FIELD | "_id"
                )
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self {
            identifier,
            query_text,
            timestamp,
            extra,
        })
    }

    /// 表示用: response フィールドがあれば先頭を返す
    pub fn response_preview(&self, max_chars: usize) -> Option<String> {
        let text = self.extra.get("response")?.as_str()?;
        let mut preview: String = text.chars().take(max_chars).collect();
        if text.chars().count() > max_chars {
            preview.push_str("...");
        }
        Some(preview)
    }
}

/// タイムスタンプ値を解釈する
///
/// 対応形式: RFC3339 文字列、"YYYY-MM-DD HH:MM:SS[.f]"（UTC とみなす）、
/// epoch 数値（秒 or ミリ秒）、拡張 JSON の {"$date": ...}。
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => {
            let n = n.as_i64()?;
            if n.abs() >= EPOCH_MS_THRESHOLD {
                Utc.timestamp_millis_opt(n).single()
            } else {
                Utc.timestamp_opt(n, 0).single()
            }
        }
        Value::Object(obj) => {
            let inner = obj.get("$date")?;
            match inner {
                Value::Object(o) => {
                    let ms = o.get("$numberLong")?.as_str()?.parse::<i64>().ok()?;
                    Utc.timestamp_millis_opt(ms).single()
                }
                Value::Number(n) => Utc.timestamp_millis_opt(n.as_i64()?).single(),
                other => parse_timestamp(other),
            }
        }
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}
