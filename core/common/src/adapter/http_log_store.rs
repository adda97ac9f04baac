//! Data API 形式の HTTP ログストア
//!
//! POST {base_url}/action/find
//! 本文: {"database", "collection", "filter": {"unique_id": ..}, "sort": {"timestamp": -1}}
//! 応答: {"documents": [...]}

use crate::domain::history::{IDENTIFIER_FIELD, TIMESTAMP_FIELD};
use crate::domain::Identifier;
use crate::error::Error;
use crate::ports::outbound::{Log, LogLevel, LogRecord, LogStore};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;

use super::http_client::truncate_diagnostic;
use super::NoopLog;

/// 1 回の検索で取得する最大件数。これより古い履歴は表示しない。
const FIND_LIMIT: usize = 1000;

/// 上限ちょうどの件数が返った場合（古い履歴が切り捨てられた可能性がある）の警告
fn limit_warning(found: usize) -> Option<LogRecord> {
    if found < FIND_LIMIT {
        return None;
    }
    Some(
        LogRecord::new(
            LogLevel::Warn,
            format!("history truncated to the newest {} records", FIND_LIMIT),
        )
        .layer("adapter")
        .kind("history")
        .field("limit", FIND_LIMIT),
    )
}

pub struct HttpLogStore {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: Option<String>,
    database: String,
    collection: String,
    timeout: Duration,
    log: Arc<dyn Log>,
}

impl HttpLogStore {
    pub fn new(
        client: reqwest::blocking::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        database: impl Into<String>,
        collection: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
            database: database.into(),
            collection: collection.into(),
            timeout,
            log: Arc::new(NoopLog),
        }
    }

    pub fn with_log(mut self, log: Arc<dyn Log>) -> Self {
        self.log = log;
        self
    }

    /// 識別子の完全一致 + タイムスタンプ降順の検索本文
    pub fn find_request_body(&self, identifier: &Identifier) -> Value {
        let mut filter = Map::new();
        filter.insert(IDENTIFIER_FIELD.to_string(), json!(identifier.as_str()));
        let mut sort = Map::new();
        sort.insert(TIMESTAMP_FIELD.to_string(), json!(-1));
        json!({
            "database": self.database,
            "collection": self.collection,
            "filter": filter,
            "sort": sort,
            "limit": FIND_LIMIT,
        })
    }
}

/// find 応答からドキュメント列を取り出す
pub fn parse_find_response(v: &Value) -> Result<Vec<Value>, Error> {
    v.get("documents")
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| Error::Json("log store response has no 'documents' array".to_string()))
}

impl LogStore for HttpLogStore {
    fn find_by_identifier(&self, identifier: &Identifier) -> Result<Vec<Value>, Error> {
        let url = format!("{}/action/find", self.base_url);
        let mut builder = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(&self.find_request_body(identifier));
        if let Some(key) = &self.api_key {
            builder = builder.header("api-key", key);
        }
        let response = builder
            .send()
            .map_err(|e| Error::io_msg(format!("log store request failed: {}", e)))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| Error::io_msg(format!("Failed to read log store response: {}", e)))?;
        if !status.is_success() {
            return Err(Error::io_msg(format!(
                "log store returned HTTP {}: {}",
                status.as_u16(),
                truncate_diagnostic(&text, 300)
            )));
        }
        let v: Value = serde_json::from_str(&text)?;
        let documents = parse_find_response(&v)?;
        if let Some(rec) = limit_warning(documents.len()) {
            let _ = self.log.log(&rec.field("unique_id", identifier.as_str()));
        }
        Ok(documents)
    }
}
