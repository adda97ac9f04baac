//! クエリ履歴の読み取り
//!
//! ログストアから識別子の完全一致で取得し、タイムスタンプ降順（新しい順）に並べる。
//! タイムスタンプが無い・解釈できないレコードは除外して続行する。

use common::domain::{HistoryRecord, Identifier};
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord, LogStore};
use std::sync::Arc;

pub struct HistoryReader {
    store: Arc<dyn LogStore>,
    log: Arc<dyn Log>,
}

impl HistoryReader {
    pub fn new(store: Arc<dyn LogStore>, log: Arc<dyn Log>) -> Self {
        Self { store, log }
    }

    pub fn list_history(&self, identifier: &Identifier) -> Result<Vec<HistoryRecord>, Error> {
        let docs = self
            .store
            .find_by_identifier(identifier)
            .map_err(history_error)?;
        let fetched = docs.len();

        let mut records: Vec<HistoryRecord> = docs
            .iter()
            .filter_map(|doc| HistoryRecord::from_document(doc, identifier).ok())
            .filter(|r| &r.identifier == identifier)
            .collect();

        let excluded = fetched - records.len();
        if excluded > 0 {
            let _ = self.log.log(
                &LogRecord::new(LogLevel::Warn, "excluded malformed history records")
                    .layer("usecase")
                    .kind("history")
                    .field("unique_id", identifier.as_str())
                    .field("excluded", excluded),
            );
        }

        // 安定ソート: 同時刻のレコードはストアの返した順を保つ
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let _ = self.log.log(
            &LogRecord::new(LogLevel::Info, "history loaded")
                .layer("usecase")
                .kind("history")
                .field("unique_id", identifier.as_str())
                .field("records", records.len()),
        );
        Ok(records)
    }
}

fn history_error(e: Error) -> Error {
    match e {
        Error::ConfigurationMissing(_) | Error::HistoryUnavailable(_) => e,
        other => Error::HistoryUnavailable(other.to_string()),
    }
}
