//! ローカル JSONL ファイルを読むログストア
//!
//! 1 行 1 ドキュメント。ファイルが無ければ 0 件（まだ何も記録されていない）として扱う。
//! JSON として読めない行は読み飛ばす。

use crate::domain::history::IDENTIFIER_FIELD;
use crate::domain::Identifier;
use crate::error::Error;
use crate::ports::outbound::LogStore;
use serde_json::Value;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

pub struct JsonlLogStore {
    path: PathBuf,
}

impl JsonlLogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LogStore for JsonlLogStore {
    fn find_by_identifier(&self, identifier: &Identifier) -> Result<Vec<Value>, Error> {
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::io_msg(format!(
                    "Failed to open {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        let mut docs = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| Error::io_msg(format!("Failed to read log store: {}", e)))?;
            if line.trim().is_empty() {
                continue;
            }
            let Ok(doc) = serde_json::from_str::<Value>(&line) else {
                continue;
            };
            if doc.get(IDENTIFIER_FIELD).and_then(Value::as_str) == Some(identifier.as_str()) {
                docs.push(doc);
            }
        }
        Ok(docs)
    }
}
