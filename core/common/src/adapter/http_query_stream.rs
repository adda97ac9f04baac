//! 推論 API へのストリーミング POST
//!
//! POST <endpoint> {"query": .., "unique_id": ..}
//! 応答本文のチャンクがそのまま回答テキスト（到着順）。非 2xx はエラー。

use crate::domain::{Identifier, Query};
use crate::error::Error;
use crate::ports::outbound::{FragmentStream, QueryStream};
use serde_json::{json, Value};

use super::fragment_reader::FragmentReader;
use super::http_client::truncate_diagnostic;

/// エラー本文として表示する最大文字数
const DIAGNOSTIC_MAX_CHARS: usize = 500;

pub struct HttpQueryStream {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpQueryStream {
    pub fn new(client: reqwest::blocking::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

pub fn query_request_body(query: &Query, identifier: &Identifier) -> Value {
    json!({
        "query": &**query,
        "unique_id": identifier.as_str(),
    })
}

/// エラー応答本文から表示用メッセージを作る（JSON の detail / error / message を優先）
pub fn diagnostic_from_body(body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "error", "message"] {
            match v.get(key) {
                Some(Value::String(s)) => return truncate_diagnostic(s, DIAGNOSTIC_MAX_CHARS),
                Some(Value::Object(o)) => {
                    if let Some(Value::String(s)) = o.get("message") {
                        return truncate_diagnostic(s, DIAGNOSTIC_MAX_CHARS);
                    }
                }
                _ => {}
            }
        }
    }
    let text = truncate_diagnostic(body, DIAGNOSTIC_MAX_CHARS);
    if text.is_empty() {
        "(empty response body)".to_string()
    } else {
        text
    }
}

impl QueryStream for HttpQueryStream {
    fn stream_query(&self, query: &Query, identifier: &Identifier) -> Result<FragmentStream, Error> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&query_request_body(query, identifier))
            .send()
            .map_err(|e| Error::RemoteQueryFailed {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::RemoteQueryFailed {
                status: Some(status.as_u16()),
                message: diagnostic_from_body(&body),
            });
        }
        Ok(Box::new(FragmentReader::new(response)))
    }
}
