//! Qdrant の scroll API を使う ScrollStore 実装
//!
//! POST {url}/collections/{collection}/points/scroll
//! 応答: {"result": {"points": [{"id": .., "payload": {..}}], "next_page_offset": <id|null>}}

use crate::config::VectorStoreConfig;
use crate::error::Error;
use crate::ports::outbound::{Cursor, ScrollPage, ScrollRecord, ScrollRequest, ScrollStore};
use serde_json::{json, Value};
use std::time::Duration;

use super::http_client::truncate_diagnostic;

pub struct QdrantScrollStore {
    client: reqwest::blocking::Client,
    config: VectorStoreConfig,
    timeout: Duration,
}

impl QdrantScrollStore {
    pub fn new(client: reqwest::blocking::Client, config: VectorStoreConfig, timeout: Duration) -> Self {
        Self {
            client,
            config,
            timeout,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/collections/{}/points/scroll",
            self.config.url, self.config.collection
        )
    }
}

/// scroll 要求の JSON 本文
pub fn scroll_request_body(request: &ScrollRequest) -> Value {
    let with_payload = if request.payload_fields.is_empty() {
        json!(true)
    } else {
        json!(request.payload_fields)
    };
    let mut body = json!({
        "limit": request.limit,
        "with_payload": with_payload,
        "with_vector": false,
    });
    if let Some(cursor) = &request.cursor {
        body["offset"] = cursor.as_value().clone();
    }
    body
}

/// scroll 応答を ScrollPage に変換する
pub fn parse_scroll_response(v: &Value) -> Result<ScrollPage, Error> {
    let result = v
        .get("result")
        .ok_or_else(|| Error::Json("scroll response has no 'result'".to_string()))?;
    let points = result
        .get("points")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Json("scroll response has no 'points' array".to_string()))?;

    let records = points
        .iter()
        .map(|p| ScrollRecord {
            payload: p
                .get("payload")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        })
        .collect();

    let next_cursor = result
        .get("next_page_offset")
        .cloned()
        .and_then(Cursor::from_value);

    Ok(ScrollPage {
        records,
        next_cursor,
    })
}

impl ScrollStore for QdrantScrollStore {
    fn scroll(&self, request: &ScrollRequest) -> Result<ScrollPage, Error> {
        let mut builder = self
            .client
            .post(self.url())
            .timeout(self.timeout)
            .json(&scroll_request_body(request));
        if let Some(key) = &self.config.api_key {
            builder = builder.header("api-key", key);
        }
        let response = builder
            .send()
            .map_err(|e| Error::io_msg(format!("vector store request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| Error::io_msg(format!("Failed to read vector store response: {}", e)))?;
        if !status.is_success() {
            return Err(Error::io_msg(format!(
                "vector store returned HTTP {}: {}",
                status.as_u16(),
                truncate_diagnostic(&text, 300)
            )));
        }
        let v: Value = serde_json::from_str(&text)?;
        parse_scroll_response(&v)
    }
}
