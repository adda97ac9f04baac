//! ページング（scroll）読み取りストア Outbound ポート
//!
//! カーソルを渡すと 1 ページ分のレコードと次カーソルを返す。次カーソルが None なら終端。

use crate::error::Error;
use serde_json::{Map, Value};

/// 次ページを取得するための不透明なトークン（数値・UUID 文字列など）
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor(Value);

impl Cursor {
    /// null は「次ページなし」を意味するため None を返す
    pub fn from_value(v: Value) -> Option<Self> {
        if v.is_null() {
            None
        } else {
            Some(Self(v))
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// scroll の要求
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollRequest {
    /// None なら先頭から
    pub cursor: Option<Cursor>,
    /// 1 ページの最大件数（1 以上）
    pub limit: usize,
    /// 取得する payload フィールド（空なら全フィールド）
    pub payload_fields: Vec<String>,
}

/// scroll で返る 1 レコード（payload のみ保持）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScrollRecord {
    pub payload: Map<String, Value>,
}

/// scroll の 1 ページ分
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScrollPage {
    pub records: Vec<ScrollRecord>,
    pub next_cursor: Option<Cursor>,
}

/// ページング読み取りストア（Outbound ポート）
///
/// 実装は `common::adapter::QdrantScrollStore` やテスト用のスタブなど。
/// プロセスで 1 度生成し、セッション間で共有する。
pub trait ScrollStore: Send + Sync {
    fn scroll(&self, request: &ScrollRequest) -> Result<ScrollPage, Error>;
}
