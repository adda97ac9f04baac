//! 識別子カタログ
//!
//! カーソル付きページングのストアを先頭から終端まで辿り、payload の識別子フィールドを
//! 集合に集める。重複は集合で自然に除かれる。

use common::domain::history::IDENTIFIER_FIELD;
use common::domain::Identifier;
use common::error::Error;
use common::ports::outbound::{Cursor, Log, LogLevel, LogRecord, ScrollRequest, ScrollStore};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::sync::Arc;

pub struct IdentifierCatalog {
    store: Arc<dyn ScrollStore>,
    page_size: NonZeroUsize,
    field: String,
    log: Arc<dyn Log>,
}

impl IdentifierCatalog {
    pub fn new(store: Arc<dyn ScrollStore>, page_size: NonZeroUsize, log: Arc<dyn Log>) -> Self {
        Self {
            store,
            page_size,
            field: IDENTIFIER_FIELD.to_string(),
            log,
        }
    }

    /// 全識別子を返す。0 件は空集合（エラーではない）。
    ///
    /// ストアの最終ページが次カーソル None を返す限り、取得回数は
    /// ceil(総件数 / ページサイズ)（0 件のときは 1 回）。
    pub fn list_identifiers(&self) -> Result<BTreeSet<Identifier>, Error> {
        let mut ids = BTreeSet::new();
        let mut cursor: Option<Cursor> = None;
        let mut pages = 0usize;
        let mut records = 0usize;

        loop {
            let request = ScrollRequest {
                cursor: cursor.clone(),
                limit: self.page_size.get(),
                payload_fields: vec![self.field.clone()],
            };
            let page = self.store.scroll(&request).map_err(catalog_error)?;
            pages += 1;
            records += page.records.len();
            ids.extend(
                page.records
                    .iter()
                    .filter_map(|r| identifier_of(&r.payload, &self.field)),
            );

            match page.next_cursor {
                None => break,
                // 同じカーソルが返り続けると終わらないので打ち切る
                Some(next) if cursor.as_ref() == Some(&next) => {
                    return Err(Error::CatalogUnavailable(
                        "store returned the same cursor twice".to_string(),
                    ));
                }
                Some(next) => cursor = Some(next),
            }
        }

        let _ = self.log.log(
            &LogRecord::new(LogLevel::Info, "identifier catalog loaded")
                .layer("usecase")
                .kind("catalog")
                .field("pages", pages)
                .field("records", records)
                .field("identifiers", ids.len()),
        );
        Ok(ids)
    }
}

/// payload から識別子を取り出す（文字列か数値のみ。空文字は無視）
fn identifier_of(payload: &Map<String, Value>, field: &str) -> Option<Identifier> {
    match payload.get(field)? {
        Value::String(s) => Identifier::parse(s).ok(),
        Value::Number(n) => Identifier::parse(&n.to_string()).ok(),
        _ => None,
    }
}

fn catalog_error(e: Error) -> Error {
    match e {
        Error::ConfigurationMissing(_) | Error::CatalogUnavailable(_) => e,
        other => Error::CatalogUnavailable(other.to_string()),
    }
}
