//! プロセス全体の設定
//!
//! 起動時に環境変数（＋CLI 上書き）から 1 度だけ解決する。
//! 各項目は欠落しても起動は続行し、警告を 1 回出す。欠落した設定を必要とする操作は
//! 呼び出し時に `Error::ConfigurationMissing` で即座に失敗する。

use crate::error::Error;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_ENDPOINT: &str = "QCHAT_ENDPOINT";
pub const ENV_LOG_STORE: &str = "QCHAT_LOG_STORE";
pub const ENV_LOG_STORE_API_KEY: &str = "QCHAT_LOG_STORE_API_KEY";
pub const ENV_LOG_STORE_DATABASE: &str = "QCHAT_LOG_STORE_DATABASE";
pub const ENV_LOG_STORE_COLLECTION: &str = "QCHAT_LOG_STORE_COLLECTION";
pub const ENV_VECTOR_URL: &str = "QCHAT_VECTOR_URL";
pub const ENV_VECTOR_API_KEY: &str = "QCHAT_VECTOR_API_KEY";
pub const ENV_VECTOR_COLLECTION: &str = "QCHAT_VECTOR_COLLECTION";
pub const ENV_PAGE_SIZE: &str = "QCHAT_PAGE_SIZE";
pub const ENV_TIMEOUT_SECS: &str = "QCHAT_TIMEOUT_SECS";
pub const ENV_LOG_FILE: &str = "QCHAT_LOG_FILE";

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_VECTOR_COLLECTION: &str = "documents";
pub const DEFAULT_LOG_STORE_DATABASE: &str = "qchat";
pub const DEFAULT_LOG_STORE_COLLECTION: &str = "queries";

/// ベクトルストア（識別子カタログの元データ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorStoreConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
}

/// ログストアの接続先
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogStoreConfig {
    /// Data API 形式の HTTP エンドポイント
    Http {
        base_url: String,
        api_key: Option<String>,
        database: String,
        collection: String,
    },
    /// ローカル JSONL ファイル（1 行 1 ドキュメント）
    File(PathBuf),
}

impl LogStoreConfig {
    /// 接続文字列を解釈する。http(s):// は HTTP、file:// またはそれ以外はファイルパス。
    pub fn parse(
        connection: &str,
        api_key: Option<String>,
        database: Option<String>,
        collection: Option<String>,
    ) -> Result<Self, Error> {
        let connection = connection.trim();
        if connection.is_empty() {
            return Err(Error::InvalidConfig(format!("{} is empty", ENV_LOG_STORE)));
        }
        if connection.starts_with("http://") || connection.starts_with("https://") {
            return Ok(Self::Http {
                base_url: connection.trim_end_matches('/').to_string(),
                api_key,
                database: database.unwrap_or_else(|| DEFAULT_LOG_STORE_DATABASE.to_string()),
                collection: collection.unwrap_or_else(|| DEFAULT_LOG_STORE_COLLECTION.to_string()),
            });
        }
        let path = connection.strip_prefix("file://").unwrap_or(connection);
        Ok(Self::File(PathBuf::from(path)))
    }
}

/// 解決済みの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub endpoint: Option<String>,
    pub log_store: Option<LogStoreConfig>,
    pub vector_store: Option<VectorStoreConfig>,
    pub page_size: NonZeroUsize,
    pub timeout: Duration,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            log_store: None,
            vector_store: None,
            page_size: NonZeroUsize::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_file: None,
        }
    }
}

impl AppConfig {
    /// 名前 → 値 のルックアップから組み立てる（空文字は未設定扱い）。
    ///
    /// 形式不正（ページサイズ 0・数値でない等）のみ Err を返す。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let log_store = match get(ENV_LOG_STORE) {
            Some(conn) => Some(LogStoreConfig::parse(
                &conn,
                get(ENV_LOG_STORE_API_KEY),
                get(ENV_LOG_STORE_DATABASE),
                get(ENV_LOG_STORE_COLLECTION),
            )?),
            None => None,
        };

        let vector_store = get(ENV_VECTOR_URL).map(|url| VectorStoreConfig {
            url: url.trim_end_matches('/').to_string(),
            api_key: get(ENV_VECTOR_API_KEY),
            collection: get(ENV_VECTOR_COLLECTION)
                .unwrap_or_else(|| DEFAULT_VECTOR_COLLECTION.to_string()),
        });

        let mut cfg = Self {
            endpoint: get(ENV_ENDPOINT),
            log_store,
            vector_store,
            log_file: get(ENV_LOG_FILE).map(PathBuf::from),
            ..Self::default()
        };
        if let Some(raw) = get(ENV_PAGE_SIZE) {
            cfg.page_size = parse_page_size(&raw)?;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            let secs = raw.parse::<u64>().map_err(|_| {
                Error::InvalidConfig(format!("{} must be a number of seconds: {}", ENV_TIMEOUT_SECS, raw))
            })?;
            cfg.timeout = Duration::from_secs(secs);
        }
        Ok(cfg)
    }

    /// 欠落している設定ごとの警告文（起動時に 1 回表示する）
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.endpoint.is_none() {
            out.push(format!("{} is not set; chat queries are disabled", ENV_ENDPOINT));
        }
        if self.vector_store.is_none() {
            out.push(format!(
                "{} is not set; the unique ID list is unavailable",
                ENV_VECTOR_URL
            ));
        }
        if self.log_store.is_none() {
            out.push(format!("{} is not set; query history is disabled", ENV_LOG_STORE));
        }
        out
    }
}

pub fn parse_page_size(raw: &str) -> Result<NonZeroUsize, Error> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| {
            Error::InvalidConfig(format!("{} must be an integer >= 1: {}", ENV_PAGE_SIZE, raw))
        })
}
