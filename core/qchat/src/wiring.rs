//! 配線: 設定から標準アダプタを組み立てて Services を作る
//!
//! HTTP クライアントとストアのクライアントはここで 1 度だけ作り、全セッションで共有する。
//! 欠落した設定の代わりには Unconfigured を差し込み、操作時に ConfigurationMissing を返す。

use std::sync::Arc;

use common::adapter::{
    build_client, FileJsonLog, HttpLogStore, HttpQueryStream, JsonlLogStore, NoopLog,
    QdrantScrollStore, StderrLog, TeeLog, Unconfigured,
};
use common::config::{AppConfig, LogStoreConfig, ENV_ENDPOINT, ENV_LOG_STORE, ENV_VECTOR_URL};
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord, LogStore, QueryStream, ScrollStore};

use crate::adapter::{NoopInterruptChecker, SigintChecker};
use crate::ports::outbound::InterruptChecker;
use crate::usecase::{HistoryReader, IdentifierCatalog, Services};

pub struct App {
    pub services: Services,
    /// 起動時に 1 回だけ表示する設定の警告
    pub warnings: Vec<String>,
}

/// ログ出力先を組み立てる（ファイル JSONL と、verbose 時の stderr）
pub fn wire_log(config: &AppConfig, verbose: bool) -> Arc<dyn Log> {
    let mut targets: Vec<Arc<dyn Log>> = Vec::new();
    if let Some(path) = &config.log_file {
        targets.push(Arc::new(FileJsonLog::new(path)));
    }
    if verbose {
        targets.push(Arc::new(StderrLog::new(true)));
    }
    match targets.len() {
        0 => Arc::new(NoopLog),
        1 => targets.remove(0),
        _ => Arc::new(TeeLog::new(targets)),
    }
}

/// 配線: 設定から App を組み立てる
pub fn wire_app(config: &AppConfig, verbose: bool) -> Result<App, Error> {
    let log = wire_log(config, verbose);
    let client = build_client(config.timeout)?;

    let scroll_store: Arc<dyn ScrollStore> = match &config.vector_store {
        Some(vs) => Arc::new(QdrantScrollStore::new(
            client.clone(),
            vs.clone(),
            config.timeout,
        )),
        None => Arc::new(Unconfigured::new(ENV_VECTOR_URL)),
    };

    let log_store: Arc<dyn LogStore> = match &config.log_store {
        Some(LogStoreConfig::Http {
            base_url,
            api_key,
            database,
            collection,
        }) => Arc::new(HttpLogStore::new(
            client.clone(),
            base_url.clone(),
            api_key.clone(),
            database.clone(),
            collection.clone(),
            config.timeout,
        )
        .with_log(Arc::clone(&log))),
        Some(LogStoreConfig::File(path)) => Arc::new(JsonlLogStore::new(path.clone())),
        None => Arc::new(Unconfigured::new(ENV_LOG_STORE)),
    };

    let query_stream: Arc<dyn QueryStream> = match &config.endpoint {
        Some(endpoint) => Arc::new(HttpQueryStream::new(client, endpoint.clone())),
        None => Arc::new(Unconfigured::new(ENV_ENDPOINT)),
    };

    let interrupt: Arc<dyn InterruptChecker> = match SigintChecker::new() {
        Ok(checker) => Arc::new(checker),
        Err(e) => {
            let _ = log.log(
                &LogRecord::new(LogLevel::Warn, format!("Ctrl+C handler unavailable: {}", e))
                    .layer("wiring")
                    .kind("config"),
            );
            Arc::new(NoopInterruptChecker)
        }
    };

    let services = Services {
        catalog: Arc::new(IdentifierCatalog::new(
            scroll_store,
            config.page_size,
            Arc::clone(&log),
        )),
        history: Arc::new(HistoryReader::new(log_store, Arc::clone(&log))),
        query_stream,
        interrupt,
        log,
    };

    let warnings = config.warnings();
    for w in &warnings {
        let _ = services.log.log(
            &LogRecord::new(LogLevel::Warn, w.as_str())
                .layer("wiring")
                .kind("config"),
        );
    }
    Ok(App { services, warnings })
}
