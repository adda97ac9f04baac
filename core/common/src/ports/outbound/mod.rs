//! Outbound ポート: アプリが外界（ベクトルストア・ログストア・推論 API・ログ・設定）を使うための trait

pub mod config_resolver;
pub mod log;
pub mod log_store;
pub mod query_stream;
pub mod scroll_store;

pub use config_resolver::ConfigResolver;
pub use log::{now_iso8601, Log, LogLevel, LogRecord};
pub use log_store::LogStore;
pub use query_stream::{FragmentStream, QueryStream};
pub use scroll_store::{Cursor, ScrollPage, ScrollRecord, ScrollRequest, ScrollStore};
