//! アダプター（外界の I/O を ports の trait で実装する）
//!
//! usecase はこのモジュールの型を直接知らず、wiring が組み立てて注入する。

pub mod file_json_log;
pub mod fragment_reader;
pub mod http_client;
pub mod http_log_store;
pub mod http_query_stream;
pub mod jsonl_log_store;
pub mod qdrant_scroll_store;
pub mod std_config_resolver;
pub mod stderr_log;
pub mod unconfigured;

pub use file_json_log::{FileJsonLog, NoopLog, TeeLog};
pub use fragment_reader::FragmentReader;
pub use http_client::build_client;
pub use http_log_store::HttpLogStore;
pub use http_query_stream::HttpQueryStream;
pub use jsonl_log_store::JsonlLogStore;
pub use qdrant_scroll_store::QdrantScrollStore;
pub use std_config_resolver::StdConfigResolver;
pub use stderr_log::StderrLog;
pub use unconfigured::Unconfigured;
