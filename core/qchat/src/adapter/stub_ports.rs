//! テスト用: 固定データを返すポート実装

#[cfg(test)]
mod stub {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use common::adapter::NoopLog;
    use common::domain::{Identifier, Query, StreamFragment};
    use common::error::Error;
    use common::ports::outbound::{
        Cursor, FragmentStream, LogStore, QueryStream, ScrollPage, ScrollRecord, ScrollRequest,
        ScrollStore,
    };
    use serde_json::{json, Map, Value};

    use crate::adapter::NoopInterruptChecker;
    use crate::ports::outbound::{FragmentSink, InterruptChecker};
    use crate::usecase::{HistoryReader, IdentifierCatalog, Services};

    /// 数値オフセットをカーソルにするページングストア
    ///
    /// 最終ページ（end >= len）では次カーソル None を返す。
    pub struct StubScrollStore {
        payloads: Vec<Map<String, Value>>,
        pub calls: AtomicUsize,
        pub fail: bool,
    }

    impl StubScrollStore {
        pub fn with_identifiers(ids: &[&str]) -> Self {
            let payloads = ids
                .iter()
                .map(|id| {
                    let mut m = Map::new();
                    m.insert("unique_id".to_string(), json!(id));
                    m
                })
                .collect();
            Self::with_payloads(payloads)
        }

        pub fn with_payloads(payloads: Vec<Map<String, Value>>) -> Self {
            Self {
                payloads,
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        pub fn unreachable() -> Self {
            Self {
                fail: true,
                ..Self::with_payloads(Vec::new())
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ScrollStore for StubScrollStore {
        fn scroll(&self, request: &ScrollRequest) -> Result<ScrollPage, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::io_msg("connection refused"));
            }
            let start = request
                .cursor
                .as_ref()
                .and_then(|c| c.as_value().as_u64())
                .unwrap_or(0) as usize;
            let end = (start + request.limit).min(self.payloads.len());
            let records = self.payloads[start..end]
                .iter()
                .map(|p| ScrollRecord { payload: p.clone() })
                .collect();
            let next_cursor = if end < self.payloads.len() {
                Cursor::from_value(json!(end))
            } else {
                None
            };
            Ok(ScrollPage {
                records,
                next_cursor,
            })
        }
    }

    /// 識別子 → ドキュメント列を返すログストア
    pub struct StubLogStore {
        docs: Vec<Value>,
        fail: bool,
    }

    impl StubLogStore {
        pub fn new(docs: Vec<Value>) -> Self {
            Self { docs, fail: false }
        }

        pub fn unreachable() -> Self {
            Self {
                docs: Vec::new(),
                fail: true,
            }
        }
    }

    impl LogStore for StubLogStore {
        fn find_by_identifier(&self, identifier: &Identifier) -> Result<Vec<Value>, Error> {
            if self.fail {
                return Err(Error::io_msg("connection refused"));
            }
            Ok(self
                .docs
                .iter()
                .filter(|d| d.get("unique_id").and_then(Value::as_str) == Some(identifier.as_str()))
                .cloned()
                .collect())
        }
    }

    /// ストリームの振る舞い
    #[derive(Debug, Clone)]
    pub enum StubReply {
        /// 断片を全部返して正常終了
        Fragments(Vec<String>),
        /// 本文を読む前に失敗（非 2xx）
        Status(u16, String),
        /// 断片を返したあと接続断
        InterruptedAfter(Vec<String>),
        /// 断片を返し、最後の読み取り中に Ctrl+C が押されてから正常終了
        CtrlCAtEnd(Vec<String>, Arc<FlagInterrupt>),
    }

    /// 送信内容を記録し、用意した応答を順に返す推論ストリーム
    pub struct StubQueryStream {
        replies: Mutex<VecDeque<StubReply>>,
        pub requests: Mutex<Vec<(String, String)>>,
    }

    impl StubQueryStream {
        pub fn new(replies: Vec<StubReply>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn fragments(parts: &[&str]) -> Self {
            Self::new(vec![StubReply::Fragments(
                parts.iter().map(|s| s.to_string()).collect(),
            )])
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl QueryStream for StubQueryStream {
        fn stream_query(&self, query: &Query, identifier: &Identifier) -> Result<FragmentStream, Error> {
            self.requests
                .lock()
                .unwrap()
                .push((query.to_string(), identifier.to_string()));
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(StubReply::Fragments(Vec::new()));
            match reply {
                StubReply::Status(status, body) => Err(Error::RemoteQueryFailed {
                    status: Some(status),
                    message: body,
                }),
                StubReply::Fragments(parts) => Ok(Box::new(
                    parts.into_iter().map(|p| Ok(StreamFragment::new(p))),
                )),
                StubReply::InterruptedAfter(parts) => {
                    let items: Vec<Result<StreamFragment, Error>> = parts
                        .into_iter()
                        .map(|p| Ok(StreamFragment::new(p)))
                        .chain(std::iter::once(Err(Error::StreamInterrupted(
                            "connection reset by peer".to_string(),
                        ))))
                        .collect();
                    Ok(Box::new(items.into_iter()))
                }
                StubReply::CtrlCAtEnd(parts, interrupt) => Ok(Box::new(
                    parts
                        .into_iter()
                        .map(|p| Ok(StreamFragment::new(p)))
                        .chain(std::iter::from_fn(move || {
                            interrupt.press();
                            None
                        })),
                )),
            }
        }
    }

    /// n 回目の is_interrupted で true を返す割り込み検知
    pub struct InterruptOnCheck {
        at: usize,
        checks: AtomicUsize,
        armed: AtomicBool,
        pub disarmed: AtomicBool,
    }

    impl InterruptOnCheck {
        pub fn new(at: usize) -> Self {
            Self {
                at,
                checks: AtomicUsize::new(0),
                armed: AtomicBool::new(false),
                disarmed: AtomicBool::new(false),
            }
        }
    }

    impl InterruptChecker for InterruptOnCheck {
        fn arm(&self) {
            self.armed.store(true, Ordering::SeqCst);
        }
        fn disarm(&self) {
            self.armed.store(false, Ordering::SeqCst);
            self.disarmed.store(true, Ordering::SeqCst);
        }
        fn is_interrupted(&self) -> bool {
            let n = self.checks.fetch_add(1, Ordering::SeqCst) + 1;
            self.armed.load(Ordering::SeqCst) && n >= self.at
        }
    }

    /// SigintChecker と同じく arm 中だけフラグを立てる割り込み検知（press で Ctrl+C を模す）
    #[derive(Debug, Default)]
    pub struct FlagInterrupt {
        armed: AtomicBool,
        flag: AtomicBool,
    }

    impl FlagInterrupt {
        pub fn press(&self) {
            if self.armed.load(Ordering::SeqCst) {
                self.flag.store(true, Ordering::SeqCst);
            }
        }
    }

    impl InterruptChecker for FlagInterrupt {
        fn arm(&self) {
            self.flag.store(false, Ordering::SeqCst);
            self.armed.store(true, Ordering::SeqCst);
        }
        fn disarm(&self) {
            self.armed.store(false, Ordering::SeqCst);
            self.flag.store(false, Ordering::SeqCst);
        }
        fn is_interrupted(&self) -> bool {
            self.flag.load(Ordering::SeqCst)
        }
    }

    /// 断片ごとの描画内容を記録する Sink
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub fragments: Vec<String>,
        pub renders: Vec<String>,
        pub ended: usize,
    }

    impl FragmentSink for RecordingSink {
        fn on_fragment(&mut self, fragment: &StreamFragment, rendered: &str) -> Result<(), Error> {
            self.fragments.push(fragment.to_string());
            self.renders.push(rendered.to_string());
            Ok(())
        }

        fn on_end(&mut self) -> Result<(), Error> {
            self.ended += 1;
            Ok(())
        }
    }

    /// スタブで Services を組み立てる
    pub struct StubServicesBuilder {
        pub scroll: Arc<StubScrollStore>,
        pub logs: Arc<StubLogStore>,
        pub stream: Arc<StubQueryStream>,
        pub interrupt: Arc<dyn InterruptChecker>,
        pub page_size: usize,
    }

    impl Default for StubServicesBuilder {
        fn default() -> Self {
            Self {
                scroll: Arc::new(StubScrollStore::with_identifiers(&[])),
                logs: Arc::new(StubLogStore::new(Vec::new())),
                stream: Arc::new(StubQueryStream::new(Vec::new())),
                interrupt: Arc::new(NoopInterruptChecker),
                page_size: 100,
            }
        }
    }

    impl StubServicesBuilder {
        pub fn build(&self) -> Services {
            let log = Arc::new(NoopLog);
            let page_size = std::num::NonZeroUsize::new(self.page_size)
                .unwrap_or(std::num::NonZeroUsize::MIN);
            Services {
                catalog: Arc::new(IdentifierCatalog::new(
                    self.scroll.clone(),
                    page_size,
                    log.clone(),
                )),
                history: Arc::new(HistoryReader::new(self.logs.clone(), log.clone())),
                query_stream: self.stream.clone(),
                interrupt: Arc::clone(&self.interrupt),
                log,
            }
        }
    }
}

#[cfg(test)]
pub use stub::{
    FlagInterrupt, InterruptOnCheck, RecordingSink, StubLogStore, StubQueryStream, StubReply, StubScrollStore,
    StubServicesBuilder,
};
