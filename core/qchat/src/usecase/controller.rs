//! ConversationController: 入力 → トランスクリプト追加 → ストリーム → 描画 → 結果追加
//!
//! 状態機械: Idle → (AwaitingIdentifier) → Streaming → Idle。
//! 失敗はすべて Notice に変換して返し、プロセスは止めない。
//! ストリームが失敗・中断した場合、途中までの回答は表示のみでトランスクリプトには残さない。

use crate::domain::{ControllerState, Session};
use crate::ports::outbound::{FragmentSink, InterruptChecker};
use crate::usecase::{HistoryReader, IdentifierCatalog};
use common::domain::{
    ConversationTurn, HistoryRecord, Identifier, Notice, NoticeKind, Page, Query,
};
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord, QueryStream};
use std::sync::Arc;

/// プロセスで 1 度だけ組み立て、全セッションで共有する依存
#[derive(Clone)]
pub struct Services {
    pub catalog: Arc<IdentifierCatalog>,
    pub history: Arc<HistoryReader>,
    pub query_stream: Arc<dyn QueryStream>,
    pub interrupt: Arc<dyn InterruptChecker>,
    pub log: Arc<dyn Log>,
}

/// 一覧系の結果。取得に失敗した場合は空の items と警告を返す。
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub notice: Option<Notice>,
}

impl<T> Listing<T> {
    fn ok(items: Vec<T>) -> Self {
        Self {
            items,
            notice: None,
        }
    }

    fn degraded(notice: Notice) -> Self {
        Self {
            items: Vec::new(),
            notice: Some(notice),
        }
    }
}

/// submit の結果
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// 正常完了。追加した assistant ターン。
    Answered(ConversationTurn),
    /// 送信前に拒否（識別子未選択・空クエリ・受信中）。トランスクリプトは変化なし。
    Rejected(Notice),
    /// user ターン追加後に失敗。discarded は表示だけして捨てた途中の回答。
    Failed { notice: Notice, discarded: String },
}

impl SubmitOutcome {
    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Self::Answered(_) => None,
            Self::Rejected(n) | Self::Failed { notice: n, .. } => Some(n),
        }
    }
}

/// arm した割り込み検知を、どの経路で抜けても disarm する
struct ArmedInterrupt<'a>(&'a dyn InterruptChecker);

impl<'a> ArmedInterrupt<'a> {
    fn arm(checker: &'a dyn InterruptChecker) -> Self {
        checker.arm();
        Self(checker)
    }
}

impl Drop for ArmedInterrupt<'_> {
    fn drop(&mut self) {
        self.0.disarm();
    }
}

pub struct ConversationController {
    services: Services,
    session: Session,
}

impl ConversationController {
    pub fn new(services: Services, session: Session) -> Self {
        Self { services, session }
    }

    /// セッションを終了して状態を返す
    pub fn into_session(self) -> Session {
        self.session
    }

    #[cfg(test)]
    pub fn state(&self) -> ControllerState {
        self.session.state
    }

    pub fn transcript(&self) -> Vec<ConversationTurn> {
        self.session.transcript.all()
    }

    pub fn selected_identifier(&self) -> Option<&Identifier> {
        self.session.selected.as_ref()
    }

    pub fn page(&self) -> Page {
        self.session.page
    }

    pub fn set_page(&mut self, page: Page) {
        self.session.page = page;
    }

    pub fn reset_transcript(&mut self) {
        self.session.transcript.reset();
        self.log(LogLevel::Info, "transcript reset", "session", None);
    }

    /// 識別子カタログを読み直す（表示用にソート済み）
    pub fn refresh_identifiers(&mut self) -> Listing<Identifier> {
        match self.services.catalog.list_identifiers() {
            Ok(set) => {
                let items = set.iter().cloned().collect();
                self.session.known_identifiers = Some(set);
                Listing::ok(items)
            }
            Err(e) => {
                self.log(LogLevel::Warn, &e.to_string(), "catalog", None);
                Listing::degraded(Notice::from_error(&e))
            }
        }
    }

    /// 識別子を選択する。
    ///
    /// 空文字は拒否（選択は変えない）。カタログ読み込み済みで未知の識別子は
    /// 警告を返すが選択は行う（カタログが古い・取得できない場合があるため）。
    pub fn select_identifier(&mut self, raw: &str) -> Option<Notice> {
        let identifier = match Identifier::parse(raw) {
            Ok(id) => id,
            Err(e) => return Some(Notice::from_error(&e)),
        };
        let unknown = self
            .session
            .known_identifiers
            .as_ref()
            .map(|known| !known.contains(&identifier))
            .unwrap_or(false);
        self.session.selected = Some(identifier.clone());
        if self.session.state == ControllerState::AwaitingIdentifier {
            self.session.state = ControllerState::Idle;
        }
        if unknown {
            return Some(Notice::warning(
                NoticeKind::UnknownIdentifier,
                format!("'{}' is not in the unique ID list", identifier),
            ));
        }
        None
    }

    /// 選択中の識別子の履歴（新しい順）
    pub fn history(&self) -> Listing<HistoryRecord> {
        let Some(identifier) = self.session.selected.as_ref() else {
            return Listing::degraded(Notice::from_error(&Error::MissingIdentifier));
        };
        match self.services.history.list_history(identifier) {
            Ok(records) => Listing::ok(records),
            Err(e) => {
                self.log(LogLevel::Warn, &e.to_string(), "history", None);
                Listing::degraded(Notice::from_error(&e))
            }
        }
    }

    /// クエリを送信し、断片ごとに sink へ描画する
    pub fn submit(&mut self, raw_query: &str, sink: &mut dyn FragmentSink) -> SubmitOutcome {
        if self.session.state == ControllerState::Streaming {
            return SubmitOutcome::Rejected(Notice::warning(
                NoticeKind::Busy,
                "an answer is still streaming; wait for it to finish",
            ));
        }
        let Some(identifier) = self.session.selected.clone() else {
            self.session.state = ControllerState::AwaitingIdentifier;
            return SubmitOutcome::Rejected(Notice::from_error(&Error::MissingIdentifier));
        };
        let query = match Query::parse(raw_query) {
            Ok(q) => q,
            Err(e) => return SubmitOutcome::Rejected(Notice::from_error(&e)),
        };

        self.session
            .transcript
            .append(ConversationTurn::user(raw_query));
        self.session.state = ControllerState::Streaming;
        self.log(
            LogLevel::Info,
            "query started",
            "query",
            Some(identifier.as_str()),
        );

        let result = self.stream_into(&query, &identifier, sink);
        let _ = sink.on_end();
        self.session.state = ControllerState::Idle;

        match result {
            Ok(answer) => {
                let turn = ConversationTurn::assistant(answer);
                self.session.transcript.append(turn.clone());
                let _ = self.services.log.log(
                    &LogRecord::new(LogLevel::Info, "query completed")
                        .layer("usecase")
                        .kind("query")
                        .field("unique_id", identifier.as_str())
                        .field("chars", turn.content().chars().count()),
                );
                SubmitOutcome::Answered(turn)
            }
            Err((e, discarded)) => {
                let _ = self.services.log.log(
                    &LogRecord::new(LogLevel::Warn, format!("query failed: {}", e))
                        .layer("usecase")
                        .kind("query")
                        .field("unique_id", identifier.as_str())
                        .field("discarded_chars", discarded.chars().count()),
                );
                SubmitOutcome::Failed {
                    notice: Notice::from_error(&e),
                    discarded,
                }
            }
        }
    }

    /// ストリームを最後まで読み、連結した回答を返す。
    /// 失敗時はエラーとそれまでに描画した途中の回答を返す。
    fn stream_into(
        &self,
        query: &Query,
        identifier: &Identifier,
        sink: &mut dyn FragmentSink,
    ) -> Result<String, (Error, String)> {
        let _armed = ArmedInterrupt::arm(self.services.interrupt.as_ref());
        let stream = self
            .services
            .query_stream
            .stream_query(query, identifier)
            .map_err(|e| (e, String::new()))?;

        let mut buffer = String::new();
        for item in stream {
            if self.services.interrupt.is_interrupted() {
                // ここで stream が drop され、接続も閉じる
                return Err((Error::Interrupted, buffer));
            }
            let fragment = match item {
                Ok(f) => f,
                Err(e) => return Err((e, buffer)),
            };
            buffer.push_str(&fragment);
            if let Err(e) = sink.on_fragment(&fragment, &buffer) {
                return Err((e, buffer));
            }
        }
        // 最後の読み取り中に押された Ctrl+C も取り消しとして扱う
        if self.services.interrupt.is_interrupted() {
            return Err((Error::Interrupted, buffer));
        }
        Ok(buffer)
    }

    fn log(&self, level: LogLevel, message: &str, kind: &str, unique_id: Option<&str>) {
        let mut rec = LogRecord::new(level, message).layer("usecase").kind(kind);
        if let Some(id) = unique_id {
            rec = rec.field("unique_id", id);
        }
        let _ = self.services.log.log(&rec);
    }
}
