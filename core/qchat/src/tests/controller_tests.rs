//! ConversationController の単体テスト（スタブのストア・推論ストリームを使用）

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::adapter::Unconfigured;
use common::config::ENV_ENDPOINT;
use common::domain::{ConversationTurn, Identifier, NoticeKind, NoticeLevel, Page, Role};
use serde_json::json;

use crate::adapter::stub_ports::{
    FlagInterrupt, InterruptOnCheck, RecordingSink, StubLogStore, StubQueryStream, StubReply, StubScrollStore,
    StubServicesBuilder,
};
use crate::domain::{ControllerState, Session};
use crate::ports::outbound::InterruptChecker;
use crate::usecase::{ConversationController, SubmitOutcome};

fn controller_with(builder: &StubServicesBuilder) -> ConversationController {
    ConversationController::new(builder.build(), Session::new())
}

fn selected(builder: &StubServicesBuilder, id: &str) -> ConversationController {
    ConversationController::new(
        builder.build(),
        Session::with_identifier(Identifier::parse(id).unwrap()),
    )
}

#[test]
fn test_fragments_are_rendered_as_growing_prefix() {
    let builder = StubServicesBuilder {
        stream: Arc::new(StubQueryStream::fragments(&["Hel", "lo", ", ", "world"])),
        ..Default::default()
    };
    let mut controller = selected(&builder, "h1");
    let mut sink = RecordingSink::default();
    controller.submit("greet me", &mut sink);

    assert_eq!(sink.renders, vec!["Hel", "Hello", "Hello, ", "Hello, world"]);
    let mut expected = String::new();
    for (fragment, rendered) in sink.fragments.iter().zip(&sink.renders) {
        expected.push_str(fragment);
        assert_eq!(&expected, rendered);
    }
    assert_eq!(sink.ended, 1);
}

#[test]
fn test_successful_stream_appends_one_assistant_turn() {
    let builder = StubServicesBuilder {
        stream: Arc::new(StubQueryStream::fragments(&["Hel", "lo"])),
        ..Default::default()
    };
    let mut controller = selected(&builder, "h1");
    let mut sink = RecordingSink::default();
    let outcome = controller.submit("say hello", &mut sink);

    assert_eq!(
        outcome,
        SubmitOutcome::Answered(ConversationTurn::assistant("Hello"))
    );
    assert_eq!(
        controller.transcript(),
        vec![
            ConversationTurn::user("say hello"),
            ConversationTurn::assistant("Hello"),
        ]
    );
    assert_eq!(controller.state(), ControllerState::Idle);
    let requests = builder.stream.requests.lock().unwrap().clone();
    assert_eq!(requests, vec![("say hello".to_string(), "h1".to_string())]);
}

#[test]
fn test_submit_without_identifier_is_rejected() {
    let builder = StubServicesBuilder {
        stream: Arc::new(StubQueryStream::fragments(&["never"])),
        ..Default::default()
    };
    let mut controller = controller_with(&builder);
    let mut sink = RecordingSink::default();
    let outcome = controller.submit("anything", &mut sink);

    let notice = outcome.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::MissingIdentifier);
    assert!(controller.transcript().is_empty());
    assert_eq!(builder.stream.request_count(), 0);
    assert!(sink.renders.is_empty());
    assert_eq!(controller.state(), ControllerState::AwaitingIdentifier);

    // 選択すると Idle に戻る
    assert!(controller.select_identifier("h1").is_none());
    assert_eq!(controller.state(), ControllerState::Idle);
}

#[test]
fn test_blank_query_is_rejected() {
    let builder = StubServicesBuilder::default();
    let mut controller = selected(&builder, "h1");
    let outcome = controller.submit("   ", &mut RecordingSink::default());
    assert_eq!(outcome.notice().unwrap().kind, NoticeKind::InvalidInput);
    assert!(controller.transcript().is_empty());
    assert_eq!(builder.stream.request_count(), 0);
}

#[test]
fn test_non_success_status_keeps_user_turn_only() {
    let builder = StubServicesBuilder {
        stream: Arc::new(StubQueryStream::new(vec![StubReply::Status(
            500,
            "model crashed".to_string(),
        )])),
        ..Default::default()
    };
    let mut controller = selected(&builder, "h1");
    let mut sink = RecordingSink::default();
    let outcome = controller.submit("why?", &mut sink);

    let notice = outcome.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::RemoteQueryFailed);
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.message.contains("500"));
    assert_eq!(controller.transcript(), vec![ConversationTurn::user("why?")]);
    assert!(sink.renders.is_empty());
    assert_eq!(controller.state(), ControllerState::Idle);
}

#[test]
fn test_interrupted_stream_discards_partial_answer() {
    let builder = StubServicesBuilder {
        stream: Arc::new(StubQueryStream::new(vec![StubReply::InterruptedAfter(vec![
            "Par".to_string(),
            "tial".to_string(),
        ])])),
        ..Default::default()
    };
    let mut controller = selected(&builder, "h1");
    let mut sink = RecordingSink::default();
    let outcome = controller.submit("tell me", &mut sink);

    match &outcome {
        SubmitOutcome::Failed { notice, discarded } => {
            assert_eq!(notice.kind, NoticeKind::StreamInterrupted);
            assert_eq!(discarded, "Partial");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(sink.renders, vec!["Par", "Partial"]);
    let turns = controller.transcript();
    assert_eq!(turns.len(), 1);
    assert!(turns.iter().all(|t| t.role() == Role::User));
}

#[test]
fn test_ctrl_c_cancels_stream() {
    // 2 回目の確認（2 つ目の断片の前）で割り込む
    let interrupt = Arc::new(InterruptOnCheck::new(2));
    let builder = StubServicesBuilder {
        stream: Arc::new(StubQueryStream::fragments(&["one ", "two ", "three"])),
        interrupt: interrupt.clone(),
        ..Default::default()
    };
    let mut controller = selected(&builder, "h1");
    let mut sink = RecordingSink::default();
    let outcome = controller.submit("count", &mut sink);

    assert_eq!(outcome.notice().unwrap().kind, NoticeKind::Cancelled);
    assert_eq!(sink.renders, vec!["one "]);
    assert_eq!(controller.transcript().len(), 1);
    assert!(interrupt.disarmed.load(Ordering::SeqCst));
    assert_eq!(controller.state(), ControllerState::Idle);
}

#[test]
fn test_ctrl_c_during_last_read_is_not_committed() {
    let interrupt = Arc::new(FlagInterrupt::default());
    let builder = StubServicesBuilder {
        stream: Arc::new(StubQueryStream::new(vec![StubReply::CtrlCAtEnd(
            vec!["Par".to_string()],
            interrupt.clone(),
        )])),
        interrupt: interrupt.clone(),
        ..Default::default()
    };
    let mut controller = selected(&builder, "h1");
    let mut sink = RecordingSink::default();
    let outcome = controller.submit("tell me", &mut sink);

    match &outcome {
        SubmitOutcome::Failed { notice, discarded } => {
            assert_eq!(notice.kind, NoticeKind::Cancelled);
            assert_eq!(discarded, "Par");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(sink.renders, vec!["Par"]);
    assert_eq!(controller.transcript(), vec![ConversationTurn::user("tell me")]);
    assert_eq!(controller.state(), ControllerState::Idle);
    // 受信が終わればフラグは下りる
    assert!(!interrupt.is_interrupted());
}

#[test]
fn test_unconfigured_endpoint_reports_configuration_missing() {
    let mut services = StubServicesBuilder::default().build();
    services.query_stream = Arc::new(Unconfigured::new(ENV_ENDPOINT));
    let mut controller = ConversationController::new(
        services,
        Session::with_identifier(Identifier::parse("h1").unwrap()),
    );
    let outcome = controller.submit("hello", &mut RecordingSink::default());
    let notice = outcome.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::ConfigurationMissing);
    assert!(notice.message.contains(ENV_ENDPOINT));
}

#[test]
fn test_transcript_keeps_order_across_submissions() {
    let builder = StubServicesBuilder {
        stream: Arc::new(StubQueryStream::new(vec![
            StubReply::Fragments(vec!["A1".to_string()]),
            StubReply::Status(503, "busy".to_string()),
            StubReply::Fragments(vec!["A3".to_string()]),
        ])),
        ..Default::default()
    };
    let mut controller = selected(&builder, "h1");
    let mut sink = RecordingSink::default();
    controller.submit("Q1", &mut sink);
    controller.submit("Q2", &mut sink);
    controller.submit("Q3", &mut sink);

    assert_eq!(
        controller.transcript(),
        vec![
            ConversationTurn::user("Q1"),
            ConversationTurn::assistant("A1"),
            ConversationTurn::user("Q2"),
            ConversationTurn::user("Q3"),
            ConversationTurn::assistant("A3"),
        ]
    );

    controller.reset_transcript();
    assert!(controller.transcript().is_empty());
    assert_eq!(controller.selected_identifier().map(|i| i.as_str()), Some("h1"));
}

#[test]
fn test_refresh_identifiers_and_unknown_selection_warns() {
    let builder = StubServicesBuilder {
        scroll: Arc::new(StubScrollStore::with_identifiers(&["b", "a", "b"])),
        ..Default::default()
    };
    let mut controller = controller_with(&builder);
    let listing = controller.refresh_identifiers();
    assert!(listing.notice.is_none());
    let names: Vec<&str> = listing.items.iter().map(|i| i.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);

    assert!(controller.select_identifier("a").is_none());
    let notice = controller.select_identifier("zzz").unwrap();
    assert_eq!(notice.kind, NoticeKind::UnknownIdentifier);
    assert_eq!(controller.selected_identifier().map(|i| i.as_str()), Some("zzz"));
}

#[test]
fn test_select_blank_identifier_keeps_previous() {
    let builder = StubServicesBuilder::default();
    let mut controller = selected(&builder, "h1");
    let notice = controller.select_identifier("  ").unwrap();
    assert_eq!(notice.kind, NoticeKind::InvalidInput);
    assert_eq!(controller.selected_identifier().map(|i| i.as_str()), Some("h1"));
}

#[test]
fn test_catalog_failure_degrades_to_warning() {
    let builder = StubServicesBuilder {
        scroll: Arc::new(StubScrollStore::unreachable()),
        ..Default::default()
    };
    let mut controller = controller_with(&builder);
    let listing = controller.refresh_identifiers();
    assert!(listing.items.is_empty());
    let notice = listing.notice.unwrap();
    assert_eq!(notice.kind, NoticeKind::CatalogUnavailable);
    assert_eq!(notice.level, NoticeLevel::Warning);
    // カタログが取れなくても選択はできる
    assert!(controller.select_identifier("h1").is_none());
}

#[test]
fn test_history_listing() {
    let builder = StubServicesBuilder {
        logs: Arc::new(StubLogStore::new(vec![
            json!({"unique_id": "h1", "query": "old", "timestamp": "2024-01-01T00:00:00Z"}),
            json!({"unique_id": "h1", "query": "new", "timestamp": "2024-02-01T00:00:00Z"}),
        ])),
        ..Default::default()
    };
    let mut controller = controller_with(&builder);
    let listing = controller.history();
    assert_eq!(listing.notice.unwrap().kind, NoticeKind::MissingIdentifier);

    controller.select_identifier("h1");
    controller.set_page(Page::History);
    let listing = controller.history();
    assert!(listing.notice.is_none());
    let queries: Vec<&str> = listing.items.iter().map(|r| r.query_text.as_str()).collect();
    assert_eq!(queries, vec!["new", "old"]);
    assert_eq!(controller.page(), Page::History);
}

#[test]
fn test_history_failure_degrades_to_warning() {
    let builder = StubServicesBuilder {
        logs: Arc::new(StubLogStore::unreachable()),
        ..Default::default()
    };
    let controller = selected(&builder, "h1");
    let listing = controller.history();
    assert!(listing.items.is_empty());
    assert_eq!(listing.notice.unwrap().kind, NoticeKind::HistoryUnavailable);
}

#[test]
fn test_sessions_are_independent() {
    let builder = StubServicesBuilder {
        stream: Arc::new(StubQueryStream::fragments(&["x"])),
        ..Default::default()
    };
    let services = builder.build();
    let mut first = ConversationController::new(
        services.clone(),
        Session::with_identifier(Identifier::parse("h1").unwrap()),
    );
    let second = ConversationController::new(services, Session::new());
    first.submit("hi", &mut RecordingSink::default());
    assert_eq!(first.transcript().len(), 2);
    assert!(second.transcript().is_empty());
    assert!(second.selected_identifier().is_none());
}
