//! 対話コンソールの結合テスト（入力はメモリ上の文字列）

use std::io::Cursor;
use std::sync::Arc;

use serde_json::json;

use crate::adapter::stub_ports::{StubLogStore, StubQueryStream, StubScrollStore, StubServicesBuilder};
use crate::console::run_console;
use crate::domain::Session;
use crate::usecase::ConversationController;

fn run(builder: &StubServicesBuilder, input: &str) -> (String, ConversationController) {
    let mut controller = ConversationController::new(builder.build(), Session::new());
    let mut out = Vec::new();
    run_console(&mut controller, Cursor::new(input.as_bytes()), &mut out).unwrap();
    (String::from_utf8(out).unwrap(), controller)
}

#[test]
fn test_select_then_ask_streams_answer() {
    let builder = StubServicesBuilder {
        scroll: Arc::new(StubScrollStore::with_identifiers(&["h1", "h2"])),
        stream: Arc::new(StubQueryStream::fragments(&["Hel", "lo"])),
        ..Default::default()
    };
    let (out, controller) = run(&builder, "/ids\n/use h1\nhi there\n/transcript\n/quit\n");

    assert!(out.contains("  h1\n"));
    assert!(out.contains("using unique ID: h1"));
    assert!(out.contains("Hello\n"));
    assert!(out.contains("you: hi there"));
    assert!(out.contains("assistant: Hello"));
    assert_eq!(controller.transcript().len(), 2);
}

#[test]
fn test_query_before_selection_prints_warning() {
    let builder = StubServicesBuilder::default();
    let (out, controller) = run(&builder, "hello\n");
    assert!(out.contains("[warning] no unique ID selected"), "{}", out);
    assert!(controller.transcript().is_empty());
}

#[test]
fn test_history_page() {
    let builder = StubServicesBuilder {
        logs: Arc::new(StubLogStore::new(vec![
            json!({"unique_id": "h1", "query": "older", "timestamp": "2024-01-01T08:00:00Z"}),
            json!({"unique_id": "h1", "query": "newer", "timestamp": "2024-01-02T08:00:00Z", "response": "fine"}),
        ])),
        ..Default::default()
    };
    let (out, _) = run(&builder, "/use h1\n/history\n");
    assert!(out.contains("== Query History =="));
    let newer = out.find("2024-01-02 08:00:00  newer").unwrap();
    let older = out.find("2024-01-01 08:00:00  older").unwrap();
    assert!(newer < older);
    assert!(out.contains("    -> fine"));
}

#[test]
fn test_queries_only_on_chat_page() {
    let builder = StubServicesBuilder {
        stream: Arc::new(StubQueryStream::fragments(&["x"])),
        ..Default::default()
    };
    let (out, controller) = run(&builder, "/use h1\n/page soon\nhello\n/page chat\nhello\n");
    assert!(out.contains("== Coming Soon =="));
    assert!(out.contains("switch to the chat page first"));
    assert_eq!(builder.stream.request_count(), 1);
    assert_eq!(controller.transcript().len(), 2);
}

#[test]
fn test_reset_and_unknown_command() {
    let builder = StubServicesBuilder {
        stream: Arc::new(StubQueryStream::fragments(&["x"])),
        ..Default::default()
    };
    let (out, controller) = run(&builder, "/use h1\nq\n/reset\n/bogus\n");
    assert!(out.contains("transcript cleared"));
    assert!(out.contains("unknown command: /bogus"));
    assert!(controller.transcript().is_empty());
}
