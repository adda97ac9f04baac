//! 対話コンソール（行入力ループ）
//!
//! 平文の行はクエリとして送信し、`/` で始まる行はコマンドとして扱う。
//! 通知はすべて出力に 1 行で表示し、ループは止めない。

use crate::adapter::ConsoleSink;
use crate::usecase::{ConversationController, SubmitOutcome};
use anyhow::Context;
use common::domain::{HistoryRecord, Notice, Page, Role};
use std::io::{BufRead, Write};

const PROMPT: &str = "qchat> ";
const RESPONSE_PREVIEW_CHARS: usize = 80;

/// 1 行の入力を解釈した結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConsoleInput {
    Submit(String),
    ListIds,
    Use(String),
    History,
    Transcript,
    Reset,
    Page(String),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub(crate) fn parse_line(line: &str) -> ConsoleInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ConsoleInput::Empty;
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return ConsoleInput::Submit(line.trim_end_matches(['\r', '\n']).to_string());
    };
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((n, a)) => (n, a.trim()),
        None => (rest, ""),
    };
    match name {
        "ids" => ConsoleInput::ListIds,
        "use" => ConsoleInput::Use(arg.to_string()),
        "history" => ConsoleInput::History,
        "transcript" => ConsoleInput::Transcript,
        "reset" => ConsoleInput::Reset,
        "page" => ConsoleInput::Page(arg.to_string()),
        "help" | "?" => ConsoleInput::Help,
        "quit" | "exit" | "q" => ConsoleInput::Quit,
        other => ConsoleInput::Unknown(other.to_string()),
    }
}

/// 入力が尽きるか /quit まで対話する
pub(crate) fn run_console<R: BufRead, W: Write>(
    controller: &mut ConversationController,
    mut input: R,
    out: &mut W,
) -> anyhow::Result<()> {
    writeln!(out, "{}  (type /help for commands)", controller.page().title())?;
    let mut line = String::new();
    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line).context("failed to read input")? == 0 {
            writeln!(out)?;
            break;
        }
        match parse_line(&line) {
            ConsoleInput::Empty => {}
            ConsoleInput::Quit => break,
            ConsoleInput::Help => print_commands(out)?,
            ConsoleInput::Submit(text) => submit(controller, &text, out)?,
            ConsoleInput::ListIds => {
                let listing = controller.refresh_identifiers();
                print_notice(out, listing.notice.as_ref())?;
                if listing.items.is_empty() && listing.notice.is_none() {
                    writeln!(out, "(no unique IDs)")?;
                }
                for id in &listing.items {
                    let mark = if controller.selected_identifier() == Some(id) {
                        "*"
                    } else {
                        " "
                    };
                    writeln!(out, "{} {}", mark, id)?;
                }
            }
            ConsoleInput::Use(raw) => {
                let notice = controller.select_identifier(&raw);
                print_notice(out, notice.as_ref())?;
                if let Some(id) = controller.selected_identifier() {
                    writeln!(out, "using unique ID: {}", id)?;
                }
            }
            ConsoleInput::History => {
                controller.set_page(Page::History);
                show_page(controller, out)?;
            }
            ConsoleInput::Transcript => {
                let turns = controller.transcript();
                if turns.is_empty() {
                    writeln!(out, "(empty transcript)")?;
                }
                for turn in &turns {
                    let who = match turn.role() {
                        Role::User => "you",
                        Role::Assistant => "assistant",
                    };
                    writeln!(out, "{}: {}", who, turn.content())?;
                }
            }
            ConsoleInput::Reset => {
                controller.reset_transcript();
                writeln!(out, "transcript cleared")?;
            }
            ConsoleInput::Page(name) => match Page::parse(&name) {
                Ok(page) => {
                    controller.set_page(page);
                    show_page(controller, out)?;
                }
                Err(e) => print_notice(out, Some(&Notice::from_error(&e)))?,
            },
            ConsoleInput::Unknown(name) => {
                writeln!(out, "unknown command: /{} (type /help)", name)?;
            }
        }
    }
    Ok(())
}

fn submit<W: Write>(
    controller: &mut ConversationController,
    text: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    if controller.page() != Page::Chat {
        writeln!(out, "switch to the chat page first (/page chat)")?;
        return Ok(());
    }
    let outcome = {
        let mut sink = ConsoleSink::new(&mut *out);
        controller.submit(text, &mut sink)
    };
    if let SubmitOutcome::Failed { discarded, .. } = &outcome {
        if !discarded.is_empty() {
            writeln!(out, "(partial answer discarded)")?;
        }
    }
    print_notice(out, outcome.notice())
}

fn show_page<W: Write>(controller: &ConversationController, out: &mut W) -> anyhow::Result<()> {
    let page = controller.page();
    writeln!(out, "== {} ==", page.title())?;
    match page {
        Page::Chat => {}
        Page::History => {
            let listing = controller.history();
            print_notice(out, listing.notice.as_ref())?;
            if listing.items.is_empty() && listing.notice.is_none() {
                writeln!(out, "(no history)")?;
            }
            for record in &listing.items {
                print_history_record(out, record)?;
            }
        }
        Page::ComingSoon => writeln!(out, "This page is not available yet.")?,
    }
    Ok(())
}

pub(crate) fn print_history_record<W: Write>(out: &mut W, record: &HistoryRecord) -> std::io::Result<()> {
    writeln!(
        out,
        "{}  {}",
        record.timestamp.format("%Y-%m-%d %H:%M:%S"),
        record.query_text
    )?;
    if let Some(preview) = record.response_preview(RESPONSE_PREVIEW_CHARS) {
        writeln!(out, "    -> {}", preview)?;
    }
    Ok(())
}

fn print_notice<W: Write>(out: &mut W, notice: Option<&Notice>) -> anyhow::Result<()> {
    if let Some(n) = notice {
        writeln!(out, "{}", n)?;
    }
    Ok(())
}

fn print_commands<W: Write>(out: &mut W) -> anyhow::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  <text>            Send a query for the selected unique ID")?;
    writeln!(out, "  /ids              List unique IDs")?;
    writeln!(out, "  /use <id>         Select a unique ID")?;
    writeln!(out, "  /history          Show query history for the selected unique ID")?;
    writeln!(out, "  /transcript       Show this session's conversation")?;
    writeln!(out, "  /reset            Clear the conversation")?;
    writeln!(out, "  /page <name>      Switch page (chat, history, soon)")?;
    writeln!(out, "  /help             Show this help")?;
    writeln!(out, "  /quit             Exit")?;
    Ok(())
}
