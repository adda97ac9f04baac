//! 人間向けに stderr へ 1 行で出す Log 実装（--verbose 時）

use crate::error::Error;
use crate::ports::outbound::{Log, LogLevel, LogRecord};

const FIELDS_SUMMARY_MAX: usize = 200;

#[derive(Debug, Clone, Default)]
pub struct StderrLog {
    /// false のとき Debug レベルは出さない
    debug: bool,
}

impl StderrLog {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }
}

/// LogRecord を "[level] kind: message {fields}" 形式に整形する
pub fn format_line(record: &LogRecord) -> String {
    let level = match record.level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
    };
    let mut line = match &record.kind {
        Some(kind) => format!("[{}] {}: {}", level, kind, record.message),
        None => format!("[{}] {}", level, record.message),
    };
    if let Some(fields) = &record.fields {
        let s = serde_json::to_string(fields).unwrap_or_default();
        if s.chars().count() > FIELDS_SUMMARY_MAX {
            let head: String = s.chars().take(FIELDS_SUMMARY_MAX).collect();
            line.push_str(&format!(" {}...", head));
        } else {
            line.push(' ');
            line.push_str(&s);
        }
    }
    line
}

impl Log for StderrLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        if record.level == LogLevel::Debug && !self.debug {
            return Ok(());
        }
        eprintln!("{}", format_line(record));
        Ok(())
    }
}
