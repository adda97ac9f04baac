//! ユーザー向け通知
//!
//! エンジンから表示シェルへ渡す唯一のチャネル。エラーはすべてここで非致命の通知に変換される。

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// 通知の種別（エラー分類 + 操作上の警告）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    ConfigurationMissing,
    CatalogUnavailable,
    HistoryUnavailable,
    MissingIdentifier,
    RemoteQueryFailed,
    StreamInterrupted,
    /// Ctrl+C によるストリーム中断
    Cancelled,
    /// カタログに存在しない識別子を選択した
    UnknownIdentifier,
    /// ストリーム中の再送信
    Busy,
    InvalidInput,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            level,
            kind,
            message: message.into(),
        }
    }

    pub fn warning(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, kind, message)
    }

    pub fn error(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, kind, message)
    }

    /// Error を通知に変換する。
    /// ストア到達不能・識別子未選択・設定欠落は警告、推論失敗はエラー表示。
    pub fn from_error(e: &Error) -> Self {
        let message = e.to_string();
        match e {
            Error::ConfigurationMissing(_) | Error::InvalidConfig(_) => {
                Self::warning(NoticeKind::ConfigurationMissing, message)
            }
            Error::CatalogUnavailable(_) => Self::warning(NoticeKind::CatalogUnavailable, message),
            Error::HistoryUnavailable(_) => Self::warning(NoticeKind::HistoryUnavailable, message),
            Error::MissingIdentifier => Self::warning(NoticeKind::MissingIdentifier, message),
            Error::RemoteQueryFailed { .. } => Self::error(NoticeKind::RemoteQueryFailed, message),
            Error::StreamInterrupted(_) => Self::error(NoticeKind::StreamInterrupted, message),
            Error::Interrupted => Self::new(NoticeLevel::Info, NoticeKind::Cancelled, message),
            Error::InvalidArgument(_) => Self::warning(NoticeKind::InvalidInput, message),
            Error::Io(_) | Error::Json(_) | Error::System(_) => {
                Self::error(NoticeKind::Internal, message)
            }
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{}] {}", label, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_error_kinds() {
        assert_eq!(
            Notice::from_error(&Error::MissingIdentifier).kind,
            NoticeKind::MissingIdentifier
        );
        let n = Notice::from_error(&Error::RemoteQueryFailed {
            status: Some(500),
            message: "boom".into(),
        });
        assert_eq!(n.kind, NoticeKind::RemoteQueryFailed);
        assert_eq!(n.level, NoticeLevel::Error);
        let n = Notice::from_error(&Error::CatalogUnavailable("down".into()));
        assert_eq!(n.level, NoticeLevel::Warning);
    }

    #[test]
    fn test_display_prefixes_level() {
        let n = Notice::warning(NoticeKind::Busy, "wait");
        assert_eq!(n.to_string(), "[warning] wait");
    }
}
