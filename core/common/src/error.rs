//! エラーハンドリング
//!
//! qchat 全体で共有するエラー型。バリアントはユーザー向け通知（Notice）の種別と
//! 1 対 1 に対応し、CLI では終了コードにも変換される。

use thiserror::Error as ThisError;

/// qchat 共通のエラー型
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// 必須の設定（エンドポイント・接続文字列等）が未設定
    #[error("configuration missing: {0} is not set")]
    ConfigurationMissing(String),

    /// 設定値が不正（起動時に致命的扱い）
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// 識別子カタログ（ベクトルストア）に到達できない
    #[error("identifier catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// クエリ履歴（ログストア）に到達できない
    #[error("query history unavailable: {0}")]
    HistoryUnavailable(String),

    /// 識別子が未選択のまま送信された
    #[error("no unique ID selected; choose one before submitting a query")]
    MissingIdentifier,

    /// 推論 API が非成功ステータスを返した（status は接続自体に失敗した場合 None）
    #[error("remote query failed{}: {message}", status_suffix(.status))]
    RemoteQueryFailed {
        status: Option<u16>,
        message: String,
    },

    /// ストリーム途中で接続が切れた
    #[error("stream interrupted: {0}")]
    StreamInterrupted(String),

    /// ユーザーによる中断（Ctrl+C）
    #[error("interrupted by user")]
    Interrupted,

    /// 引数不正
    #[error("{0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),

    /// その他のシステムエラー
    #[error("{0}")]
    System(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn io_msg(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn system(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }

    pub fn config_missing(variable: impl Into<String>) -> Self {
        Self::ConfigurationMissing(variable.into())
    }

    /// 使い方の表示が必要なエラーか
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// sysexits 準拠の終了コード
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) | Self::MissingIdentifier => 64,
            Self::ConfigurationMissing(_) | Self::InvalidConfig(_) => 78,
            Self::CatalogUnavailable(_)
            | Self::HistoryUnavailable(_)
            | Self::RemoteQueryFailed { .. }
            | Self::StreamInterrupted(_)
            | Self::Io(_)
            | Self::Json(_) => 74,
            Self::Interrupted => 130,
            Self::System(_) => 70,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
