//! 1 回の対話セッションの状態
//!
//! トランスクリプト・選択中の識別子・表示ページ・コントローラ状態をまとめて持つ。
//! セッション開始時に生成し、終了時に破棄する。プロセス全体で共有しない。

use crate::domain::SessionTranscript;
use chrono::{DateTime, Utc};
use common::domain::{Identifier, Page};
use std::collections::BTreeSet;

/// 会話コントローラの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    /// 識別子未選択のまま送信された（選択されると Idle に戻る）
    AwaitingIdentifier,
    /// ストリーム受信中（新しい送信は受け付けない）
    Streaming,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub transcript: SessionTranscript,
    pub selected: Option<Identifier>,
    pub page: Page,
    pub state: ControllerState,
    /// 直近に読み込んだ識別子カタログ（未読み込みなら None）
    pub known_identifiers: Option<BTreeSet<Identifier>>,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            transcript: SessionTranscript::new(),
            selected: None,
            page: Page::default(),
            state: ControllerState::default(),
            known_identifiers: None,
            started_at: Utc::now(),
        }
    }

    /// 識別子を事前選択したセッション（ワンショット実行用）
    pub fn with_identifier(identifier: Identifier) -> Self {
        Self {
            selected: Some(identifier),
            ..Self::new()
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
