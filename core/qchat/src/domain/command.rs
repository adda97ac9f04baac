//! CLI から解釈したコマンド

use common::domain::{Identifier, Query};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QchatCommand {
    Help,
    /// 対話コンソール
    Console,
    /// 識別子一覧
    ListIds,
    /// 指定識別子のクエリ履歴
    History { identifier: Identifier },
    /// 1 回だけクエリを送って回答を表示する
    Ask { identifier: Identifier, query: Query },
}

impl QchatCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Console => "console",
            Self::ListIds => "ids",
            Self::History { .. } => "history",
            Self::Ask { .. } => "ask",
        }
    }
}
