//! ドメイン型（Newtype）
//!
//! String を直接運ばず、意味のある型に包んで境界を明確にする。

pub mod fragment;
pub mod history;
pub mod notice;
pub mod page;
pub mod turn;

use crate::error::Error;
use serde::{Deserialize, Serialize};

pub use fragment::StreamFragment;
pub use history::HistoryRecord;
pub use notice::{Notice, NoticeKind, NoticeLevel};
pub use page::Page;
pub use turn::{ConversationTurn, Role};

/// コンテキスト識別子（unique ID）
///
/// 病院・テナント等の文脈を指す不透明なトークン。空文字は許さない。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// 前後の空白を除いて検証する。空なら InvalidArgument。
    pub fn parse(s: &str) -> Result<Self, Error> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_argument("unique ID must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for Identifier {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Identifier {
    type Error = Error;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

/// ユーザークエリ（推論 API に送る自由文）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    /// 空白のみのクエリは送信しない
    pub fn parse(s: &str) -> Result<Self, Error> {
        if s.trim().is_empty() {
            return Err(Error::invalid_argument("query must not be empty"));
        }
        Ok(Self(s.to_string()))
    }
}

impl std::ops::Deref for Query {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Query {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
