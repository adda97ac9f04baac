//! 表示ページ（ナビゲーションのモード切替）

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Chat,
    History,
    ComingSoon,
}

impl Page {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Chat => "Chat Interface",
            Self::History => "Query History",
            Self::ComingSoon => "Coming Soon",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(Self::Chat),
            "history" => Ok(Self::History),
            "soon" | "coming-soon" | "placeholder" => Ok(Self::ComingSoon),
            other => Err(Error::invalid_argument(format!(
                "unknown page '{}' (expected chat, history or soon)",
                other
            ))),
        }
    }
}
