//! ストリーム断片

/// 推論 API のストリームから届いたテキストの 1 チャンク
///
/// 同一ストリーム内での到着順に意味がある。到着順に連結すると回答全文になる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamFragment(String);

impl StreamFragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::ops::Deref for StreamFragment {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
