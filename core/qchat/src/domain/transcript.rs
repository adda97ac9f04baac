//! セッショントランスクリプト
//!
//! 1 セッション分の会話ターンを追加順（＝時系列）に保持する。
//! user → assistant の交互は強制しない（中断された assistant ターンは追加されないため、
//! user が連続することがある）。

use common::domain::ConversationTurn;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionTranscript {
    turns: Vec<ConversationTurn>,
}

impl SessionTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// スナップショットを返す（以後の追加は反映されない）
    pub fn all(&self) -> Vec<ConversationTurn> {
        self.turns.clone()
    }

    pub fn reset(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
