//! Ctrl+C（SIGINT）等による割り込みを検知する Outbound ポート
//!
//! ストリーム受信中だけ arm し、その間の割り込みはフラグとして受け取る。
//! arm されていない間の割り込みはセッション終了として扱う（実装側の責務）。

pub trait InterruptChecker: Send + Sync {
    /// ストリーム開始。フラグをクリアする。
    fn arm(&self);
    /// ストリーム終了。フラグをクリアする。
    fn disarm(&self);
    fn is_interrupted(&self) -> bool;
}
