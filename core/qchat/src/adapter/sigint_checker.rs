//! Ctrl+C（SIGINT）で割り込みフラグを立てる InterruptChecker 実装
//!
//! ストリーム受信中（arm 中）の Ctrl+C はフラグを立てるだけで、呼び出し側が接続を閉じる。
//! 次の断片が届かないと気づけないため、arm 中にもう一度押された場合はプロセスを終える。
//! 待機中の Ctrl+C はセッション終了としてプロセスを終える。

use crate::ports::outbound::InterruptChecker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// SIGINT による終了コード（128 + 2）
const SIGINT_EXIT_CODE: i32 = 130;

/// SIGINT 受信時の振る舞い
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SigintAction {
    /// 受信中の取り消しを要求した
    Flagged,
    /// プロセスを終える
    Exit,
}

/// arm 中の 1 回目はフラグを立てる。2 回目（フラグが立ったまま）と待機中は終了。
fn on_sigint(armed: &AtomicBool, flag: &AtomicBool) -> SigintAction {
    if !armed.load(Ordering::SeqCst) {
        return SigintAction::Exit;
    }
    if flag.swap(true, Ordering::SeqCst) {
        SigintAction::Exit
    } else {
        SigintAction::Flagged
    }
}

pub struct SigintChecker {
    flag: Arc<AtomicBool>,
    armed: Arc<AtomicBool>,
}

impl SigintChecker {
    /// 新しいチェッカーを作成し、SIGINT ハンドラを登録する。
    /// ハンドラは初回のみ登録できる（ctrlc の仕様）。
    pub fn new() -> Result<Self, ctrlc::Error> {
        let flag = Arc::new(AtomicBool::new(false));
        let armed = Arc::new(AtomicBool::new(false));
        let flag_clone = Arc::clone(&flag);
        let armed_clone = Arc::clone(&armed);
        ctrlc::set_handler(move || match on_sigint(&armed_clone, &flag_clone) {
            SigintAction::Flagged => {
                eprintln!();
                eprintln!("(cancelling; press Ctrl+C again to quit)");
            }
            SigintAction::Exit => {
                eprintln!();
                std::process::exit(SIGINT_EXIT_CODE);
            }
        })?;
        Ok(Self { flag, armed })
    }
}

impl InterruptChecker for SigintChecker {
    fn arm(&self) {
        self.flag.store(false, Ordering::SeqCst);
        self.armed.store(true, Ordering::SeqCst);
    }

    fn disarm(&self) {
        self.armed.store(false, Ordering::SeqCst);
        self.flag.store(false, Ordering::SeqCst);
    }

    fn is_interrupted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// 割り込みを検知しないスタブ（ハンドラ登録に失敗した場合などに使用）
#[derive(Debug, Default)]
pub struct NoopInterruptChecker;

impl InterruptChecker for NoopInterruptChecker {
    fn arm(&self) {}
    fn disarm(&self) {}
    fn is_interrupted(&self) -> bool {
        false
    }
}
