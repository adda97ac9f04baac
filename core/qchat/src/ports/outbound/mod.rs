//! Outbound ポート: アプリが外界（描画・割り込み）を使うための trait

pub mod fragment_sink;
pub mod interrupt_checker;

pub use fragment_sink::FragmentSink;
pub use interrupt_checker::InterruptChecker;
