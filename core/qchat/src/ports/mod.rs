//! Ports & Adapters のポート定義
//!
//! - inbound: ドライバ（CLI）がアプリを呼び出すインターフェース
//! - outbound: アプリが外界（描画・割り込み）を使うための trait
//!   ストア・推論 API のポートは common::ports::outbound にある

pub mod inbound;
pub mod outbound;
