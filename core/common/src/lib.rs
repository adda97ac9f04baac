//! qchat 共通ライブラリ
//!
//! ドメイン型・ポート（trait）・HTTP/ファイルのアダプタを提供します。
//! usecase とコンソールは `qchat` クレート側にあります。

/// エラーハンドリング
pub mod error;

/// プロセス全体の設定
pub mod config;

/// ドメイン型
pub mod domain;

/// Outbound ポート
pub mod ports;

/// ポートの標準実装
pub mod adapter;
