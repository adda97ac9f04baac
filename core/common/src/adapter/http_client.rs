//! 共有 HTTP クライアントの生成
//!
//! reqwest::blocking::Client は内部で接続プールを持ち、clone しても同じプールを共有する。
//! wiring でプロセスにつき 1 度だけ生成し、各アダプタに渡す。

use crate::error::Error;
use std::time::Duration;

/// 接続タイムアウトのみを持つクライアントを作る。
///
/// 全体タイムアウトは付けない（長時間のストリーミング応答を途中で切らないため）。
/// ストア系の短い要求はリクエスト単位で timeout を指定する。
pub fn build_client(connect_timeout: Duration) -> Result<reqwest::blocking::Client, Error> {
    reqwest::blocking::Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(None::<Duration>)
        .user_agent(concat!("qchat/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::system(format!("Failed to build HTTP client: {}", e)))
}

/// エラー本文を表示用に短くする
pub(crate) fn truncate_diagnostic(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let head: String = trimmed.chars().take(max_chars).collect();
    format!("{}...", head)
}
