//! 設定解決 Outbound ポート
//!
//! usecase・wiring はこの trait 経由でのみ環境変数にアクセスする。

use crate::config::AppConfig;
use crate::error::Error;

/// プロセス起動時に 1 度だけ設定を解決する
pub trait ConfigResolver: Send + Sync {
    /// 欠落は AppConfig 内の None として返す。値の形式不正のみ Err。
    fn resolve(&self) -> Result<AppConfig, Error>;
}
