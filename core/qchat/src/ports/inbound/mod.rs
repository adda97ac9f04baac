//! Inbound ポート: ドライバ（CLI）がアプリを呼び出すインターフェース

use crate::domain::QchatCommand;
use common::error::Error;

/// 解釈済みコマンドを実行して終了コードを返す
///
/// main はこの trait を実装した Runner の run を呼び出す。
pub trait UseCaseRunner {
    fn run(&self, cmd: QchatCommand) -> Result<i32, Error>;
}
