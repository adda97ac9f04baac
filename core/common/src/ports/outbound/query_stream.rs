//! ストリーミング推論 Outbound ポート

use crate::domain::{Identifier, Query, StreamFragment};
use crate::error::Error;

/// 断片の遅延列。有限・再開不可。Err を返した後は None のみを返す。
pub type FragmentStream = Box<dyn Iterator<Item = Result<StreamFragment, Error>> + Send>;

/// クエリを送り、回答を断片列として受け取る（Outbound ポート）
///
/// ステータスは本文を読む前に検証する。非成功なら断片を 1 つも返さず
/// `Error::RemoteQueryFailed` を返す。再送は行わない。
pub trait QueryStream: Send + Sync {
    fn stream_query(&self, query: &Query, identifier: &Identifier) -> Result<FragmentStream, Error>;
}
