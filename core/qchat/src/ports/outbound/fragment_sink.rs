//! ストリーム断片の描画先 Outbound ポート
//!
//! 断片を 1 つ受け取るたびに 1 回呼ばれる。特定の UI の再描画機構には依存しない。

use common::domain::StreamFragment;
use common::error::Error;

pub trait FragmentSink {
    /// `rendered` は 1..i 番目の断片を連結したもの（i = この断片）
    fn on_fragment(&mut self, fragment: &StreamFragment, rendered: &str) -> Result<(), Error>;

    /// ストリーム終了時（成功・失敗どちらでも 1 回）
    fn on_end(&mut self) -> Result<(), Error> {
        Ok(())
    }
}
