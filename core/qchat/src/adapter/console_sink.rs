//! 端末への逐次描画
//!
//! 端末は追記しかできないため、描画済みの先頭部分は書き直さず新しい断片だけを書く。
//! 画面上の表示は常に「ここまでの断片の連結」と一致する。

use crate::ports::outbound::FragmentSink;
use common::domain::StreamFragment;
use common::error::Error;
use std::io::Write;

pub struct ConsoleSink<W: Write> {
    out: W,
    wrote_any: bool,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            wrote_any: false,
        }
    }
}

impl<W: Write> FragmentSink for ConsoleSink<W> {
    fn on_fragment(&mut self, fragment: &StreamFragment, _rendered: &str) -> Result<(), Error> {
        self.out
            .write_all(fragment.as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(|e| Error::io_msg(format!("Failed to write to terminal: {}", e)))?;
        self.wrote_any = true;
        Ok(())
    }

    fn on_end(&mut self) -> Result<(), Error> {
        if self.wrote_any {
            writeln!(self.out).map_err(|e| Error::io_msg(e.to_string()))?;
            self.wrote_any = false;
        }
        self.out.flush().map_err(|e| Error::io_msg(e.to_string()))
    }
}
