//! 任意の Read をテキスト断片の Iterator に変換する
//!
//! 受信したチャンクごとに 1 断片を返す。チャンク境界で分断された UTF-8 の
//! マルチバイト文字は次のチャンクまで持ち越し、文字の途中で断片を切らない。
//! 読み取りが途中で失敗したら `StreamInterrupted` を 1 度返し、以後は None。

use crate::domain::StreamFragment;
use crate::error::Error;
use std::io::{ErrorKind, Read};

/// 1 回の read で読む最大バイト数
pub const CHUNK_SIZE: usize = 4096;

pub struct FragmentReader<R: Read> {
    reader: R,
    buf: Vec<u8>,
    /// 前チャンク末尾の不完全な UTF-8 バイト列
    pending: Vec<u8>,
    done: bool,
}

impl<R: Read> FragmentReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, CHUNK_SIZE)
    }

    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            buf: vec![0; chunk_size.max(1)],
            pending: Vec::new(),
            done: false,
        }
    }

    /// pending + bytes を復号し、末尾の不完全な文字だけを pending に残す
    fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(s) => {
                    out.push_str(s);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }

    fn flush_pending(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Some(rest)
    }
}

impl<R: Read> Iterator for FragmentReader<R> {
    type Item = Result<StreamFragment, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let mut chunk = std::mem::take(&mut self.buf);
            let read = self.reader.read(&mut chunk);
            let n = match read {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {
                    self.buf = chunk;
                    continue;
                }
                Err(e) => {
                    self.buf = chunk;
                    self.done = true;
                    return Some(Err(Error::StreamInterrupted(e.to_string())));
                }
            };
            if n == 0 {
                self.buf = chunk;
                self.done = true;
                return self.flush_pending().map(|s| Ok(StreamFragment::new(s)));
            }
            let text = self.decode(&chunk[..n]);
            self.buf = chunk;
            if !text.is_empty() {
                return Some(Ok(StreamFragment::new(text)));
            }
        }
    }
}
