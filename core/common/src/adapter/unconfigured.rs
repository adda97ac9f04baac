//! 設定が欠落しているストア・API の代役
//!
//! 起動は止めず、該当の操作が呼ばれた時点で `ConfigurationMissing` を返す。

use crate::domain::{Identifier, Query};
use crate::error::Error;
use crate::ports::outbound::{
    FragmentStream, LogStore, QueryStream, ScrollPage, ScrollRequest, ScrollStore,
};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct Unconfigured {
    /// 欠落している環境変数名
    variable: &'static str,
}

impl Unconfigured {
    pub fn new(variable: &'static str) -> Self {
        Self { variable }
    }

    fn err(&self) -> Error {
        Error::config_missing(self.variable)
    }
}

impl ScrollStore for Unconfigured {
    fn scroll(&self, _request: &ScrollRequest) -> Result<ScrollPage, Error> {
        Err(self.err())
    }
}

impl LogStore for Unconfigured {
    fn find_by_identifier(&self, _identifier: &Identifier) -> Result<Vec<Value>, Error> {
        Err(self.err())
    }
}

impl QueryStream for Unconfigured {
    fn stream_query(&self, _query: &Query, _identifier: &Identifier) -> Result<FragmentStream, Error> {
        Err(self.err())
    }
}
