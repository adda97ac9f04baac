//! 標準設定解決実装（std::env を委譲）

use crate::config::AppConfig;
use crate::error::Error;
use crate::ports::outbound::ConfigResolver;
use std::env;

/// 環境変数から設定を解決する。overrides に同名の値があればそちらを優先する。
#[derive(Debug, Clone, Default)]
pub struct StdConfigResolver {
    overrides: Vec<(&'static str, String)>,
}

impl StdConfigResolver {
    pub fn with_overrides(overrides: Vec<(&'static str, String)>) -> Self {
        Self { overrides }
    }

    fn lookup(&self, name: &str) -> Option<String> {
        self.overrides
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.clone())
            .or_else(|| env::var(name).ok())
    }
}

impl ConfigResolver for StdConfigResolver {
    fn resolve(&self) -> Result<AppConfig, Error> {
        AppConfig::from_lookup(|name| self.lookup(name))
    }
}
