//! Plain-data engine configuration, round-trippable through `toml`.

use serde::{Deserialize, Serialize};

use crate::block::BLOCK_SIZE;
use crate::sig::Algorithm;
use crate::{err_at, Result};

/// Default number of blocks the page cache holds resident at once.
pub const DEFAULT_NUM_PAGES: usize = 5;

/// Knobs this core actually exposes. Plain data with builder-style
/// `set_*` methods — not a singleton, and not wired into any global
/// state by this crate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    num_pages: usize,
    #[serde(skip)]
    block_size: usize,
    default_algorithms: Vec<Algorithm>,
}

impl Config {
    pub fn new() -> Self {
        Config {
            num_pages: DEFAULT_NUM_PAGES,
            block_size: BLOCK_SIZE,
            default_algorithms: vec![Algorithm::Md5, Algorithm::Sha1],
        }
    }

    pub fn num_pages(&self) -> usize {
        self.num_pages
    }

    pub fn set_num_pages(mut self, num_pages: usize) -> Self {
        self.num_pages = num_pages;
        self
    }

    /// Fixed at compile time; exposed as a named constant rather than a
    /// magic number, never settable.
    pub fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    pub fn default_algorithms(&self) -> &[Algorithm] {
        &self.default_algorithms
    }

    pub fn set_default_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.default_algorithms = algorithms;
        self
    }

    pub fn to_toml(&self) -> Result<String> {
        err_at!(EncodeFail, toml::to_string(self))
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        let mut cfg: Config = err_at!(DecodeFail, toml::from_str(s))?;
        cfg.block_size = BLOCK_SIZE;
        Ok(cfg)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
