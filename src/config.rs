//! Optional TOML configuration applied to the registry.
//!
//! ```toml
//! [global]
//! level = "info"
//! flush_level = "error"
//! pattern = "%+"
//! flush_every_seconds = 5
//!
//! [levels]
//! net = "debug"
//!
//! [worker_pool]
//! queue_size = 8192
//! workers = 1
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::level::Level;
use crate::registry::Registry;
use crate::thread_pool::ThreadPool;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalSection,
    /// Per-logger level overrides, keyed by logger name.
    #[serde(default)]
    pub levels: HashMap<String, String>,
    #[serde(default)]
    pub worker_pool: Option<WorkerPoolSection>,
}

#[derive(Debug, Deserialize, Default)]
pub struct GlobalSection {
    pub level: Option<String>,
    pub flush_level: Option<String>,
    pub pattern: Option<String>,
    pub flush_every_seconds: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct WorkerPoolSection {
    pub queue_size: usize,
    pub workers: usize,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Config> {
        toml::from_str(text).map_err(|source| Error::ConfigParse {
            path: std::path::PathBuf::new(),
            source,
        })
    }

    /// Pushes the settings into the global registry. Level strings are
    /// validated before anything is applied.
    pub fn apply(&self) -> Result<()> {
        let registry = Registry::global();

        let global_level = self.global.level.as_deref().map(str::parse).transpose()?;
        let flush_level: Option<Level> = self
            .global
            .flush_level
            .as_deref()
            .map(str::parse)
            .transpose()?;
        let mut overrides = HashMap::new();
        for (name, level) in &self.levels {
            overrides.insert(name.clone(), level.parse::<Level>()?);
        }

        if let Some(pool) = &self.worker_pool {
            registry.set_pool(Some(ThreadPool::new(pool.queue_size, pool.workers)?));
        }
        if !overrides.is_empty() || global_level.is_some() {
            registry.set_levels(overrides, global_level);
        }
        if let Some(level) = flush_level {
            registry.set_flush_level(level);
        }
        if let Some(pattern) = &self.global.pattern {
            registry.set_pattern(pattern);
        }
        if let Some(secs) = self.global.flush_every_seconds {
            registry.flush_every(Duration::from_secs(secs));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config = Config::from_toml(
            r#"
            [global]
            level = "debug"
            flush_level = "error"
            pattern = "%v"
            flush_every_seconds = 3

            [levels]
            net = "trace"
            storage = "warn"

            [worker_pool]
            queue_size = 1024
            workers = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.global.level.as_deref(), Some("debug"));
        assert_eq!(config.global.flush_every_seconds, Some(3));
        assert_eq!(config.levels.len(), 2);
        let pool = config.worker_pool.unwrap();
        assert_eq!(pool.queue_size, 1024);
        assert_eq!(pool.workers, 2);
    }

    #[test]
    fn empty_config_is_valid() {
        let config = Config::from_toml("").unwrap();
        assert!(config.global.level.is_none());
        assert!(config.levels.is_empty());
        assert!(config.worker_pool.is_none());
    }

    #[test]
    fn bad_level_string_is_rejected_on_apply() {
        let config = Config::from_toml("[levels]\nnet = \"loud\"\n").unwrap();
        assert!(config.apply().is_err());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            Config::from_toml("[global\nlevel=1"),
            Err(Error::ConfigParse { .. })
        ));
    }
}
