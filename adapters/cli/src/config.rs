//! TOML configuration for the command-line driver.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Configuration file consulted when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_PATH: &str = "wumpus.toml";

const DEFAULT_LOG_FILTER: &str = "info";

/// Settings read from the configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CliConfig {
    /// World file played when `play` is not given one.
    pub(crate) world: Option<PathBuf>,
    /// Session pacing.
    pub(crate) session: SessionConfig,
    /// Log output.
    pub(crate) logging: LoggingConfig,
}

/// Session settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SessionConfig {
    /// Keep the session paused and drive it one step at a time.
    pub(crate) start_paused: bool,
}

/// Logging settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LoggingConfig {
    /// `tracing-subscriber` filter directive used when `RUST_LOG` is unset.
    pub(crate) filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl CliConfig {
    /// Loads the configuration.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_PATH`] is
    /// read when present and defaults are used otherwise.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.is_file() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid configuration toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = CliConfig::from_toml("").expect("empty config parses");
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.logging.filter, "info");
        assert!(!config.session.start_paused);
        assert_eq!(config.world, None);
    }

    #[test]
    fn full_file_is_read() {
        let config = CliConfig::from_toml(
            r#"
            world = "caves/first.wld"

            [session]
            start_paused = true

            [logging]
            filter = "wumpus_system_rules=debug"
            "#,
        )
        .expect("config parses");

        assert_eq!(config.world, Some(PathBuf::from("caves/first.wld")));
        assert!(config.session.start_paused);
        assert_eq!(config.logging.filter, "wumpus_system_rules=debug");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(CliConfig::from_toml("speed = 3").is_err());
        assert!(CliConfig::from_toml("[session]\ndelay = 10").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let error = CliConfig::load(Some(&dir.path().join("absent.toml")))
            .expect_err("missing explicit config");
        assert!(error.to_string().contains("failed to read config file"));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("wumpus.toml");
        fs::write(&path, "[logging]\nfilter = \"warn\"\n").expect("write config");

        let config = CliConfig::load(Some(&path)).expect("config loads");

        assert_eq!(config.logging.filter, "warn");
    }
}
