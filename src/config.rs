use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use serde::Deserialize;

use crate::error::SemgusError;

pub const CONFIG_VERSION: u32 = 1;

/// How an input document is split into events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// `[` as the first non-whitespace character selects batch, anything else stream.
    #[default]
    Auto,
    /// One JSON array holding every event.
    Batch,
    /// Whitespace-separated event documents.
    Stream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Level selected by `count` repetitions of `-v`, starting from warn.
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    #[serde(default)]
    pub mode: InputMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub log_level: Option<LogLevel>,
}

/// Settings read from an optional TOML file. Command-line flags take precedence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub version: u32,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            input: InputConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, SemgusError> {
        let body = fs::read_to_string(path).map_err(|source| SemgusError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&body, path)
    }

    /// Parses `body`; `source` only labels errors.
    pub fn from_toml_str(body: &str, source: &Path) -> Result<Self, SemgusError> {
        let config: Config = toml::from_str(body).map_err(|err| SemgusError::Config {
            path: PathBuf::from(source),
            message: format!("config is not valid TOML: {err}"),
        })?;
        if config.version != CONFIG_VERSION {
            return Err(SemgusError::Config {
                path: PathBuf::from(source),
                message: format!(
                    "unsupported config version {} (expected {CONFIG_VERSION})",
                    config.version
                ),
            });
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tables_fall_back_to_defaults() {
        let config = Config::from_toml_str("version = 1\n", Path::new("semgus.toml"))
            .expect("config should parse");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn reads_input_and_output_tables() {
        let body = r#"version = 1

[input]
mode = "stream"

[output]
format = "json"
log_level = "debug"
"#;
        let config = Config::from_toml_str(body, Path::new("semgus.toml")).expect("config");
        assert_eq!(config.input.mode, InputMode::Stream);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.log_level, Some(LogLevel::Debug));
    }

    #[test]
    fn rejects_other_versions() {
        let err = Config::from_toml_str("version = 2\n", Path::new("semgus.toml"))
            .expect_err("version 2 must fail");
        assert_eq!(err.code(), "E-CONFIG");
        assert!(err.message().contains("unsupported config version 2"));
    }

    #[test]
    fn verbosity_counts_up_from_warn() {
        assert_eq!(LogLevel::from_verbosity(0).filter(), LevelFilter::WARN);
        assert_eq!(LogLevel::from_verbosity(2).filter(), LevelFilter::DEBUG);
        assert_eq!(LogLevel::from_verbosity(9).filter(), LevelFilter::TRACE);
    }
}
