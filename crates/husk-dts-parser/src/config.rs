//! Parser limits, loadable from the `[parser]` table of a TOML file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Default nesting limit for types and declarations.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Default limit on significant tokens per file.
pub const DEFAULT_MAX_TOKENS: usize = 4_000_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid parser configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Root of a configuration file. Only the `[parser]` table is read; other
/// tables are ignored so the file can be shared with other tools.
#[derive(Debug, Clone, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    parser: ParserSection,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ParserSection {
    /// Maximum nesting depth of types and declaration bodies.
    max_depth: Option<usize>,
    /// Maximum number of significant tokens in one file.
    max_tokens: Option<usize>,
}

/// Caller-imposed bounds on a single parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    pub max_depth: usize,
    pub max_tokens: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl ParserConfig {
    /// Parse configuration from a TOML string. Missing keys keep their defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        let defaults = Self::default();
        Ok(Self {
            max_depth: file.parser.max_depth.unwrap_or(defaults.max_depth),
            max_tokens: file.parser.max_tokens.unwrap_or(defaults.max_tokens),
        })
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }
}
