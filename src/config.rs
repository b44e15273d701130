//! Scanner and scoring options.
//!
//! Precedence: built-in defaults → `choose-files.toml` (or `--config`) →
//! `--override name=value`. List options extend what came before; an
//! `exclude_directory` entry starting with `!` removes a pattern instead.

use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "choose-files.toml";
pub const DEFAULT_MAX_DEPTH: usize = 4;
const DEFAULT_EXCLUDE_DIRECTORIES: [&str; 4] = ["^/proc$", "^/dev$", "^/sys$", "/__pycache__$"];
const DEFAULT_MODIFY_SCORE: [&str; 1] = [r"(^|/)\.[^/]+(/|$) *= 0.5"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("The override {0:?} must have the form name=value")]
    MalformedOverride(String),

    #[error("Unknown option {0:?}")]
    UnknownOption(String),

    #[error("The value {value:?} for {option} is not a valid non-negative integer")]
    InvalidInteger { option: String, value: String },

    #[error("The exclude_directory pattern {pattern:?} is invalid: {source}")]
    ExcludePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Sparse on-disk form: absent keys keep the accumulated value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    exclude_directory: Option<Vec<String>>,
    max_depth: Option<usize>,
    modify_score: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChooserConfig {
    pub exclude_directory: Vec<String>,
    pub max_depth: usize,
    pub modify_score: Vec<String>,
}

impl Default for ChooserConfig {
    fn default() -> Self {
        ChooserConfig {
            exclude_directory: DEFAULT_EXCLUDE_DIRECTORIES.map(String::from).to_vec(),
            max_depth: DEFAULT_MAX_DEPTH,
            modify_score: DEFAULT_MODIFY_SCORE.map(String::from).to_vec(),
        }
    }
}

impl ChooserConfig {
    /// `<config_dir>/kitty/choose-files.toml`, if a config dir exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("kitty").join(CONFIG_FILE_NAME))
    }

    /// Load from the given files (the default location when empty, nothing
    /// when one of them is `NONE`) and then apply overrides.
    pub fn load(config_paths: &[PathBuf], overrides: &[String]) -> Result<Self, ConfigError> {
        let mut config = ChooserConfig::default();

        if config_paths.is_empty() {
            if let Some(path) = Self::default_path().filter(|p| p.is_file()) {
                config.merge_file(&path)?;
            }
        } else if !config_paths.iter().any(|p| p == Path::new("NONE")) {
            for path in config_paths {
                config.merge_file(path)?;
            }
        }

        for assignment in overrides {
            config.apply_override(assignment)?;
        }
        Ok(config)
    }

    fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded config from {}", path.display());

        for pattern in file.exclude_directory.unwrap_or_default() {
            self.push_exclude_directory(pattern);
        }
        if let Some(depth) = file.max_depth {
            self.max_depth = depth;
        }
        self.modify_score
            .extend(file.modify_score.unwrap_or_default());
        Ok(())
    }

    fn apply_override(&mut self, assignment: &str) -> Result<(), ConfigError> {
        let (name, value) = assignment
            .split_once('=')
            .map(|(n, v)| (n.trim(), v.trim()))
            .filter(|(n, _)| !n.is_empty())
            .ok_or_else(|| ConfigError::MalformedOverride(assignment.to_string()))?;

        match name {
            "exclude_directory" => self.push_exclude_directory(value.to_string()),
            "modify_score" => self.modify_score.push(value.to_string()),
            "max_depth" => {
                self.max_depth = value.parse().map_err(|_| ConfigError::InvalidInteger {
                    option: name.to_string(),
                    value: value.to_string(),
                })?;
            }
            other => return Err(ConfigError::UnknownOption(other.to_string())),
        }
        Ok(())
    }

    fn push_exclude_directory(&mut self, pattern: String) {
        match pattern.strip_prefix('!') {
            Some(removed) => self.exclude_directory.retain(|p| p != removed),
            None => {
                if !self.exclude_directory.contains(&pattern) {
                    self.exclude_directory.push(pattern);
                }
            }
        }
    }

    pub fn exclude_patterns(&self) -> Result<Vec<Regex>, ConfigError> {
        self.exclude_directory
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigError::ExcludePattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect()
    }
}
