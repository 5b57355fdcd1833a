//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{HsnError, Result};
use crate::core::paths::resolve_absolute_path;

/// Full launcher configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub launcher: LauncherConfig,
    pub runner: RunnerConfig,
    pub logging: LoggingConfig,
    pub paths: PathsConfig,
}

/// Where categories live and how the menu looks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LauncherConfig {
    /// Directory whose subfolders are the menu categories. `None` means CWD.
    pub root: Option<PathBuf>,
    /// Colorize human output.
    pub color: bool,
}

/// External interpreter used for every script run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunnerConfig {
    pub program: String,
    /// Arguments placed before the script path.
    pub args: Vec<String>,
}

/// Activity log settings. No `jsonl_path` means no file logging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub jsonl_path: Option<PathBuf>,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

/// Filesystem paths used by the launcher itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            root: None,
            color: true,
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            program: "powershell".to_string(),
            args: vec![
                "-ExecutionPolicy".to_string(),
                "Bypass".to_string(),
                "-File".to_string(),
            ],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            jsonl_path: None,
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME")
            .or_else(|| env::var_os("USERPROFILE"))
            .map_or_else(|| PathBuf::from("."), PathBuf::from);
        Self {
            config_file: home_dir
                .join(".config")
                .join("hardsecnet")
                .join("config.toml"),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, env_var)
    }

    fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| HsnError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(HsnError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(lookup)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Resolved scan root: configured root, else the current directory.
    #[must_use]
    pub fn root_dir(&self) -> PathBuf {
        let raw = self
            .launcher
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        resolve_absolute_path(&raw)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("HSN_ROOT")
            && !raw.trim().is_empty()
        {
            self.launcher.root = Some(PathBuf::from(raw));
        }

        if let Some(raw) = lookup("HSN_COLOR") {
            self.launcher.color = parse_env_bool("HSN_COLOR", &raw)?;
        }

        if let Some(raw) = lookup("HSN_RUNNER_PROGRAM") {
            self.runner.program = raw.trim().to_string();
        }

        if let Some(raw) = lookup("HSN_RUNNER_ARGS") {
            self.runner.args = raw.split_whitespace().map(str::to_string).collect();
        }

        if let Some(raw) = lookup("HSN_LOG_JSONL") {
            self.logging.jsonl_path = if raw.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(raw))
            };
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.runner.program.trim().is_empty() {
            return Err(HsnError::InvalidConfig {
                details: "runner.program must not be empty".to_string(),
            });
        }

        if self.logging.max_size_bytes == 0 {
            return Err(HsnError::InvalidConfig {
                details: "logging.max_size_bytes must be > 0".to_string(),
            });
        }

        if self.logging.max_rotated_files == 0 {
            return Err(HsnError::InvalidConfig {
                details: "logging.max_rotated_files must be > 0".to_string(),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(HsnError::InvalidConfig {
            details: format!("env var {name} must be a boolean, got {raw:?}"),
        }),
    }
}
