//! HSN-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, HsnError>;

/// Top-level error type for the launcher.
#[derive(Debug, Error)]
pub enum HsnError {
    #[error("[HSN-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[HSN-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[HSN-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[HSN-2001] Audit.ps1 not found beside {harden} (expected {expected})")]
    MissingSibling { harden: PathBuf, expected: PathBuf },

    #[error("[HSN-2002] no PowerShell scripts found under {root}")]
    NoScriptsFound { root: PathBuf },

    #[error("[HSN-2003] no category folders found under {root}")]
    NoCategoriesFound { root: PathBuf },

    #[error("[HSN-3001] script {script} failed: {detail}")]
    ProcessFailure {
        script: PathBuf,
        exit_code: Option<i32>,
        detail: String,
    },

    #[error("[HSN-3002] failed to launch {program} for {script}: {source}")]
    Spawn {
        program: String,
        script: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[HSN-3003] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[HSN-3101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },
}

impl HsnError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "HSN-1001",
            Self::MissingConfig { .. } => "HSN-1002",
            Self::ConfigParse { .. } => "HSN-1003",
            Self::MissingSibling { .. } => "HSN-2001",
            Self::NoScriptsFound { .. } => "HSN-2002",
            Self::NoCategoriesFound { .. } => "HSN-2003",
            Self::ProcessFailure { .. } => "HSN-3001",
            Self::Spawn { .. } => "HSN-3002",
            Self::Io { .. } => "HSN-3003",
            Self::Serialization { .. } => "HSN-3101",
        }
    }

    /// Whether the failure came from an external script or its interpreter.
    #[must_use]
    pub const fn is_script_failure(&self) -> bool {
        matches!(self, Self::ProcessFailure { .. } | Self::Spawn { .. })
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for HsnError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for HsnError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
