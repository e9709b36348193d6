//! Error definitions for configuration resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the configuration crate.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while locating, loading, or resolving a configuration.
///
/// Every variant is fatal for the resolution in progress. A tree that was being
/// merged when one of these surfaced must be discarded, not reused.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No candidate document exists in the searched directory.
    #[error(
        "cannot find any valid config file in {}, supported configs are: {}",
        dir.display(),
        candidates.join(", ")
    )]
    NotFound {
        /// Directory that was searched.
        dir: PathBuf,
        /// File names that were tried, in search order.
        candidates: &'static [&'static str],
    },

    /// A command-line override token was not a `--key value` pair.
    #[error("malformed override argument `{argument}`: {reason}")]
    MalformedArguments {
        /// The offending token.
        argument: String,
        /// Human-readable reason for rejection.
        reason: &'static str,
    },

    /// An operation was invoked before the document carried what it needs.
    #[error("precondition violated: {reason}")]
    PreconditionViolation {
        /// Human-readable description of the missing precondition.
        reason: &'static str,
    },

    /// Reading a document from disk failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Source [`std::io::Error`].
        source: std::io::Error,
    },

    /// The document is not valid YAML.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// Path of the document being parsed.
        path: PathBuf,
        /// Source [`serde_yaml::Error`].
        source: serde_yaml::Error,
    },

    /// The document parsed but has a shape the engine cannot resolve.
    #[error("invalid config document {}: {reason}", path.display())]
    InvalidDocument {
        /// Path of the offending document.
        path: PathBuf,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// A repository identifier could not be turned into a local directory.
    #[error("cannot fetch `{identifier}`: {reason}")]
    RemoteFetch {
        /// Identifier that was requested.
        identifier: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The `.env` file exists but could not be parsed.
    #[error("failed to load env file {}: {source}", path.display())]
    EnvFile {
        /// Path of the env file.
        path: PathBuf,
        /// Source [`dotenvy::Error`].
        source: dotenvy::Error,
    },
}

impl ConfigError {
    /// Helper to construct remote fetch errors from string-like values.
    #[must_use]
    pub fn remote_fetch(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RemoteFetch {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Helper to construct document shape errors.
    #[must_use]
    pub fn invalid_document(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
