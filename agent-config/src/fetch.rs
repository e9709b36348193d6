//! Strategies for turning a repository identifier into a local directory.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Resolves identifiers that do not exist on the local filesystem.
///
/// Implementations may block (network or disk); the locator calls them at most
/// once per resolution.
pub trait RemoteFetcher {
    /// Returns the local directory holding the snapshot for `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RemoteFetch`] if the identifier is invalid or the
    /// snapshot cannot be materialized.
    fn fetch(&self, identifier: &str) -> ConfigResult<PathBuf>;
}

impl<F> RemoteFetcher for F
where
    F: Fn(&str) -> ConfigResult<PathBuf>,
{
    fn fetch(&self, identifier: &str) -> ConfigResult<PathBuf> {
        (self)(identifier)
    }
}

/// Fetcher that refuses every identifier, so a missing local path is reported.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRemoteFetch;

impl RemoteFetcher for NoRemoteFetch {
    fn fetch(&self, identifier: &str) -> ConfigResult<PathBuf> {
        Err(ConfigError::remote_fetch(
            identifier,
            "path does not exist locally and no remote fetcher is configured",
        ))
    }
}

/// Fetcher backed by a directory of previously downloaded snapshots.
///
/// An identifier `owner/name` maps to `<root>/owner/name`.
#[derive(Clone, Debug)]
pub struct SnapshotCache {
    root: PathBuf,
}

impl SnapshotCache {
    /// Creates a cache rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the cache root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl RemoteFetcher for SnapshotCache {
    fn fetch(&self, identifier: &str) -> ConfigResult<PathBuf> {
        let mut parts = identifier.split('/');
        let (Some(owner), Some(name), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ConfigError::remote_fetch(
                identifier,
                "expected an identifier of the form `owner/name`",
            ));
        };
        if [owner, name]
            .iter()
            .any(|part| part.is_empty() || *part == "." || *part == "..")
        {
            return Err(ConfigError::remote_fetch(
                identifier,
                "identifier segments must be non-empty names",
            ));
        }

        let dir = self.root.join(owner).join(name);
        if !dir.is_dir() {
            return Err(ConfigError::remote_fetch(
                identifier,
                format!("no snapshot found at {}", dir.display()),
            ));
        }
        debug!(identifier, dir = %dir.display(), "resolved snapshot from cache");
        Ok(dir)
    }
}
