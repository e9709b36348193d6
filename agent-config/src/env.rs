//! Environment-derived overrides.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::overrides::OverrideMap;

/// Default name of the dotenv file consulted by [`EnvSource`].
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Builds the environment [`OverrideMap`] for the first merge pass.
///
/// Sources are layered lowest to highest precedence:
/// 1. the dotenv file, if it exists
/// 2. the process environment, unless disabled
/// 3. the caller-supplied extra mapping
///
/// The process environment is only read, never modified.
#[derive(Clone, Debug)]
pub struct EnvSource {
    env_file: Option<PathBuf>,
    include_process: bool,
}

impl Default for EnvSource {
    fn default() -> Self {
        Self {
            env_file: Some(PathBuf::from(DEFAULT_ENV_FILE)),
            include_process: true,
        }
    }
}

impl EnvSource {
    /// Creates the default source: `./.env` plus the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source with no file and no process environment.
    ///
    /// Only the extra mapping passed to [`EnvSource::load`] contributes.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            env_file: None,
            include_process: false,
        }
    }

    /// Uses `path` as the dotenv file.
    #[must_use]
    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Disables the dotenv file.
    #[must_use]
    pub fn without_env_file(mut self) -> Self {
        self.env_file = None;
        self
    }

    /// Enables or disables reading the process environment.
    #[must_use]
    pub fn with_process_env(mut self, include: bool) -> Self {
        self.include_process = include;
        self
    }

    /// Returns the configured dotenv path.
    #[must_use]
    pub fn env_file(&self) -> Option<&Path> {
        self.env_file.as_deref()
    }

    /// Collects the layered overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EnvFile`] if the dotenv file exists but cannot be
    /// read or parsed.
    pub fn load(&self, extra: Option<&OverrideMap>) -> ConfigResult<OverrideMap> {
        let mut overrides = OverrideMap::new();

        if let Some(path) = self.env_file.as_deref() {
            load_env_file(path, &mut overrides)?;
        }

        if self.include_process {
            // Non-UTF-8 variables cannot be substituted into string values.
            overrides.extend(std::env::vars_os().filter_map(|(key, value)| {
                Some((key.into_string().ok()?, value.into_string().ok()?))
            }));
        }

        if let Some(extra) = extra {
            overrides.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        Ok(overrides)
    }
}

fn load_env_file(path: &Path, overrides: &mut OverrideMap) -> ConfigResult<()> {
    if !path.is_file() {
        debug!(path = %path.display(), "env file not present, skipping");
        return Ok(());
    }

    let env_error = |source| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    };
    let entries = dotenvy::from_path_iter(path).map_err(env_error)?;
    let mut count = 0_usize;
    for entry in entries {
        let (key, value) = entry.map_err(env_error)?;
        overrides.insert(key, value);
        count += 1;
    }
    debug!(path = %path.display(), count, "loaded env file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_env(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn empty_source_returns_only_extra() {
        let mut extra = OverrideMap::new();
        extra.insert("model_name".into(), "qwen-max".into());
        let overrides = EnvSource::empty().load(Some(&extra)).unwrap();
        assert_eq!(overrides, extra);
        assert!(EnvSource::empty().load(None).unwrap().is_empty());
    }

    #[test]
    fn reads_env_file() {
        let (_dir, path) = write_env("API_KEY=abc\n# comment\nMODEL=\"qwen\"\n");
        let overrides = EnvSource::empty().with_env_file(&path).load(None).unwrap();
        assert_eq!(overrides.get("API_KEY").map(String::as_str), Some("abc"));
        assert_eq!(overrides.get("MODEL").map(String::as_str), Some("qwen"));
    }

    #[test]
    fn extra_overrides_env_file() {
        let (_dir, path) = write_env("MODEL=from-file\nOTHER=kept\n");
        let mut extra = OverrideMap::new();
        extra.insert("MODEL".into(), "from-caller".into());
        let overrides = EnvSource::empty()
            .with_env_file(&path)
            .load(Some(&extra))
            .unwrap();
        assert_eq!(overrides["MODEL"], "from-caller");
        assert_eq!(overrides["OTHER"], "kept");
    }

    #[test]
    fn missing_env_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = EnvSource::empty()
            .with_env_file(dir.path().join(".env"))
            .load(None)
            .unwrap();
        assert!(overrides.is_empty());
    }

    #[test]
    fn malformed_env_file_is_an_error() {
        let (_dir, path) = write_env("NOT A VALID LINE\n");
        let err = EnvSource::empty()
            .with_env_file(&path)
            .load(None)
            .expect_err("should fail");
        assert!(matches!(err, ConfigError::EnvFile { .. }));
    }

    #[test]
    fn process_env_is_included_by_default() {
        // PATH is set in any environment running the test suite.
        let overrides = EnvSource::new().without_env_file().load(None).unwrap();
        assert!(overrides.contains_key("PATH"));
    }
}
