//! Discovery and loading of the configuration document for a task.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::fetch::RemoteFetcher;
use crate::tree::ConfigTree;

/// Document names tried in a task directory, in order. Workflows win over agents.
pub const SUPPORTED_CONFIG_NAMES: &[&str] =
    &["workflow.yaml", "workflow.yml", "agent.yaml", "agent.yml"];

/// A document picked by [`locate`], before any overrides are applied.
#[derive(Clone, Debug, PartialEq)]
pub struct LocatedDocument {
    /// Parsed document.
    pub tree: ConfigTree,
    /// File name that was loaded, e.g. `agent.yml`.
    pub name: String,
    /// Directory the document was loaded from.
    pub dir: PathBuf,
}

/// Finds and loads the document for `path_or_id`.
///
/// A path that does not exist locally is handed to `fetcher` as a repository
/// identifier. A file is loaded directly; a directory is searched for the
/// first of [`SUPPORTED_CONFIG_NAMES`].
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] when a directory holds none of the
/// candidates, any error from `fetcher`, and load errors from
/// [`load_document`].
pub fn locate<F>(path_or_id: &str, fetcher: &F) -> ConfigResult<LocatedDocument>
where
    F: RemoteFetcher + ?Sized,
{
    let mut target = PathBuf::from(path_or_id);
    if !target.exists() {
        info!(identifier = path_or_id, "path not found locally, fetching");
        target = fetcher.fetch(path_or_id)?;
    }

    if target.is_file() {
        let name = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let tree = load_document(&target)?;
        debug!(path = %target.display(), "loaded config file");
        return Ok(LocatedDocument { tree, name, dir });
    }

    for name in SUPPORTED_CONFIG_NAMES {
        let candidate = target.join(name);
        if candidate.is_file() {
            let tree = load_document(&candidate)?;
            debug!(path = %candidate.display(), "discovered config file");
            return Ok(LocatedDocument {
                tree,
                name: (*name).to_owned(),
                dir: target,
            });
        }
    }

    Err(ConfigError::NotFound {
        dir: target,
        candidates: SUPPORTED_CONFIG_NAMES,
    })
}

/// Reads and parses a YAML (or JSON) document.
///
/// An empty document yields an empty mapping. YAML merge keys (`<<: *anchor`)
/// are expanded, with keys written next to them taking precedence.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] or [`ConfigError::Parse`] on read and syntax
/// failures, and [`ConfigError::InvalidDocument`] when the root is not a
/// mapping or a key cannot be represented as a string.
pub fn load_document(path: &Path) -> ConfigResult<ConfigTree> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_error = |source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    };
    let mut value: serde_yaml::Value = serde_yaml::from_str(&raw).map_err(parse_error)?;
    value.apply_merge().map_err(parse_error)?;
    let tree = ConfigTree::try_from(value)
        .map_err(|err| ConfigError::invalid_document(path, err.to_string()))?;

    if tree.is_null() {
        return Ok(ConfigTree::mapping());
    }
    if tree.as_mapping().is_none() {
        return Err(ConfigError::invalid_document(
            path,
            format!("document root must be a mapping, found a {}", tree.kind()),
        ));
    }
    Ok(tree)
}
