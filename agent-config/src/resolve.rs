//! Resolution pipeline: locate, override, annotate, finish.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::EnvSource;
use crate::error::ConfigResult;
use crate::fetch::{NoRemoteFetch, RemoteFetcher};
use crate::finish::{self, LOCAL_DIR_KEY, NAME_KEY};
use crate::locator::{self, LocatedDocument};
use crate::mcp::{self, McpProjection};
use crate::merge::{self, Substitution};
use crate::overrides::OverrideMap;
use crate::tree::ConfigTree;

/// Which override pass produced a substitution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverridePass {
    /// Environment and `.env` derived overrides.
    Env,
    /// Command-line `--key value` overrides.
    Cli,
}

impl OverridePass {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Env => "env",
            Self::Cli => "cli",
        }
    }
}

/// Applies environment overrides, then command-line overrides, to `tree`.
///
/// Both passes mutate the same tree, so command-line values win wherever the
/// two target the same key. Nothing is rolled back.
pub fn apply_overrides(
    tree: &mut ConfigTree,
    env_overrides: &OverrideMap,
    cli_overrides: &OverrideMap,
) -> Vec<(OverridePass, Substitution)> {
    let mut applied = Vec::new();
    for (pass, overrides) in [
        (OverridePass::Env, env_overrides),
        (OverridePass::Cli, cli_overrides),
    ] {
        let events = merge::merge(tree, overrides);
        debug!(pass = pass.as_str(), substitutions = events.len(), "applied overrides");
        for event in events {
            info!(pass = pass.as_str(), path = %event.path, "{event}");
            applied.push((pass, event));
        }
    }
    applied
}

/// Fully materialized configuration for one task invocation.
///
/// Treated as read-only once produced; [`ConfigLifecycleHandler`] hooks return
/// new values rather than mutating shared ones.
///
/// [`ConfigLifecycleHandler`]: crate::lifecycle::ConfigLifecycleHandler
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedConfig {
    tree: ConfigTree,
    local_dir: PathBuf,
    name: String,
}

impl ResolvedConfig {
    /// Attaches `local_dir` and `name` to `tree` and fills structural defaults.
    #[must_use]
    pub fn new(mut tree: ConfigTree, local_dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        let local_dir = local_dir.into();
        let name = name.into();
        if let Some(root) = tree.as_mapping_mut() {
            root.insert(
                LOCAL_DIR_KEY,
                ConfigTree::from(local_dir.to_string_lossy().into_owned()),
            );
            root.insert(NAME_KEY, ConfigTree::from(name.clone()));
        }
        Self {
            tree: finish::finish(tree),
            local_dir,
            name,
        }
    }

    /// The resolved document.
    #[must_use]
    pub const fn tree(&self) -> &ConfigTree {
        &self.tree
    }

    /// Consumes the configuration, returning the document.
    #[must_use]
    pub fn into_tree(self) -> ConfigTree {
        self.tree
    }

    /// Directory the document was loaded from.
    #[must_use]
    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    /// File name that was matched.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a top-level entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigTree> {
        self.tree.get(key)
    }

    /// Returns `true` if the document is a workflow rather than a single agent.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionViolation`](crate::ConfigError::PreconditionViolation)
    /// if the `name` entry was removed from the document.
    pub fn is_workflow(&self) -> ConfigResult<bool> {
        finish::is_workflow(&self.tree)
    }

    /// MCP server view of the tool registry.
    #[must_use]
    pub fn mcp_servers(&self) -> McpProjection {
        mcp::project_mcp(&self.tree)
    }

    /// Replaces the document while keeping the derived fields.
    ///
    /// Used by lifecycle hooks that rewrite a configuration between agents.
    #[must_use]
    pub fn with_tree(self, tree: ConfigTree) -> Self {
        Self::new(tree, self.local_dir, self.name)
    }
}

/// Resolves task configurations from directories, files, or identifiers.
///
/// # Examples
///
/// ```no_run
/// use agent_config::{ConfigLoader, EnvSource, parse_overrides};
///
/// let cli = parse_overrides(["--model_name", "qwen-max"]).unwrap();
/// let config = ConfigLoader::new()
///     .with_env_source(EnvSource::empty())
///     .from_task("tasks/research", None, &cli)
///     .unwrap();
/// println!("workflow: {}", config.is_workflow().unwrap());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConfigLoader<F = NoRemoteFetch> {
    fetcher: F,
    env: EnvSource,
}

impl ConfigLoader {
    /// Creates a loader with the default env source and no remote fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: RemoteFetcher> ConfigLoader<F> {
    /// Uses `fetcher` for targets that do not exist locally.
    #[must_use]
    pub fn with_fetcher<G: RemoteFetcher>(self, fetcher: G) -> ConfigLoader<G> {
        ConfigLoader {
            fetcher,
            env: self.env,
        }
    }

    /// Uses `env` to build the environment overrides.
    #[must_use]
    pub fn with_env_source(mut self, env: EnvSource) -> Self {
        self.env = env;
        self
    }

    /// Returns the configured env source.
    #[must_use]
    pub const fn env_source(&self) -> &EnvSource {
        &self.env
    }

    /// Locates, overrides, and finishes the configuration for `target`.
    ///
    /// `env_extra` is layered on top of the environment; `cli_overrides` is
    /// applied last and wins over everything else.
    ///
    /// # Errors
    ///
    /// Returns any [`ConfigError`](crate::ConfigError) from locating, loading,
    /// or building the environment overrides. No partially resolved configuration is returned.
    pub fn from_task(
        &self,
        target: &str,
        env_extra: Option<&OverrideMap>,
        cli_overrides: &OverrideMap,
    ) -> ConfigResult<ResolvedConfig> {
        let LocatedDocument { mut tree, name, dir } = locator::locate(target, &self.fetcher)?;
        info!(task = target, name = %name, dir = %dir.display(), "resolving config");

        let env_overrides = self.env.load(env_extra)?;
        apply_overrides(&mut tree, &env_overrides, cli_overrides);

        Ok(ResolvedConfig::new(tree, dir, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> ConfigTree {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn overrides(pairs: &[(&str, &str)]) -> OverrideMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn cli_wins_over_env() {
        let mut tree = parse("model: base\n");
        let applied = apply_overrides(
            &mut tree,
            &overrides(&[("model", "from-env")]),
            &overrides(&[("model", "from-cli")]),
        );
        assert_eq!(tree.get("model").and_then(ConfigTree::as_str), Some("from-cli"));
        let passes: Vec<_> = applied.iter().map(|(pass, _)| *pass).collect();
        assert_eq!(passes, vec![OverridePass::Env, OverridePass::Cli]);
    }

    #[test]
    fn env_pass_consumes_placeholders_first() {
        // Once env resolves the placeholder, the cli token no longer matches.
        let mut tree = parse("model: <model_name>\n");
        apply_overrides(
            &mut tree,
            &overrides(&[("model_name", "env-model")]),
            &overrides(&[("model_name", "cli-model")]),
        );
        assert_eq!(tree.get("model").and_then(ConfigTree::as_str), Some("env-model"));
    }

    #[test]
    fn resolves_end_to_end_scenario() {
        let mut tree = parse("model: <model_name>\nretries: 3\n");
        apply_overrides(
            &mut tree,
            &OverrideMap::new(),
            &overrides(&[("model_name", "qwen-max"), ("retries", "5")]),
        );
        assert_eq!(tree, parse("model: qwen-max\nretries: '5'\n"));
    }

    #[test]
    fn resolved_config_carries_derived_fields() {
        let config = ResolvedConfig::new(parse("llm: {}\n"), "/tasks/demo", "agent.yml");
        assert_eq!(config.name(), "agent.yml");
        assert_eq!(config.local_dir(), Path::new("/tasks/demo"));
        assert_eq!(config.get(NAME_KEY).and_then(ConfigTree::as_str), Some("agent.yml"));
        assert_eq!(
            config.get(LOCAL_DIR_KEY).and_then(ConfigTree::as_str),
            Some("/tasks/demo")
        );
        assert!(!config.is_workflow().unwrap());
        assert_eq!(config.get("tools"), Some(&ConfigTree::mapping()));
        assert_eq!(config.get("callbacks"), Some(&ConfigTree::sequence()));
    }

    #[test]
    fn derived_fields_overwrite_document_values() {
        let config = ResolvedConfig::new(parse("name: custom\n"), "/tasks", "workflow.yaml");
        assert!(config.is_workflow().unwrap());
    }

    #[test]
    fn with_tree_keeps_derived_fields() {
        let config = ResolvedConfig::new(parse("a: 1\n"), "/tasks", "workflow.yml");
        let replaced = config.with_tree(parse("b: 2\n"));
        assert!(replaced.get("a").is_none());
        assert_eq!(replaced.name(), "workflow.yml");
        assert!(replaced.is_workflow().unwrap());
    }

    #[test]
    fn loader_resolves_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("agent.yml"), "model: <model_name>\n").unwrap();
        let config = ConfigLoader::new()
            .with_env_source(EnvSource::empty())
            .from_task(
                dir.path().to_str().unwrap(),
                Some(&overrides(&[("model_name", "from-env")])),
                &OverrideMap::new(),
            )
            .unwrap();
        assert_eq!(config.get("model").and_then(ConfigTree::as_str), Some("from-env"));
        assert_eq!(config.local_dir(), dir.path());
    }
}
