//! Configuration resolution for agents and workflows.
//!
//! A task configuration is a YAML document discovered in a task directory
//! (`workflow.yaml`, `workflow.yml`, `agent.yaml`, `agent.yml`, in that order)
//! or fetched by identifier. Two override passes are then applied to it, first
//! environment-derived values and then command-line `--key value` pairs. Each
//! pass replaces scalar values whose key matches an override (direct match) or
//! whose whole value is a `<name>` placeholder for one.
//!
//! ```
//! use agent_config::{apply_overrides, parse_overrides, ConfigTree, OverrideMap};
//!
//! let mut tree: ConfigTree = serde_yaml::from_str("model: <model_name>\nretries: 3\n").unwrap();
//! let cli = parse_overrides(["--model_name", "qwen-max", "--retries", "5"]).unwrap();
//! apply_overrides(&mut tree, &OverrideMap::new(), &cli);
//!
//! assert_eq!(tree.get("model").and_then(ConfigTree::as_str), Some("qwen-max"));
//! assert_eq!(tree.get("retries").and_then(ConfigTree::as_str), Some("5"));
//! ```

#![warn(missing_docs, clippy::pedantic)]

mod env;
mod error;
mod fetch;
mod finish;
mod lifecycle;
mod locator;
mod mcp;
pub mod merge;
mod overrides;
pub mod placeholder;
mod resolve;
mod tree;

/// Environment-derived override sources.
pub use env::{DEFAULT_ENV_FILE, EnvSource};
/// Error type and result alias shared across the crate.
pub use error::{ConfigError, ConfigResult};
/// Remote fetch strategies for targets missing locally.
pub use fetch::{NoRemoteFetch, RemoteFetcher, SnapshotCache};
/// Structural defaults and classification.
pub use finish::{
    CALLBACKS_KEY, LOCAL_DIR_KEY, NAME_KEY, TOOLS_KEY, WORKFLOW_NAMES, finish, is_workflow,
};
/// Hooks run around each agent task.
pub use lifecycle::{ConfigLifecycleHandler, PassThrough};
/// Document discovery and loading.
pub use locator::{LocatedDocument, SUPPORTED_CONFIG_NAMES, load_document, locate};
/// MCP server projection of the tool registry.
pub use mcp::{MCP_FLAG, McpProjection, project_mcp};
/// In-place override merge.
pub use merge::{Substitution, SubstitutionKind, merge};
/// Override maps and command-line parsing.
pub use overrides::{OVERRIDE_PREFIX, OverrideMap, parse_overrides};
/// Resolution pipeline.
pub use resolve::{ConfigLoader, OverridePass, ResolvedConfig, apply_overrides};
/// Configuration tree model.
pub use tree::{ConfigTree, Mapping, Scalar, UnsupportedKey};
