//! Projection of the tool registry into an MCP server configuration.

use serde::Serialize;
use tracing::warn;

use crate::finish::TOOLS_KEY;
use crate::tree::{ConfigTree, Mapping, Scalar};

/// Per-tool attribute selecting whether the tool is exposed over MCP.
pub const MCP_FLAG: &str = "mcp";

/// `{"mcpServers": {...}}` view of the enabled tools.
///
/// Entries are deep copies, so later changes to the source tree do not leak in.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct McpProjection {
    #[serde(rename = "mcpServers")]
    servers: Mapping,
}

impl McpProjection {
    /// Server entries keyed by tool name, in registry order.
    #[must_use]
    pub const fn servers(&self) -> &Mapping {
        &self.servers
    }

    /// Returns `true` when no tool is exposed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Renders the projection as JSON.
    ///
    /// # Errors
    ///
    /// Propagates [`serde_json::Error`]; only non-finite floats can trigger it.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Builds the MCP view of `tree`'s `tools` registry.
///
/// A tool is included unless its `mcp` attribute is false; the attribute
/// itself is not copied. A missing or empty registry yields an empty view.
#[must_use]
pub fn project_mcp(tree: &ConfigTree) -> McpProjection {
    let Some(tools) = tree.get(TOOLS_KEY).and_then(ConfigTree::as_mapping) else {
        return McpProjection::default();
    };

    let servers = tools
        .iter()
        .filter(|(name, entry)| mcp_enabled(name, entry))
        .map(|(name, entry)| (name, strip_flag(entry)))
        .collect();
    McpProjection { servers }
}

fn mcp_enabled(name: &str, entry: &ConfigTree) -> bool {
    let Some(flag) = entry.get(MCP_FLAG) else {
        return true;
    };
    match flag.as_scalar() {
        Some(Scalar::Bool(enabled)) => *enabled,
        Some(Scalar::Null) => true,
        // Overrides always arrive as strings.
        Some(Scalar::String(raw)) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => true,
            "false" | "no" | "off" | "0" => false,
            _ => {
                warn!(tool = name, value = %raw, "unrecognized mcp flag, treating as enabled");
                true
            }
        },
        _ => {
            warn!(tool = name, kind = flag.kind(), "non-boolean mcp flag, treating as enabled");
            true
        }
    }
}

fn strip_flag(entry: &ConfigTree) -> ConfigTree {
    let mut copy = entry.clone();
    if let Some(mapping) = copy.as_mapping_mut() {
        mapping.remove(MCP_FLAG);
    }
    copy
}
