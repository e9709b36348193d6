//! Structural defaults and workflow classification for resolved documents.

use crate::error::{ConfigError, ConfigResult};
use crate::tree::ConfigTree;

/// Key holding the tool registry.
pub const TOOLS_KEY: &str = "tools";
/// Key holding the callback list.
pub const CALLBACKS_KEY: &str = "callbacks";
/// Key holding the matched document file name.
pub const NAME_KEY: &str = "name";
/// Key holding the directory the document was loaded from.
pub const LOCAL_DIR_KEY: &str = "local_dir";

/// Document names that mark a workflow rather than a single agent.
pub const WORKFLOW_NAMES: &[&str] = &["workflow.yaml", "workflow.yml"];

/// Ensures `tools` is a mapping and `callbacks` a sequence when absent or null.
///
/// Present non-null values are left alone. Non-mapping roots are returned
/// unchanged. Applying this twice is the same as applying it once.
#[must_use]
pub fn finish(mut tree: ConfigTree) -> ConfigTree {
    if let Some(root) = tree.as_mapping_mut() {
        if root.get(TOOLS_KEY).is_none_or(ConfigTree::is_null) {
            root.insert(TOOLS_KEY, ConfigTree::mapping());
        }
        if root.get(CALLBACKS_KEY).is_none_or(ConfigTree::is_null) {
            root.insert(CALLBACKS_KEY, ConfigTree::sequence());
        }
    }
    tree
}

/// Returns `true` if the document was loaded from a workflow file.
///
/// # Errors
///
/// Returns [`ConfigError::PreconditionViolation`] when the document carries no
/// `name`; resolution attaches it, so a missing name means the tree has not
/// been resolved yet.
pub fn is_workflow(tree: &ConfigTree) -> ConfigResult<bool> {
    let name = tree
        .get(NAME_KEY)
        .and_then(ConfigTree::as_str)
        .ok_or(ConfigError::PreconditionViolation {
            reason: "cannot find a valid name in this config",
        })?;
    Ok(WORKFLOW_NAMES.contains(&name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> ConfigTree {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn fills_missing_fields() {
        let tree = finish(parse("llm: {model: m}\n"));
        assert_eq!(tree.get(TOOLS_KEY), Some(&ConfigTree::mapping()));
        assert_eq!(tree.get(CALLBACKS_KEY), Some(&ConfigTree::sequence()));
    }

    #[test]
    fn replaces_explicit_nulls() {
        let tree = finish(parse("tools: ~\ncallbacks:\n"));
        assert_eq!(tree.get(TOOLS_KEY), Some(&ConfigTree::mapping()));
        assert_eq!(tree.get(CALLBACKS_KEY), Some(&ConfigTree::sequence()));
    }

    #[test]
    fn keeps_present_values() {
        let original = parse("tools:\n  search: {mcp: false}\ncallbacks: [input_callback]\n");
        assert_eq!(finish(original.clone()), original);
    }

    #[test]
    fn is_idempotent() {
        for yaml in ["{}", "tools: ~\n", "callbacks: [a]\n", "tools: {a: {}}\nx: 1\n"] {
            let once = finish(parse(yaml));
            assert_eq!(finish(once.clone()), once);
        }
    }

    #[test]
    fn classifies_workflow_names() {
        for (name, expected) in [
            ("workflow.yaml", true),
            ("workflow.yml", true),
            ("agent.yaml", false),
            ("agent.yml", false),
        ] {
            let tree = parse(&format!("name: {name}\n"));
            assert_eq!(is_workflow(&tree).unwrap(), expected, "{name}");
        }
    }

    #[test]
    fn classification_requires_a_name() {
        let err = is_workflow(&parse("llm: {}\n")).expect_err("should fail");
        assert!(matches!(err, ConfigError::PreconditionViolation { .. }));

        let err = is_workflow(&parse("name: ~\n")).expect_err("null name should fail");
        assert!(matches!(err, ConfigError::PreconditionViolation { .. }));
    }
}
