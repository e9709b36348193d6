//! Hooks for adjusting a configuration around each agent task.

use crate::resolve::ResolvedConfig;

/// Rewrites configurations as a workflow moves from agent to agent.
///
/// `tag` identifies the agent, so one handler can serve several agents. Both
/// hooks default to returning the configuration unchanged.
pub trait ConfigLifecycleHandler: Send + Sync {
    /// Called before the agent identified by `tag` starts its task.
    fn task_begin(&self, config: ResolvedConfig, _tag: &str) -> ResolvedConfig {
        config
    }

    /// Called after the task ends; the result is handed to the next agent in
    /// the workflow unless that agent has a configuration of its own.
    fn task_end(&self, config: ResolvedConfig, _tag: &str) -> ResolvedConfig {
        config
    }
}

/// Handler that leaves every configuration unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThrough;

impl ConfigLifecycleHandler for PassThrough {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ConfigTree;

    struct ModelPinner;

    impl ConfigLifecycleHandler for ModelPinner {
        fn task_begin(&self, config: ResolvedConfig, tag: &str) -> ResolvedConfig {
            if tag != "coder" {
                return config;
            }
            let mut tree = config.tree().clone();
            if let Some(root) = tree.as_mapping_mut() {
                root.insert("model", ConfigTree::from("pinned"));
            }
            config.with_tree(tree)
        }
    }

    fn config() -> ResolvedConfig {
        let tree = serde_yaml::from_str("model: base\n").unwrap();
        ResolvedConfig::new(tree, "/tasks/demo", "workflow.yaml")
    }

    #[test]
    fn pass_through_is_identity() {
        let original = config();
        let begun = PassThrough.task_begin(original.clone(), "any");
        assert_eq!(PassThrough.task_end(begun, "any"), original);
    }

    #[test]
    fn handlers_dispatch_on_tag() {
        let handler = ModelPinner;
        let other = handler.task_begin(config(), "reviewer");
        assert_eq!(other.get("model").and_then(ConfigTree::as_str), Some("base"));

        let pinned = handler.task_begin(config(), "coder");
        assert_eq!(pinned.get("model").and_then(ConfigTree::as_str), Some("pinned"));
        assert_eq!(pinned.name(), "workflow.yaml");
        // task_end falls back to the default.
        assert_eq!(handler.task_end(pinned.clone(), "coder"), pinned);
    }
}
