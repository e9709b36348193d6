//! Resolves an agent or workflow configuration and prints the result.
//!
//! ```text
//! resolve-config tasks/research --model_name qwen-max --retries 5
//! resolve-config --mcp --format json tasks/research
//! ```
//!
//! Overrides follow the target. This tool's own flags are still recognized after
//! the target, up to the first override. Use `--` before the overrides if a key
//! collides with one of those flags.

#![warn(missing_docs, clippy::pedantic)]

use std::path::PathBuf;

use agent_config::{
    ConfigLoader, EnvSource, RemoteFetcher, ResolvedConfig, SnapshotCache, parse_overrides,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Output encoding for the resolved document.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "resolve-config", version, about = "Resolve an agent or workflow configuration")]
struct Cli {
    /// Output encoding.
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,

    /// Print the MCP server projection instead of the full document.
    #[arg(long)]
    mcp: bool,

    /// Dotenv file consulted for environment overrides.
    #[arg(long, value_name = "PATH", default_value = agent_config::DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// Ignore the process environment when building overrides.
    #[arg(long)]
    no_process_env: bool,

    /// Directory of downloaded snapshots used for `owner/name` targets.
    #[arg(long, value_name = "DIR")]
    snapshot_cache: Option<PathBuf>,

    /// Task directory, config file, or repository identifier.
    target: String,

    /// Overrides as `--key value` pairs.
    #[arg(
        value_name = "OVERRIDES",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    overrides: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let overrides = parse_overrides(cli.overrides.iter().cloned())?;
    let env = EnvSource::new()
        .with_env_file(&cli.env_file)
        .with_process_env(!cli.no_process_env);
    let loader = ConfigLoader::new().with_env_source(env);

    let config = match &cli.snapshot_cache {
        Some(root) => resolve(loader.with_fetcher(SnapshotCache::new(root)), &cli, &overrides)?,
        None => resolve(loader, &cli, &overrides)?,
    };

    let rendered = if cli.mcp {
        render(&config.mcp_servers(), cli.format)?
    } else {
        render(config.tree(), cli.format)?
    };
    print!("{rendered}");
    Ok(())
}

fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Json => serde_json::to_string_pretty(value)? + "\n",
    })
}

fn resolve<F: RemoteFetcher>(
    loader: ConfigLoader<F>,
    cli: &Cli,
    overrides: &agent_config::OverrideMap,
) -> Result<ResolvedConfig> {
    let config = loader
        .from_task(&cli.target, None, overrides)
        .with_context(|| format!("failed to resolve config for `{}`", cli.target))?;
    let workflow = config.is_workflow()?;
    debug!(name = config.name(), workflow, "resolved config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_overrides_are_collected() {
        let cli = Cli::try_parse_from([
            "resolve-config",
            "--format",
            "json",
            "tasks/demo",
            "--model_name",
            "qwen-max",
        ])
        .unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
        assert_eq!(cli.target, "tasks/demo");
        let overrides = parse_overrides(cli.overrides).unwrap();
        assert_eq!(overrides["model_name"], "qwen-max");
    }

    #[test]
    fn separator_allows_colliding_keys() {
        let cli =
            Cli::try_parse_from(["resolve-config", "tasks/demo", "--", "--mcp", "false"]).unwrap();
        assert!(!cli.mcp);
        let overrides = parse_overrides(cli.overrides).unwrap();
        assert_eq!(overrides["mcp"], "false");
    }

    #[test]
    fn own_flags_after_target_are_not_overrides() {
        let cli = Cli::try_parse_from([
            "resolve-config",
            "tasks/demo",
            "--format",
            "json",
            "--retries",
            "5",
        ])
        .unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
        let overrides = parse_overrides(cli.overrides).unwrap();
        assert!(!overrides.contains_key("format"));
        assert_eq!(overrides["retries"], "5");
    }

    #[test]
    fn renders_in_document_order() {
        let tree: agent_config::ConfigTree = serde_yaml::from_str("zeta: 1\nalpha: [a]\n").unwrap();
        assert_eq!(
            render(&tree, OutputFormat::Json).unwrap(),
            "{\n  \"zeta\": 1,\n  \"alpha\": [\n    \"a\"\n  ]\n}\n"
        );
        assert_eq!(render(&tree, OutputFormat::Yaml).unwrap(), "zeta: 1\nalpha:\n- a\n");
    }

    #[test]
    fn defaults_match_library_defaults() {
        let cli = Cli::try_parse_from(["resolve-config", "tasks/demo"]).unwrap();
        assert_eq!(cli.env_file, PathBuf::from(agent_config::DEFAULT_ENV_FILE));
        assert!(matches!(cli.format, OutputFormat::Yaml));
        assert!(cli.overrides.is_empty());
    }
}
