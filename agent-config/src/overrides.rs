//! Command-line override parsing.

use std::collections::BTreeMap;

use crate::error::{ConfigError, ConfigResult};

/// Flat key to value overrides consumed by a single merge pass.
///
/// Iteration order carries no meaning; a sorted map keeps logs and tests stable.
pub type OverrideMap = BTreeMap<String, String>;

/// Prefix every override key must carry on the command line.
pub const OVERRIDE_PREFIX: &str = "--";

/// Parses trailing `--key value` pairs into an [`OverrideMap`].
///
/// Values are kept as raw strings. A repeated key keeps its last value.
///
/// # Errors
///
/// Returns [`ConfigError::MalformedArguments`] if a key token lacks the `--`
/// prefix, has an empty name, or is not followed by a value.
pub fn parse_overrides<I, S>(args: I) -> ConfigResult<OverrideMap>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut overrides = OverrideMap::new();
    let mut args = args.into_iter().map(Into::into);

    while let Some(argument) = args.next() {
        let Some(key) = argument.strip_prefix(OVERRIDE_PREFIX) else {
            return Err(ConfigError::MalformedArguments {
                argument,
                reason: "expected an override key of the form `--key`",
            });
        };
        if key.is_empty() {
            return Err(ConfigError::MalformedArguments {
                argument,
                reason: "override key is empty",
            });
        }
        let key = key.to_owned();
        let Some(value) = args.next() else {
            return Err(ConfigError::MalformedArguments {
                argument,
                reason: "override key is missing its value",
            });
        };
        overrides.insert(key, value);
    }

    Ok(overrides)
}
