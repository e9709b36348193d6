//! `<name>` placeholder tokens inside string values.
//!
//! A scalar is a placeholder only when the *whole* string is `<` + key + `>`
//! and the key is present in the override map. There is no escape syntax, so a
//! literal value such as `<html>` is replaced whenever `html` is an override key.

use crate::overrides::OverrideMap;

/// Returns the token name of a `<name>` string, without checking any overrides.
#[must_use]
pub fn token(value: &str) -> Option<&str> {
    value.strip_prefix('<')?.strip_suffix('>')
}

/// Resolves `value` against `extra` if it is a placeholder for one of its keys.
///
/// Returns the token name together with the replacement. The replacement is
/// used verbatim; it is never itself checked for placeholders.
#[must_use]
pub fn resolve<'a, 'v>(value: &'v str, extra: &'a OverrideMap) -> Option<(&'v str, &'a str)> {
    let name = token(value)?;
    extra
        .get(name)
        .map(|replacement| (name, replacement.as_str()))
}
