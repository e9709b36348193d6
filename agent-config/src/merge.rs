//! In-place override merge over a [`ConfigTree`].
//!
//! # Semantics
//! - Mapping and sequence values are only recursed into, never replaced
//! - A scalar mapping value whose *key* is in the override map is replaced
//!   outright (direct match); placeholder matching is skipped for that entry
//! - Otherwise a `<token>` string is replaced when `token` is an override key
//! - Sequence items have no key, so only placeholder matching applies
//! - Replacements are single pass: an inserted value is never re-examined
//!
//! The merge reports what it replaced as a list of [`Substitution`] events
//! instead of logging, leaving presentation to the caller.

use std::fmt;

use crate::overrides::OverrideMap;
use crate::placeholder;
use crate::tree::{ConfigTree, Scalar};

/// Why a value was replaced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubstitutionKind {
    /// The mapping key itself is an override key.
    Direct,
    /// The value was a `<token>` placeholder.
    Placeholder {
        /// Token name between the angle brackets.
        token: String,
    },
}

/// A single replacement performed by [`merge`].
///
/// Only the location is recorded; override values may carry secrets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Substitution {
    /// Dotted path of the replaced value, e.g. `llm.model` or `servers[1].url`.
    pub path: String,
    /// Rule that fired.
    pub kind: SubstitutionKind,
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SubstitutionKind::Direct => write!(f, "replaced `{}` with override value", self.path),
            SubstitutionKind::Placeholder { token } => {
                write!(f, "replaced `<{token}>` at `{}` with override value", self.path)
            }
        }
    }
}

/// Applies `extra` to `tree` in place and returns the replacements made.
///
/// An empty override map returns immediately without walking the tree. A
/// scalar root is left untouched.
pub fn merge(tree: &mut ConfigTree, extra: &OverrideMap) -> Vec<Substitution> {
    let mut events = Vec::new();
    if extra.is_empty() {
        return events;
    }
    let mut path = Vec::new();
    traverse(tree, extra, &mut path, &mut events);
    events
}

enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

fn render(path: &[Segment<'_>]) -> String {
    let mut rendered = String::new();
    for segment in path {
        match segment {
            Segment::Key(key) => {
                if !rendered.is_empty() {
                    rendered.push('.');
                }
                rendered.push_str(key);
            }
            Segment::Index(index) => {
                rendered.push('[');
                rendered.push_str(&index.to_string());
                rendered.push(']');
            }
        }
    }
    rendered
}

fn traverse<'t>(
    node: &'t mut ConfigTree,
    extra: &OverrideMap,
    path: &mut Vec<Segment<'t>>,
    events: &mut Vec<Substitution>,
) {
    match node {
        ConfigTree::Mapping(mapping) => {
            for (name, value) in mapping.iter_mut() {
                path.push(Segment::Key(name));
                if value.is_container() {
                    traverse(value, extra, path, events);
                } else if let Some(replacement) = extra.get(name) {
                    *value = string(replacement);
                    events.push(Substitution {
                        path: render(path),
                        kind: SubstitutionKind::Direct,
                    });
                } else {
                    replace_placeholder(value, extra, path, events);
                }
                path.pop();
            }
        }
        ConfigTree::Sequence(items) => {
            for (index, item) in items.iter_mut().enumerate() {
                path.push(Segment::Index(index));
                if item.is_container() {
                    traverse(item, extra, path, events);
                } else {
                    replace_placeholder(item, extra, path, events);
                }
                path.pop();
            }
        }
        ConfigTree::Scalar(_) => {}
    }
}

fn replace_placeholder(
    value: &mut ConfigTree,
    extra: &OverrideMap,
    path: &[Segment<'_>],
    events: &mut Vec<Substitution>,
) {
    let Some(current) = value.as_str() else {
        return;
    };
    let Some((token, replacement)) = placeholder::resolve(current, extra) else {
        return;
    };
    let token = token.to_owned();
    *value = string(replacement);
    events.push(Substitution {
        path: render(path),
        kind: SubstitutionKind::Placeholder { token },
    });
}

fn string(value: &str) -> ConfigTree {
    ConfigTree::Scalar(Scalar::String(value.to_owned()))
}
