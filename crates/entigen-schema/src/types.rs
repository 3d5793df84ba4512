use crate::prelude::*;
use derive_more::{Display, FromStr};
use std::fmt;

///
/// Shape
///
/// How a component member is exposed. Callbacks are always read live from
/// the store; values are mirrored into shadow fields.
///

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    FromStr,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    #[default]
    Value,
    Callback,
}

/// Type-name prefixes that denote a callable.
const CALLBACK_PREFIXES: [&str; 5] = ["Fn(", "FnMut(", "FnOnce(", "fn(", "extern \"C\" fn("];

/// Trailing identifiers that denote a callable.
const CALLBACK_SUFFIXES: [&str; 3] = ["Callback", "Handler", "Delegate"];

/// Whole identifiers that denote a callable.
const CALLBACK_NAMES: [&str; 3] = ["Action", "Func", "EventHandler"];

impl Shape {
    /// Classify a declared type name.
    ///
    /// Wrappers such as `Box<dyn ...>`, `Rc<...>`, `Arc<...>` and `Option<...>`
    /// are looked through, so `Option<Rc<dyn Fn(u32)>>` is a callback.
    #[must_use]
    pub fn infer(type_name: &str) -> Self {
        let compact: String = type_name.split_whitespace().collect::<Vec<_>>().join(" ");

        let inner = strip_wrappers(&compact);
        let inner = ["dyn ", "impl "]
            .iter()
            .find_map(|kw| inner.strip_prefix(kw))
            .unwrap_or(inner);
        if CALLBACK_PREFIXES.iter().any(|p| inner.starts_with(p)) {
            return Self::Callback;
        }

        // last path segment, generic arguments removed
        let head = inner.split('<').next().unwrap_or(inner);
        let ident = head.rsplit("::").next().unwrap_or(head).trim();

        if CALLBACK_NAMES.contains(&ident) || CALLBACK_SUFFIXES.iter().any(|s| ident.ends_with(s)) {
            Self::Callback
        } else {
            Self::Value
        }
    }

    #[must_use]
    pub const fn is_callback(self) -> bool {
        matches!(self, Self::Callback)
    }
}

// strip_wrappers
// peel off smart-pointer / option wrappers around a type name
fn strip_wrappers(mut ty: &str) -> &str {
    const WRAPPERS: [&str; 6] = ["Box<", "Rc<", "Arc<", "Option<", "RefCell<", "&"];

    loop {
        let trimmed = ty.trim();
        let Some(wrapper) = WRAPPERS.iter().find(|w| trimmed.starts_with(**w)) else {
            return trimmed;
        };

        let rest = &trimmed[wrapper.len()..];
        ty = if wrapper.ends_with('<') {
            rest.strip_suffix('>').unwrap_or(rest)
        } else {
            rest.trim_start_matches("mut ")
        };
    }
}

///
/// Visibility
///

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    FromStr,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum Visibility {
    Crate,
    Private,
    Protected,
    #[default]
    Public,
}

impl Visibility {
    /// Whether generated code living in the consuming crate may use it.
    #[must_use]
    pub const fn is_accessible(self) -> bool {
        matches!(self, Self::Public | Self::Crate)
    }
}

///
/// Arg
///
/// One attachment argument, as written in the schema.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Arg {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Arg {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Text(_) => "string",
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}
