use crate::prelude::*;
use std::collections::BTreeMap;

/// Named-argument keys accepted for the alias.
pub const NAME_KEYS: [&str; 1] = ["name"];

/// Named-argument keys accepted for the nesting flag.
pub const NEST_KEYS: [&str; 2] = ["nest_declaration", "nestDeclaration"];

/// Named-argument keys accepted for the top-level accessor flag.
pub const TOP_LEVEL_KEYS: [&str; 2] = ["top_level_accessor", "topLevelAccessor"];

///
/// Attachment
///
/// A component attached to an entity, kept in the raw form it was declared
/// with: a component reference plus positional and named arguments
/// (`name`, `nest_declaration`, `top_level_accessor`). Interpreting the
/// arguments is left to the synthesis engine.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Attachment {
    #[serde(alias = "kind")]
    pub component: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Arg>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub named: BTreeMap<String, Arg>,
}

impl Attachment {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            ..Default::default()
        }
    }

    /// Explicit alias, as the `name` named argument.
    #[must_use]
    pub fn alias(self, name: &str) -> Self {
        self.named_arg(NAME_KEYS[0], name)
    }

    /// Request a nested accessor object.
    #[must_use]
    pub fn nested(self) -> Self {
        self.named_arg(NEST_KEYS[0], true)
    }

    /// Request flat accessors even when nesting.
    #[must_use]
    pub fn top_level(self) -> Self {
        self.named_arg(TOP_LEVEL_KEYS[0], true)
    }

    #[must_use]
    pub fn positional(mut self, arg: impl Into<Arg>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn named_arg(mut self, key: &str, arg: impl Into<Arg>) -> Self {
        self.named.insert(key.to_string(), arg.into());
        self
    }

    /// First named argument matching any of `keys`.
    #[must_use]
    pub fn named_lookup(&self, keys: &[&str]) -> Option<&Arg> {
        keys.iter().find_map(|key| self.named.get(*key))
    }

    /// Named arguments not recognised by any key set.
    pub fn unknown_named(&self) -> impl Iterator<Item = &str> {
        self.named.keys().map(String::as_str).filter(|key| {
            !NAME_KEYS.contains(key) && !NEST_KEYS.contains(key) && !TOP_LEVEL_KEYS.contains(key)
        })
    }

    /// Whether the reference names a generic parameter or a generic
    /// instantiation rather than a concrete component kind.
    #[must_use]
    pub fn is_generic_reference(&self) -> bool {
        let reference = self.component.trim();

        reference.contains('<')
            || (reference.len() == 1 && reference.chars().all(|c| c.is_ascii_uppercase()))
    }
}

impl ValidateNode for Attachment {
    fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        if self.component.trim().is_empty() {
            errs.add("component reference is empty");
        }

        errs.result()
    }
}
