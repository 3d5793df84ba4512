use crate::prelude::*;

///
/// Def
///
/// Identity shared by every schema node: the fully qualified path
/// (`game::actors::Player`) plus optional doc comments carried into the
/// generated code.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Def {
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl Def {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            comments: None,
        }
    }

    /// Last path segment.
    #[must_use]
    pub fn ident(&self) -> &str {
        bare_name(&self.path)
    }

    /// Everything before the last segment; empty for a bare ident.
    #[must_use]
    pub fn module_path(&self) -> &str {
        self.path
            .rsplit_once("::")
            .map_or("", |(module, _)| module)
    }
}

/// Last segment of a `::`-separated path.
#[must_use]
pub fn bare_name(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}
