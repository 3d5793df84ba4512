use crate::{prelude::*, validate::naming::validate_path};

///
/// Entity
///
/// One entity definition: its base, the components attached directly to it,
/// and the naming policy applied to attachments without an explicit alias.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Entity {
    #[serde(flatten)]
    pub def: Def,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(default, alias = "useNestedNames")]
    pub use_nested_names: bool,

    #[serde(default, rename = "component", skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Attachment>,
}

impl Entity {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            def: Def::new(path),
            parent: None,
            use_nested_names: false,
            components: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub const fn with_nested_names(mut self) -> Self {
        self.use_nested_names = true;
        self
    }

    #[must_use]
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.components.push(attachment);
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.def.path
    }
}

impl ValidateNode for Entity {
    fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        if let Err(e) = validate_path(&self.def.path) {
            errs.add(e);
        }

        if let Some(parent) = &self.parent {
            if let Err(e) = validate_path(parent) {
                err!(errs, "parent: {e}");
            }
        }

        for (i, attachment) in self.components.iter().enumerate() {
            errs.add_result(format!("component[{i}]"), attachment.validate());
        }

        errs.result()
    }
}
