use crate::{prelude::*, validate::naming::validate_ident};
use std::collections::BTreeSet;

fn default_ctor_name() -> String {
    "new".to_string()
}

///
/// Constructor
///
/// Primary construction form of a component kind: an associated function
/// taking every parameter in declaration order.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Constructor {
    #[serde(default = "default_ctor_name")]
    pub name: String,

    #[serde(default, rename = "param")]
    pub params: Vec<Param>,
}

impl Default for Constructor {
    fn default() -> Self {
        Self {
            name: default_ctor_name(),
            params: Vec::new(),
        }
    }
}

impl Constructor {
    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }
}

impl ValidateNode for Constructor {
    fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        if let Err(e) = validate_ident(&self.name) {
            err!(errs, "constructor name: {e}");
        }

        let mut seen = BTreeSet::new();
        for param in &self.params {
            if let Err(e) = validate_ident(&param.name) {
                err!(errs, "parameter: {e}");
            }
            if !seen.insert(param.name.as_str()) {
                err!(errs, "duplicate constructor parameter '{}'", param.name);
            }
        }

        errs.result()
    }
}

///
/// Param
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Param {
    pub name: String,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            default: None,
        }
    }

    #[must_use]
    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    #[must_use]
    pub fn with_default(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }
}
