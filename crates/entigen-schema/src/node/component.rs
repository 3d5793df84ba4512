use crate::{prelude::*, validate::naming::validate_path};
use std::collections::BTreeSet;

///
/// Component
///
/// A component kind: an ordered bundle of members, optionally built through
/// a primary constructor instead of field assignment.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Component {
    #[serde(flatten)]
    pub def: Def,

    #[serde(default, rename = "member", skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constructor: Option<Constructor>,
}

impl Component {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            def: Def::new(path),
            members: Vec::new(),
            constructor: None,
        }
    }

    #[must_use]
    pub fn member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    #[must_use]
    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = Some(constructor);
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.def.path
    }

    #[must_use]
    pub fn get_member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Constructor parameter matching a member name, if any.
    #[must_use]
    pub fn ctor_param(&self, name: &str) -> Option<&Param> {
        self.constructor.as_ref()?.get_param(name)
    }

    #[must_use]
    pub const fn is_primary_constructed(&self) -> bool {
        self.constructor.is_some()
    }
}

impl ValidateNode for Component {
    fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        if let Err(e) = validate_path(&self.def.path) {
            errs.add(e);
        }

        let mut seen = BTreeSet::new();
        for member in &self.members {
            if !seen.insert(member.name.as_str()) {
                err!(errs, "duplicate member '{}'", member.name);
            }
            errs.add_result(member.name.clone(), member.validate());
        }

        if let Some(constructor) = &self.constructor {
            errs.add_result("constructor", constructor.validate());
        }

        errs.result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_members_fail_validation() {
        let component = Component::new("game::Position")
            .member(Member::field("x", "f32"))
            .member(Member::field("x", "f64"));

        let err = component.validate().expect_err("duplicate member must fail");
        assert!(err.to_string().contains("duplicate member 'x'"));
    }

    #[test]
    fn ctor_param_matches_by_member_name() {
        let component = Component::new("game::Health")
            .member(Member::field("value", "u32"))
            .with_constructor(Constructor::default().param(Param::new("value").with_default("10")));

        assert!(component.is_primary_constructed());
        assert_eq!(
            component
                .ctor_param("value")
                .and_then(|p| p.default.as_deref()),
            Some("10")
        );
        assert!(component.ctor_param("max").is_none());
    }

    #[test]
    fn duplicate_ctor_params_fail_validation() {
        let component = Component::new("game::Health").with_constructor(
            Constructor::default()
                .param(Param::new("value"))
                .param(Param::new("value")),
        );

        let err = component.validate().expect_err("duplicate parameter must fail");
        assert!(
            err.to_string()
                .contains("constructor: duplicate constructor parameter 'value'")
        );
    }
}
