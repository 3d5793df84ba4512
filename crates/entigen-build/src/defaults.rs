//! Default value extraction for component members.
//!
//! A declaration-site initializer wins; otherwise the default of the
//! primary constructor parameter whose name matches the member is used.

use entigen_schema::node::{Component, Member, Param};
use serde::Serialize;

///
/// DefaultSource
///
/// Where a member's default expression came from. The expression is kept
/// as raw text and spliced into generated code unevaluated.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(tag = "source", content = "expr", rename_all = "snake_case")]
pub enum DefaultSource {
    #[default]
    None,
    Literal(String),
    ConstructorParam(String),
}

impl DefaultSource {
    #[must_use]
    pub fn expr(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Literal(expr) | Self::ConstructorParam(expr) => Some(expr),
        }
    }

    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Default of `member`: its own initializer first, then the default of the
/// matching primary-constructor parameter.
#[must_use]
pub fn extract_default(component: &Component, member: &Member) -> DefaultSource {
    if let Some(expr) = non_blank(member.initializer.as_deref()) {
        return DefaultSource::Literal(expr.to_string());
    }

    let param_default = component
        .ctor_param(&member.name)
        .and_then(|param| non_blank(param.default.as_deref()));

    match param_default {
        Some(expr) => DefaultSource::ConstructorParam(expr.to_string()),
        None => DefaultSource::None,
    }
}

/// Expression passed for constructor parameter `param`: the default of the
/// member it initializes, else the parameter's own default.
#[must_use]
pub fn ctor_argument(component: &Component, param: &Param) -> Option<String> {
    match component.get_member(&param.name) {
        Some(member) => extract_default(component, member).expr().map(str::to_string),
        None => non_blank(param.default.as_deref()).map(str::to_string),
    }
}

fn non_blank(expr: Option<&str>) -> Option<&str> {
    expr.map(str::trim).filter(|e| !e.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use entigen_schema::node::Constructor;

    fn health() -> Component {
        Component::new("game::Health")
            .member(Member::field("value", "u32"))
            .member(Member::field("max", "u32").with_initializer("100"))
            .member(Member::field("regen", "f32"))
            .with_constructor(
                Constructor::default()
                    .param(Param::new("value").with_default("10"))
                    .param(Param::new("max").with_default("50")),
            )
    }

    #[test]
    fn initializer_wins_over_constructor_default() {
        let c = health();
        assert_eq!(
            extract_default(&c, c.get_member("max").unwrap()),
            DefaultSource::Literal("100".to_string())
        );
    }

    #[test]
    fn constructor_default_is_the_fallback() {
        let c = health();
        let source = extract_default(&c, c.get_member("value").unwrap());

        assert_eq!(source, DefaultSource::ConstructorParam("10".to_string()));
        assert_eq!(source.expr(), Some("10"));
    }

    #[test]
    fn members_without_any_default() {
        let c = health();
        let source = extract_default(&c, c.get_member("regen").unwrap());

        assert!(source.is_none());
        assert_eq!(source.expr(), None);
    }

    #[test]
    fn constructor_arguments() {
        let c = health().with_constructor(
            Constructor::default()
                .param(Param::new("value").with_default("10"))
                .param(Param::new("max").with_default("50"))
                .param(Param::new("scale").with_default(" 2.0 "))
                .param(Param::new("regen")),
        );
        let args: Vec<_> = c
            .constructor
            .as_ref()
            .unwrap()
            .params
            .iter()
            .map(|p| ctor_argument(&c, p))
            .collect();

        assert_eq!(
            args,
            vec![
                Some("10".to_string()),
                Some("100".to_string()),
                Some("2.0".to_string()),
                None,
            ]
        );
    }

    #[test]
    fn expression_text_is_kept_verbatim() {
        let c = Component::new("game::Tint")
            .member(Member::field("rgba", "[u8; 4]").with_initializer("[0xff, 0, 0, 0xff]"));

        assert_eq!(
            extract_default(&c, &c.members[0]).expr(),
            Some("[0xff, 0, 0, 0xff]")
        );
    }
}
