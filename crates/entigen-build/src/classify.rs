//! Member classification: which members of a component kind are exposed,
//! with what shape and which capabilities.

use crate::defaults::{DefaultSource, extract_default};
use entigen_schema::{
    node::{Access, Component, Member},
    types::{Shape, Visibility},
};
use serde::Serialize;

///
/// MemberDescriptor
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MemberDescriptor {
    pub name: String,
    pub ty: String,
    pub shape: Shape,
    pub readable: bool,
    pub writable: bool,
    pub default: DefaultSource,

    /// Member is supplied through the primary constructor.
    pub is_ctor_param: bool,
}

impl MemberDescriptor {
    /// Value members that can be read keep a shadow copy.
    #[must_use]
    pub const fn has_shadow(&self) -> bool {
        self.readable && !self.shape.is_callback()
    }
}

/// Exposed members of `component`, in declaration order.
///
/// Static members and members that are neither readable nor writable from
/// the consuming crate are left out.
#[must_use]
pub fn classify_component(component: &Component) -> Vec<MemberDescriptor> {
    component
        .members
        .iter()
        .filter(|member| !member.is_static)
        .filter_map(|member| classify_member(component, member))
        .collect()
}

fn classify_member(component: &Component, member: &Member) -> Option<MemberDescriptor> {
    let (readable, writable) = capabilities(member.access);
    if !readable && !writable {
        tracing::trace!(
            component = component.path(),
            member = %member.name,
            "member is not accessible"
        );
        return None;
    }

    Some(MemberDescriptor {
        name: member.name.clone(),
        ty: member.ty.clone(),
        shape: member.shape,
        readable,
        writable,
        default: extract_default(component, member),
        is_ctor_param: component.ctor_param(&member.name).is_some(),
    })
}

const fn capabilities(access: Access) -> (bool, bool) {
    match access {
        Access::Field {
            visibility,
            readonly,
        } => (
            visibility.is_accessible(),
            visibility.is_accessible() && !readonly,
        ),
        Access::Property { getter, setter } => (accessible(getter), accessible(setter)),
    }
}

const fn accessible(vis: Option<Visibility>) -> bool {
    match vis {
        Some(vis) => vis.is_accessible(),
        None => false,
    }
}
