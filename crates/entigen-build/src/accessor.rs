//! Accessor synthesis: names, capabilities and shadow fields for every
//! member exposed by the attachments an entity declares itself.

use crate::{classify::MemberDescriptor, diagnostic::SynthError, resolve::ResolvedAttachment};
use convert_case::{Case, Casing};
use entigen_schema::{node::Component, types::Shape};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Methods every generated entity carries, whatever its attachments.
pub const SCAFFOLD_METHODS: [&str; 6] = [
    "bind",
    "entity_id",
    "init_defaults",
    "spawn",
    "store",
    "sync_shadows",
];

/// Rust method identifier for an accessor name (`CircleCollider_X` ->
/// `circle_collider_x`). Keywords get a trailing underscore.
#[must_use]
pub fn method_ident(name: &str) -> String {
    let snake = name.to_case(Case::Snake);

    if syn::parse_str::<syn::Ident>(&snake).is_ok() {
        snake
    } else {
        format!("{snake}_")
    }
}

#[must_use]
pub fn setter_ident(name: &str) -> String {
    method_ident(&format!("set_{}", name.to_case(Case::Snake)))
}

///
/// Placement
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "placement", rename_all = "snake_case")]
pub enum Placement {
    Flat,
    Nested { object: String },
}

///
/// ResolvedAccessor
///
/// One exposed member. `getter` and `setter` hold the emitted method
/// identifiers and are absent when the capability is missing.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResolvedAccessor {
    pub name: String,
    pub kind: String,
    pub member: String,
    pub ty: String,
    pub shape: Shape,
    pub readable: bool,
    pub writable: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub getter: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub setter: Option<String>,

    /// Shadow field backing the getter, for readable values only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<String>,

    #[serde(flatten)]
    pub placement: Placement,
}

impl ResolvedAccessor {
    fn methods(&self) -> impl Iterator<Item = &str> + Clone {
        self.getter.iter().chain(&self.setter).map(String::as_str)
    }
}

///
/// NestedObject
/// accessor object scoped under an attachment's alias
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct NestedObject {
    pub name: String,
    pub kind: String,

    /// Entity method returning the shared view.
    pub getter: String,

    /// Entity method returning the mutable view, when anything is writable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub getter_mut: Option<String>,

    pub ref_ident: String,
    pub mut_ident: String,
    pub accessors: Vec<ResolvedAccessor>,
}

impl NestedObject {
    fn methods(&self) -> impl Iterator<Item = &str> + Clone {
        std::iter::once(self.getter.as_str()).chain(self.getter_mut.as_deref())
    }
}

///
/// ShadowField
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ShadowField {
    pub ident: String,
    pub kind: String,
    pub member: String,
    pub ty: String,
}

///
/// ClassifiedAttachment
/// an attachment together with its component kind and exposed members
///

#[derive(Clone, Debug)]
pub struct ClassifiedAttachment<'a> {
    pub attachment: &'a ResolvedAttachment,
    pub component: &'a Component,
    pub members: Vec<MemberDescriptor>,
}

///
/// Surface
///

#[derive(Clone, Debug, Default)]
pub struct Surface {
    pub accessors: Vec<ResolvedAccessor>,
    pub nested: Vec<NestedObject>,
    pub shadows: Vec<ShadowField>,

    /// Every method callable on the entity, inherited ones included,
    /// mapped to a description of where it comes from.
    pub methods: BTreeMap<String, String>,
}

/// Method namespace of a root entity before any accessor is added.
#[must_use]
pub fn scaffold_methods() -> BTreeMap<String, String> {
    SCAFFOLD_METHODS
        .iter()
        .map(|m| ((*m).to_string(), format!("generated method '{m}'")))
        .collect()
}

///
/// SurfaceBuilder
///

pub struct SurfaceBuilder<'a> {
    entity: &'a str,
    entity_ident: &'a str,
    surface: Surface,
    errors: Vec<SynthError>,
}

impl<'a> SurfaceBuilder<'a> {
    /// `inherited` is the method namespace of the nearest emitted ancestor,
    /// or `scaffold_methods()` for a root.
    #[must_use]
    pub fn new(
        entity: &'a str,
        entity_ident: &'a str,
        inherited: BTreeMap<String, String>,
    ) -> Self {
        Self {
            entity,
            entity_ident,
            surface: Surface {
                methods: inherited,
                ..Surface::default()
            },
            errors: Vec::new(),
        }
    }

    /// Build the surface, failing with every collision found.
    pub fn build(
        mut self,
        attachments: &[ClassifiedAttachment<'_>],
    ) -> Result<Surface, Vec<SynthError>> {
        let shadow_idents = shadow_idents(attachments);

        for (classified, shadow_prefix) in attachments.iter().zip(&shadow_idents) {
            self.add_attachment(classified, shadow_prefix);
        }

        if self.errors.is_empty() {
            Ok(self.surface)
        } else {
            Err(self.errors)
        }
    }

    fn add_attachment(&mut self, classified: &ClassifiedAttachment<'_>, shadow_prefix: &str) {
        let attachment = classified.attachment;

        for member in &classified.members {
            if member.has_shadow() {
                self.surface.shadows.push(ShadowField {
                    ident: format!("{shadow_prefix}_{}", member.name.to_case(Case::Snake)),
                    kind: attachment.kind.clone(),
                    member: member.name.clone(),
                    ty: member.ty.clone(),
                });
            }
        }

        if attachment.exposes_flat() {
            for member in &classified.members {
                let name = if attachment.alias.is_empty() {
                    member.name.clone()
                } else {
                    format!("{}_{}", attachment.alias, member.name)
                };
                let accessor = accessor(&name, attachment, member, shadow_prefix, Placement::Flat);
                let origin = format!(
                    "accessor '{name}' from {} ({})",
                    attachment.kind, self.entity
                );

                if self.claim(&name, accessor.methods(), &origin) {
                    self.surface.accessors.push(accessor);
                }
            }
        }

        if attachment.nest {
            let object = self.nested_object(classified, shadow_prefix);
            let origin = format!(
                "accessor object '{}' from {} ({})",
                object.name, attachment.kind, self.entity
            );

            if self.claim(&object.name, object.methods(), &origin) {
                self.surface.nested.push(object);
            }
        }
    }

    fn nested_object(
        &mut self,
        classified: &ClassifiedAttachment<'_>,
        shadow_prefix: &str,
    ) -> NestedObject {
        let attachment = classified.attachment;
        let name = attachment.nest_name().to_string();
        let getter = method_ident(&name);
        let type_stem = format!("{}{}", self.entity_ident, name.to_case(Case::Pascal));

        // members of one object only compete with each other
        let mut local = BTreeMap::new();
        let mut accessors = Vec::new();
        for member in &classified.members {
            let placement = Placement::Nested {
                object: name.clone(),
            };
            let accessor = accessor(&member.name, attachment, member, shadow_prefix, placement);

            let clash = accessor.methods().find_map(|m| local.get(m).cloned());
            match clash {
                Some(existing) => self.errors.push(SynthError::AccessorCollision {
                    name: format!("{name}.{}", member.name),
                    existing,
                }),
                None => {
                    for m in accessor.methods() {
                        local.insert(m.to_string(), format!("accessor '{name}.{}'", member.name));
                    }
                    accessors.push(accessor);
                }
            }
        }

        let getter_mut = accessors
            .iter()
            .any(|a| a.setter.is_some())
            .then(|| format!("{getter}_mut"));

        NestedObject {
            name,
            kind: attachment.kind.clone(),
            getter,
            getter_mut,
            ref_ident: format!("{type_stem}Ref"),
            mut_ident: format!("{type_stem}Mut"),
            accessors,
        }
    }

    // Reserve `methods` under `name`; records a collision and returns false
    // when any of them is already taken.
    fn claim<'m>(
        &mut self,
        name: &str,
        methods: impl Iterator<Item = &'m str> + Clone,
        origin: &str,
    ) -> bool {
        if let Some(existing) = methods
            .clone()
            .find_map(|m| self.surface.methods.get(m))
        {
            tracing::debug!(entity = self.entity, name, existing = %existing, "accessor collision");
            self.errors.push(SynthError::AccessorCollision {
                name: name.to_string(),
                existing: existing.clone(),
            });
            return false;
        }

        for m in methods {
            self.surface.methods.insert(m.to_string(), origin.to_string());
        }

        true
    }
}

fn accessor(
    name: &str,
    attachment: &ResolvedAttachment,
    member: &MemberDescriptor,
    shadow_prefix: &str,
    placement: Placement,
) -> ResolvedAccessor {
    ResolvedAccessor {
        name: name.to_string(),
        kind: attachment.kind.clone(),
        member: member.name.clone(),
        ty: member.ty.clone(),
        shape: member.shape,
        readable: member.readable,
        writable: member.writable,
        getter: member.readable.then(|| method_ident(name)),
        setter: member.writable.then(|| setter_ident(name)),
        shadow: member
            .has_shadow()
            .then(|| format!("{shadow_prefix}_{}", member.name.to_case(Case::Snake))),
        placement,
    }
}

// Shadow prefix per attachment: `__{kind}`, plus the position when two
// attached kinds share a bare name.
fn shadow_idents(attachments: &[ClassifiedAttachment<'_>]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let clashing: BTreeSet<&str> = attachments
        .iter()
        .map(|c| c.attachment.kind_name())
        .filter(|name| !seen.insert(*name))
        .collect();

    attachments
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let name = c.attachment.kind_name();
            let stem = name.to_case(Case::Snake);
            if clashing.contains(name) {
                format!("__{stem}{i}")
            } else {
                format!("__{stem}")
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_component;
    use entigen_schema::node::Member;

    fn position() -> Component {
        Component::new("game::Position")
            .member(Member::field("X", "f32"))
            .member(Member::field("Y", "f32"))
            .member(Member::field("Z", "f32"))
            .member(Member::field("OnChange", "Rc<dyn Fn(f32)>"))
    }

    fn collider() -> Component {
        Component::new("game::Collider")
            .member(Member::field("X", "f32"))
            .member(Member::field("Y", "f32"))
    }

    fn attachment(kind: &str, alias: &str) -> ResolvedAttachment {
        ResolvedAttachment {
            owner: "game::Player".to_string(),
            index: 0,
            kind: kind.to_string(),
            alias: alias.to_string(),
            nest: false,
            top_level: false,
        }
    }

    fn classified<'a>(a: &'a ResolvedAttachment, c: &'a Component) -> ClassifiedAttachment<'a> {
        ClassifiedAttachment {
            attachment: a,
            component: c,
            members: classify_component(c),
        }
    }

    fn build(attachments: &[ClassifiedAttachment<'_>]) -> Result<Surface, Vec<SynthError>> {
        SurfaceBuilder::new("game::Player", "Player", scaffold_methods()).build(attachments)
    }

    #[test]
    fn idents_are_snake_case() {
        assert_eq!(method_ident("CircleCollider_X"), "circle_collider_x");
        assert_eq!(method_ident("OnChange"), "on_change");
        assert_eq!(method_ident("Type"), "type_");
        assert_eq!(setter_ident("CircleCollider_X"), "set_circle_collider_x");
    }

    #[test]
    fn flat_and_prefixed_accessors() {
        let (pos, col) = (position(), collider());
        let (a, b) = (
            attachment("game::Position", ""),
            attachment("game::Collider", "CircleCollider"),
        );

        let surface = build(&[classified(&a, &pos), classified(&b, &col)]).unwrap();
        let names: Vec<_> = surface.accessors.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["X", "Y", "Z", "OnChange", "CircleCollider_X", "CircleCollider_Y"]
        );

        let on_change = &surface.accessors[3];
        assert_eq!(on_change.getter.as_deref(), Some("on_change"));
        assert!(on_change.shadow.is_none());

        let shadows: Vec<_> = surface.shadows.iter().map(|s| s.ident.as_str()).collect();
        assert_eq!(
            shadows,
            vec![
                "__position_x",
                "__position_y",
                "__position_z",
                "__collider_x",
                "__collider_y"
            ]
        );
        assert!(surface.methods.contains_key("set_circle_collider_y"));
        assert!(surface.methods.contains_key("spawn"));
    }

    #[test]
    fn duplicate_flat_names_collide() {
        let (pos, col) = (position(), collider());
        let (a, b) = (
            attachment("game::Position", ""),
            attachment("game::Collider", ""),
        );

        let errors = build(&[classified(&a, &pos), classified(&b, &col)]).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0],
            SynthError::AccessorCollision {
                name: "X".to_string(),
                existing: "accessor 'X' from game::Position (game::Player)".to_string(),
            }
        );
    }

    #[test]
    fn inherited_and_scaffold_names_collide() {
        let store = Component::new("game::Meta").member(Member::field("store", "u32"));
        let a = attachment("game::Meta", "");
        let errors = build(&[classified(&a, &store)]).unwrap_err();
        assert!(matches!(
            &errors[0],
            SynthError::AccessorCollision { existing, .. } if existing == "generated method 'store'"
        ));

        let mut inherited = scaffold_methods();
        inherited.insert(
            "x".to_string(),
            "accessor 'X' from game::Position (game::Child)".to_string(),
        );
        let col = collider();
        let b = attachment("game::Collider", "");
        let errors = SurfaceBuilder::new("game::Grandchild", "Grandchild", inherited)
            .build(&[classified(&b, &col)])
            .unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn nested_objects() {
        let pos = position();
        let mut a = attachment("game::Position", "");
        a.nest = true;

        let surface = build(&[classified(&a, &pos)]).unwrap();
        assert!(surface.accessors.is_empty());

        let object = &surface.nested[0];
        assert_eq!(object.name, "Position");
        assert_eq!(object.getter, "position");
        assert_eq!(object.getter_mut.as_deref(), Some("position_mut"));
        assert_eq!(object.ref_ident, "PlayerPositionRef");
        assert_eq!(object.accessors[0].getter.as_deref(), Some("x"));
        assert_eq!(
            object.accessors[0].placement,
            Placement::Nested {
                object: "Position".to_string()
            }
        );

        // top-level flag adds the flat accessors back
        a.top_level = true;
        let surface = build(&[classified(&a, &pos)]).unwrap();
        assert_eq!(surface.accessors.len(), 4);
        assert_eq!(surface.nested.len(), 1);
    }

    #[test]
    fn clashing_kind_names_get_distinct_shadows() {
        let a_kind = Component::new("game::Tag").member(Member::field("v", "u8"));
        let b_kind = Component::new("ui::Tag").member(Member::field("v", "u8"));
        let a = attachment("game::Tag", "");
        let b = attachment("ui::Tag", "Ui");

        let surface = build(&[classified(&a, &a_kind), classified(&b, &b_kind)]).unwrap();
        let shadows: Vec<_> = surface.shadows.iter().map(|s| s.ident.as_str()).collect();
        assert_eq!(shadows, vec!["__tag0_v", "__tag1_v"]);
    }
}
