use crate::{prelude::*, validate::naming::validate_ident};

///
/// Access
///
/// How a member is declared on its component: a plain field, or a property
/// with independently visible getter and setter.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Access {
    Field {
        visibility: Visibility,
        readonly: bool,
    },
    Property {
        getter: Option<Visibility>,
        setter: Option<Visibility>,
    },
}

impl Default for Access {
    fn default() -> Self {
        Self::Field {
            visibility: Visibility::Public,
            readonly: false,
        }
    }
}

///
/// Member
///
/// One member of a component kind. `shape` is settled when the member is
/// ingested: an explicit tag wins, otherwise it is inferred from `ty`.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(from = "MemberDef", into = "MemberDef")]
pub struct Member {
    pub name: String,
    pub ty: String,
    pub shape: Shape,
    pub access: Access,
    pub is_static: bool,
    pub initializer: Option<String>,
}

impl Member {
    /// A public, mutable field.
    pub fn field(name: impl Into<String>, ty: impl Into<String>) -> Self {
        let ty = ty.into();

        Self {
            name: name.into(),
            shape: Shape::infer(&ty),
            ty,
            access: Access::default(),
            is_static: false,
            initializer: None,
        }
    }

    /// A property with the given getter and setter visibility.
    pub fn property(
        name: impl Into<String>,
        ty: impl Into<String>,
        getter: Option<Visibility>,
        setter: Option<Visibility>,
    ) -> Self {
        Self {
            access: Access::Property { getter, setter },
            ..Self::field(name, ty)
        }
    }

    #[must_use]
    pub const fn readonly(mut self) -> Self {
        if let Access::Field { readonly, .. } = &mut self.access {
            *readonly = true;
        }
        self
    }

    #[must_use]
    pub const fn with_visibility(mut self, vis: Visibility) -> Self {
        if let Access::Field { visibility, .. } = &mut self.access {
            *visibility = vis;
        }
        self
    }

    #[must_use]
    pub const fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    #[must_use]
    pub fn with_initializer(mut self, expr: impl Into<String>) -> Self {
        self.initializer = Some(expr.into());
        self
    }

    #[must_use]
    pub const fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

impl ValidateNode for Member {
    fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        if let Err(e) = validate_ident(&self.name) {
            errs.add(e);
        }
        if self.ty.trim().is_empty() {
            err!(errs, "member '{}' has an empty type", self.name);
        }

        errs.result()
    }
}

///
/// MemberKind
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    #[default]
    Field,
    Property,
}

///
/// MemberDef
/// on-disk form of a member
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MemberDef {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,

    #[serde(default)]
    pub kind: MemberKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub readonly: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub getter: Option<Visibility>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setter: Option<Visibility>,

    #[serde(default, rename = "static", skip_serializing_if = "std::ops::Not::not")]
    pub is_static: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<String>,
}

impl From<MemberDef> for Member {
    fn from(def: MemberDef) -> Self {
        let access = match def.kind {
            MemberKind::Field => Access::Field {
                visibility: def.visibility.unwrap_or_default(),
                readonly: def.readonly,
            },
            MemberKind::Property => Access::Property {
                getter: def.getter,
                setter: def.setter,
            },
        };
        let shape = def.shape.unwrap_or_else(|| Shape::infer(&def.ty));

        Self {
            name: def.name,
            ty: def.ty,
            shape,
            access,
            is_static: def.is_static,
            initializer: def.initializer,
        }
    }
}

impl From<Member> for MemberDef {
    fn from(member: Member) -> Self {
        let (kind, visibility, readonly, getter, setter) = match member.access {
            Access::Field {
                visibility,
                readonly,
            } => (MemberKind::Field, Some(visibility), readonly, None, None),
            Access::Property { getter, setter } => {
                (MemberKind::Property, None, false, getter, setter)
            }
        };

        Self {
            name: member.name,
            ty: member.ty,
            shape: Some(member.shape),
            kind,
            visibility,
            readonly,
            getter,
            setter,
            is_static: member.is_static,
            initializer: member.initializer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_is_inferred_on_ingestion_unless_tagged() {
        let inferred: Member =
            serde_json::from_str(r#"{"name":"on_change","type":"Rc<dyn Fn(f32)>"}"#).unwrap();
        assert_eq!(inferred.shape, Shape::Callback);

        let tagged: Member =
            serde_json::from_str(r#"{"name":"hook","type":"Hook","shape":"callback"}"#).unwrap();
        assert_eq!(tagged.shape, Shape::Callback);

        let value: Member = serde_json::from_str(r#"{"name":"x","type":"f32"}"#).unwrap();
        assert_eq!(value.shape, Shape::Value);
        assert_eq!(value.access, Access::default());
    }

    #[test]
    fn property_members_keep_accessor_visibility() {
        let member: Member = serde_json::from_str(
            r#"{"name":"health","type":"u32","kind":"property","getter":"public","setter":"private"}"#,
        )
        .unwrap();

        assert_eq!(
            member.access,
            Access::Property {
                getter: Some(Visibility::Public),
                setter: Some(Visibility::Private),
            }
        );
    }

    #[test]
    fn builders_adjust_field_access() {
        let member = Member::field("id", "u64")
            .readonly()
            .with_visibility(Visibility::Crate);

        assert_eq!(
            member.access,
            Access::Field {
                visibility: Visibility::Crate,
                readonly: true,
            }
        );
    }

    #[test]
    fn rejects_keyword_names() {
        assert!(Member::field("type", "u8").validate().is_err());
        assert!(Member::field("kind", "u8").validate().is_ok());
    }
}
