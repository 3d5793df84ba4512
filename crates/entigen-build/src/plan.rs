//! Per-entity emission plans: everything the emitter needs, decided up
//! front and serialisable for inspection.

use crate::{
    accessor::{
        ClassifiedAttachment, NestedObject, ResolvedAccessor, ShadowField, SurfaceBuilder,
        scaffold_methods,
    },
    classify::classify_component,
    defaults::ctor_argument,
    diagnostic::SynthError,
    flatten::{ChainCache, Flattened},
    fragment::{FragmentCheck, parse_expr, parse_ident, parse_path, parse_type},
    resolve::ResolvedAttachment,
};
use serde::Serialize;
use std::collections::BTreeMap;

///
/// InitStep
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum InitStep {
    /// Replace the component with `Kind::ctor(args..)`.
    Construct {
        kind: String,
        ctor: String,
        args: Vec<CtorArg>,
    },

    /// Assign defaults to writable members in place.
    Assign {
        kind: String,
        assignments: Vec<Assignment>,
    },
}

impl InitStep {
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Construct { kind, .. } | Self::Assign { kind, .. } => kind,
        }
    }
}

///
/// CtorArg
/// `expr` is absent when the parameter falls back to `Default::default()`
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CtorArg {
    pub param: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
}

///
/// Assignment
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Assignment {
    pub member: String,
    pub expr: String,
}

///
/// EntityPlan
///

#[derive(Clone, Debug, Serialize)]
pub struct EntityPlan {
    pub entity: String,
    pub ident: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,

    pub is_root: bool,

    /// Nearest ancestor that has an artifact of its own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_ident: Option<String>,

    pub chain: Vec<String>,
    pub archetype: Vec<String>,
    pub attachments: Vec<ResolvedAttachment>,
    pub accessors: Vec<ResolvedAccessor>,
    pub nested: Vec<NestedObject>,
    pub shadows: Vec<ShadowField>,
    pub init: Vec<InitStep>,

    /// Method namespace of the entity, inherited methods included.
    pub methods: BTreeMap<String, String>,
}

impl EntityPlan {
    /// Getter method names of every flat accessor.
    pub fn getters(&self) -> impl Iterator<Item = &str> {
        self.accessors.iter().filter_map(|a| a.getter.as_deref())
    }

    /// Setter method names of every flat accessor.
    pub fn setters(&self) -> impl Iterator<Item = &str> {
        self.accessors.iter().filter_map(|a| a.setter.as_deref())
    }

    /// Type names this plan emits: the entity struct, then nested views.
    pub fn type_idents(&self) -> impl Iterator<Item = &str> {
        let views = self.nested.iter().flat_map(|object| {
            std::iter::once(object.ref_ident.as_str())
                .chain(object.getter_mut.as_ref().map(|_| object.mut_ident.as_str()))
        });

        std::iter::once(self.ident.as_str()).chain(views)
    }

    #[must_use]
    pub fn accessor(&self, name: &str) -> Option<&ResolvedAccessor> {
        self.accessors.iter().find(|a| a.name == name)
    }
}

///
/// Planner
///

pub struct Planner<'c, 'a> {
    cache: &'c ChainCache<'a>,
}

impl<'c, 'a> Planner<'c, 'a> {
    #[must_use]
    pub const fn new(cache: &'c ChainCache<'a>) -> Self {
        Self { cache }
    }

    /// Plan one entity. `Ok(None)` means there is nothing to emit for it.
    pub fn plan(&self, path: &str) -> Result<Option<EntityPlan>, Vec<SynthError>> {
        let flat = self.cache.flatten(path).map_err(|e| vec![e])?;

        if !flat.is_root() && flat.attachments.is_empty() {
            tracing::debug!(entity = path, "no attachments in chain, skipping");
            return Ok(None);
        }

        let base = self.base_plan(&flat)?;
        let entity = flat.entity();
        let ident = entity.def.ident();

        let classified = self.classify(&flat);
        let mut fragments = check_fragments(ident, &classified);

        let inherited = base
            .as_ref()
            .map_or_else(scaffold_methods, |b| b.methods.clone());
        let surface = match SurfaceBuilder::new(path, ident, inherited).build(&classified) {
            Ok(surface) => surface,
            Err(mut errors) => {
                errors.append(&mut fragments);
                return Err(errors);
            }
        };
        if !fragments.is_empty() {
            return Err(fragments);
        }

        let plan = EntityPlan {
            entity: path.to_string(),
            ident: ident.to_string(),
            comments: entity.def.comments.clone(),
            is_root: flat.is_root(),
            base: base.as_ref().map(|b| b.entity.clone()),
            base_ident: base.as_ref().map(|b| b.ident.clone()),
            chain: flat.chain.iter().map(|e| e.path().to_string()).collect(),
            archetype: flat.archetype(),
            attachments: flat.own().cloned().collect(),
            accessors: surface.accessors,
            nested: surface.nested,
            shadows: surface.shadows,
            init: classified.iter().filter_map(init_step).collect(),
            methods: surface.methods,
        };

        tracing::debug!(
            entity = path,
            kinds = plan.archetype.len(),
            accessors = plan.accessors.len(),
            nested = plan.nested.len(),
            "planned entity"
        );

        Ok(Some(plan))
    }

    // Plan of the nearest ancestor with an artifact. The chain root always
    // has one, so every non-root entity finds a base.
    fn base_plan(&self, flat: &Flattened<'_>) -> Result<Option<EntityPlan>, Vec<SynthError>> {
        if flat.is_root() {
            return Ok(None);
        }

        let depth = (0..flat.chain.len() - 1)
            .rev()
            .find(|&d| d == 0 || flat.has_attachments_up_to(d))
            .unwrap_or_default();
        let ancestor = flat.chain[depth].path();

        match self.plan(ancestor) {
            Ok(Some(plan)) => Ok(Some(plan)),
            Ok(None) | Err(_) => Err(vec![SynthError::AncestorFailed {
                ancestor: ancestor.to_string(),
            }]),
        }
    }

    fn classify<'f>(&self, flat: &'f Flattened<'_>) -> Vec<ClassifiedAttachment<'f>>
    where
        'a: 'f,
    {
        flat.own()
            .filter_map(|attachment| {
                let component = self.cache.schema().component(&attachment.kind)?;

                Some(ClassifiedAttachment {
                    attachment,
                    component,
                    members: classify_component(component),
                })
            })
            .collect()
    }
}

fn check_fragments(ident: &str, classified: &[ClassifiedAttachment<'_>]) -> Vec<SynthError> {
    let mut check = FragmentCheck::new();
    check.check(parse_ident(ident, "entity name"));

    for c in classified {
        let kind = &c.attachment.kind;
        check.check(parse_path(kind, "component kind"));

        for member in &c.members {
            let context = format!("{kind}.{}", member.name);
            check.check(parse_type(&member.ty, &context));
            if let Some(expr) = member.default.expr() {
                check.check(parse_expr(expr, &context));
            }
        }

        if let Some(ctor) = &c.component.constructor {
            check.check(parse_ident(&ctor.name, &format!("{kind} constructor")));
            for param in &ctor.params {
                // member defaults were checked above
                if c.members.iter().any(|m| m.name == param.name) {
                    continue;
                }
                if let Some(expr) = ctor_argument(c.component, param) {
                    let context = format!("{kind}::{}({})", ctor.name, param.name);
                    check.check(parse_expr(&expr, &context));
                }
            }
        }
    }

    check.into_errors()
}

fn init_step(classified: &ClassifiedAttachment<'_>) -> Option<InitStep> {
    let component = classified.component;
    let kind = classified.attachment.kind.clone();

    if let Some(ctor) = &component.constructor {
        let args = ctor
            .params
            .iter()
            .map(|param| CtorArg {
                param: param.name.clone(),
                expr: ctor_argument(component, param),
            })
            .collect();

        return Some(InitStep::Construct {
            kind,
            ctor: ctor.name.clone(),
            args,
        });
    }

    let assignments: Vec<_> = classified
        .members
        .iter()
        .filter(|m| m.writable)
        .filter_map(|m| {
            m.default.expr().map(|expr| Assignment {
                member: m.name.clone(),
                expr: expr.to_string(),
            })
        })
        .collect();

    (!assignments.is_empty()).then_some(InitStep::Assign { kind, assignments })
}
