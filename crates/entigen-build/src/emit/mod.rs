//! Rust emission of entity plans.

mod archetype;
mod init;
mod scaffold;
mod surface;

use crate::{
    diagnostic::SynthError,
    fragment::{parse_ident, parse_path, parse_type},
    plan::EntityPlan,
};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Ident, Path, Type};

///
/// EntityBuilder
///
/// Emits one entity: struct, archetype, construction routines, initializer
/// and accessor surface. Every generated entity is generic over the store
/// type `S` and refers to the runtime contract through `runtime`.
///

pub struct EntityBuilder<'p> {
    pub(crate) plan: &'p EntityPlan,
    pub(crate) runtime: Path,
    pub(crate) ident: Ident,
}

impl<'p> EntityBuilder<'p> {
    pub fn new(plan: &'p EntityPlan, runtime_path: &str) -> Result<Self, SynthError> {
        Ok(Self {
            plan,
            runtime: parse_path(runtime_path, "runtime path")?,
            ident: parse_ident(&plan.ident, "entity name")?,
        })
    }

    /// Emit the full entity.
    pub fn generate(&self) -> Result<TokenStream, SynthError> {
        let definition = scaffold::definition(self)?;
        let deref = scaffold::deref(self);
        let archetype = archetype::generate(self)?;
        let construct = scaffold::construction(self)?;
        let init = init::generate(self)?;
        let sync = scaffold::sync_shadows(self)?;
        let accessors = surface::flat(self)?;
        let nested = surface::nested(self)?;

        let ident = &self.ident;
        let bound = self.store_bound();

        Ok(quote! {
            #definition
            #deref

            impl<S: #bound> #ident<S> {
                #archetype
                #construct
                #init
                #sync
                #accessors
            }

            #nested
        })
    }

    // helpers

    pub(crate) fn store_bound(&self) -> TokenStream {
        let rt = &self.runtime;
        quote!(#rt::ComponentStore)
    }

    pub(crate) fn base_ident(&self) -> Result<Option<Ident>, SynthError> {
        self.plan
            .base_ident
            .as_deref()
            .map(|base| parse_ident(base, "base entity name"))
            .transpose()
    }

    pub(crate) fn kind(path: &str) -> Result<Path, SynthError> {
        parse_path(path, "component kind")
    }

    pub(crate) fn member_ty(kind: &str, member: &str, ty: &str) -> Result<Type, SynthError> {
        parse_type(ty, &format!("{kind}.{member}"))
    }

    pub(crate) fn member(kind: &str, member: &str) -> Result<Ident, SynthError> {
        parse_ident(member, &format!("{kind} member"))
    }

    pub(crate) fn method(name: &str) -> Ident {
        format_ident!("{name}")
    }
}
