use super::EntityBuilder;
use crate::{
    diagnostic::SynthError,
    fragment::{parse_expr, parse_ident},
    plan::{Assignment, CtorArg, InitStep},
};
use proc_macro2::TokenStream;
use quote::quote;

// init_defaults
// ancestors first, then one step per directly attached kind
pub fn generate(builder: &EntityBuilder<'_>) -> Result<TokenStream, SynthError> {
    let base = builder
        .plan
        .base
        .is_some()
        .then(|| quote!(self.base.init_defaults();));

    let steps = builder
        .plan
        .init
        .iter()
        .map(|step| init_step(builder, step))
        .collect::<Result<Vec<_>, SynthError>>()?;

    Ok(quote! {
        /// Apply declared defaults to the store entry, ancestors first.
        pub fn init_defaults(&mut self) {
            #base
            #(#steps)*
            self.sync_shadows();
        }
    })
}

fn init_step(builder: &EntityBuilder<'_>, step: &InitStep) -> Result<TokenStream, SynthError> {
    let rt = &builder.runtime;
    let kind = EntityBuilder::kind(step.kind())?;

    match step {
        InitStep::Construct { ctor, args, .. } => {
            let ctor = parse_ident(ctor, &format!("{} constructor", step.kind()))?;
            let args = args
                .iter()
                .map(|arg| ctor_arg(step.kind(), arg))
                .collect::<Result<Vec<_>, SynthError>>()?;

            Ok(quote! {
                #rt::ComponentStore::insert(
                    self.store(),
                    self.entity_id(),
                    <#kind>::#ctor(#(#args),*),
                );
            })
        }

        InitStep::Assign { assignments, .. } => {
            let assignments = assignments
                .iter()
                .map(|a| assignment(step.kind(), a))
                .collect::<Result<Vec<_>, SynthError>>()?;

            Ok(quote! {
                #rt::ComponentStore::write(self.store(), self.entity_id(), |c: &mut #kind| {
                    #(#assignments)*
                });
            })
        }
    }
}

fn ctor_arg(kind: &str, arg: &CtorArg) -> Result<TokenStream, SynthError> {
    match &arg.expr {
        Some(expr) => {
            let expr = parse_expr(expr, &format!("{kind}({})", arg.param))?;
            Ok(quote!(#expr))
        }
        None => Ok(quote!(::core::default::Default::default())),
    }
}

fn assignment(kind: &str, assignment: &Assignment) -> Result<TokenStream, SynthError> {
    let member = EntityBuilder::member(kind, &assignment.member)?;
    let expr = parse_expr(&assignment.expr, &format!("{kind}.{}", assignment.member))?;

    Ok(quote!(c.#member = #expr;))
}
