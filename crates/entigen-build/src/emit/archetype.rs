use super::EntityBuilder;
use crate::diagnostic::SynthError;
use proc_macro2::TokenStream;
use quote::quote;

// ARCHETYPE: every component kind of the chain, ancestors first
pub fn generate(builder: &EntityBuilder<'_>) -> Result<TokenStream, SynthError> {
    let rt = &builder.runtime;
    let kinds = builder
        .plan
        .archetype
        .iter()
        .map(|path| {
            let kind = EntityBuilder::kind(path)?;

            Ok(quote!(#rt::ComponentType::of::<#kind>(#path)))
        })
        .collect::<Result<Vec<_>, SynthError>>()?;

    Ok(quote! {
        /// Component kinds the store entry is created with.
        pub const ARCHETYPE: &'static [#rt::ComponentType] = &[#(#kinds),*];
    })
}
