use super::EntityBuilder;
use crate::diagnostic::SynthError;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

// definition
// the struct: store handle on the root, base on descendants, then shadows
pub fn definition(builder: &EntityBuilder<'_>) -> Result<TokenStream, SynthError> {
    let plan = builder.plan;
    let ident = &builder.ident;
    let rt = &builder.runtime;
    let bound = builder.store_bound();

    let docs = plan
        .comments
        .iter()
        .flat_map(|c| c.lines())
        .map(|line| {
            let line = format!(" {}", line.trim());
            quote!(#[doc = #line])
        });

    let head = match builder.base_ident()? {
        Some(base) => quote!(base: #base<S>,),
        None => quote! {
            store: S,
            id: #rt::EntityId,
        },
    };

    let shadows = plan
        .shadows
        .iter()
        .map(|shadow| {
            let field = format_ident!("{}", shadow.ident);
            let ty = EntityBuilder::member_ty(&shadow.kind, &shadow.member, &shadow.ty)?;

            Ok(quote!(#field: #ty,))
        })
        .collect::<Result<Vec<_>, SynthError>>()?;

    Ok(quote! {
        #(#docs)*
        pub struct #ident<S: #bound> {
            #head
            #(#shadows)*
        }
    })
}

// deref
// descendants expose their base's surface
pub fn deref(builder: &EntityBuilder<'_>) -> TokenStream {
    let Some(base) = builder.plan.base_ident.as_deref() else {
        return quote!();
    };
    let base = format_ident!("{base}");
    let ident = &builder.ident;
    let bound = builder.store_bound();

    quote! {
        impl<S: #bound> ::core::ops::Deref for #ident<S> {
            type Target = #base<S>;

            fn deref(&self) -> &Self::Target {
                &self.base
            }
        }

        impl<S: #bound> ::core::ops::DerefMut for #ident<S> {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.base
            }
        }
    }
}

// construction
// spawn, bind and (root only) the store handle accessors
pub fn construction(builder: &EntityBuilder<'_>) -> Result<TokenStream, SynthError> {
    let rt = &builder.runtime;

    let bind = match builder.base_ident()? {
        Some(base) => {
            let reads = shadow_reads(builder, &quote!(base.store()), &quote!(id))?;
            quote! {
                /// Attach to an existing store entry.
                pub fn bind(store: S, id: #rt::EntityId) -> Self {
                    let base = #base::bind(store, id);

                    Self {
                        #(#reads)*
                        base,
                    }
                }
            }
        }
        None => {
            let reads = shadow_reads(builder, &quote!(&store), &quote!(id))?;
            quote! {
                /// Attach to an existing store entry.
                pub fn bind(store: S, id: #rt::EntityId) -> Self {
                    Self {
                        #(#reads)*
                        store,
                        id,
                    }
                }

                pub const fn store(&self) -> &S {
                    &self.store
                }

                pub const fn entity_id(&self) -> #rt::EntityId {
                    self.id
                }
            }
        }
    };

    Ok(quote! {
        /// Create a store entry from `ARCHETYPE` and apply the defaults.
        pub fn spawn(store: S) -> Self {
            let id = #rt::ComponentStore::create(&store, Self::ARCHETYPE);
            let mut entity = Self::bind(store, id);
            entity.init_defaults();

            entity
        }

        #bind
    })
}

// sync_shadows
// reload every shadow field from the store
pub fn sync_shadows(builder: &EntityBuilder<'_>) -> Result<TokenStream, SynthError> {
    let base = builder
        .plan
        .base
        .is_some()
        .then(|| quote!(self.base.sync_shadows();));

    let reads = builder
        .plan
        .shadows
        .iter()
        .map(|shadow| {
            let field = format_ident!("{}", shadow.ident);
            let read = read_member(
                builder,
                &quote!(self.store()),
                &quote!(self.entity_id()),
                &shadow.kind,
                &shadow.member,
            )?;

            Ok(quote!(self.#field = #read;))
        })
        .collect::<Result<Vec<_>, SynthError>>()?;

    Ok(quote! {
        /// Reload shadow fields from the store.
        pub fn sync_shadows(&mut self) {
            #base
            #(#reads)*
        }
    })
}

// `field: <read>,` for every shadow, used in struct literals
fn shadow_reads(
    builder: &EntityBuilder<'_>,
    store: &TokenStream,
    id: &TokenStream,
) -> Result<Vec<TokenStream>, SynthError> {
    builder
        .plan
        .shadows
        .iter()
        .map(|shadow| {
            let field = format_ident!("{}", shadow.ident);
            let read = read_member(builder, store, id, &shadow.kind, &shadow.member)?;

            Ok(quote!(#field: #read,))
        })
        .collect()
}

/// Live read of one member, cloned out of the store.
pub fn read_member(
    builder: &EntityBuilder<'_>,
    store: &TokenStream,
    id: &TokenStream,
    kind: &str,
    member: &str,
) -> Result<TokenStream, SynthError> {
    let rt = &builder.runtime;
    let kind_path = EntityBuilder::kind(kind)?;
    let member = EntityBuilder::member(kind, member)?;

    Ok(quote! {
        #rt::ComponentStore::read(#store, #id, |c: &#kind_path| {
            ::core::clone::Clone::clone(&c.#member)
        })
    })
}

/// Store write of one member.
pub fn write_member(
    builder: &EntityBuilder<'_>,
    store: &TokenStream,
    id: &TokenStream,
    kind: &str,
    member: &str,
    value: &TokenStream,
) -> Result<TokenStream, SynthError> {
    let rt = &builder.runtime;
    let kind_path = EntityBuilder::kind(kind)?;
    let member = EntityBuilder::member(kind, member)?;

    Ok(quote! {
        #rt::ComponentStore::write(#store, #id, |c: &mut #kind_path| c.#member = #value)
    })
}
