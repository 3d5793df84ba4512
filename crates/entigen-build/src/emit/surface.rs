use super::{
    EntityBuilder,
    scaffold::{read_member, write_member},
};
use crate::{
    accessor::{NestedObject, ResolvedAccessor},
    diagnostic::SynthError,
};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

// flat
// accessors defined directly on the entity
pub fn flat(builder: &EntityBuilder<'_>) -> Result<TokenStream, SynthError> {
    let methods = builder
        .plan
        .accessors
        .iter()
        .map(|accessor| {
            let doc = format!(" `{}` of `{}`.", accessor.member, accessor.kind);
            let methods = accessor_methods(builder, accessor, &quote!(self))?;

            Ok(quote! {
                #[doc = #doc]
                #methods
            })
        })
        .collect::<Result<Vec<_>, SynthError>>()?;

    let objects = builder.plan.nested.iter().map(|object| {
        let getter = EntityBuilder::method(&object.getter);
        let ref_ident = format_ident!("{}", object.ref_ident);
        let doc = format!(" `{}` members, as an accessor object.", object.kind);

        let getter_mut = object.getter_mut.as_deref().map(|name| {
            let name = EntityBuilder::method(name);
            let mut_ident = format_ident!("{}", object.mut_ident);

            quote! {
                pub const fn #name(&mut self) -> #mut_ident<'_, S> {
                    #mut_ident(self)
                }
            }
        });

        quote! {
            #[doc = #doc]
            pub const fn #getter(&self) -> #ref_ident<'_, S> {
                #ref_ident(self)
            }

            #getter_mut
        }
    });

    Ok(quote! {
        #(#methods)*
        #(#objects)*
    })
}

// nested
// one shared and one mutable view type per accessor object
pub fn nested(builder: &EntityBuilder<'_>) -> Result<TokenStream, SynthError> {
    builder
        .plan
        .nested
        .iter()
        .map(|object| nested_object(builder, object))
        .collect()
}

fn nested_object(
    builder: &EntityBuilder<'_>,
    object: &NestedObject,
) -> Result<TokenStream, SynthError> {
    let ident = &builder.ident;
    let bound = builder.store_bound();
    let ref_ident = format_ident!("{}", object.ref_ident);
    let recv = quote!(self.0);

    let getters = object
        .accessors
        .iter()
        .map(|accessor| getter(builder, accessor, &recv))
        .collect::<Result<Vec<_>, SynthError>>()?;

    let shared = quote! {
        pub struct #ref_ident<'a, S: #bound>(&'a #ident<S>);

        impl<S: #bound> #ref_ident<'_, S> {
            #(#getters)*
        }
    };

    if object.getter_mut.is_none() {
        return Ok(shared);
    }

    let mut_ident = format_ident!("{}", object.mut_ident);
    let methods = object
        .accessors
        .iter()
        .map(|accessor| accessor_methods(builder, accessor, &recv))
        .collect::<Result<Vec<_>, SynthError>>()?;

    Ok(quote! {
        #shared

        pub struct #mut_ident<'a, S: #bound>(&'a mut #ident<S>);

        impl<S: #bound> #mut_ident<'_, S> {
            #(#methods)*
        }
    })
}

fn accessor_methods(
    builder: &EntityBuilder<'_>,
    accessor: &ResolvedAccessor,
    recv: &TokenStream,
) -> Result<TokenStream, SynthError> {
    let getter = getter(builder, accessor, recv)?;
    let setter = setter(builder, accessor, recv)?;

    Ok(quote! {
        #getter
        #setter
    })
}

// Values come from the shadow field, callbacks live from the store.
fn getter(
    builder: &EntityBuilder<'_>,
    accessor: &ResolvedAccessor,
    recv: &TokenStream,
) -> Result<TokenStream, SynthError> {
    let Some(name) = accessor.getter.as_deref() else {
        return Ok(quote!());
    };
    let name = EntityBuilder::method(name);
    let ty = EntityBuilder::member_ty(&accessor.kind, &accessor.member, &accessor.ty)?;

    Ok(match accessor.shadow.as_deref() {
        Some(shadow) => {
            let shadow = format_ident!("{shadow}");
            quote! {
                pub fn #name(&self) -> &#ty {
                    &#recv.#shadow
                }
            }
        }
        None => {
            let read = read_member(
                builder,
                &quote!(#recv.store()),
                &quote!(#recv.entity_id()),
                &accessor.kind,
                &accessor.member,
            )?;
            quote! {
                pub fn #name(&self) -> #ty {
                    #read
                }
            }
        }
    })
}

// Writes go to the store; values are mirrored into their shadow.
fn setter(
    builder: &EntityBuilder<'_>,
    accessor: &ResolvedAccessor,
    recv: &TokenStream,
) -> Result<TokenStream, SynthError> {
    let Some(name) = accessor.setter.as_deref() else {
        return Ok(quote!());
    };
    let name = EntityBuilder::method(name);
    let ty = EntityBuilder::member_ty(&accessor.kind, &accessor.member, &accessor.ty)?;
    let store = quote!(#recv.store());
    let id = quote!(#recv.entity_id());

    Ok(match accessor.shadow.as_deref() {
        Some(shadow) => {
            let shadow = format_ident!("{shadow}");
            let write = write_member(
                builder,
                &store,
                &id,
                &accessor.kind,
                &accessor.member,
                &quote!(::core::clone::Clone::clone(&value)),
            )?;
            quote! {
                pub fn #name(&mut self, value: #ty) {
                    #write;
                    #recv.#shadow = value;
                }
            }
        }
        None => {
            let write = write_member(
                builder,
                &store,
                &id,
                &accessor.kind,
                &accessor.member,
                &quote!(value),
            )?;
            quote! {
                pub fn #name(&mut self, value: #ty) {
                    #write;
                }
            }
        }
    })
}
