//! Derives the `WireType` impl: the stable registry name and the field
//! schema in declaration order.

use quote::quote;

use crate::fields::{StructModel, WireKind};

pub(crate) fn expand(model: &StructModel) -> proc_macro2::TokenStream {
    let ident = &model.ident;
    let wire_name = &model.wire_name;

    let base = match &model.base {
        Some(base) => {
            let base_ty = &base.ty;
            quote! {
                ::core::option::Option::Some(
                    <#base_ty as ::gamewire_core::WireType>::NAME,
                )
            }
        }
        None => quote! { ::core::option::Option::None },
    };

    let field_schemas = model.fields.iter().map(|field| {
        let name = field.ident.to_string();
        let kind = field_kind(field.kind.clone(), &field.ty);
        let optional = field.optional;

        quote! {
            ::gamewire_core::FieldSchema {
                name: #name,
                kind: #kind,
                optional: #optional,
            }
        }
    });

    quote! {
        impl ::gamewire_core::WireType for #ident {
            const NAME: &'static str = #wire_name;
            const SCHEMA: ::gamewire_core::TypeSchema = ::gamewire_core::TypeSchema {
                name: #wire_name,
                base: #base,
                fields: &[#(#field_schemas),*],
            };
        }
    }
}

fn field_kind(kind: WireKind, ty: &syn::Type) -> proc_macro2::TokenStream {
    match kind {
        WireKind::Bool => quote! { ::gamewire_core::FieldKind::Bool },
        WireKind::Byte => quote! { ::gamewire_core::FieldKind::Byte },
        WireKind::Short => quote! { ::gamewire_core::FieldKind::Short },
        WireKind::Int => quote! { ::gamewire_core::FieldKind::Int },
        WireKind::Long => quote! { ::gamewire_core::FieldKind::Long },
        WireKind::Float => quote! { ::gamewire_core::FieldKind::Float },
        WireKind::Double => quote! { ::gamewire_core::FieldKind::Double },
        WireKind::Str => quote! { ::gamewire_core::FieldKind::Str },
        WireKind::Bytes => quote! { ::gamewire_core::FieldKind::Bytes },
        WireKind::List => quote! { ::gamewire_core::FieldKind::List },
        WireKind::Deque => quote! { ::gamewire_core::FieldKind::Deque },
        WireKind::Map => quote! { ::gamewire_core::FieldKind::Map },
        WireKind::OrderedMap => quote! { ::gamewire_core::FieldKind::OrderedMap },
        WireKind::SortedMap => quote! { ::gamewire_core::FieldKind::SortedMap },
        WireKind::Set => quote! { ::gamewire_core::FieldKind::Set },
        WireKind::OrderedSet => quote! { ::gamewire_core::FieldKind::OrderedSet },
        WireKind::SortedSet => quote! { ::gamewire_core::FieldKind::SortedSet },
        WireKind::Any => quote! { ::gamewire_core::FieldKind::Any },
        WireKind::Ref => quote! {
            ::gamewire_core::FieldKind::Ref(<#ty as ::gamewire_core::WireType>::NAME)
        },
    }
}
