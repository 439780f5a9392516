//! Derives the `Marshal` impl: presence flags and field bodies in
//! declaration order, base-type fields first.

use quote::quote;

use crate::fields::{StructModel, WireField, WireKind};

pub(crate) fn expand(model: &StructModel) -> proc_macro2::TokenStream {
    let ident = &model.ident;

    let base_stmt = model.base.as_ref().map(|base| {
        let base_ident = &base.ident;
        quote! {
            ::gamewire_core::Marshal::encode_fields(&self.#base_ident, registry, cursor)?;
        }
    });

    let nullable: Vec<_> = model.fields.iter().filter(|f| f.is_null_testable()).collect();

    let flag_stmts = match nullable.is_empty() {
        true => None,
        false => {
            let pushes = nullable.iter().map(|field| {
                let present = presence_expr(field);
                quote! { flags.push(#present); }
            });

            Some(quote! {
                let mut flags = ::gamewire_core::FlagWriter::default();
                #(#pushes)*
                flags.write(cursor);
            })
        }
    };

    let body_stmts = model.fields.iter().map(body_stmt);

    let generic_bytes = model.serde_fallback.then(|| {
        quote! {
            fn to_generic_bytes(&self) -> ::core::result::Result<
                ::std::vec::Vec<u8>,
                ::gamewire_core::WireError,
            > {
                ::gamewire_core::ser_de::serialize(self)
            }
        }
    });

    quote! {
        impl ::gamewire_core::Marshal for #ident {
            fn type_name(&self) -> &'static str {
                <Self as ::gamewire_core::WireType>::NAME
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::core::any::Any> {
                self
            }

            fn clone_boxed(&self) -> ::std::boxed::Box<dyn ::gamewire_core::Marshal> {
                ::std::boxed::Box::new(::core::clone::Clone::clone(self))
            }

            fn eq_boxed(&self, other: &dyn ::gamewire_core::Marshal) -> bool {
                match other.as_any().downcast_ref::<Self>() {
                    ::core::option::Option::Some(other) => self == other,
                    ::core::option::Option::None => false,
                }
            }

            #[allow(unused_variables)]
            fn encode_fields(
                &self,
                registry: &::gamewire_core::Registry,
                cursor: &mut ::gamewire_core::ByteCursor,
            ) -> ::core::result::Result<(), ::gamewire_core::WireError> {
                #base_stmt
                #flag_stmts
                #(#body_stmts)*
                ::core::result::Result::Ok(())
            }

            #generic_bytes
        }
    }
}

/// Presence test matching the flag-bit semantics: absent means omitted
/// from the wire entirely.
fn presence_expr(field: &WireField) -> proc_macro2::TokenStream {
    let ident = &field.ident;

    if field.optional {
        return quote! { self.#ident.is_some() };
    }

    match field.kind {
        // empty strings and containers encode as absent
        WireKind::Str
        | WireKind::Bytes
        | WireKind::List
        | WireKind::Deque
        | WireKind::Map
        | WireKind::OrderedMap
        | WireKind::SortedMap
        | WireKind::Set
        | WireKind::OrderedSet
        | WireKind::SortedSet => quote! { !self.#ident.is_empty() },
        WireKind::Any => quote! { !self.#ident.is_null() },
        WireKind::Ref => quote! { true },
        _ => quote! { true },
    }
}

fn body_stmt(field: &WireField) -> proc_macro2::TokenStream {
    let ident = &field.ident;

    let put = |value: proc_macro2::TokenStream| -> proc_macro2::TokenStream {
        match field.kind {
            WireKind::Bool => quote! { cursor.put_u8(#value as u8); },
            WireKind::Byte => quote! { cursor.put_i8(#value); },
            WireKind::Short => quote! { cursor.put_i16(#value); },
            WireKind::Int => quote! { cursor.put_i32(#value); },
            WireKind::Long => quote! { cursor.put_i64(#value); },
            WireKind::Float => quote! { cursor.put_f32(#value); },
            WireKind::Double => quote! { cursor.put_f64(#value); },
            WireKind::Str => quote! { cursor.put_str(#value); },
            WireKind::Bytes => {
                quote! { ::gamewire_core::builtin::put_byte_array(cursor, #value); }
            }
            WireKind::List => {
                quote! { ::gamewire_core::builtin::put_list(registry, cursor, #value)?; }
            }
            WireKind::Deque => {
                quote! { ::gamewire_core::builtin::put_deque(registry, cursor, #value)?; }
            }
            WireKind::Map => {
                quote! { ::gamewire_core::builtin::put_map(registry, cursor, #value)?; }
            }
            WireKind::OrderedMap => {
                quote! { ::gamewire_core::builtin::put_ordered_map(registry, cursor, #value)?; }
            }
            WireKind::SortedMap => {
                quote! { ::gamewire_core::builtin::put_sorted_map(registry, cursor, #value)?; }
            }
            WireKind::Set => {
                quote! { ::gamewire_core::builtin::put_set(registry, cursor, #value)?; }
            }
            WireKind::OrderedSet => {
                quote! { ::gamewire_core::builtin::put_ordered_set(registry, cursor, #value)?; }
            }
            WireKind::SortedSet => {
                quote! { ::gamewire_core::builtin::put_sorted_set(registry, cursor, #value)?; }
            }
            WireKind::Any => {
                quote! { ::gamewire_core::marshal_object(registry, cursor, #value)?; }
            }
            WireKind::Ref => {
                quote! { ::gamewire_core::marshal_ref(registry, cursor, #value)?; }
            }
        }
    };

    if field.optional {
        let body = put(quote! { value });

        // primitives are copied out of the option, the rest borrowed
        return match field.kind.is_primitive() {
            true => quote! {
                if let ::core::option::Option::Some(value) = self.#ident {
                    #body
                }
            },
            false => quote! {
                if let ::core::option::Option::Some(value) = &self.#ident {
                    #body
                }
            },
        };
    }

    match field.kind {
        // primitive scalars are always written
        WireKind::Bool
        | WireKind::Byte
        | WireKind::Short
        | WireKind::Int
        | WireKind::Long
        | WireKind::Float
        | WireKind::Double => put(quote! { self.#ident }),

        // always-present references
        WireKind::Ref => put(quote! { &self.#ident }),

        WireKind::Any => {
            let body = put(quote! { &self.#ident });
            quote! {
                if !self.#ident.is_null() {
                    #body
                }
            }
        }

        // strings, byte arrays, containers: empty encodes as absent
        _ => {
            let body = put(quote! { &self.#ident });
            quote! {
                if !self.#ident.is_empty() {
                    #body
                }
            }
        }
    }
}
