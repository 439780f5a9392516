//! Derives the `WireDecode` impl, mirroring the generated encoding
//! exactly: base-type fields, flag bytes, then field bodies.

use quote::quote;

use crate::fields::{StructModel, WireField, WireKind};

pub(crate) fn expand(model: &StructModel) -> proc_macro2::TokenStream {
    let ident = &model.ident;

    let base_stmt = model.base.as_ref().map(|base| {
        let base_ident = &base.ident;
        quote! {
            ::gamewire_core::WireDecode::decode_fields(&mut self.#base_ident, registry, cursor)?;
        }
    });

    let nullable_count = model.fields.iter().filter(|f| f.is_null_testable()).count();

    let flag_stmt = match nullable_count {
        0 => None,
        count => Some(quote! {
            let flags = ::gamewire_core::FlagReader::read(cursor, #count)?;
        }),
    };

    let mut flag_index = 0_usize;
    let body_stmts: Vec<_> = model
        .fields
        .iter()
        .map(|field| {
            let stmt = body_stmt(field, flag_index);
            if field.is_null_testable() {
                flag_index += 1;
            }
            stmt
        })
        .collect();

    let decode_override = model.intern.as_ref().map(|intern| {
        quote! {
            fn decode(
                registry: &::gamewire_core::Registry,
                cursor: &mut ::gamewire_core::ByteCursor,
            ) -> ::core::result::Result<Self, ::gamewire_core::WireError> {
                let mut value = <Self as ::core::default::Default>::default();
                ::gamewire_core::WireDecode::decode_fields(&mut value, registry, cursor)?;

                // decode may substitute a canonical instance
                ::core::result::Result::Ok(#intern(value))
            }
        }
    });

    quote! {
        impl ::gamewire_core::WireDecode for #ident {
            #[allow(unused_variables)]
            fn decode_fields(
                &mut self,
                registry: &::gamewire_core::Registry,
                cursor: &mut ::gamewire_core::ByteCursor,
            ) -> ::core::result::Result<(), ::gamewire_core::WireError> {
                #base_stmt
                #flag_stmt
                #(#body_stmts)*
                ::core::result::Result::Ok(())
            }

            #decode_override
        }
    }
}

fn body_stmt(field: &WireField, flag_index: usize) -> proc_macro2::TokenStream {
    let ident = &field.ident;
    let ty = &field.ty;

    let read = match field.kind {
        WireKind::Bool => quote! { cursor.get_u8()? != 0 },
        WireKind::Byte => quote! { cursor.get_i8()? },
        WireKind::Short => quote! { cursor.get_i16()? },
        WireKind::Int => quote! { cursor.get_i32()? },
        WireKind::Long => quote! { cursor.get_i64()? },
        WireKind::Float => quote! { cursor.get_f32()? },
        WireKind::Double => quote! { cursor.get_f64()? },
        WireKind::Str => quote! { cursor.get_str()? },
        WireKind::Bytes => quote! { ::gamewire_core::builtin::get_byte_array(cursor)? },
        WireKind::List => quote! { ::gamewire_core::builtin::get_list(registry, cursor)? },
        WireKind::Deque => quote! { ::gamewire_core::builtin::get_deque(registry, cursor)? },
        WireKind::Map => quote! { ::gamewire_core::builtin::get_map(registry, cursor)? },
        WireKind::OrderedMap => {
            quote! { ::gamewire_core::builtin::get_ordered_map(registry, cursor)? }
        }
        WireKind::SortedMap => {
            quote! { ::gamewire_core::builtin::get_sorted_map(registry, cursor)? }
        }
        WireKind::Set => quote! { ::gamewire_core::builtin::get_set(registry, cursor)? },
        WireKind::OrderedSet => {
            quote! { ::gamewire_core::builtin::get_ordered_set(registry, cursor)? }
        }
        WireKind::SortedSet => {
            quote! { ::gamewire_core::builtin::get_sorted_set(registry, cursor)? }
        }
        WireKind::Any => quote! { ::gamewire_core::unmarshal_object(registry, cursor)? },
        WireKind::Ref => quote! {
            ::gamewire_core::unmarshal_object(registry, cursor)?.into_object::<#ty>()?
        },
    };

    let assigned = match field.optional {
        true => quote! { ::core::option::Option::Some(#read) },
        false => read,
    };

    match field.is_null_testable() {
        // absent fields keep their default value
        true => quote! {
            if flags.get(#flag_index) {
                self.#ident = #assigned;
            }
        },
        false => quote! {
            self.#ident = #assigned;
        },
    }
}
