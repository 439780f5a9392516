//! Proc-macros for gamewire_core

use quote::quote;
use syn::parse_macro_input;

mod decode;
mod encode;
mod fields;
mod schema;

/// Generates the marshalling capability for a struct: its `WireType`
/// schema, the `Marshal` encode half and the `WireDecode` decode half,
/// all following declared field order.
///
/// The struct must also implement `Debug`, `Clone`, `Default` and
/// `PartialEq`. Field types can be:
/// - primitive scalars (`bool`, `i8`, `i16`, `i32`, `i64`, `f32`, `f64`)
/// - `String` (an empty string encodes as absent)
/// - `Vec<u8>` byte arrays
/// - the builtin containers holding `Value` elements (`Vec`, `VecDeque`,
///   `HashMap`, `IndexMap`, `BTreeMap`, `HashSet`, `IndexSet`,
///   `BTreeSet`)
/// - `Value` for fully dynamic fields
/// - other registered `Marshal` types, by value
/// - `Option` of any of the above
///
/// Attributes:
/// - `#[wire(base)]` on the first field embeds a base type whose fields
///   are encoded before this type's own
/// - `#[wire(skip)]` excludes a field from the wire
/// - `#[wire(rename = "...")]` overrides the registry name
/// - `#[wire(intern = path)]` passes decoded instances through a
///   `fn(Self) -> Self` canonicalization hook
/// - `#[wire(serde)]` opts into the generic serialization fallback
///   (requires `serde::Serialize`)
///
/// ```ignore
/// #[derive(Debug, Clone, Default, PartialEq, Marshal)]
/// pub struct Player {
///     #[wire(base)]
///     pub base: Entity,
///     pub level: i16,
///     pub guild: String,
/// }
/// ```
#[proc_macro_derive(Marshal, attributes(wire))]
pub fn derive_marshal(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(item as syn::DeriveInput);

    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &syn::DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let model = fields::parse(input)?;

    let schema_impl = schema::expand(&model);
    let marshal_impl = encode::expand(&model);
    let decode_impl = decode::expand(&model);

    Ok(quote! {
        #schema_impl
        #marshal_impl
        #decode_impl
    })
}
