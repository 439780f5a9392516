//! Parses a struct definition into the model the codegen works from:
//! the optional base field, then every wire field in declaration order
//! with its classified kind.

use syn::spanned::Spanned;

/// Parsed form of a `#[derive(Marshal)]` struct.
pub(crate) struct StructModel {
    pub ident: syn::Ident,

    /// Stable registry name, the struct ident unless renamed.
    pub wire_name: String,

    /// Embedded base-type field, encoded before everything else.
    pub base: Option<BaseField>,

    /// Declared wire fields, in declaration order.
    pub fields: Vec<WireField>,

    /// Canonicalization hook applied to freshly decoded instances.
    pub intern: Option<syn::Path>,

    /// Whether to generate the generic serde fallback hook.
    pub serde_fallback: bool,
}

pub(crate) struct BaseField {
    pub ident: syn::Ident,
    pub ty: syn::Type,
}

pub(crate) struct WireField {
    pub ident: syn::Ident,

    /// The effective value type: for `Option<T>` fields this is `T`.
    pub ty: syn::Type,

    pub kind: WireKind,

    /// Wrapped in `Option`.
    pub optional: bool,
}

/// Field categories the wire format can express.
#[derive(Clone, PartialEq)]
pub(crate) enum WireKind {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Str,
    Bytes,
    List,
    Deque,
    Map,
    OrderedMap,
    SortedMap,
    Set,
    OrderedSet,
    SortedSet,
    Any,
    Ref,
}

impl WireKind {
    /// Primitive scalars never take a presence flag.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::Byte
                | Self::Short
                | Self::Int
                | Self::Long
                | Self::Float
                | Self::Double
        )
    }
}

impl WireField {
    pub fn is_null_testable(&self) -> bool {
        self.optional || !self.kind.is_primitive()
    }
}

pub(crate) fn parse(input: &syn::DeriveInput) -> syn::Result<StructModel> {
    let syn::Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(
            input.ident.span(),
            "Marshal can only be derived for structs",
        ));
    };

    let syn::Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new(
            input.ident.span(),
            "Marshal requires named fields",
        ));
    };

    let mut wire_name = input.ident.to_string();
    let mut intern = None;
    let mut serde_fallback = false;

    for attr in &input.attrs {
        if !attr.path().is_ident("wire") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                wire_name = lit.value();
                Ok(())
            } else if meta.path.is_ident("intern") {
                let lit: syn::Path = meta.value()?.parse()?;
                intern = Some(lit);
                Ok(())
            } else if meta.path.is_ident("serde") {
                serde_fallback = true;
                Ok(())
            } else {
                Err(meta.error("expected rename, intern or serde"))
            }
        })?;
    }

    let mut base = None;
    let mut fields = Vec::new();

    for (index, field) in named.named.iter().enumerate() {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(field.span(), "named field expected"))?;

        let mut is_base = false;
        let mut is_skip = false;

        for attr in &field.attrs {
            if !attr.path().is_ident("wire") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("base") {
                    is_base = true;
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    is_skip = true;
                    Ok(())
                } else {
                    Err(meta.error("expected base or skip"))
                }
            })?;
        }

        if is_skip {
            continue;
        }

        if is_base {
            if index != 0 {
                return Err(syn::Error::new(
                    ident.span(),
                    "the base field must be declared first",
                ));
            }
            if base.is_some() {
                return Err(syn::Error::new(ident.span(), "only one base field allowed"));
            }

            base = Some(BaseField {
                ident,
                ty: field.ty.clone(),
            });
            continue;
        }

        let (kind, ty, optional) = classify(&field.ty)?;
        fields.push(WireField {
            ident,
            ty,
            kind,
            optional,
        });
    }

    Ok(StructModel {
        ident: input.ident.clone(),
        wire_name,
        base,
        fields,
        intern,
        serde_fallback,
    })
}

/// Classify a field type into its wire kind.
///
/// Unsupported shapes are compile errors: arrays of primitives other
/// than byte have no wire form, and containers hold `Value` elements
/// so heterogeneous contents stay expressible.
fn classify(ty: &syn::Type) -> syn::Result<(WireKind, syn::Type, bool)> {
    let segment = last_segment(ty)?;
    let name = segment.ident.to_string();

    let kind = match name.as_str() {
        "bool" => WireKind::Bool,
        "i8" => WireKind::Byte,
        "i16" => WireKind::Short,
        "i32" => WireKind::Int,
        "i64" => WireKind::Long,
        "f32" => WireKind::Float,
        "f64" => WireKind::Double,
        "String" => WireKind::Str,
        "Value" => WireKind::Any,
        "Option" => {
            let inner = single_generic_arg(segment)?;
            let (kind, inner_ty, optional) = classify(&inner)?;

            if optional {
                return Err(syn::Error::new(ty.span(), "nested Option is not supported"));
            }

            return Ok((kind, inner_ty, true));
        }
        "Vec" => {
            let inner = single_generic_arg(segment)?;
            match last_segment(&inner)?.ident.to_string().as_str() {
                "u8" => WireKind::Bytes,
                "Value" => WireKind::List,
                other => {
                    return Err(syn::Error::new(
                        ty.span(),
                        format!(
                            "Vec<{}> has no wire form; only Vec<u8> and Vec<Value> are supported",
                            other
                        ),
                    ))
                }
            }
        }
        "VecDeque" => value_container(segment, ty, WireKind::Deque)?,
        "HashMap" => value_container(segment, ty, WireKind::Map)?,
        "IndexMap" => value_container(segment, ty, WireKind::OrderedMap)?,
        "BTreeMap" => value_container(segment, ty, WireKind::SortedMap)?,
        "HashSet" => value_container(segment, ty, WireKind::Set)?,
        "IndexSet" => value_container(segment, ty, WireKind::OrderedSet)?,
        "BTreeSet" => value_container(segment, ty, WireKind::SortedSet)?,
        _ => WireKind::Ref,
    };

    Ok((kind, ty.clone(), false))
}

/// Containers carry `Value` type parameters only.
fn value_container(
    segment: &syn::PathSegment,
    ty: &syn::Type,
    kind: WireKind,
) -> syn::Result<WireKind> {
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return Err(syn::Error::new(ty.span(), "missing container type params"));
    };

    for arg in &args.args {
        if let syn::GenericArgument::Type(arg_ty) = arg {
            if last_segment(arg_ty)?.ident != "Value" {
                return Err(syn::Error::new(
                    ty.span(),
                    "container fields hold Value elements",
                ));
            }
        }
    }

    Ok(kind)
}

fn last_segment(ty: &syn::Type) -> syn::Result<&syn::PathSegment> {
    match ty {
        syn::Type::Path(path) => path
            .path
            .segments
            .last()
            .ok_or_else(|| syn::Error::new(ty.span(), "empty type path")),
        syn::Type::Array(_) | syn::Type::Slice(_) => Err(syn::Error::new(
            ty.span(),
            "primitive arrays are not supported on the wire; use Vec<u8> or Vec<Value>",
        )),
        _ => Err(syn::Error::new(ty.span(), "unsupported field type")),
    }
}

fn single_generic_arg(segment: &syn::PathSegment) -> syn::Result<syn::Type> {
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return Err(syn::Error::new(
            segment.ident.span(),
            "missing type parameter",
        ));
    };

    for arg in &args.args {
        if let syn::GenericArgument::Type(ty) = arg {
            return Ok(ty.clone());
        }
    }

    Err(syn::Error::new(
        segment.ident.span(),
        "missing type parameter",
    ))
}
