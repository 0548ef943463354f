use darling::FromMeta;
use syn::{DeriveInput, Field};

use crate::HessianFieldAttr;

/// Lowercases the first ASCII letter, the default field rename (§4.10).
/// Duplicated from `hessian2::reflect::lower_initial` since this crate
/// runs at macro-expansion time over plain strings, not generated code.
fn lower_initial(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

pub(crate) fn parse_field_attr(field: &Field) -> HessianFieldAttr {
    field
        .attrs
        .iter()
        .find(|a| a.path().is_ident("hessian"))
        .and_then(|a| HessianFieldAttr::from_meta(&a.meta).ok())
        .unwrap_or_default()
}

/// Resolves the wire name for one struct field: an explicit
/// `#[hessian(rename = "...")]` wins, otherwise the struct-level
/// `rename_all` case conversion runs, defaulting to lowercase-initial.
pub(crate) fn field_wire_name(field: &Field, rename_all: &str, ctx: &DeriveInput) -> String {
    if let Some(rename) = parse_field_attr(field).rename {
        return rename;
    }
    let ident = field.ident.as_ref().unwrap().to_string();
    convert_to_case(rename_all, ident, ctx)
}

/// The five type shapes the derive macro knows how to bridge to
/// [`hessian2::Value`] without the caller writing any glue.
pub(crate) enum FieldShape<'t> {
    /// A numeric/bool/string primitive — a direct `Value` variant,
    /// with numeric coercion handling width mismatches on decode
    /// (§4.12 "Numeric coercion").
    Scalar,
    /// `Vec<u8>` — the binary form rather than a typed list.
    Bytes,
    /// `Vec<T>` for any other `T` — an untyped list, elements
    /// converted one at a time (§4.12 "Slice/array set").
    List(&'t syn::Type),
    /// `Option<T>` — `None` becomes `Value::Null`; `Some` recurses on `T`.
    Optional(&'t syn::Type),
    /// Anything else: assumed to implement `HessianClass` itself.
    Nested,
}

const SCALAR_IDENTS: &[&str] = &[
    "bool", "i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64", "f32", "f64", "String",
];

pub(crate) fn classify_field(ty: &syn::Type) -> FieldShape<'_> {
    let syn::Type::Path(path) = ty else {
        return FieldShape::Nested;
    };
    let Some(segment) = path.path.segments.last() else {
        return FieldShape::Nested;
    };
    let ident = segment.ident.to_string();
    if SCALAR_IDENTS.contains(&ident.as_str()) {
        return FieldShape::Scalar;
    }
    match ident.as_str() {
        "Vec" if is_u8_arg(segment) => FieldShape::Bytes,
        "Vec" => match generic_inner(segment) {
            Some(inner) => FieldShape::List(inner),
            None => FieldShape::Nested,
        },
        "Option" => match generic_inner(segment) {
            Some(inner) => FieldShape::Optional(inner),
            None => FieldShape::Nested,
        },
        _ => FieldShape::Nested,
    }
}

fn is_u8_arg(segment: &syn::PathSegment) -> bool {
    matches!(generic_inner(segment), Some(syn::Type::Path(p)) if p.path.is_ident("u8"))
}

fn generic_inner(segment: &syn::PathSegment) -> Option<&syn::Type> {
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        syn::GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

pub(crate) fn convert_to_case(case: &str, source: String, ctx: &DeriveInput) -> String {
    use convert_case::{Case, Casing};
    match case {
        "" => lower_initial(&source),
        "lowercase" => source.to_lowercase(),
        "UPPERCASE" => source.to_uppercase(),
        "PascalCase" => source.to_case(Case::Pascal),
        "camelCase" => source.to_case(Case::Camel),
        "snake_case" => source.to_case(Case::Snake),
        "SCREAMING_SNAKE_CASE" => source.to_case(Case::ScreamingSnake),
        "kebab-case" => source.to_case(Case::Kebab),
        other => panic!("{} case is not implemented (struct {})", other, ctx.ident),
    }
}
