use quote::quote;

use crate::util::{classify_field, FieldShape};

/// Builds the body of `HessianClass::from_field_values`: one binding per
/// field, looked up by wire name out of the decoded field map and
/// coerced to the field's host type. Keys in `fields` with no matching
/// host field are simply never looked up (§4.10 "unknown fields").
pub(crate) fn expand_from_field_values(
    field_idents: &[syn::Ident],
    field_names: &[String],
    field_types: &[syn::Type],
) -> proc_macro2::TokenStream {
    let bindings: Vec<proc_macro2::TokenStream> = field_idents
        .iter()
        .zip(field_names.iter())
        .zip(field_types.iter())
        .map(|((ident, name), ty)| field_binding(ident, name, ty))
        .collect();

    quote! {
        #(#bindings)*
        Ok(Self { #(#field_idents),* })
    }
}

fn field_binding(ident: &syn::Ident, name: &str, ty: &syn::Type) -> proc_macro2::TokenStream {
    match classify_field(ty) {
        FieldShape::Optional(inner) => {
            let some_expr = coerce_expr(inner, quote!(__v), name);
            quote! {
                let #ident = match hessian2::reflect::lookup_field(fields, #name) {
                    None => None,
                    Some(hessian2::Value::Null) => None,
                    Some(__v) => Some(#some_expr),
                };
            }
        }
        shape => {
            let value_expr = coerce_expr_for_shape(&shape, ty, quote!(__v), name);
            quote! {
                let #ident = match hessian2::reflect::lookup_field(fields, #name) {
                    Some(__v) => #value_expr,
                    None => return Err(hessian2::Error::custom(
                        format!("missing required field {:?}", #name)
                    )),
                };
            }
        }
    }
}

fn coerce_expr(
    ty: &syn::Type,
    binding: proc_macro2::TokenStream,
    name: &str,
) -> proc_macro2::TokenStream {
    let shape = classify_field(ty);
    coerce_expr_for_shape(&shape, ty, binding, name)
}

fn coerce_expr_for_shape(
    shape: &FieldShape,
    ty: &syn::Type,
    binding: proc_macro2::TokenStream,
    name: &str,
) -> proc_macro2::TokenStream {
    match shape {
        FieldShape::Scalar => {
            let coerce_fn = scalar_coerce_fn(ty);
            quote! { hessian2::reflect::#coerce_fn(#binding, #name)? }
        }
        FieldShape::Bytes => quote! { hessian2::reflect::coerce_bytes(#binding, #name)? },
        FieldShape::List(elem) => {
            let elem_expr = coerce_expr(elem, quote!(__item), name);
            quote! {
                hessian2::reflect::coerce_list(#binding, #name, |__item, _| Ok(#elem_expr))?
            }
        }
        FieldShape::Nested => quote! { hessian2::reflect::coerce_object::<#ty>(#binding, #name)? },
        FieldShape::Optional(_) => panic!("nested Option<Option<_>> fields are not supported"),
    }
}

fn scalar_coerce_fn(ty: &syn::Type) -> syn::Ident {
    let syn::Type::Path(path) = ty else {
        unreachable!("classify_field already verified this is a path type")
    };
    let ident = path.path.segments.last().unwrap().ident.to_string();
    let fn_name = match ident.as_str() {
        "bool" => "coerce_bool",
        "i8" => "coerce_i8",
        "i16" => "coerce_i16",
        "i32" => "coerce_i32",
        "i64" => "coerce_i64",
        "u8" => "coerce_u8",
        "u16" => "coerce_u16",
        "u32" => "coerce_u32",
        "u64" => "coerce_u64",
        "f32" => "coerce_f32",
        "f64" => "coerce_f64",
        "String" => "coerce_string",
        other => unreachable!("unexpected scalar type {other}"),
    };
    syn::Ident::new(fn_name, proc_macro2::Span::call_site())
}
