use quote::quote;

use crate::util::{classify_field, FieldShape};

/// Builds the body of `HessianClass::field_values`, one expression per
/// field converting `self.#ident` into a `hessian2::Value`.
pub(crate) fn expand_field_values(
    field_idents: &[syn::Ident],
    field_types: &[syn::Type],
) -> proc_macro2::TokenStream {
    let exprs: Vec<proc_macro2::TokenStream> = field_idents
        .iter()
        .zip(field_types.iter())
        .map(|(ident, ty)| field_value_expr(ident, ty))
        .collect();

    quote! {
        vec![ #(#exprs),* ]
    }
}

fn field_value_expr(ident: &syn::Ident, ty: &syn::Type) -> proc_macro2::TokenStream {
    field_value_expr_ref(ty, quote!(&self.#ident))
}

/// Builds the expression converting a value of type `ty` into a
/// `hessian2::Value`, given `binding` — an expression of type `&ty`.
/// Shared between top-level fields and `Option<T>` / `Vec<T>`
/// recursion, which always hand down a reference (a closure parameter
/// or a match-ergonomics binding), never an owned value.
fn field_value_expr_ref(
    ty: &syn::Type,
    binding: proc_macro2::TokenStream,
) -> proc_macro2::TokenStream {
    match classify_field(ty) {
        FieldShape::Scalar | FieldShape::Bytes => quote! {
            hessian2::Value::from(#binding.clone())
        },
        FieldShape::List(elem) => {
            let elem_expr = field_value_expr_ref(elem, quote!(__item));
            quote! {
                hessian2::reflect::list_value_from(#binding, |__item| #elem_expr)
            }
        }
        FieldShape::Optional(inner) => {
            let some_expr = field_value_expr_ref(inner, quote!(__inner));
            quote! {
                match #binding {
                    Some(__inner) => #some_expr,
                    None => hessian2::Value::Null,
                }
            }
        }
        FieldShape::Nested => quote! {
            hessian2::reflect::object_value_from(#binding)
        },
    }
}
