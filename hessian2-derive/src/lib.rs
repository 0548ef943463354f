use darling::{FromDeriveInput, FromMeta};
use quote::quote;
use syn::DeriveInput;

mod de;
mod ser;
mod util;

#[derive(Debug, Clone, FromDeriveInput)]
#[darling(attributes(hessian))]
#[allow(dead_code)]
struct HessianStructAttr {
    #[darling(default)]
    pub class: Option<String>,
    #[darling(default)]
    pub rename_all: String,
}

#[derive(Debug, darling::FromMeta, PartialEq, Default)]
struct HessianFieldAttr {
    #[darling(default)]
    rename: Option<String>,
}

struct ClassAttr {
    class_name: String,
    rename_field: String,
}

fn parse_class_attr(input: &syn::DeriveInput) -> ClassAttr {
    let attr = HessianStructAttr::from_derive_input(input).unwrap();
    let class_name = attr.class.unwrap_or_else(|| input.ident.to_string());
    ClassAttr {
        class_name,
        rename_field: attr.rename_all,
    }
}

/// Derives [`hessian2::reflect::HessianClass`] for an ordinary named-field
/// struct.
///
/// Field names default to lowercase-initial (`Color` -> `color`, §4.10);
/// `#[hessian(rename = "...")]` overrides a single field, and
/// `#[hessian(class = "...")]` on the struct overrides the wire class name
/// (which otherwise defaults to the struct's Rust name).
#[proc_macro_derive(HessianClass, attributes(hessian))]
pub fn derive_hessian_class(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse_macro_input!(item as DeriveInput);
    let attr = parse_class_attr(&input);
    let ident = &input.ident;

    let data = match &input.data {
        syn::Data::Struct(data) => data,
        _ => unimplemented!("HessianClass can only be derived for structs"),
    };
    let fields = match &data.fields {
        syn::Fields::Named(fields) => fields,
        _ => unimplemented!("HessianClass can only be derived for structs with named fields"),
    };

    let class_name = &attr.class_name;
    let field_idents: Vec<syn::Ident> = fields
        .named
        .iter()
        .map(|f| f.ident.clone().unwrap())
        .collect();
    let field_types: Vec<syn::Type> = fields.named.iter().map(|f| f.ty.clone()).collect();
    let field_names: Vec<String> = fields
        .named
        .iter()
        .map(|f| util::field_wire_name(f, &attr.rename_field, &input))
        .collect();

    let field_values_impl = ser::expand_field_values(&field_idents, &field_types);
    let from_field_values_impl = de::expand_from_field_values(&field_idents, &field_names, &field_types);

    let output = quote! {
        #[automatically_derived]
        impl hessian2::reflect::HessianClass for #ident {
            fn class_name() -> &'static str {
                #class_name
            }

            fn field_names() -> &'static [&'static str] {
                &[ #(#field_names),* ]
            }

            fn field_values(&self) -> Vec<hessian2::Value> {
                #field_values_impl
            }

            fn from_field_values(
                fields: &hessian2::IndexMap<String, hessian2::Value>,
            ) -> Result<Self, hessian2::Error> {
                #from_field_values_impl
            }
        }
    };
    output.into()
}
