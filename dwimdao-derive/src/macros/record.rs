//! `Record` derive

use crate::attributes;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr};

pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    let fields = match &input.data {
        Data::Struct(syn::DataStruct {
            fields: Fields::Named(fields),
            ..
        }) => &fields.named,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Record can only be derived for structs with named fields",
            ));
        }
    };

    let mut columns = Vec::with_capacity(fields.len());
    let mut from_row_fields = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let column = attributes::extract_column_name(field).unwrap_or_else(|| {
            let name = field_name.to_string();
            name.strip_prefix("r#").map(str::to_string).unwrap_or(name)
        });
        let column = LitStr::new(&column, field_name.span());
        from_row_fields.push(quote! {
            #field_name: row.try_get(#column)?,
        });
        columns.push(column);
    }

    let name = LitStr::new(&struct_name.to_string(), struct_name.span());
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::dwimdao::FromRow for #struct_name #ty_generics #where_clause {
            fn from_row(row: &::dwimdao::Row) -> ::core::result::Result<Self, ::dwimdao::RowError> {
                ::core::result::Result::Ok(Self {
                    #(#from_row_fields)*
                })
            }
        }

        impl #impl_generics ::dwimdao::Record for #struct_name #ty_generics #where_clause {
            const NAME: &'static str = #name;
            const FIELDS: &'static [&'static str] = &[#(#columns),*];
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_expand_uses_field_names() {
        let input: DeriveInput = parse_quote! {
            struct User {
                id: i64,
                r#type: String,
                #[column_name = "secondname"]
                surname: String,
            }
        };
        let out = expand(&input).unwrap().to_string();
        assert!(out.contains("\"User\""));
        assert!(out.contains("\"type\""));
        assert!(out.contains("\"secondname\""));
        assert!(!out.contains("\"surname\""));
    }

    #[test]
    fn test_rejects_tuple_structs() {
        let input: DeriveInput = parse_quote!(struct Pair(i64, i64););
        assert!(expand(&input).is_err());
    }
}
