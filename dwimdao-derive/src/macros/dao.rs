//! `#[dao]` contract attribute

use crate::attributes;
use crate::types::{self, Shape};
use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote, ToTokens};
use syn::{parse_macro_input, parse_quote, FnArg, Ident, ItemTrait, LitStr, Pat, ReturnType, TraitItem};

pub fn expand_dao(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = TokenStream2::from(args);
    let item = parse_macro_input!(input as ItemTrait);
    expand(args, item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// One dispatched method, as parsed from the trait.
struct Method {
    descriptor: TokenStream2,
    body: TokenStream2,
}

fn expand(args: TokenStream2, mut item: ItemTrait) -> syn::Result<TokenStream2> {
    if !args.is_empty() {
        return Err(syn::Error::new_spanned(args, "#[dao] takes no arguments"));
    }
    if !item.generics.params.is_empty() || item.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(&item.generics, "contract traits cannot be generic"));
    }

    let trait_name = item.ident.clone();
    let contract = LitStr::new(&trait_name.to_string(), trait_name.span());

    let mut methods = Vec::new();
    for trait_item in &mut item.items {
        match trait_item {
            TraitItem::Fn(f) => {
                let sql = attributes::take_sql(&mut f.attrs)?;
                if f.default.is_some() {
                    if let Some(sql) = sql {
                        return Err(syn::Error::new_spanned(
                            sql,
                            "sql attribute on a method with a default body",
                        ));
                    }
                    continue;
                }
                methods.push(method(&f.sig, sql)?);
            }
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "contract traits may only contain methods",
                ));
            }
        }
    }

    item.attrs.push(parse_quote!(#[allow(non_snake_case)]));

    let descriptors = methods.iter().map(|m| &m.descriptor);
    let bodies = methods.iter().map(|m| &m.body);

    Ok(quote! {
        #item

        impl ::dwimdao::Contract for dyn #trait_name {
            fn descriptor() -> ::dwimdao::ContractDescriptor {
                ::dwimdao::ContractDescriptor::new(#contract)
                    #(.method(#descriptors))*
            }
        }

        #[allow(non_snake_case)]
        impl<__E: ::dwimdao::Executor> #trait_name for ::dwimdao::Dao<dyn #trait_name, __E> {
            #(#bodies)*
        }
    })
}

fn method(sig: &syn::Signature, sql: Option<LitStr>) -> syn::Result<Method> {
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(asyncness, "contract methods cannot be async"));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&sig.generics, "contract methods cannot be generic"));
    }

    let mut inputs = sig.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(receiver))
            if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        _ => {
            return Err(syn::Error::new_spanned(
                &sig.ident,
                "contract methods must take `&self`",
            ));
        }
    }

    let mut params = Vec::new();
    let mut args = Vec::new();
    let mut impl_sig = sig.clone();
    for (idx, input) in impl_sig.inputs.iter_mut().skip(1).enumerate() {
        let FnArg::Typed(typed) = input else {
            return Err(syn::Error::new_spanned(input, "unexpected receiver"));
        };
        let param = match typed.pat.as_ref() {
            Pat::Ident(pat) => pat.ident.to_string(),
            _ => format!("arg{idx}"),
        };
        params.push(LitStr::new(param.trim_start_matches("r#"), Span::call_site()));

        let arg: Ident = format_ident!("__arg{}", idx);
        typed.pat = Box::new(parse_quote!(#arg));
        args.push(arg);
    }

    let ReturnType::Type(_, ret) = &sig.output else {
        return Err(syn::Error::new_spanned(
            &sig.ident,
            "contract methods must return `Result<_, _>`",
        ));
    };
    let Some((ok, _err)) = types::result_parts(ret) else {
        return Err(syn::Error::new_spanned(ret, "contract methods must return `Result<_, _>`"));
    };

    let name = LitStr::new(&sig.ident.to_string(), sig.ident.span());
    let values = quote! {
        [#(::core::convert::Into::<::dwimdao::Value>::into(#args)),*]
    };

    let (return_type, call) = match types::classify(ok) {
        Shape::Single(record) => (
            quote!(::dwimdao::ReturnType::record::<#record>()),
            quote! {
                ::dwimdao::Dao::find_one::<#record>(self, #name, &#values)
                    .map_err(::core::convert::Into::into)
            },
        ),
        Shape::Sequence(record) => (
            quote!(::dwimdao::ReturnType::collection_of::<#record>()),
            quote! {
                ::dwimdao::Dao::find_many::<#record>(self, #name, &#values)
                    .map_err(::core::convert::Into::into)
            },
        ),
        Shape::Other => {
            let declared = LitStr::new(&ok.to_token_stream().to_string(), Span::call_site());
            (
                quote!(::dwimdao::ReturnType::other(#declared)),
                quote! {
                    let _ = (#(#args,)*);
                    ::core::result::Result::Err(::core::convert::Into::into(
                        ::dwimdao::Dao::rejection(self, #name),
                    ))
                },
            )
        }
    };

    let sql = sql.map(|sql| quote!(.sql(#sql)));
    let descriptor = quote! {
        ::dwimdao::MethodDescriptor::new(#name, #return_type)
            #(.param(#params))*
            #sql
    };
    let body = quote! {
        #impl_sig {
            #call
        }
    };

    Ok(Method { descriptor, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(item: ItemTrait) -> syn::Result<String> {
        expand(TokenStream2::new(), item).map(|ts| ts.to_string())
    }

    #[test]
    fn test_expands_finders_and_overrides() {
        let out = expand_str(parse_quote! {
            pub trait UserDao {
                fn findById(&self, id: i64) -> Result<Option<User>, DaoError>;
                #[sql = "select * from user where secondname like ?"]
                fn search(&self, pattern: &str) -> Result<Vec<User>, DaoError>;
                fn save(&self) -> Result<u64, DaoError>;
            }
        })
        .unwrap();

        assert!(out.contains("impl :: dwimdao :: Contract for dyn UserDao"));
        assert!(out.contains("ReturnType :: record :: < User >"));
        assert!(out.contains("ReturnType :: collection_of :: < User >"));
        assert!(out.contains("ReturnType :: other (\"u64\")"));
        assert!(out.contains(". sql (\"select * from user where secondname like ?\")"));
        assert!(out.contains(". param (\"pattern\")"));
        // the sql attribute is consumed
        assert!(!out.contains("# [sql"));
    }

    #[test]
    fn test_default_methods_are_left_alone() {
        let out = expand_str(parse_quote! {
            pub trait UserDao {
                fn findById(&self, id: i64) -> Result<Option<User>, DaoError>;
                fn describe(&self) -> String { String::from("users") }
            }
        })
        .unwrap();
        assert!(!out.contains("\"describe\""));
    }

    #[test]
    fn test_rejects_bad_signatures() {
        assert!(expand_str(parse_quote! {
            trait A { fn findById(self, id: i64) -> Result<Option<User>, DaoError>; }
        })
        .is_err());
        assert!(expand_str(parse_quote! {
            trait B { fn findById(&self, id: i64) -> Option<User>; }
        })
        .is_err());
        assert!(expand_str(parse_quote! {
            trait C { fn findBy<T>(&self, id: T) -> Result<Vec<User>, DaoError>; }
        })
        .is_err());
        assert!(expand_str(parse_quote! {
            trait D<T> { fn findById(&self, id: i64) -> Result<Option<T>, DaoError>; }
        })
        .is_err());
        assert!(expand_str(parse_quote! {
            trait E { const X: i32; }
        })
        .is_err());
    }
}
