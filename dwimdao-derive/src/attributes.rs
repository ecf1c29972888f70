//! Attribute parsing utilities

use syn::{Attribute, Expr, ExprLit, Field, Lit, LitStr, Meta};

/// Extract column name from field attributes
pub fn extract_column_name(field: &Field) -> Option<String> {
    for attr in &field.attrs {
        if attr.path().is_ident("column_name") {
            if let Ok(meta) = attr.meta.require_name_value() {
                if let Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) = &meta.value
                {
                    return Some(s.value());
                }
            }
        }
    }
    None
}

/// Remove `#[sql = "..."]` / `#[sql("...")]` from `attrs` and return its query.
///
/// A second `sql` attribute on the same method is an error.
pub fn take_sql(attrs: &mut Vec<Attribute>) -> syn::Result<Option<LitStr>> {
    let mut found: Option<LitStr> = None;
    let mut kept = Vec::with_capacity(attrs.len());

    for attr in attrs.drain(..) {
        if !attr.path().is_ident("sql") {
            kept.push(attr);
            continue;
        }
        let lit = match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => s.clone(),
                other => {
                    return Err(syn::Error::new_spanned(other, "expected a string literal query"));
                }
            },
            Meta::List(_) => attr.parse_args::<LitStr>()?,
            Meta::Path(path) => {
                return Err(syn::Error::new_spanned(
                    path,
                    "expected #[sql = \"...\"] or #[sql(\"...\")]",
                ));
            }
        };
        if found.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate sql attribute"));
        }
        found = Some(lit);
    }

    *attrs = kept;
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_take_sql_name_value() {
        let mut attrs: Vec<Attribute> = vec![
            parse_quote!(#[doc = "finder"]),
            parse_quote!(#[sql = "select * from user"]),
        ];
        let sql = take_sql(&mut attrs).unwrap().unwrap();
        assert_eq!(sql.value(), "select * from user");
        assert_eq!(attrs.len(), 1);
        assert!(attrs[0].path().is_ident("doc"));
    }

    #[test]
    fn test_take_sql_list() {
        let mut attrs: Vec<Attribute> = vec![parse_quote!(#[sql("select 1")])];
        assert_eq!(take_sql(&mut attrs).unwrap().unwrap().value(), "select 1");
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_take_sql_absent_and_invalid() {
        let mut attrs: Vec<Attribute> = vec![parse_quote!(#[inline])];
        assert!(take_sql(&mut attrs).unwrap().is_none());

        let mut attrs: Vec<Attribute> = vec![parse_quote!(#[sql])];
        assert!(take_sql(&mut attrs).is_err());

        let mut attrs: Vec<Attribute> = vec![parse_quote!(#[sql = "a"]), parse_quote!(#[sql = "b"])];
        assert!(take_sql(&mut attrs).is_err());
    }

    #[test]
    fn test_extract_column_name() {
        let item: syn::ItemStruct = parse_quote! {
            struct User {
                id: i64,
                #[column_name = "secondname"]
                surname: String,
            }
        };
        let names: Vec<Option<String>> = item.fields.iter().map(extract_column_name).collect();
        assert_eq!(names, vec![None, Some("secondname".to_string())]);
    }
}
