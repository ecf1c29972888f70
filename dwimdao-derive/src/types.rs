//! Classification of declared return types

use syn::{GenericArgument, PathArguments, Type};

/// What a contract method's `Ok` type asks dispatch to produce.
pub enum Shape<'a> {
    /// `Option<R>`
    Single(&'a Type),
    /// `Vec<R>`
    Sequence(&'a Type),
    /// Anything dispatch cannot produce
    Other,
}

/// Split `Result<T, E>` (any path ending in `Result`) into `T` and `E`.
pub fn result_parts(ty: &Type) -> Option<(&Type, Option<&Type>)> {
    let args = generic_args(ty, "Result")?;
    match args.as_slice() {
        [ok] => Some((*ok, None)),
        [ok, err] => Some((*ok, Some(*err))),
        _ => None,
    }
}

pub fn classify(ty: &Type) -> Shape<'_> {
    if let Some([inner]) = generic_args(ty, "Option").as_deref() {
        if is_record_candidate(inner) {
            return Shape::Single(*inner);
        }
    }
    if let Some([inner]) = generic_args(ty, "Vec").as_deref() {
        if is_record_candidate(inner) {
            return Shape::Sequence(*inner);
        }
    }
    Shape::Other
}

/// Type arguments of `ty` if its last path segment is `name<...>`.
fn generic_args<'a>(ty: &'a Type, name: &str) -> Option<Vec<&'a Type>> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if segment.ident != name {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    Some(
        args.args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect(),
    )
}

/// Whether `ty` could name a record: a plain path that is not a scalar or std container.
fn is_record_candidate(ty: &Type) -> bool {
    const NOT_RECORDS: &[&str] = &[
        "bool", "char", "str", "String", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16",
        "u32", "u64", "u128", "usize", "f32", "f64", "Option", "Vec", "HashMap", "BTreeMap",
        "HashSet", "BTreeSet", "Box", "Value",
    ];

    match ty {
        Type::Path(path) if path.qself.is_none() => path
            .path
            .segments
            .last()
            .is_some_and(|seg| !NOT_RECORDS.contains(&seg.ident.to_string().as_str())),
        _ => false,
    }
}
