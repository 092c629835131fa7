//! Implementation of the `#[derive(Record)]` macro.
//!
//! For every included field this generates a reader function, a descriptor
//! member and a `SCREAMING_SNAKE_CASE` name constant.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{
    ext::IdentExt, spanned::Spanned, Data, DeriveInput, Error, Fields, GenericArgument,
    PathArguments, Result, Type,
};

use super::attrs::{parse_sift_attrs, FieldKind};

/// Main implementation of the Record derive macro.
pub fn record_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "Record cannot be derived for generic structs or structs with lifetimes",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Record can only be derived for structs",
            ))
        }
    };

    let mut readers: Vec<TokenStream> = Vec::new();
    let mut members: Vec<TokenStream> = Vec::new();
    let mut field_constants: Vec<TokenStream> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_sift_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        let (optional, inner_ty) = match option_inner(&field.ty) {
            Some(inner) => (true, inner),
            None => (false, &field.ty),
        };

        // Fields with neither an annotation nor a recognizable type are not
        // exposed
        let kind = match attrs.kind.or_else(|| infer_kind(inner_ty)) {
            Some(kind) => kind,
            None => continue,
        };

        let member_name = attrs
            .rename
            .unwrap_or_else(|| field_name.unraw().to_string());
        let const_name = format_ident!("{}", to_screaming_snake_case(&member_name));
        field_constants.push(quote! {
            /// Field name constant for sort and select conditions.
            pub const #const_name: &'static str = #member_name;
        });

        let reader = format_ident!("__sift_read_{}", field_name.unraw());
        let value_expr = value_expr(kind);
        let body = if optional {
            quote! {
                match &record.#field_name {
                    ::core::option::Option::Some(value) => #value_expr,
                    ::core::option::Option::None => ::sift::Value::None,
                }
            }
        } else {
            quote! {
                let value = &record.#field_name;
                #value_expr
            }
        };

        readers.push(quote! {
            #[allow(non_snake_case)]
            fn #reader(record: &dyn ::core::any::Any) -> ::sift::Value<'_> {
                let ::core::option::Option::Some(record) = record.downcast_ref::<#struct_name>()
                else {
                    return ::sift::Value::None;
                };
                #body
            }
        });

        let field_kind = field_kind_expr(kind, inner_ty);
        members.push(quote! {
            ::sift::Member::new(#member_name, #field_kind, #reader)
        });
    }

    let type_name = struct_name.to_string();

    let expanded = quote! {
        impl #struct_name {
            #(#field_constants)*
        }

        impl ::sift::Record for #struct_name {
            fn descriptor() -> &'static ::sift::TypeDescriptor {
                #(#readers)*

                static DESCRIPTOR: ::sift::TypeDescriptor =
                    ::sift::TypeDescriptor::new(#type_name, &[#(#members),*]);
                &DESCRIPTOR
            }
        }
    };

    Ok(expanded)
}

/// Expression converting `value: &FieldType` into a `sift::Value`.
fn value_expr(kind: FieldKind) -> TokenStream {
    match kind {
        FieldKind::String => quote! { ::sift::Value::String(value) },
        FieldKind::Number => {
            quote! { ::sift::Value::Number(::sift::Number::from(*value)) }
        }
        FieldKind::Timestamp => quote! {
            ::sift::Value::Timestamp(::sift::SiftTimestamp::sift_timestamp(value))
        },
        FieldKind::Enum => quote! {
            ::sift::Value::Enum(::sift::SiftEnum::sift_discriminant(value))
        },
        FieldKind::Bool => quote! { ::sift::Value::Bool(*value) },
        FieldKind::List => quote! {
            ::sift::Value::List(
                value
                    .iter()
                    .map(|item| ::sift::ToValue::to_value(item))
                    .collect(),
            )
        },
        FieldKind::Record => quote! { ::sift::Value::Record(value) },
    }
}

fn field_kind_expr(kind: FieldKind, ty: &Type) -> TokenStream {
    match kind {
        FieldKind::String => quote! { ::sift::FieldKind::String },
        FieldKind::Number => quote! { ::sift::FieldKind::Number },
        FieldKind::Timestamp => quote! { ::sift::FieldKind::Timestamp },
        FieldKind::Enum => quote! { ::sift::FieldKind::Enum },
        FieldKind::Bool => quote! { ::sift::FieldKind::Bool },
        FieldKind::List => quote! { ::sift::FieldKind::List },
        FieldKind::Record => quote! {
            ::sift::FieldKind::Record(<#ty as ::sift::Record>::descriptor)
        },
    }
}

/// Returns `T` for a field typed `Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    type_argument(ty, "Option")
}

/// Returns `T` for a type whose last path segment is `wrapper<T>`.
fn type_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

/// Kind implied by common field types when no annotation is given.
///
/// `Vec<T>` is a list only when `T` is a scalar with a `ToValue` impl.
fn infer_kind(ty: &Type) -> Option<FieldKind> {
    match type_argument(ty, "Vec") {
        Some(element) => is_list_element(element).then_some(FieldKind::List),
        None => scalar_kind(ty),
    }
}

fn is_list_element(ty: &Type) -> bool {
    match scalar_kind(ty) {
        Some(FieldKind::String | FieldKind::Number | FieldKind::Bool) => true,
        Some(FieldKind::Timestamp) => last_ident(ty).is_some_and(|ident| ident == "Timestamp"),
        _ => false,
    }
}

fn scalar_kind(ty: &Type) -> Option<FieldKind> {
    match ty {
        Type::Reference(reference) => match &*reference.elem {
            Type::Path(path) if path.path.is_ident("str") => Some(FieldKind::String),
            _ => None,
        },
        Type::Path(_) => match last_ident(ty)?.as_str() {
            "String" => Some(FieldKind::String),
            "bool" => Some(FieldKind::Bool),
            "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64" | "usize"
            | "f32" | "f64" => Some(FieldKind::Number),
            "Timestamp" | "SystemTime" => Some(FieldKind::Timestamp),
            _ => None,
        },
        _ => None,
    }
}

fn last_ident(ty: &Type) -> Option<String> {
    let Type::Path(path) = ty else {
        return None;
    };
    path.path.segments.last().map(|segment| segment.ident.to_string())
}

/// Convert a string to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = c.is_alphanumeric();
        }
    }

    result
}
