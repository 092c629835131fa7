//! Parsing of `#[sift(...)]` field attributes.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Ident, Lit, Meta, Result, Token,
};

const EXPECTED_KINDS: &str = "String, Number, Timestamp, Enum, Bool, List, Record";

/// Declared kind of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Timestamp,
    Enum,
    Bool,
    /// Sequence of scalars: `#[sift(List)]`
    List,
    /// Nested record: `#[sift(Record)]`
    Record,
}

impl FieldKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "String" | "string" => Some(FieldKind::String),
            "Number" | "number" => Some(FieldKind::Number),
            "Timestamp" | "timestamp" => Some(FieldKind::Timestamp),
            "Enum" | "enum" | "enumeration" => Some(FieldKind::Enum),
            "Bool" | "bool" | "boolean" => Some(FieldKind::Bool),
            "List" | "list" => Some(FieldKind::List),
            "Record" | "record" => Some(FieldKind::Record),
            _ => None,
        }
    }

    pub fn from_ident(ident: &Ident) -> Result<Self> {
        let name = ident.to_string();
        FieldKind::from_name(&name).ok_or_else(|| {
            Error::new(
                ident.span(),
                format!("unknown sift kind: '{name}'. Expected one of: {EXPECTED_KINDS}"),
            )
        })
    }

    pub fn from_str(s: &str, span: Span) -> Result<Self> {
        FieldKind::from_name(s).ok_or_else(|| {
            Error::new(
                span,
                format!("unknown sift kind: '{s}'. Expected one of: {EXPECTED_KINDS}"),
            )
        })
    }
}

/// Field-level attributes from `#[sift(...)]`.
#[derive(Debug, Clone, Default)]
pub struct SiftAttr {
    pub kind: Option<FieldKind>,
    pub skip: bool,
    /// Member name exposed to path resolution (default: field name).
    pub rename: Option<String>,
}

fn string_literal(value: &syn::Expr, what: &str) -> Result<syn::LitStr> {
    match value {
        syn::Expr::Lit(syn::ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.clone()),
        other => Err(Error::new(
            other.span(),
            format!("{what} must be a string literal"),
        )),
    }
}

impl Parse for SiftAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = SiftAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                // sift(String), sift(Record), sift(skip)
                Meta::Path(p) => {
                    if p.is_ident("skip") {
                        attr.skip = true;
                    } else if let Some(ident) = p.get_ident() {
                        attr.kind = Some(FieldKind::from_ident(ident)?);
                    } else {
                        return Err(Error::new(
                            p.span(),
                            format!("expected a sift kind ({EXPECTED_KINDS}) or skip"),
                        ));
                    }
                }

                // rename = "..." or ty = "..."
                Meta::NameValue(nv) => {
                    if nv.path.is_ident("rename") {
                        attr.rename = Some(string_literal(&nv.value, "rename")?.value());
                    } else if nv.path.is_ident("ty") {
                        let lit = string_literal(&nv.value, "ty")?;
                        attr.kind = Some(FieldKind::from_str(&lit.value(), lit.span())?);
                    } else {
                        return Err(Error::new(
                            nv.path.span(),
                            "unknown attribute. Expected: rename or ty",
                        ));
                    }
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown sift attribute. Expected a kind, skip, rename = \"...\", or ty = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Extracts `#[sift(...)]` from a field's attributes.
pub fn parse_sift_attrs(attrs: &[Attribute]) -> Result<SiftAttr> {
    for attr in attrs {
        if attr.path().is_ident("sift") {
            return attr.parse_args::<SiftAttr>();
        }
    }
    Ok(SiftAttr::default())
}
