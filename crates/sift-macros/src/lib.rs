//! Proc macros for sift.
//!
//! - [`Record`] - Generate a static type descriptor so a struct can be
//!   sorted and filtered by runtime field paths.
//!
//! The macros are re-exported by `sift` behind its default `derive`
//! feature; depend on `sift` rather than on this crate directly.

mod record;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `sift::Record` for a struct with named fields.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `String` | String field (`String`, `&'static str`) |
/// | `Number` | Numeric primitive |
/// | `Timestamp` | Any type implementing `SiftTimestamp` |
/// | `Enum` | Any type implementing `SiftEnum` |
/// | `Bool` | Boolean field |
/// | `List` | `Vec` of scalars implementing `ToValue` |
/// | `Record` | Nested struct that itself implements `Record` |
/// | `ty = "..."` | Kind given as a string, for names that are keywords (`ty = "enum"`) |
/// | `skip` | Exclude this field |
/// | `rename = "..."` | Member name used for path resolution |
///
/// Without a kind annotation, `String`, `&'static str`, `bool`, numeric
/// primitives, `Timestamp` and `SystemTime` fields are picked up
/// automatically, as are `Vec`s of those scalars other than `SystemTime`.
/// Any other field, `Vec<Office>` included, is left out. `Option<T>` fields
/// read as absent when `None`.
///
/// # Generated Code
///
/// 1. Field name constants (e.g. `Task::CREATED_AT`)
/// 2. `impl sift::Record` returning a static `TypeDescriptor`
///
/// Generic structs are rejected, lifetime parameters included: a record
/// must be `'static`, so borrowed string fields are `&'static str`.
///
/// # Example
///
/// ```ignore
/// use sift::{Record, RecordSliceExt, SortDirection};
///
/// #[derive(Record)]
/// struct Address {
///     city: String,
/// }
///
/// #[derive(Record)]
/// struct User {
///     name: String,
///     #[sift(Record)]
///     address: Address,
///     #[sift(Record)]
///     previous: Option<Address>,
///     #[sift(skip)]
///     password_hash: String,
/// }
///
/// let users: Vec<User> = load();
/// let by_city = users.order_by("Address.City", SortDirection::Asc)?;
/// let named = users.where_eq(User::NAME, "alice")?;
/// ```
#[proc_macro_derive(Record, attributes(sift))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
