//! Sift - order and filter Rust struct collections by runtime field paths.
//!
//! Sift takes sort and filter conditions expressed as field names, such as
//! `"CreatedAt"` or `"address.city"`, and applies them to typed records
//! without per-type comparator code. It supports:
//!
//! - Dotted paths into nested records
//! - Tolerant naming: `CreatedAt`, `created_at` and `created-at` resolve to
//!   the same member
//! - Cached path resolution, shared safely across threads
//! - Multi-key ordering with explicit priorities and stable tie-breaking
//! - Ten comparison kinds, ANDed across conditions
//! - Eager evaluation over slices, or lazy plans handed to a query provider
//!
//! # Quick Start
//!
//! ```rust
//! use sift::{Record, RecordSliceExt, SelectCompare, SortCondition};
//!
//! #[derive(Record)]
//! struct Address {
//!     city: String,
//! }
//!
//! #[derive(Record)]
//! struct Person {
//!     id: u32,
//!     name: String,
//!     #[sift(Record)]
//!     address: Address,
//! }
//!
//! let people = vec![
//!     Person { id: 2, name: "Alice".into(), address: Address { city: "Paris".into() } },
//!     Person { id: 5, name: "Bob".into(), address: Address { city: "Berlin".into() } },
//!     Person { id: 8, name: "Alice".into(), address: Address { city: "Rome".into() } },
//! ];
//!
//! let sorted = people
//!     .order_by_multiple(&[
//!         SortCondition::asc("Name"),
//!         SortCondition::desc("Id").with_priority(1),
//!     ])
//!     .unwrap();
//! let ids: Vec<u32> = sorted.iter().map(|p| p.id).collect();
//! assert_eq!(ids, [8, 2, 5]);
//!
//! let outside_paris = people
//!     .where_by("address.city", "Paris", SelectCompare::NotEqual)
//!     .unwrap();
//! assert_eq!(outside_paris.len(), 2);
//! ```
//!
//! # Comparisons
//!
//! | Compare | Field kinds |
//! |---------|-------------|
//! | `Equal`, `NotEqual`, `InWithEqual` | String, Number, Timestamp, Enum, Bool |
//! | `Greater`, `GreaterEqual`, `Less`, `LessEqual`, `Between` | String, Number, Timestamp, Enum, Bool |
//! | `Contains`, `InWithContains` | String (substring), List (element) |
//!
//! An absent field value (`Option::None`, or a path through an absent
//! nested record) never matches a condition and sorts last in ascending
//! order.
//!
//! # Eager and lazy
//!
//! [`SortComposer`] and [`FilterComposer`] work on borrowed records and take
//! an explicit [`AccessorCache`]; [`RecordSliceExt`] is the same API on
//! `[T]` backed by [`AccessorCache::global`]. [`Query`] builds a symbolic
//! [`QueryPlan`] for a [`QueryProvider`] and evaluates nothing until
//! [`Query::execute`].

mod cache;
mod compare;
mod condition;
mod descriptor;
mod error;
mod ext;
mod filter;
mod naming;
mod ordering;
mod path;
mod query;
mod sort;
mod value;

#[cfg(test)]
mod testing;

// Re-export public API
pub use cache::{AccessorCache, CacheStats};
pub use compare::SelectCompare;
pub use condition::{CompiledCondition, ConditionValue, SelectCondition};
pub use descriptor::{FieldKind, Member, ReadFn, Record, SiftEnum, SiftTimestamp, TypeDescriptor};
pub use error::{Result, SiftError};
pub use ext::{RecordSliceExt, WhereIf, WhereIfExt, WhereIfIndexed};
pub use filter::{FilterComposer, Predicate};
pub use naming::{resolve_member, NameVariant};
pub use ordering::{compare_values, prioritized, sort_values, SortCondition, SortDirection};
pub use path::{AccessorPlan, FieldExpr, FieldPath, PathResolver};
pub use query::{
    FilterExpr, MemoryProvider, OrderExpr, Ordered, Query, QueryPlan, QueryProvider, Unordered,
};
pub use sort::{compare_by_keys, SortComposer, SortKey, Sorted};
pub use value::{Number, Timestamp, ToValue, Value, ValueKind};

#[cfg(feature = "derive")]
pub use sift_macros::Record;
