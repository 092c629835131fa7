//! Type descriptors: the introspection backend for field-path resolution.
//!
//! A [`TypeDescriptor`] is a static table of a record type's members. Each
//! [`Member`] carries its name, the [`FieldKind`] it holds, and a reader
//! function that extracts its [`Value`] from a type-erased record.
//!
//! Descriptors are normally generated with `#[derive(Record)]`, but can be
//! written by hand:
//!
//! ```
//! use std::any::Any;
//! use sift::{FieldKind, Member, Number, Record, TypeDescriptor, Value};
//!
//! struct Task {
//!     name: String,
//!     priority: u8,
//! }
//!
//! fn read_name(record: &dyn Any) -> Value<'_> {
//!     match record.downcast_ref::<Task>() {
//!         Some(task) => Value::String(&task.name),
//!         None => Value::None,
//!     }
//! }
//!
//! fn read_priority(record: &dyn Any) -> Value<'_> {
//!     match record.downcast_ref::<Task>() {
//!         Some(task) => Value::Number(Number::from(task.priority)),
//!         None => Value::None,
//!     }
//! }
//!
//! impl Record for Task {
//!     fn descriptor() -> &'static TypeDescriptor {
//!         static DESCRIPTOR: TypeDescriptor = TypeDescriptor::new(
//!             "Task",
//!             &[
//!                 Member::new("name", FieldKind::String, read_name),
//!                 Member::new("priority", FieldKind::Number, read_priority),
//!             ],
//!         );
//!         &DESCRIPTOR
//!     }
//! }
//!
//! assert!(Task::descriptor().member("priority").is_some());
//! ```

use std::any::Any;
use std::fmt;

use crate::value::{Timestamp, Value, ValueKind};

/// Reader function stored in a [`Member`].
pub type ReadFn = for<'a> fn(&'a dyn Any) -> Value<'a>;

/// A record type whose members can be addressed by name at runtime.
pub trait Record: Any {
    /// Returns the static member table for this type.
    fn descriptor() -> &'static TypeDescriptor
    where
        Self: Sized;
}

/// Static description of a record type's addressable members.
pub struct TypeDescriptor {
    name: &'static str,
    members: &'static [Member],
}

impl TypeDescriptor {
    pub const fn new(name: &'static str, members: &'static [Member]) -> Self {
        TypeDescriptor { name, members }
    }

    /// The record type's name, used in diagnostics and symbolic plans.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn members(&self) -> &'static [Member] {
        self.members
    }

    /// Looks up a member by exact name.
    pub fn member(&self, name: &str) -> Option<&'static Member> {
        self.members.iter().find(|m| m.name == name)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("members", &self.members)
            .finish()
    }
}

/// A single addressable member of a record type.
pub struct Member {
    name: &'static str,
    kind: FieldKind,
    read: ReadFn,
}

impl Member {
    pub const fn new(name: &'static str, kind: FieldKind, read: ReadFn) -> Self {
        Member { name, kind, read }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared kind of the member's value.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Reads this member from a record.
    ///
    /// Returns [`Value::None`] when `record` is not of the owning type.
    pub fn read<'a>(&self, record: &'a dyn Any) -> Value<'a> {
        (self.read)(record)
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Declared kind of a member.
#[derive(Clone, Copy)]
pub enum FieldKind {
    String,
    Number,
    Timestamp,
    Enum,
    Bool,
    /// Sequence of scalars.
    List,
    /// Nested record; holds the nested type's descriptor.
    Record(fn() -> &'static TypeDescriptor),
}

impl FieldKind {
    pub fn value_kind(self) -> ValueKind {
        match self {
            FieldKind::String => ValueKind::String,
            FieldKind::Number => ValueKind::Number,
            FieldKind::Timestamp => ValueKind::Timestamp,
            FieldKind::Enum => ValueKind::Enum,
            FieldKind::Bool => ValueKind::Bool,
            FieldKind::List => ValueKind::List,
            FieldKind::Record(_) => ValueKind::Record,
        }
    }

    /// Returns the nested descriptor for record members.
    pub fn nested(self) -> Option<&'static TypeDescriptor> {
        match self {
            FieldKind::Record(descriptor) => Some(descriptor()),
            _ => None,
        }
    }

    /// Name of the type for diagnostics: the record name for nested
    /// records, the value kind otherwise.
    pub fn type_name(self) -> &'static str {
        match self {
            FieldKind::Record(descriptor) => descriptor().name(),
            other => other.value_kind().as_str(),
        }
    }
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Record(descriptor) => write!(f, "Record({})", descriptor().name()),
            other => write!(f, "{:?}", other.value_kind()),
        }
    }
}

/// Helper trait for converting enum types to their discriminant values.
///
/// Used by `#[derive(Record)]` for fields marked `#[sift(Enum)]`.
/// Discriminants define both equality and ordering of the field.
///
/// ```
/// use sift::SiftEnum;
///
/// #[derive(Clone, Copy)]
/// enum Status {
///     Pending,
///     Active,
/// }
///
/// impl SiftEnum for Status {
///     fn sift_discriminant(&self) -> u32 {
///         match self {
///             Status::Pending => 0,
///             Status::Active => 1,
///         }
///     }
/// }
/// ```
pub trait SiftEnum {
    fn sift_discriminant(&self) -> u32;
}

/// Helper trait for converting types to timestamps.
///
/// Used by `#[derive(Record)]` for fields marked `#[sift(Timestamp)]`.
pub trait SiftTimestamp {
    fn sift_timestamp(&self) -> Timestamp;
}

impl SiftTimestamp for i64 {
    fn sift_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self)
    }
}

impl SiftTimestamp for u64 {
    fn sift_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(i64::try_from(*self).unwrap_or(i64::MAX))
    }
}

impl SiftTimestamp for Timestamp {
    fn sift_timestamp(&self) -> Timestamp {
        *self
    }
}

impl SiftTimestamp for std::time::SystemTime {
    fn sift_timestamp(&self) -> Timestamp {
        let millis = |elapsed: std::time::Duration| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        };
        match self.duration_since(std::time::UNIX_EPOCH) {
            Ok(elapsed) => Timestamp::from_millis(millis(elapsed)),
            Err(before) => Timestamp::from_millis(-millis(before.duration())),
        }
    }
}
