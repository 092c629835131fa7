//! Runtime value types for field comparison.
//!
//! The [`Value`] enum represents the runtime value of a field read from a
//! record through an accessor plan. Scalars borrow from the record; nested
//! records are carried as `&dyn Any` so a plan can keep walking.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Runtime value for comparison, borrowed from the source record.
#[derive(Debug, Clone)]
pub enum Value<'a> {
    /// String value (borrowed).
    String(&'a str),
    /// Numeric value.
    Number(Number),
    /// Timestamp value (milliseconds since Unix epoch).
    Timestamp(Timestamp),
    /// Enum discriminant value.
    Enum(u32),
    /// Boolean value.
    Bool(bool),
    /// Sequence of scalar values.
    List(Vec<Value<'a>>),
    /// Nested record, type-erased.
    Record(&'a dyn Any),
    /// Field absent, `Option::None`, or unreachable through an absent parent.
    None,
}

impl<'a> Value<'a> {
    /// Returns `true` if this is a `None` value.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Returns the kind of this value, or `None` for [`Value::None`].
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::String(_) => Some(ValueKind::String),
            Value::Number(_) => Some(ValueKind::Number),
            Value::Timestamp(_) => Some(ValueKind::Timestamp),
            Value::Enum(_) => Some(ValueKind::Enum),
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::List(_) => Some(ValueKind::List),
            Value::Record(_) => Some(ValueKind::Record),
            Value::None => None,
        }
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the timestamp value, if present.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Extracts the enum discriminant, if present.
    pub fn as_enum(&self) -> Option<u32> {
        match self {
            Value::Enum(d) => Some(*d),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extracts the list elements, if present.
    pub fn as_list(&self) -> Option<&[Value<'a>]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Downcasts a nested record value to a concrete type.
    pub fn as_record<T: Any>(&self) -> Option<&'a T> {
        match self {
            Value::Record(r) => r.downcast_ref::<T>(),
            _ => None,
        }
    }
}

// Numbers compare by value across variants. Nested records compare by
// identity: two values are equal only when they point at the same record.
impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.compare(*b) == Some(Ordering::Equal),
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => {
                std::ptr::eq(*a as *const dyn Any as *const (), *b as *const dyn Any as *const ())
            }
            (Value::None, Value::None) => true,
            _ => false,
        }
    }
}

/// The kind of a value, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Number,
    Timestamp,
    Enum,
    Bool,
    List,
    Record,
}

impl ValueKind {
    /// Returns `true` if values of this kind have a natural ordering.
    pub fn is_ordered(self) -> bool {
        !matches!(self, ValueKind::List | ValueKind::Record)
    }

    /// Returns the display name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Timestamp => "timestamp",
            ValueKind::Enum => "enum",
            ValueKind::Bool => "bool",
            ValueKind::List => "list",
            ValueKind::Record => "record",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric value supporting all common numeric types.
///
/// Numbers are stored in one of three variants to preserve precision:
/// - `I64` for signed integers
/// - `U64` for unsigned integers
/// - `F64` for floating point
///
/// Comparisons between different numeric types are handled by converting
/// to the appropriate common type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Returns the value as `i64` when it is an integer that fits.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Number::I64(n) => Some(n),
            Number::U64(n) => i64::try_from(n).ok(),
            Number::F64(_) => None,
        }
    }

    pub fn is_nan(self) -> bool {
        matches!(self, Number::F64(n) if n.is_nan())
    }

    /// Compares two numbers, handling mixed types.
    ///
    /// Returns `None` when either side is NaN.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),

            // Mixed integer signs compare exactly; anything with a float goes through f64
            (Number::I64(a), Number::U64(b)) => Some(compare_i64_u64(a, b)),
            (Number::U64(a), Number::I64(b)) => Some(compare_i64_u64(b, a).reverse()),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }

    /// Total order for sorting: NaN ranks after every number and equal to
    /// another NaN.
    pub fn sort_cmp(self, other: Number) -> Ordering {
        self.compare(other)
            .unwrap_or_else(|| self.is_nan().cmp(&other.is_nan()))
    }
}

fn compare_i64_u64(a: i64, b: u64) -> Ordering {
    match u64::try_from(a) {
        Ok(a) => a.cmp(&b),
        Err(_) => Ordering::Less,
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

macro_rules! number_from {
    ($variant:ident, $target:ty: $($source:ty),*) => {
        $(
            impl From<$source> for Number {
                fn from(n: $source) -> Self {
                    Number::$variant(n as $target)
                }
            }
        )*
    };
}

number_from!(I64, i64: i8, i16, i32, i64, isize);
number_from!(U64, u64: u8, u16, u32, u64, usize);
number_from!(F64, f64: f32, f64);

/// Timestamp value represented as milliseconds since Unix epoch.
///
/// Users convert from their preferred datetime type through
/// [`SiftTimestamp`](crate::SiftTimestamp).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a new timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Creates a new timestamp from seconds since Unix epoch.
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs * 1000)
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Returns the timestamp as seconds since Unix epoch.
    pub fn as_secs(self) -> i64 {
        self.0 / 1000
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Timestamp(millis)
    }
}

/// Conversion of a scalar into a borrowed [`Value`].
///
/// Used by `#[derive(Record)]` for the elements of `List` fields.
pub trait ToValue {
    fn to_value(&self) -> Value<'_>;
}

impl ToValue for String {
    fn to_value(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl ToValue for &'static str {
    fn to_value(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

impl ToValue for Timestamp {
    fn to_value(&self) -> Value<'_> {
        Value::Timestamp(*self)
    }
}

macro_rules! number_to_value {
    ($($source:ty),*) => {
        $(
            impl ToValue for $source {
                fn to_value(&self) -> Value<'_> {
                    Value::Number(Number::from(*self))
                }
            }
        )*
    };
}

number_to_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
