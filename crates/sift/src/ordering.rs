//! Ordering types for sorting records by field paths.
//!
//! Provides [`SortDirection`], [`SortCondition`] and the value comparison
//! used by every sort in the crate.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiftError};
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending order (smallest first).
    #[default]
    #[serde(alias = "asc", alias = "ASC", alias = "Ascending")]
    Asc,
    /// Descending order (largest first).
    #[serde(alias = "desc", alias = "DESC", alias = "Descending")]
    Desc,
}

impl SortDirection {
    pub fn is_asc(self) -> bool {
        matches!(self, SortDirection::Asc)
    }

    pub fn is_desc(self) -> bool {
        matches!(self, SortDirection::Desc)
    }

    /// Applies this direction to an ordering.
    ///
    /// For `Asc`, returns the ordering unchanged.
    /// For `Desc`, reverses the ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A field to sort by, its direction, and its priority among other
/// conditions. Lower priorities are applied first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortCondition {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
    #[serde(default)]
    pub priority: i32,
}

impl SortCondition {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        SortCondition {
            field: field.into(),
            direction,
            priority: 0,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        SortCondition::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        SortCondition::new(field, SortDirection::Desc)
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Orders `conditions` by ascending priority, keeping the input order of
/// equal priorities.
///
/// An empty set is a caller error, not an identity ordering.
pub fn prioritized(conditions: &[SortCondition]) -> Result<Vec<&SortCondition>> {
    if conditions.is_empty() {
        return Err(SiftError::EmptySortConditions);
    }
    let mut ordered: Vec<&SortCondition> = conditions.iter().collect();
    ordered.sort_by_key(|c| c.priority);
    Ok(ordered)
}

/// Compares two values of the same kind.
///
/// Returns `None` if the kinds don't match or comparison is not possible
/// (NaN, lists, records).
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.compare(*b),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        (Value::Enum(a), Value::Enum(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),

        // None values sort last
        (Value::None, Value::None) => Some(Ordering::Equal),
        (Value::None, _) => Some(Ordering::Greater),
        (_, Value::None) => Some(Ordering::Less),

        _ => None,
    }
}

/// Total order used by every sort.
///
/// Same as [`compare_values`], except NaN ranks after every number and
/// mismatched kinds tie, so the comparator stays transitive.
pub fn sort_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.sort_cmp(*b),
        _ => compare_values(a, b).unwrap_or(Ordering::Equal),
    }
}
