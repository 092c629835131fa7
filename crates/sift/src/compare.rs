//! Comparison kinds for select conditions.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Comparison applied between a field value and a condition value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SelectCompare {
    /// Substring (strings) or element membership (lists).
    Contains,
    /// Structural equality.
    #[default]
    Equal,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    NotEqual,
    /// Field contains any element of the condition's value list.
    InWithContains,
    /// Field equals any element of the condition's value list.
    InWithEqual,
    /// Field lies within an inclusive `[low, high]` range.
    Between,
}

impl SelectCompare {
    /// Returns `true` if this comparison needs a natural ordering.
    pub fn requires_ordering(self) -> bool {
        matches!(
            self,
            SelectCompare::Greater
                | SelectCompare::GreaterEqual
                | SelectCompare::Less
                | SelectCompare::LessEqual
                | SelectCompare::Between
        )
    }

    /// Returns `true` if this comparison takes a list of values.
    pub fn takes_set(self) -> bool {
        matches!(self, SelectCompare::InWithContains | SelectCompare::InWithEqual)
    }

    /// Evaluates a comparison given the ordering of field against value.
    ///
    /// Only meaningful for `Equal`, `NotEqual` and the four ordering
    /// comparisons.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            SelectCompare::Equal => ordering == Ordering::Equal,
            SelectCompare::NotEqual => ordering != Ordering::Equal,
            SelectCompare::Greater => ordering == Ordering::Greater,
            SelectCompare::GreaterEqual => ordering != Ordering::Less,
            SelectCompare::Less => ordering == Ordering::Less,
            SelectCompare::LessEqual => ordering != Ordering::Greater,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SelectCompare::Contains => "contains",
            SelectCompare::Equal => "equal",
            SelectCompare::Greater => "greater",
            SelectCompare::GreaterEqual => "greater_equal",
            SelectCompare::Less => "less",
            SelectCompare::LessEqual => "less_equal",
            SelectCompare::NotEqual => "not_equal",
            SelectCompare::InWithContains => "in_with_contains",
            SelectCompare::InWithEqual => "in_with_equal",
            SelectCompare::Between => "between",
        }
    }
}

impl fmt::Display for SelectCompare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_requirements() {
        assert!(SelectCompare::Greater.requires_ordering());
        assert!(SelectCompare::Between.requires_ordering());
        assert!(!SelectCompare::Equal.requires_ordering());
        assert!(!SelectCompare::Contains.requires_ordering());
        assert!(SelectCompare::InWithEqual.takes_set());
        assert!(!SelectCompare::Between.takes_set());
    }

    #[test]
    fn eval_ordering() {
        assert!(SelectCompare::Equal.eval_ordering(Ordering::Equal));
        assert!(!SelectCompare::Equal.eval_ordering(Ordering::Less));
        assert!(SelectCompare::NotEqual.eval_ordering(Ordering::Greater));
        assert!(SelectCompare::Greater.eval_ordering(Ordering::Greater));
        assert!(!SelectCompare::Greater.eval_ordering(Ordering::Equal));
        assert!(SelectCompare::GreaterEqual.eval_ordering(Ordering::Equal));
        assert!(SelectCompare::Less.eval_ordering(Ordering::Less));
        assert!(SelectCompare::LessEqual.eval_ordering(Ordering::Equal));
        assert!(!SelectCompare::LessEqual.eval_ordering(Ordering::Greater));
        assert!(!SelectCompare::Contains.eval_ordering(Ordering::Equal));
    }

    #[test]
    fn display() {
        assert_eq!(SelectCompare::GreaterEqual.to_string(), "greater_equal");
        assert_eq!(SelectCompare::InWithContains.to_string(), "in_with_contains");
    }

    #[test]
    fn deserializes_variant_names() {
        let c: SelectCompare = serde_json::from_str(r#""InWithEqual""#).unwrap();
        assert_eq!(c, SelectCompare::InWithEqual);
    }
}
