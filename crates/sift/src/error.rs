//! Error types for the sift crate.

use thiserror::Error;

/// Errors that can occur when resolving field paths or composing
/// orderings and filters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SiftError {
    /// A path segment matched no member under any naming variant.
    ///
    /// `type_name` is the type being searched when the segment failed, which
    /// for nested paths is the intermediate type rather than the root.
    #[error("field '{segment}' not found on type {type_name}")]
    FieldNotFound { type_name: String, segment: String },

    /// An ordering or range comparison was requested on a type without a
    /// natural order.
    #[error("values of type {type_name} have no natural ordering")]
    NotComparable { type_name: String },

    /// A multi-key sort was requested with no conditions.
    #[error("at least one sort condition is required")]
    EmptySortConditions,

    /// A multi-condition filter was requested with no conditions.
    #[error("at least one select condition is required")]
    EmptySelectConditions,

    /// The field path could not be reduced to a member-access chain.
    #[error("invalid path expression '{path}': {reason}")]
    InvalidPathExpression { path: String, reason: &'static str },

    /// Comparison is not meaningful for the field's value type.
    #[error("comparison '{compare}' is not valid for {value_type} values")]
    InvalidCompareForType {
        compare: &'static str,
        value_type: &'static str,
    },

    /// Type mismatch between condition value and field value.
    #[error("type mismatch: field holds {expected}, condition supplies {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// The condition value has the wrong shape for its comparison,
    /// e.g. a `Between` without exactly two bounds.
    #[error("invalid value for '{compare}': {reason}")]
    InvalidConditionValue {
        compare: &'static str,
        reason: &'static str,
    },
}

impl SiftError {
    pub(crate) fn field_not_found(type_name: impl Into<String>, segment: &str) -> Self {
        SiftError::FieldNotFound {
            type_name: type_name.into(),
            segment: segment.to_string(),
        }
    }

    pub(crate) fn invalid_path(path: &str, reason: &'static str) -> Self {
        SiftError::InvalidPathExpression {
            path: path.to_string(),
            reason,
        }
    }
}

/// Result type for sift operations.
pub type Result<T> = std::result::Result<T, SiftError>;
