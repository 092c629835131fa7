//! Select conditions and their compiled, type-checked form.
//!
//! A [`SelectCondition`] names a field, a [`SelectCompare`] and a
//! [`ConditionValue`]. Before it can filter anything it is compiled against
//! the resolved field kind: the value is checked (and, for timestamps and
//! enums, coerced from integers) so that evaluation itself cannot fail.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::compare::SelectCompare;
use crate::descriptor::SiftEnum;
use crate::error::{Result, SiftError};
use crate::ordering::compare_values;
use crate::path::AccessorPlan;
use crate::value::{Number, Timestamp, Value, ValueKind};

/// Owned value stored in a condition.
///
/// Deserializes untagged: JSON strings, numbers, booleans, arrays and
/// `{"low": .., "high": ..}` objects map to the matching variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    String(String),
    Number(Number),
    Bool(bool),
    /// Value set for `InWithEqual` / `InWithContains`, or two bounds for
    /// `Between`.
    List(Vec<ConditionValue>),
    /// Inclusive bounds for `Between`.
    Range {
        low: Box<ConditionValue>,
        high: Box<ConditionValue>,
    },
    Timestamp(Timestamp),
    /// Enum discriminant.
    Enum(u32),
}

impl ConditionValue {
    /// Inclusive `[low, high]` range for `Between`.
    pub fn range(low: impl Into<ConditionValue>, high: impl Into<ConditionValue>) -> Self {
        ConditionValue::Range {
            low: Box::new(low.into()),
            high: Box::new(high.into()),
        }
    }

    /// Value set for the `In*` comparisons.
    pub fn set<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ConditionValue>,
    {
        ConditionValue::List(values.into_iter().map(Into::into).collect())
    }

    /// Discriminant of an enum implementing [`SiftEnum`].
    pub fn variant<E: SiftEnum>(value: &E) -> Self {
        ConditionValue::Enum(value.sift_discriminant())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ConditionValue::String(_) => "string",
            ConditionValue::Number(_) => "number",
            ConditionValue::Bool(_) => "bool",
            ConditionValue::List(_) => "list",
            ConditionValue::Range { .. } => "range",
            ConditionValue::Timestamp(_) => "timestamp",
            ConditionValue::Enum(_) => "enum",
        }
    }
}

impl From<String> for ConditionValue {
    fn from(s: String) -> Self {
        ConditionValue::String(s)
    }
}

impl From<&str> for ConditionValue {
    fn from(s: &str) -> Self {
        ConditionValue::String(s.to_string())
    }
}

impl From<bool> for ConditionValue {
    fn from(b: bool) -> Self {
        ConditionValue::Bool(b)
    }
}

impl From<Number> for ConditionValue {
    fn from(n: Number) -> Self {
        ConditionValue::Number(n)
    }
}

impl From<Timestamp> for ConditionValue {
    fn from(t: Timestamp) -> Self {
        ConditionValue::Timestamp(t)
    }
}

impl<V: Into<ConditionValue>> From<Vec<V>> for ConditionValue {
    fn from(values: Vec<V>) -> Self {
        ConditionValue::set(values)
    }
}

macro_rules! condition_from_number {
    ($($source:ty),*) => {
        $(
            impl From<$source> for ConditionValue {
                fn from(n: $source) -> Self {
                    ConditionValue::Number(Number::from(n))
                }
            }
        )*
    };
}

condition_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// A filter predicate on one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectCondition {
    pub field: String,
    pub value: ConditionValue,
    #[serde(default)]
    pub compare: SelectCompare,
}

impl SelectCondition {
    pub fn new(
        field: impl Into<String>,
        value: impl Into<ConditionValue>,
        compare: SelectCompare,
    ) -> Self {
        SelectCondition {
            field: field.into(),
            value: value.into(),
            compare,
        }
    }

    /// Equality condition, the default comparison.
    pub fn eq(field: impl Into<String>, value: impl Into<ConditionValue>) -> Self {
        SelectCondition::new(field, value, SelectCompare::Equal)
    }

    pub fn between(
        field: impl Into<String>,
        low: impl Into<ConditionValue>,
        high: impl Into<ConditionValue>,
    ) -> Self {
        SelectCondition::new(field, ConditionValue::range(low, high), SelectCompare::Between)
    }
}

/// Scalar operand after checking against the field kind.
#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    String(String),
    Number(Number),
    Timestamp(Timestamp),
    Enum(u32),
    Bool(bool),
}

impl Scalar {
    fn as_value(&self) -> Value<'_> {
        match self {
            Scalar::String(s) => Value::String(s),
            Scalar::Number(n) => Value::Number(*n),
            Scalar::Timestamp(t) => Value::Timestamp(*t),
            Scalar::Enum(d) => Value::Enum(*d),
            Scalar::Bool(b) => Value::Bool(*b),
        }
    }

    /// Converts a condition value to a scalar of `target` kind, or of its
    /// own kind when `target` is `None`.
    fn from_condition(value: &ConditionValue, target: Option<ValueKind>) -> Result<Scalar> {
        let mismatch = |expected: Option<ValueKind>| SiftError::TypeMismatch {
            expected: expected.map_or("scalar", ValueKind::as_str),
            actual: value.kind_name(),
        };

        let scalar = match value {
            ConditionValue::String(s) => Scalar::String(s.clone()),
            ConditionValue::Number(n) => Scalar::Number(*n),
            ConditionValue::Bool(b) => Scalar::Bool(*b),
            ConditionValue::Timestamp(t) => Scalar::Timestamp(*t),
            ConditionValue::Enum(d) => Scalar::Enum(*d),
            ConditionValue::List(_) | ConditionValue::Range { .. } => {
                return Err(mismatch(target))
            }
        };

        let Some(target) = target else {
            return Ok(scalar);
        };

        match (scalar, target) {
            (s @ Scalar::String(_), ValueKind::String)
            | (s @ Scalar::Number(_), ValueKind::Number)
            | (s @ Scalar::Timestamp(_), ValueKind::Timestamp)
            | (s @ Scalar::Enum(_), ValueKind::Enum)
            | (s @ Scalar::Bool(_), ValueKind::Bool) => Ok(s),

            // Integers stand in for epoch milliseconds and discriminants
            (Scalar::Number(n), ValueKind::Timestamp) => n
                .as_i64()
                .map(|ms| Scalar::Timestamp(Timestamp(ms)))
                .ok_or_else(|| mismatch(Some(target))),
            (Scalar::Number(n), ValueKind::Enum) => n
                .as_i64()
                .and_then(|d| u32::try_from(d).ok())
                .map(Scalar::Enum)
                .ok_or_else(|| mismatch(Some(target))),

            _ => Err(mismatch(Some(target))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Scalar(Scalar),
    Set(Vec<Scalar>),
    Range(Scalar, Scalar),
}

/// A select condition bound to an accessor plan and checked against the
/// field's kind.
#[derive(Debug, Clone)]
pub struct CompiledCondition {
    plan: Arc<AccessorPlan>,
    compare: SelectCompare,
    operand: Operand,
}

impl CompiledCondition {
    /// Checks `compare` and `value` against the kind at the end of `plan`.
    pub fn compile(
        plan: Arc<AccessorPlan>,
        compare: SelectCompare,
        value: &ConditionValue,
    ) -> Result<Self> {
        let kind = plan.kind();
        let value_kind = kind.value_kind();
        let invalid_for_kind = || SiftError::InvalidCompareForType {
            compare: compare.as_str(),
            value_type: value_kind.as_str(),
        };

        if compare.requires_ordering() && !value_kind.is_ordered() {
            return Err(SiftError::NotComparable {
                type_name: kind.type_name().to_string(),
            });
        }

        let operand = match (compare, value_kind) {
            (_, ValueKind::Record) => return Err(invalid_for_kind()),

            (SelectCompare::Contains, ValueKind::String) => {
                Operand::Scalar(Scalar::from_condition(value, Some(ValueKind::String))?)
            }
            (SelectCompare::Contains, ValueKind::List) => {
                Operand::Scalar(Scalar::from_condition(value, None)?)
            }
            (SelectCompare::InWithContains, ValueKind::String) => {
                Operand::Set(set_operand(value, compare, Some(ValueKind::String))?)
            }
            (SelectCompare::InWithContains, ValueKind::List) => {
                Operand::Set(set_operand(value, compare, None)?)
            }
            (SelectCompare::Contains | SelectCompare::InWithContains, _) => {
                return Err(invalid_for_kind())
            }

            (_, ValueKind::List) => return Err(invalid_for_kind()),

            (SelectCompare::InWithEqual, scalar) => {
                Operand::Set(set_operand(value, compare, Some(scalar))?)
            }
            (SelectCompare::Between, scalar) => {
                let (low, high) = range_bounds(value)?;
                Operand::Range(
                    Scalar::from_condition(low, Some(scalar))?,
                    Scalar::from_condition(high, Some(scalar))?,
                )
            }
            (_, scalar) => {
                if matches!(
                    value,
                    ConditionValue::List(_) | ConditionValue::Range { .. }
                ) {
                    return Err(SiftError::InvalidConditionValue {
                        compare: compare.as_str(),
                        reason: "expected a single value",
                    });
                }
                Operand::Scalar(Scalar::from_condition(value, Some(scalar))?)
            }
        };

        Ok(CompiledCondition {
            plan,
            compare,
            operand,
        })
    }

    pub fn plan(&self) -> &Arc<AccessorPlan> {
        &self.plan
    }

    pub fn compare(&self) -> SelectCompare {
        self.compare
    }

    /// Evaluates the condition against a record.
    ///
    /// An absent field value never matches.
    pub fn matches(&self, record: &dyn std::any::Any) -> bool {
        let field = self.plan.read(record);
        if field.is_none() {
            return false;
        }

        match (&self.operand, self.compare) {
            (Operand::Scalar(s), SelectCompare::Contains) => contains(&field, s),
            (Operand::Scalar(s), compare) => compare_values(&field, &s.as_value())
                .map(|ordering| compare.eval_ordering(ordering))
                .unwrap_or(false),
            (Operand::Set(set), SelectCompare::InWithContains) => {
                set.iter().any(|s| contains(&field, s))
            }
            (Operand::Set(set), _) => set.iter().any(|s| is_equal(&field, &s.as_value())),
            (Operand::Range(low, high), _) => {
                let above = compare_values(&field, &low.as_value());
                let below = compare_values(&field, &high.as_value());
                matches!(above, Some(Ordering::Greater | Ordering::Equal))
                    && matches!(below, Some(Ordering::Less | Ordering::Equal))
            }
        }
    }
}

fn is_equal(a: &Value<'_>, b: &Value<'_>) -> bool {
    compare_values(a, b) == Some(Ordering::Equal)
}

fn contains(field: &Value<'_>, needle: &Scalar) -> bool {
    match (field, needle) {
        (Value::String(haystack), Scalar::String(needle)) => haystack.contains(needle.as_str()),
        (Value::List(items), needle) => {
            let needle = needle.as_value();
            items.iter().any(|item| is_equal(item, &needle))
        }
        _ => false,
    }
}

/// A single value is accepted as a one-element set.
fn set_operand(
    value: &ConditionValue,
    compare: SelectCompare,
    kind: Option<ValueKind>,
) -> Result<Vec<Scalar>> {
    match value {
        ConditionValue::List(items) => items
            .iter()
            .map(|item| Scalar::from_condition(item, kind))
            .collect(),
        ConditionValue::Range { .. } => Err(SiftError::InvalidConditionValue {
            compare: compare.as_str(),
            reason: "expected a list of values",
        }),
        single => Ok(vec![Scalar::from_condition(single, kind)?]),
    }
}

fn range_bounds(value: &ConditionValue) -> Result<(&ConditionValue, &ConditionValue)> {
    match value {
        ConditionValue::Range { low, high } => Ok((low, high)),
        ConditionValue::List(bounds) if bounds.len() == 2 => Ok((&bounds[0], &bounds[1])),
        _ => Err(SiftError::InvalidConditionValue {
            compare: SelectCompare::Between.as_str(),
            reason: "expected exactly two bounds",
        }),
    }
}
