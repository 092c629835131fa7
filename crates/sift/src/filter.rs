//! Filtering record collections by select conditions.
//!
//! Conditions are compiled once per call against the resolved field kind
//! (see [`CompiledCondition`]) and then evaluated per record. Multiple
//! conditions are ANDed in the order given, short-circuiting on the first
//! miss.

use std::fmt;
use std::marker::PhantomData;

use crate::cache::AccessorCache;
use crate::compare::SelectCompare;
use crate::condition::{CompiledCondition, ConditionValue, SelectCondition};
use crate::descriptor::Record;
use crate::error::{Result, SiftError};
use crate::path::PathResolver;

/// Compiled conjunction of select conditions over records of type `T`.
pub struct Predicate<T> {
    conditions: Vec<CompiledCondition>,
    _record: PhantomData<fn(&T)>,
}

impl<T: Record> Predicate<T> {
    /// Returns `true` if every condition matches `record`.
    pub fn matches(&self, record: &T) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }

    pub fn conditions(&self) -> &[CompiledCondition] {
        &self.conditions
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Predicate {
            conditions: self.conditions.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("conditions", &self.conditions)
            .finish()
    }
}

/// Builds and applies filters through a [`PathResolver`].
#[derive(Debug, Clone, Copy)]
pub struct FilterComposer<'c> {
    resolver: PathResolver<'c>,
}

impl<'c> FilterComposer<'c> {
    pub fn new(cache: &'c AccessorCache) -> Self {
        FilterComposer {
            resolver: PathResolver::new(cache),
        }
    }

    /// Composer backed by the process-wide cache.
    pub fn global() -> FilterComposer<'static> {
        FilterComposer {
            resolver: PathResolver::global(),
        }
    }

    pub fn resolver(&self) -> PathResolver<'c> {
        self.resolver
    }

    /// Resolves the condition's field on `T` and checks it against the
    /// field kind.
    pub fn compile<T: Record>(&self, condition: &SelectCondition) -> Result<CompiledCondition> {
        let plan = self.resolver.get_accessor::<T>(&condition.field)?;
        CompiledCondition::compile(plan, condition.compare, &condition.value)
    }

    /// Compiles all `conditions` into one predicate.
    ///
    /// Nothing is returned unless every condition compiles.
    pub fn predicate<T: Record>(&self, conditions: &[SelectCondition]) -> Result<Predicate<T>> {
        if conditions.is_empty() {
            return Err(SiftError::EmptySelectConditions);
        }
        let conditions = conditions
            .iter()
            .map(|condition| self.compile::<T>(condition))
            .collect::<Result<Vec<_>>>()?;
        Ok(Predicate {
            conditions,
            _record: PhantomData,
        })
    }

    /// Keeps the records whose `field` satisfies `compare` against `value`.
    pub fn where_by<'a, T, I>(
        &self,
        source: I,
        field: &str,
        value: impl Into<ConditionValue>,
        compare: SelectCompare,
    ) -> Result<Vec<&'a T>>
    where
        T: Record,
        I: IntoIterator<Item = &'a T>,
    {
        self.where_multiple(source, &[SelectCondition::new(field, value, compare)])
    }

    /// Shorthand for [`where_by`](Self::where_by) with [`SelectCompare::Equal`].
    pub fn where_eq<'a, T, I>(
        &self,
        source: I,
        field: &str,
        value: impl Into<ConditionValue>,
    ) -> Result<Vec<&'a T>>
    where
        T: Record,
        I: IntoIterator<Item = &'a T>,
    {
        self.where_by(source, field, value, SelectCompare::Equal)
    }

    /// Keeps the records matching every condition, in source order.
    pub fn where_multiple<'a, T, I>(
        &self,
        source: I,
        conditions: &[SelectCondition],
    ) -> Result<Vec<&'a T>>
    where
        T: Record,
        I: IntoIterator<Item = &'a T>,
    {
        let predicate = self.predicate::<T>(conditions)?;
        tracing::trace!(
            record = T::descriptor().name(),
            conditions = predicate.len(),
            "applying filter"
        );
        Ok(source
            .into_iter()
            .filter(|record| predicate.matches(record))
            .collect())
    }
}
