//! Multi-key sorting of record collections by field paths.
//!
//! [`SortComposer`] resolves the first key and produces a [`Sorted`] view;
//! [`Sorted::then_by`] adds secondary keys. Every step is a stable sort with
//! the composite comparator of all keys so far, so records that tie on every
//! key keep their source order.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::cache::AccessorCache;
use crate::descriptor::Record;
use crate::error::{Result, SiftError};
use crate::ordering::{prioritized, sort_values, SortCondition, SortDirection};
use crate::path::{AccessorPlan, PathResolver};

/// A resolved sort key: accessor plan plus direction.
#[derive(Debug, Clone)]
pub struct SortKey {
    plan: Arc<AccessorPlan>,
    direction: SortDirection,
}

impl SortKey {
    /// Fails with [`SiftError::NotComparable`] when the field has no
    /// natural ordering.
    pub fn new(plan: Arc<AccessorPlan>, direction: SortDirection) -> Result<Self> {
        let kind = plan.kind();
        if !kind.value_kind().is_ordered() {
            return Err(SiftError::NotComparable {
                type_name: kind.type_name().to_string(),
            });
        }
        Ok(SortKey { plan, direction })
    }

    pub fn plan(&self) -> &Arc<AccessorPlan> {
        &self.plan
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Compares two records on this key.
    ///
    /// NaN and then absent values sort after present ones before the
    /// direction is applied.
    pub fn compare(&self, a: &dyn Any, b: &dyn Any) -> Ordering {
        let ordering = sort_values(&self.plan.read(a), &self.plan.read(b));
        self.direction.apply(ordering)
    }
}

/// Compares two records on each key in turn until one differs.
pub fn compare_by_keys(keys: &[SortKey], a: &dyn Any, b: &dyn Any) -> Ordering {
    for key in keys {
        let ordering = key.compare(a, b);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// An ordered view over borrowed records.
pub struct Sorted<'a, T> {
    items: Vec<&'a T>,
    keys: Vec<SortKey>,
    resolver: PathResolver<'a>,
}

impl<'a, T: Record> Sorted<'a, T> {
    fn sort(mut items: Vec<&'a T>, keys: Vec<SortKey>, resolver: PathResolver<'a>) -> Self {
        tracing::trace!(
            record = T::descriptor().name(),
            keys = keys.len(),
            items = items.len(),
            "sorting records"
        );
        items.sort_by(|a, b| compare_by_keys(&keys, *a, *b));
        Sorted {
            items,
            keys,
            resolver,
        }
    }

    /// Adds a secondary key, refining the order of records that tie on all
    /// earlier keys.
    pub fn then_by(self, field: &str, direction: SortDirection) -> Result<Self> {
        let plan = self.resolver.get_accessor::<T>(field)?;
        let key = SortKey::new(plan, direction)?;
        let Sorted {
            items,
            mut keys,
            resolver,
        } = self;
        keys.push(key);
        Ok(Sorted::sort(items, keys, resolver))
    }

    pub fn then_by_condition(self, condition: &SortCondition) -> Result<Self> {
        self.then_by(&condition.field, condition.direction)
    }
}

impl<'a, T> Sorted<'a, T> {
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[&'a T] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a T> + '_ {
        self.items.iter().copied()
    }

    /// Returns one page of the ordered records.
    ///
    /// `index` is 1-based; 0 is treated as the first page.
    pub fn page(&self, index: usize, size: usize) -> Vec<&'a T> {
        let start = index.max(1).saturating_sub(1).saturating_mul(size);
        self.items.iter().skip(start).take(size).copied().collect()
    }

    pub fn into_vec(self) -> Vec<&'a T> {
        self.items
    }
}

impl<'a, T> IntoIterator for Sorted<'a, T> {
    type Item = &'a T;
    type IntoIter = std::vec::IntoIter<&'a T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<T> fmt::Debug for Sorted<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sorted")
            .field("len", &self.items.len())
            .field("keys", &self.keys)
            .finish()
    }
}

/// Builds ordered views through a [`PathResolver`].
#[derive(Debug, Clone, Copy)]
pub struct SortComposer<'c> {
    resolver: PathResolver<'c>,
}

impl<'c> SortComposer<'c> {
    pub fn new(cache: &'c AccessorCache) -> Self {
        SortComposer {
            resolver: PathResolver::new(cache),
        }
    }

    /// Composer backed by the process-wide cache.
    pub fn global() -> SortComposer<'static> {
        SortComposer {
            resolver: PathResolver::global(),
        }
    }

    pub fn resolver(&self) -> PathResolver<'c> {
        self.resolver
    }

    /// Resolves `field` on `T` into a sort key.
    pub fn key<T: Record>(&self, field: &str, direction: SortDirection) -> Result<SortKey> {
        let plan = self.resolver.get_accessor::<T>(field)?;
        SortKey::new(plan, direction)
    }

    /// Orders `source` by a single primary key.
    pub fn order_by<'a, T, I>(
        &self,
        source: I,
        field: &str,
        direction: SortDirection,
    ) -> Result<Sorted<'a, T>>
    where
        'c: 'a,
        T: Record,
        I: IntoIterator<Item = &'a T>,
    {
        let key = self.key::<T>(field, direction)?;
        Ok(Sorted::sort(
            source.into_iter().collect(),
            vec![key],
            self.resolver,
        ))
    }

    pub fn order_by_condition<'a, T, I>(
        &self,
        source: I,
        condition: &SortCondition,
    ) -> Result<Sorted<'a, T>>
    where
        'c: 'a,
        T: Record,
        I: IntoIterator<Item = &'a T>,
    {
        self.order_by(source, &condition.field, condition.direction)
    }

    /// Adds a secondary key to an existing ordering.
    pub fn then_by<'a, T: Record>(
        &self,
        sorted: Sorted<'a, T>,
        field: &str,
        direction: SortDirection,
    ) -> Result<Sorted<'a, T>> {
        sorted.then_by(field, direction)
    }

    /// Orders `source` by every condition, lowest priority first.
    ///
    /// All keys are resolved before anything is sorted, so a bad field in
    /// any condition fails the whole call.
    pub fn order_by_multiple<'a, T, I>(
        &self,
        source: I,
        conditions: &[SortCondition],
    ) -> Result<Sorted<'a, T>>
    where
        'c: 'a,
        T: Record,
        I: IntoIterator<Item = &'a T>,
    {
        let keys = prioritized(conditions)?
            .into_iter()
            .map(|condition| self.key::<T>(&condition.field, condition.direction))
            .collect::<Result<Vec<_>>>()?;
        Ok(Sorted::sort(source.into_iter().collect(), keys, self.resolver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ids, people, Address, Person};

    #[test]
    fn order_by_name_both_directions() {
        let cache = AccessorCache::new();
        let sort = SortComposer::new(&cache);
        let source = vec![Person::new(2, "Bob", "Rome"), Person::new(1, "Alice", "Oslo")];

        let asc = sort.order_by(&source, "Name", SortDirection::Asc).unwrap();
        assert_eq!(ids(asc), [1, 2]);

        let desc = sort.order_by(&source, "Name", SortDirection::Desc).unwrap();
        assert_eq!(ids(desc), [2, 1]);
    }

    #[test]
    fn then_by_refines_ties() {
        let cache = AccessorCache::new();
        let sort = SortComposer::new(&cache);
        let source = people();

        let sorted = sort
            .order_by(&source, "Name", SortDirection::Asc)
            .unwrap()
            .then_by("Id", SortDirection::Desc)
            .unwrap();
        assert_eq!(ids(sorted), [8, 3, 2, 5, 1]);
    }

    #[test]
    fn order_by_multiple_uses_priority_not_position() {
        let cache = AccessorCache::new();
        let sort = SortComposer::new(&cache);
        let source = people();

        let sorted = sort
            .order_by_multiple(
                &source,
                &[
                    SortCondition::desc("Id").with_priority(1),
                    SortCondition::asc("Name").with_priority(0),
                ],
            )
            .unwrap();
        assert_eq!(ids(sorted.iter()), [8, 3, 2, 5, 1]);
        assert_eq!(sorted.keys().len(), 2);
        assert_eq!(sorted.keys()[0].direction(), SortDirection::Asc);
    }

    #[test]
    fn order_by_multiple_rejects_empty() {
        let cache = AccessorCache::new();
        let sort = SortComposer::new(&cache);
        let err = sort.order_by_multiple(&people(), &[]).unwrap_err();
        assert_eq!(err, SiftError::EmptySortConditions);
    }

    #[test]
    fn single_key_sort_is_stable() {
        let cache = AccessorCache::new();
        let sort = SortComposer::new(&cache);
        let source = people();

        let sorted = sort.order_by(&source, "name", SortDirection::Asc).unwrap();
        assert_eq!(ids(sorted), [2, 8, 3, 5, 1]);
    }

    #[test]
    fn absent_values_sort_last_ascending_and_first_descending() {
        let cache = AccessorCache::new();
        let sort = SortComposer::new(&cache);
        let mut source = people();
        source[1].nickname = Some("b".to_string());
        source[3].nickname = Some("a".to_string());

        let asc = sort.order_by(&source, "Nickname", SortDirection::Asc).unwrap();
        assert_eq!(ids(asc), [1, 5, 2, 8, 3]);

        let desc = sort.order_by(&source, "Nickname", SortDirection::Desc).unwrap();
        assert_eq!(ids(desc), [2, 8, 3, 5, 1]);
    }

    #[test]
    fn sort_by_nested_field() {
        let cache = AccessorCache::new();
        let sort = SortComposer::new(&cache);
        let source = people();
        let sorted = sort
            .order_by(&source, "Address.City", SortDirection::Asc)
            .unwrap()
            .then_by("Id", SortDirection::Asc)
            .unwrap();
        assert_eq!(ids(sorted), [5, 3, 1, 2, 8]);
    }

    #[test]
    fn unordered_kinds_are_rejected() {
        let cache = AccessorCache::new();
        let sort = SortComposer::new(&cache);
        let source = people();

        let err = sort.order_by(&source, "Tags", SortDirection::Asc).unwrap_err();
        assert_eq!(
            err,
            SiftError::NotComparable {
                type_name: "list".to_string()
            }
        );

        let err = sort.order_by(&source, "Address", SortDirection::Asc).unwrap_err();
        assert_eq!(
            err,
            SiftError::NotComparable {
                type_name: Address::descriptor().name().to_string()
            }
        );
    }

    #[test]
    fn missing_field_names_segment() {
        let cache = AccessorCache::new();
        let sort = SortComposer::new(&cache);
        let err = sort
            .order_by(&people(), "Missing.Field", SortDirection::Asc)
            .unwrap_err();
        assert_eq!(
            err,
            SiftError::FieldNotFound {
                type_name: "Person".to_string(),
                segment: "Missing".to_string(),
            }
        );
    }

    #[test]
    fn page_is_one_based() {
        let cache = AccessorCache::new();
        let sort = SortComposer::new(&cache);
        let source = people();
        let sorted = sort.order_by(&source, "Id", SortDirection::Asc).unwrap();

        assert_eq!(ids(sorted.page(1, 2)), [1, 2]);
        assert_eq!(ids(sorted.page(2, 2)), [3, 5]);
        assert_eq!(ids(sorted.page(3, 2)), [8]);
        assert_eq!(ids(sorted.page(0, 2)), [1, 2]);
        assert!(sorted.page(4, 2).is_empty());
    }
}
