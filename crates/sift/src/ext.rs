//! Extension traits for slices and iterators.
//!
//! [`RecordSliceExt`] exposes the sort and filter composers directly on
//! `[T]`, resolving paths through the process-wide cache. [`WhereIfExt`]
//! adds conditional filtering to any iterator.

use crate::compare::SelectCompare;
use crate::condition::{ConditionValue, SelectCondition};
use crate::descriptor::Record;
use crate::error::Result;
use crate::filter::FilterComposer;
use crate::ordering::{SortCondition, SortDirection};
use crate::sort::{SortComposer, Sorted};

/// Ordering and filtering on slices of records.
///
/// ```
/// use sift::{Record, RecordSliceExt, SortDirection};
///
/// #[derive(Record)]
/// struct Task {
///     #[sift(Number)]
///     id: u32,
///     #[sift(String)]
///     title: String,
/// }
///
/// let tasks = vec![
///     Task { id: 2, title: "write".into() },
///     Task { id: 1, title: "plan".into() },
/// ];
///
/// let sorted = tasks.order_by("Id", SortDirection::Asc).unwrap();
/// let titles: Vec<&str> = sorted.iter().map(|t| t.title.as_str()).collect();
/// assert_eq!(titles, ["plan", "write"]);
/// ```
pub trait RecordSliceExt<T: Record> {
    fn order_by(&self, field: &str, direction: SortDirection) -> Result<Sorted<'_, T>>;

    fn order_by_condition(&self, condition: &SortCondition) -> Result<Sorted<'_, T>>;

    fn order_by_multiple(&self, conditions: &[SortCondition]) -> Result<Sorted<'_, T>>;

    fn where_by(
        &self,
        field: &str,
        value: impl Into<ConditionValue>,
        compare: SelectCompare,
    ) -> Result<Vec<&T>>;

    fn where_eq(&self, field: &str, value: impl Into<ConditionValue>) -> Result<Vec<&T>>;

    fn where_multiple(&self, conditions: &[SelectCondition]) -> Result<Vec<&T>>;
}

impl<T: Record> RecordSliceExt<T> for [T] {
    fn order_by(&self, field: &str, direction: SortDirection) -> Result<Sorted<'_, T>> {
        SortComposer::global().order_by(self, field, direction)
    }

    fn order_by_condition(&self, condition: &SortCondition) -> Result<Sorted<'_, T>> {
        SortComposer::global().order_by_condition(self, condition)
    }

    fn order_by_multiple(&self, conditions: &[SortCondition]) -> Result<Sorted<'_, T>> {
        SortComposer::global().order_by_multiple(self, conditions)
    }

    fn where_by(
        &self,
        field: &str,
        value: impl Into<ConditionValue>,
        compare: SelectCompare,
    ) -> Result<Vec<&T>> {
        FilterComposer::global().where_by(self, field, value, compare)
    }

    fn where_eq(&self, field: &str, value: impl Into<ConditionValue>) -> Result<Vec<&T>> {
        FilterComposer::global().where_eq(self, field, value)
    }

    fn where_multiple(&self, conditions: &[SelectCondition]) -> Result<Vec<&T>> {
        FilterComposer::global().where_multiple(self, conditions)
    }
}

/// Conditional filtering for iterators.
pub trait WhereIfExt: Iterator + Sized {
    /// Filters by `predicate` only when `condition` is set; otherwise every
    /// item passes and `predicate` is never called.
    fn where_if<F>(self, condition: bool, predicate: F) -> WhereIf<Self, F>
    where
        F: FnMut(&Self::Item) -> bool,
    {
        WhereIf {
            iter: self,
            predicate: condition.then_some(predicate),
        }
    }

    /// Like [`where_if`](Self::where_if), also passing each item's position
    /// in the source.
    fn where_if_indexed<F>(self, condition: bool, predicate: F) -> WhereIfIndexed<Self, F>
    where
        F: FnMut(&Self::Item, usize) -> bool,
    {
        WhereIfIndexed {
            iter: self,
            predicate: condition.then_some(predicate),
            index: 0,
        }
    }
}

impl<I: Iterator> WhereIfExt for I {}

/// Iterator returned by [`WhereIfExt::where_if`].
#[derive(Debug, Clone)]
pub struct WhereIf<I, F> {
    iter: I,
    predicate: Option<F>,
}

impl<I, F> Iterator for WhereIf<I, F>
where
    I: Iterator,
    F: FnMut(&I::Item) -> bool,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        match &mut self.predicate {
            Some(predicate) => self.iter.find(|item| predicate(item)),
            None => self.iter.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.iter.size_hint();
        match self.predicate {
            Some(_) => (0, upper),
            None => (lower, upper),
        }
    }
}

/// Iterator returned by [`WhereIfExt::where_if_indexed`].
#[derive(Debug, Clone)]
pub struct WhereIfIndexed<I, F> {
    iter: I,
    predicate: Option<F>,
    index: usize,
}

impl<I, F> Iterator for WhereIfIndexed<I, F>
where
    I: Iterator,
    F: FnMut(&I::Item, usize) -> bool,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        let Some(predicate) = &mut self.predicate else {
            return self.iter.next();
        };
        for item in self.iter.by_ref() {
            let index = self.index;
            self.index += 1;
            if predicate(&item, index) {
                return Some(item);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.iter.size_hint();
        match self.predicate {
            Some(_) => (0, upper),
            None => (lower, upper),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ids, people, Person};
    use std::cell::Cell;

    #[test]
    fn slice_order_by() {
        let source = vec![Person::new(2, "Bob", "Rome"), Person::new(1, "Alice", "Oslo")];
        let sorted = source.order_by("name", SortDirection::Asc).unwrap();
        assert_eq!(ids(sorted), [1, 2]);
    }

    #[test]
    fn slice_where_eq() {
        let source = people();
        let bobs = source.where_eq("Name", "Bob").unwrap();
        assert_eq!(ids(bobs), [5, 1]);
    }

    #[test]
    fn where_if_false_never_calls_predicate() {
        let calls = Cell::new(0);
        let result: Vec<i32> = vec![1, 2, 3]
            .into_iter()
            .where_if(false, |_| {
                calls.set(calls.get() + 1);
                false
            })
            .collect();
        assert_eq!(result, [1, 2, 3]);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn where_if_true_filters() {
        let result: Vec<i32> = (1..=6).where_if(true, |n| n % 2 == 0).collect();
        assert_eq!(result, [2, 4, 6]);
    }

    #[test]
    fn where_if_indexed_passes_source_position() {
        let result: Vec<char> = "abcdef"
            .chars()
            .where_if_indexed(true, |_, index| index % 3 == 0)
            .collect();
        assert_eq!(result, ['a', 'd']);

        let untouched: Vec<char> = "abc".chars().where_if_indexed(false, |_, _| false).collect();
        assert_eq!(untouched, ['a', 'b', 'c']);
    }

    #[test]
    fn where_if_on_records() {
        let source = people();
        let only_active = true;
        let active: Vec<&Person> = source.iter().where_if(only_active, |p| p.active).collect();
        assert_eq!(ids(active), [5, 1, 3]);
    }
}
