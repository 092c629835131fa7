//! Lazy queries over a [`QueryProvider`].
//!
//! A [`Query`] resolves field paths and checks conditions as it is built,
//! but only records them symbolically in a [`QueryPlan`]. Nothing touches
//! the data until [`Query::execute`] hands the plan to the provider, which
//! may evaluate it in memory ([`MemoryProvider`]) or translate it into its
//! own query language.
//!
//! # Plan semantics
//!
//! ```text
//! result = source
//!        | filter (all filters match)
//!        | order  (orderings, primary first, stable)
//!        | skip offset
//!        | take limit
//! ```
//!
//! Filters and orderings always apply before paging, whatever order the
//! builder methods were called in.
//!
//! # Ordering state
//!
//! `then_by` only exists on a query that already has a primary ordering:
//!
//! ```compile_fail
//! use sift::{MemoryProvider, Query, Record, SortDirection};
//!
//! #[derive(Clone, Record)]
//! struct Row {
//!     #[sift(Number)]
//!     id: u32,
//! }
//!
//! let provider = MemoryProvider::<Row>::new(vec![]);
//! let query = Query::new(&provider).then_by("id", SortDirection::Asc);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use crate::cache::AccessorCache;
use crate::compare::SelectCompare;
use crate::condition::{CompiledCondition, ConditionValue, SelectCondition};
use crate::descriptor::{Record, TypeDescriptor};
use crate::error::{Result, SiftError};
use crate::ordering::{prioritized, SortCondition, SortDirection};
use crate::path::{FieldExpr, PathResolver};
use crate::sort::{compare_by_keys, SortKey};

// ============================================================================
// Plan
// ============================================================================

/// A checked filter in symbolic form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterExpr {
    pub field: FieldExpr,
    pub compare: SelectCompare,
    pub value: ConditionValue,
}

impl FilterExpr {
    /// Binds the filter back to a compiled condition on `root`.
    pub fn compile(&self, root: &'static TypeDescriptor) -> Result<CompiledCondition> {
        let plan = self.field.bind(root)?;
        CompiledCondition::compile(plan.into(), self.compare, &self.value)
    }
}

/// An ordering key in symbolic form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderExpr {
    pub field: FieldExpr,
    pub direction: SortDirection,
}

impl OrderExpr {
    /// Binds the ordering back to a sort key on `root`.
    pub fn bind(&self, root: &'static TypeDescriptor) -> Result<SortKey> {
        let plan = self.field.bind(root)?;
        SortKey::new(plan.into(), self.direction)
    }
}

/// Everything a provider needs to evaluate a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    /// Record type the query runs over.
    pub record: &'static str,
    /// ANDed filters, in the order they were added.
    pub filters: Vec<FilterExpr>,
    /// Primary ordering first, then secondary keys.
    pub orderings: Vec<OrderExpr>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl QueryPlan {
    fn new(record: &'static str) -> Self {
        QueryPlan {
            record,
            filters: Vec::new(),
            orderings: Vec::new(),
            offset: 0,
            limit: None,
        }
    }

    /// Returns `true` if the plan filters, orders and pages nothing.
    pub fn is_identity(&self) -> bool {
        self.filters.is_empty()
            && self.orderings.is_empty()
            && self.offset == 0
            && self.limit.is_none()
    }
}

// ============================================================================
// Provider
// ============================================================================

/// Evaluates or translates query plans over some data source.
pub trait QueryProvider {
    /// Record type the source yields.
    type Record: Record;
    type Output;
    type Error;

    fn execute(&self, plan: &QueryPlan) -> std::result::Result<Self::Output, Self::Error>;
}

impl<P: QueryProvider + ?Sized> QueryProvider for &P {
    type Record = P::Record;
    type Output = P::Output;
    type Error = P::Error;

    fn execute(&self, plan: &QueryPlan) -> std::result::Result<Self::Output, Self::Error> {
        (**self).execute(plan)
    }
}

/// In-memory provider that evaluates plans against an owned `Vec`.
///
/// Counts executions so callers can observe that building a query did not
/// evaluate it.
#[derive(Debug)]
pub struct MemoryProvider<T> {
    items: Vec<T>,
    executions: AtomicUsize,
}

impl<T> MemoryProvider<T> {
    pub fn new(items: Vec<T>) -> Self {
        MemoryProvider {
            items,
            executions: AtomicUsize::new(0),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of plans executed so far.
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::Relaxed)
    }
}

impl<T: Record + Clone> QueryProvider for MemoryProvider<T> {
    type Record = T;
    type Output = Vec<T>;
    type Error = SiftError;

    fn execute(&self, plan: &QueryPlan) -> Result<Vec<T>> {
        self.executions.fetch_add(1, Ordering::Relaxed);
        let root = T::descriptor();

        let conditions = plan
            .filters
            .iter()
            .map(|filter| filter.compile(root))
            .collect::<Result<Vec<_>>>()?;
        let keys = plan
            .orderings
            .iter()
            .map(|ordering| ordering.bind(root))
            .collect::<Result<Vec<_>>>()?;

        let mut rows: Vec<&T> = self
            .items
            .iter()
            .filter(|item| conditions.iter().all(|c| c.matches(*item)))
            .collect();
        if !keys.is_empty() {
            rows.sort_by(|a, b| compare_by_keys(&keys, *a, *b));
        }

        tracing::trace!(
            record = plan.record,
            matched = rows.len(),
            offset = plan.offset,
            limit = ?plan.limit,
            "executed query plan in memory"
        );

        Ok(rows
            .into_iter()
            .skip(plan.offset)
            .take(plan.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }
}

// ============================================================================
// Query builder
// ============================================================================

/// Marker: the query has no ordering yet.
#[derive(Debug, Clone, Copy)]
pub struct Unordered;

/// Marker: the query has a primary ordering and accepts `then_by`.
#[derive(Debug, Clone, Copy)]
pub struct Ordered;

/// A lazily evaluated query over a provider.
pub struct Query<'c, P: QueryProvider, O = Unordered> {
    provider: P,
    resolver: PathResolver<'c>,
    plan: QueryPlan,
    _state: PhantomData<O>,
}

impl<P: QueryProvider> Query<'static, P, Unordered> {
    /// Starts a query resolving paths through the process-wide cache.
    pub fn new(provider: P) -> Self {
        Query::with_resolver(provider, PathResolver::global())
    }
}

impl<'c, P: QueryProvider> Query<'c, P, Unordered> {
    pub fn with_cache(provider: P, cache: &'c AccessorCache) -> Self {
        Query::with_resolver(provider, PathResolver::new(cache))
    }

    fn with_resolver(provider: P, resolver: PathResolver<'c>) -> Self {
        Query {
            provider,
            resolver,
            plan: QueryPlan::new(P::Record::descriptor().name()),
            _state: PhantomData,
        }
    }
}

impl<'c, P: QueryProvider, O> Query<'c, P, O> {
    fn into_state<N>(self) -> Query<'c, P, N> {
        Query {
            provider: self.provider,
            resolver: self.resolver,
            plan: self.plan,
            _state: PhantomData,
        }
    }

    fn filter_expr(&self, condition: &SelectCondition) -> Result<FilterExpr> {
        let plan = self
            .resolver
            .get_accessor::<P::Record>(&condition.field)?;
        let field = plan.expr();
        CompiledCondition::compile(plan, condition.compare, &condition.value)?;
        Ok(FilterExpr {
            field,
            compare: condition.compare,
            value: condition.value.clone(),
        })
    }

    fn order_expr(&self, field: &str, direction: SortDirection) -> Result<OrderExpr> {
        let plan = self.resolver.get_accessor::<P::Record>(field)?;
        let key = SortKey::new(plan, direction)?;
        Ok(OrderExpr {
            field: key.plan().expr(),
            direction,
        })
    }

    // ------------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------------

    /// Adds a filter on `field`.
    pub fn where_by(
        self,
        field: &str,
        value: impl Into<ConditionValue>,
        compare: SelectCompare,
    ) -> Result<Self> {
        self.where_condition(&SelectCondition::new(field, value, compare))
    }

    /// Adds an equality filter on `field`.
    pub fn where_eq(self, field: &str, value: impl Into<ConditionValue>) -> Result<Self> {
        self.where_by(field, value, SelectCompare::Equal)
    }

    pub fn where_condition(mut self, condition: &SelectCondition) -> Result<Self> {
        let filter = self.filter_expr(condition)?;
        self.plan.filters.push(filter);
        Ok(self)
    }

    /// Adds every condition, or none if any fails to resolve or check.
    pub fn where_multiple(mut self, conditions: &[SelectCondition]) -> Result<Self> {
        if conditions.is_empty() {
            return Err(SiftError::EmptySelectConditions);
        }
        let filters = conditions
            .iter()
            .map(|condition| self.filter_expr(condition))
            .collect::<Result<Vec<_>>>()?;
        self.plan.filters.extend(filters);
        Ok(self)
    }

    /// Adds `condition` only when `flag` is set.
    ///
    /// When `flag` is false the condition's path is not even resolved.
    pub fn where_if(self, flag: bool, condition: &SelectCondition) -> Result<Self> {
        if !flag {
            return Ok(self);
        }
        self.where_condition(condition)
    }

    // ------------------------------------------------------------------------
    // Ordering
    // ------------------------------------------------------------------------

    /// Orders by `field`, replacing any earlier ordering.
    pub fn order_by(self, field: &str, direction: SortDirection) -> Result<Query<'c, P, Ordered>> {
        let primary = self.order_expr(field, direction)?;
        let mut query = self.into_state::<Ordered>();
        query.plan.orderings = vec![primary];
        Ok(query)
    }

    pub fn order_by_condition(self, condition: &SortCondition) -> Result<Query<'c, P, Ordered>> {
        self.order_by(&condition.field, condition.direction)
    }

    /// Orders by every condition, lowest priority first, replacing any
    /// earlier ordering.
    pub fn order_by_multiple(
        self,
        conditions: &[SortCondition],
    ) -> Result<Query<'c, P, Ordered>> {
        let orderings = prioritized(conditions)?
            .into_iter()
            .map(|condition| self.order_expr(&condition.field, condition.direction))
            .collect::<Result<Vec<_>>>()?;
        let mut query = self.into_state::<Ordered>();
        query.plan.orderings = orderings;
        Ok(query)
    }

    // ------------------------------------------------------------------------
    // Paging
    // ------------------------------------------------------------------------

    /// Skips `n` more results.
    pub fn skip(mut self, n: usize) -> Self {
        self.plan.offset = self.plan.offset.saturating_add(n);
        self.plan.limit = self.plan.limit.map(|limit| limit.saturating_sub(n));
        self
    }

    /// Keeps at most `n` of the remaining results.
    pub fn take(mut self, n: usize) -> Self {
        self.plan.limit = Some(self.plan.limit.map_or(n, |limit| limit.min(n)));
        self
    }

    /// Restricts results to one page; `index` is 1-based, 0 means the first.
    pub fn page(self, index: usize, size: usize) -> Self {
        let start = index.max(1).saturating_sub(1).saturating_mul(size);
        self.skip(start).take(size)
    }

    // ------------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------------

    pub fn plan(&self) -> &QueryPlan {
        &self.plan
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Hands the plan to the provider.
    pub fn execute(&self) -> std::result::Result<P::Output, P::Error> {
        tracing::debug!(
            record = self.plan.record,
            filters = self.plan.filters.len(),
            orderings = self.plan.orderings.len(),
            "executing query"
        );
        self.provider.execute(&self.plan)
    }
}

impl<'c, P: QueryProvider> Query<'c, P, Ordered> {
    /// Appends a secondary ordering key.
    pub fn then_by(mut self, field: &str, direction: SortDirection) -> Result<Self> {
        let key = self.order_expr(field, direction)?;
        self.plan.orderings.push(key);
        Ok(self)
    }

    pub fn then_by_condition(self, condition: &SortCondition) -> Result<Self> {
        self.then_by(&condition.field, condition.direction)
    }
}

impl<P: QueryProvider, O> fmt::Debug for Query<'_, P, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query").field("plan", &self.plan).finish()
    }
}
