//! Field-path parsing and resolution into accessor plans.
//!
//! A dotted path such as `"Address.City"` is resolved one segment at a time
//! against the type reached so far. The result is an [`AccessorPlan`]: the
//! root descriptor plus the ordered member steps. A plan can be used in two
//! forms:
//!
//! - **compiled**: [`AccessorPlan::read`] walks the steps over an in-memory
//!   record and returns the [`Value`] at the end of the path;
//! - **symbolic**: [`AccessorPlan::expr`] yields a [`FieldExpr`] naming the
//!   record type and canonical member names, which a query provider can
//!   translate without the engine evaluating anything.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::cache::AccessorCache;
use crate::descriptor::{FieldKind, Member, Record, TypeDescriptor};
use crate::error::{Result, SiftError};
use crate::naming::resolve_member;
use crate::value::{Value, ValueKind};

/// A parsed dotted path: non-empty, with no empty segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath<'p> {
    raw: &'p str,
    segments: Vec<&'p str>,
}

impl<'p> FieldPath<'p> {
    /// Splits `raw` on `.`.
    ///
    /// Fails with [`SiftError::InvalidPathExpression`] for an empty path or
    /// an empty segment (`"a..b"`, `".a"`, `"a."`).
    pub fn parse(raw: &'p str) -> Result<Self> {
        if raw.is_empty() {
            return Err(SiftError::invalid_path(raw, "path is empty"));
        }
        let segments: Vec<&str> = raw.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(SiftError::invalid_path(raw, "path contains an empty segment"));
        }
        Ok(FieldPath { raw, segments })
    }

    pub fn as_str(&self) -> &'p str {
        self.raw
    }

    pub fn segments(&self) -> &[&'p str] {
        &self.segments
    }
}

/// Resolved, reusable description of how to read a field from a record.
#[derive(Clone)]
pub struct AccessorPlan {
    root: &'static TypeDescriptor,
    steps: Vec<&'static Member>,
    leaf: &'static Member,
}

impl AccessorPlan {
    /// Resolves `path` against `root` without consulting any cache.
    pub fn resolve(root: &'static TypeDescriptor, path: &str) -> Result<Self> {
        let path = FieldPath::parse(path)?;
        let mut current = root;
        let mut steps: Vec<&'static Member> = Vec::with_capacity(path.segments().len());

        for segment in path.segments() {
            // Only nested records can be stepped into
            if let Some(previous) = steps.last() {
                current = match previous.kind().nested() {
                    Some(nested) => nested,
                    None => {
                        return Err(SiftError::field_not_found(
                            previous.kind().type_name(),
                            segment,
                        ))
                    }
                };
            }
            steps.push(resolve_member(current, segment)?);
        }

        AccessorPlan::from_steps(root, steps)
            .ok_or_else(|| SiftError::invalid_path(path.as_str(), "path is empty"))
    }

    fn from_steps(root: &'static TypeDescriptor, steps: Vec<&'static Member>) -> Option<Self> {
        let leaf = *steps.last()?;
        Some(AccessorPlan { root, steps, leaf })
    }

    /// The record type the plan reads from.
    pub fn root(&self) -> &'static TypeDescriptor {
        self.root
    }

    pub fn steps(&self) -> &[&'static Member] {
        &self.steps
    }

    /// Declared kind of the value at the end of the path.
    pub fn kind(&self) -> FieldKind {
        self.leaf.kind()
    }

    /// Reads the value at the end of the path.
    ///
    /// An absent intermediate record yields [`Value::None`].
    pub fn read<'a>(&self, record: &'a dyn Any) -> Value<'a> {
        let mut current = record;
        for member in &self.steps[..self.steps.len() - 1] {
            match member.read(current) {
                Value::Record(next) => current = next,
                _ => return Value::None,
            }
        }
        self.leaf.read(current)
    }

    /// Typed convenience over [`read`](Self::read).
    pub fn read_record<'a, T: Record>(&self, record: &'a T) -> Value<'a> {
        self.read(record)
    }

    /// Symbolic form of the plan for lazy query providers.
    pub fn expr(&self) -> FieldExpr {
        FieldExpr {
            record: self.root.name(),
            members: self.steps.iter().map(|m| m.name()).collect(),
            kind: self.kind().value_kind(),
        }
    }
}

impl fmt::Debug for AccessorPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorPlan")
            .field("root", &self.root.name())
            .field("steps", &self.steps.iter().map(|m| m.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// Symbolic member-access chain, walkable by a query provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FieldExpr {
    /// Record type the chain starts from.
    pub record: &'static str,
    /// Canonical member names, root first.
    pub members: Vec<&'static str>,
    /// Kind of the value at the end of the chain.
    #[serde(skip)]
    pub kind: ValueKind,
}

impl FieldExpr {
    /// Dotted canonical path, e.g. `address.city`.
    pub fn path(&self) -> String {
        self.members.join(".")
    }

    /// Binds this expression back to a compiled plan on `root`.
    ///
    /// Member names are matched exactly, so an expression produced from a
    /// plan always binds to an equivalent plan on the same descriptor.
    pub fn bind(&self, root: &'static TypeDescriptor) -> Result<AccessorPlan> {
        if root.name() != self.record {
            return Err(SiftError::field_not_found(root.name(), &self.path()));
        }
        let mut current = root;
        let mut steps: Vec<&'static Member> = Vec::with_capacity(self.members.len());
        for name in &self.members {
            if let Some(previous) = steps.last() {
                current = previous
                    .kind()
                    .nested()
                    .ok_or_else(|| SiftError::field_not_found(previous.kind().type_name(), name))?;
            }
            let member = current
                .member(name)
                .ok_or_else(|| SiftError::field_not_found(current.name(), name))?;
            steps.push(member);
        }
        AccessorPlan::from_steps(root, steps)
            .ok_or_else(|| SiftError::invalid_path("", "expression has no members"))
    }
}

impl fmt::Display for FieldExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.record, self.path())
    }
}

/// Resolves field paths to accessor plans through an [`AccessorCache`].
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'c> {
    cache: &'c AccessorCache,
}

impl<'c> PathResolver<'c> {
    pub fn new(cache: &'c AccessorCache) -> Self {
        PathResolver { cache }
    }

    /// Resolver backed by the process-wide cache.
    pub fn global() -> PathResolver<'static> {
        PathResolver::new(AccessorCache::global())
    }

    pub fn cache(&self) -> &'c AccessorCache {
        self.cache
    }

    /// Returns the accessor plan for `path` on `T`, resolving it on first use.
    pub fn get_accessor<T: Record>(&self, path: &str) -> Result<Arc<AccessorPlan>> {
        self.get_accessor_for(TypeId::of::<T>(), T::descriptor(), path)
    }

    /// Untyped form of [`get_accessor`](Self::get_accessor).
    pub fn get_accessor_for(
        &self,
        type_id: TypeId,
        descriptor: &'static TypeDescriptor,
        path: &str,
    ) -> Result<Arc<AccessorPlan>> {
        if let Some(plan) = self.cache.get(type_id, path) {
            tracing::trace!(record = descriptor.name(), path, "accessor cache hit");
            return Ok(plan);
        }

        let plan = AccessorPlan::resolve(descriptor, path)?;
        tracing::debug!(
            record = descriptor.name(),
            path,
            resolved = %plan.expr().path(),
            "resolved accessor plan"
        );
        Ok(self.cache.insert_if_absent(type_id, path, plan))
    }
}
