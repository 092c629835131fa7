//! Naming-convention tolerant member lookup.
//!
//! A path segment is tried against a descriptor in a fixed order of
//! [`NameVariant`]s. The first exact match wins; there is no
//! case-insensitive or fuzzy fallback.

use convert_case::{Case, Casing};

use crate::descriptor::{Member, TypeDescriptor};
use crate::error::{Result, SiftError};

/// A deterministic transform applied to a segment before lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameVariant {
    /// The segment as written.
    Original,
    /// `created_at` -> `CreatedAt`
    Pascal,
    /// `CreatedAt` -> `created_at`
    Snake,
    /// `CreatedAt` -> `created-at`
    Kebab,
}

impl NameVariant {
    /// All variants in lookup order.
    pub const ORDER: [NameVariant; 4] = [
        NameVariant::Original,
        NameVariant::Pascal,
        NameVariant::Snake,
        NameVariant::Kebab,
    ];

    pub fn apply(self, segment: &str) -> String {
        match self {
            NameVariant::Original => segment.to_string(),
            NameVariant::Pascal => segment.to_case(Case::Pascal),
            NameVariant::Snake => segment.to_case(Case::Snake),
            NameVariant::Kebab => segment.to_case(Case::Kebab),
        }
    }
}

/// Resolves `segment` to a member of `descriptor`.
///
/// Fails with [`SiftError::FieldNotFound`] naming the descriptor's type when
/// no variant matches.
pub fn resolve_member(descriptor: &TypeDescriptor, segment: &str) -> Result<&'static Member> {
    for variant in NameVariant::ORDER {
        let candidate = variant.apply(segment);
        if let Some(member) = descriptor.member(&candidate) {
            if variant != NameVariant::Original {
                tracing::trace!(
                    record = descriptor.name(),
                    segment,
                    member = member.name(),
                    ?variant,
                    "matched member through naming variant"
                );
            }
            return Ok(member);
        }
    }
    Err(SiftError::field_not_found(descriptor.name(), segment))
}
