//! Rated resolution results.
//!
//! A resolution produces a list of candidate entities, each carrying an
//! integer confidence rate. The list is deduplicated by entity: reaching
//! the same entity along two resolution paths keeps the most confident
//! rating ("poke" semantics) instead of appending a duplicate.

use crate::base::{FileId, MemberId};

/// Rate for a directly resolved package or module.
pub const RATE_HIGH: i32 = 1000;
/// Rate for lower-confidence hits: the wildcard-export marker, foreign
/// re-exports merged by the fallback.
pub const RATE_NORMAL: i32 = 0;
/// Floor reserved for fallback resolutions; anything at or below this is
/// treated as "effectively unresolved" when deciding whether to retry.
pub const RATE_LOW: i32 = -1000;

/// A concrete project entity a qualified name can denote.
///
/// Entities are references into externally-owned project state. The
/// resolver never mutates or destroys them; it only hands them back to the
/// caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Entity {
    /// An importable directory.
    Package(FileId),
    /// A source file.
    Module(FileId),
    /// A symbol declared inside a module.
    Member(MemberId),
}

impl Entity {
    /// The file or directory node backing this entity, when it has one.
    pub fn node(&self) -> Option<FileId> {
        match self {
            Entity::Package(dir) => Some(*dir),
            Entity::Module(file) => Some(*file),
            Entity::Member(_) => None,
        }
    }

    /// Whether this entity is a file or a directory (as opposed to a
    /// symbol inside one).
    pub fn is_file_or_dir(&self) -> bool {
        matches!(self, Entity::Package(_) | Entity::Module(_))
    }
}

/// A candidate entity with its confidence rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RatedResult {
    pub entity: Entity,
    pub rate: i32,
}

impl RatedResult {
    pub fn new(entity: Entity, rate: i32) -> Self {
        Self { entity, rate }
    }
}

/// An ordered, duplicate-free list of rated results.
///
/// Insertion order is preserved; [`ResolveResultList::sorted`] produces the
/// final ranking (descending rate, stable on ties).
#[derive(Clone, Debug, Default)]
pub struct ResolveResultList {
    results: Vec<RatedResult>,
}

impl ResolveResultList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-entry list at [`RATE_HIGH`].
    pub fn to(entity: Entity) -> Self {
        let mut list = Self::new();
        list.poke(entity, RATE_HIGH);
        list
    }

    /// Insert `entity` at `rate`, or raise an existing entry's rate to
    /// `max(old, rate)`. Never creates duplicates.
    pub fn poke(&mut self, entity: Entity, rate: i32) {
        for existing in &mut self.results {
            if existing.entity == entity {
                existing.rate = existing.rate.max(rate);
                return;
            }
        }
        self.results.push(RatedResult::new(entity, rate));
    }

    /// Poke every entry of `other` into this list.
    pub fn extend_poked<I: IntoIterator<Item = RatedResult>>(&mut self, other: I) {
        for result in other {
            self.poke(result.entity, result.rate);
        }
    }

    /// The results in insertion order.
    pub fn results(&self) -> &[RatedResult] {
        &self.results
    }

    /// Consume into the final ranking: descending by rate, ties keep
    /// insertion order.
    pub fn sorted(mut self) -> Vec<RatedResult> {
        self.results.sort_by_key(|r| std::cmp::Reverse(r.rate));
        self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl From<Vec<RatedResult>> for ResolveResultList {
    fn from(results: Vec<RatedResult>) -> Self {
        let mut list = Self::new();
        list.extend_poked(results);
        list
    }
}

impl IntoIterator for ResolveResultList {
    type Item = RatedResult;
    type IntoIter = std::vec::IntoIter<RatedResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}
