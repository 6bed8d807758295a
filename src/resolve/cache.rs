//! Memoization of resolution results.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::base::{FileId, QualifiedName};
use super::result::RatedResult;

/// Composite cache key for one resolution request.
///
/// Equal keys must produce equal result lists for an unchanged project
/// snapshot; everything that influences resolution and can vary per
/// request is part of the key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResolutionKey {
    pub name: QualifiedName,
    /// Canonical source file (original-file dereferenced).
    pub source: FileId,
    pub absolute_import_enabled: bool,
    pub relative_level: u32,
}

impl ResolutionKey {
    pub fn new(
        name: QualifiedName,
        source: FileId,
        absolute_import_enabled: bool,
        relative_level: u32,
    ) -> Self {
        Self {
            name,
            source,
            absolute_import_enabled,
            relative_level,
        }
    }
}

/// Per-key memoization table for [`crate::resolve::ResolveEngine::resolve`].
///
/// Reads are concurrent; writes touch single entries. Invalidation is per
/// source file and removes entries outright — a cached list is never
/// updated in place. The invalidation trigger itself (file watcher, editor
/// change notification) lives with the host.
#[derive(Debug, Default)]
pub struct ResolveCache {
    map: RwLock<FxHashMap<ResolutionKey, Arc<[RatedResult]>>>,
}

impl ResolveCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached list for `key`, if present. Clones of the same `Arc` are
    /// returned until the entry is invalidated.
    pub fn get(&self, key: &ResolutionKey) -> Option<Arc<[RatedResult]>> {
        self.map.read().get(key).cloned()
    }

    pub fn insert(&self, key: ResolutionKey, results: Arc<[RatedResult]>) {
        self.map.write().insert(key, results);
    }

    /// Drop every entry whose request originated in `file`.
    pub fn invalidate_file(&self, file: FileId) {
        self.map.write().retain(|key, _| key.source != file);
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.map.write().clear();
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}
