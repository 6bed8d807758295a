//! Resolution context — roots, absolute-import flag, relative level.

use std::sync::Arc;

use crate::base::FileId;

/// Value object describing how a qualified name should be resolved.
///
/// Contexts are immutable; [`ResolveContext::with_relative`] and
/// [`ResolveContext::without_roots`] return new instances. `without_roots`
/// is what the foreign-import fallback uses to broaden the search from the
/// configured root set to "anywhere reachable from this file".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveContext {
    /// Ordered search roots (project sources, installed libraries, SDK
    /// paths). Earlier roots win ties.
    roots: Arc<[FileId]>,
    /// Whether the source file opts into absolute-only imports.
    absolute_import_enabled: bool,
    /// `None` — plain absolute resolution from the roots.
    /// `Some(0)` — resolve from the source file's own directory first,
    /// then the roots (legacy relative-then-absolute semantics).
    /// `Some(n)`, n > 0 — step back `n` package levels from the source
    /// file and resolve only from there.
    relative_level: Option<u32>,
}

impl ResolveContext {
    /// Context resolving absolutely from `roots`.
    pub fn from_roots(roots: impl Into<Arc<[FileId]>>) -> Self {
        Self {
            roots: roots.into(),
            absolute_import_enabled: true,
            relative_level: None,
        }
    }

    /// A copy with the given relative step-back level.
    pub fn with_relative(&self, level: u32) -> Self {
        Self {
            relative_level: Some(level),
            ..self.clone()
        }
    }

    /// A copy with the root set cleared.
    pub fn without_roots(&self) -> Self {
        Self {
            roots: Arc::from([]),
            ..self.clone()
        }
    }

    /// A copy with the absolute-import flag set.
    pub fn with_absolute_import(&self, enabled: bool) -> Self {
        Self {
            absolute_import_enabled: enabled,
            ..self.clone()
        }
    }

    pub fn roots(&self) -> &[FileId] {
        &self.roots
    }

    pub fn absolute_import_enabled(&self) -> bool {
        self.absolute_import_enabled
    }

    pub fn relative_level(&self) -> Option<u32> {
        self.relative_level
    }
}
