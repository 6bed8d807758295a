//! Project filesystem abstraction.
//!
//! The resolver never touches the disk directly. All directory and file
//! queries go through [`ProjectFs`], which the host implements on top of
//! whatever it already has (an editor VFS, an index, a plain directory
//! tree). The crate ships [`MemoryFs`], an in-memory implementation used
//! by tests and by hosts that mirror a tree up front.
//!
//! The contract is intentionally small: exact-name child lookup, parent and
//! name queries, and "original file" dereferencing for editor-transient
//! views. Implementations are expected to be fast — existence checks are
//! issued repeatedly during resolution and any memoization happens at this
//! layer, not in the resolver.

mod memory;

pub use memory::MemoryFs;

use smol_str::SmolStr;

use crate::base::FileId;

/// Host-provided view of the project's files and directories.
///
/// Lookup by name is *exact*: implementations backed by case-insensitive
/// filesystems may return a node whose real name differs in case from the
/// query, and the resolver re-checks [`ProjectFs::name`] against the
/// requested component before accepting a candidate.
pub trait ProjectFs: Send + Sync {
    /// Whether `node` still exists. A handle for which this returns `false`
    /// is stale and must not be fed back into the resolver.
    fn exists(&self, node: FileId) -> bool;

    /// Whether `node` is a directory.
    fn is_dir(&self, node: FileId) -> bool;

    /// The node's own name (last path component). `None` for unknown nodes
    /// and for the filesystem root.
    fn name(&self, node: FileId) -> Option<SmolStr>;

    /// The node's parent directory.
    fn parent(&self, node: FileId) -> Option<FileId>;

    /// Child directory of `dir` named `name`, if any.
    fn child_dir(&self, dir: FileId, name: &str) -> Option<FileId>;

    /// Child file of `dir` named `name` (full name, with extension), if any.
    fn child_file(&self, dir: FileId, name: &str) -> Option<FileId>;

    /// Dereference an editor-transient view to its canonical on-disk
    /// counterpart. Returns `node` itself when there is no such view.
    fn original_file(&self, node: FileId) -> FileId;

    /// The directory containing `node`.
    fn containing_dir(&self, node: FileId) -> Option<FileId> {
        self.parent(node)
    }
}
