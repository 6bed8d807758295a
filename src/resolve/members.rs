//! Module member tables.
//!
//! Once a qualified name lands on a module file, its trailing components
//! resolve against the module's declared members. The member data itself
//! (functions, classes, module-level bindings, re-exports) comes from the
//! host's declaration table — typically a stub index or a parsed file —
//! behind the [`MemberTable`] trait. [`StaticMemberTable`] is the shipped
//! in-memory implementation.

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::{FileId, LocalMemberId, MemberId, QualifiedName};
use super::result::Entity;

/// Name of the explicit public-export list (`__all__`).
///
/// A member with this name resolves at `RATE_NORMAL` rather than
/// `RATE_HIGH`: the reference more likely denotes whatever the list names
/// than the list symbol itself.
pub const EXPORT_LIST_NAME: &str = "__all__";

/// One raw declaration of a name inside a module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberDecl {
    /// A symbol declared in the module body.
    Symbol {
        id: MemberId,
        /// The declaration sits inside an exception-handling construct —
        /// a control-flow-local binding the arbiter treats as unreliable.
        in_exception_handler: bool,
    },
    /// A name this module re-exports from elsewhere; `source` is the full
    /// qualified name of the re-exported target.
    Reexport { source: QualifiedName },
}

/// Host-provided member lookup for modules.
pub trait MemberTable: Send + Sync {
    /// Raw declarations of `name` inside `module`, in declaration order.
    fn members_named(&self, module: FileId, name: &str) -> Vec<MemberDecl>;

    /// The declared name of a member, for rating purposes. `None` for ids
    /// this table did not issue.
    fn member_name(&self, id: MemberId) -> Option<SmolStr>;
}

/// A member candidate during resolution, with the predicates the arbiter's
/// module-vs-directory precedence policy needs.
#[derive(Clone, Debug)]
pub(crate) struct MemberHit {
    pub(crate) entity: Entity,
    pub(crate) rate: i32,
    pub(crate) in_exception_handler: bool,
    pub(crate) is_export_list: bool,
}

impl MemberHit {
    /// Directory-based resolution is preferred over this hit when the hit
    /// is itself a file/directory reference, a control-flow-local binding,
    /// or the wildcard-export marker.
    pub(crate) fn prefer_directory(&self) -> bool {
        self.in_exception_handler || self.entity.is_file_or_dir() || self.is_export_list
    }
}

/// In-memory [`MemberTable`].
///
/// Hosts populate it per file and drop a file's members wholesale when the
/// file changes, mirroring the per-file cache invalidation granularity.
#[derive(Debug, Default)]
pub struct StaticMemberTable {
    inner: RwLock<StaticMemberTableInner>,
}

#[derive(Debug, Default)]
struct StaticMemberTableInner {
    /// module → declared name → declarations, in declaration order.
    by_module: FxHashMap<FileId, IndexMap<SmolStr, Vec<MemberDecl>>>,
    /// Reverse lookup for rating.
    names: FxHashMap<MemberId, SmolStr>,
    /// Next per-file local id.
    next_local: FxHashMap<FileId, u32>,
}

impl StaticMemberTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a symbol `name` in `module`, returning its id.
    pub fn add_symbol(&self, module: FileId, name: &str) -> MemberId {
        self.add_symbol_full(module, name, false)
    }

    /// Declare a symbol bound inside an exception handler.
    pub fn add_symbol_in_handler(&self, module: FileId, name: &str) -> MemberId {
        self.add_symbol_full(module, name, true)
    }

    fn add_symbol_full(&self, module: FileId, name: &str, in_exception_handler: bool) -> MemberId {
        let mut inner = self.inner.write();
        let local = inner.next_local.entry(module).or_default();
        let id = MemberId::new(module, LocalMemberId::new(*local));
        *local += 1;

        inner.names.insert(id, SmolStr::new(name));
        inner
            .by_module
            .entry(module)
            .or_default()
            .entry(SmolStr::new(name))
            .or_default()
            .push(MemberDecl::Symbol {
                id,
                in_exception_handler,
            });
        id
    }

    /// Declare that `module` re-exports `name` from `source`.
    pub fn add_reexport(&self, module: FileId, name: &str, source: QualifiedName) {
        let mut inner = self.inner.write();
        inner
            .by_module
            .entry(module)
            .or_default()
            .entry(SmolStr::new(name))
            .or_default()
            .push(MemberDecl::Reexport { source });
    }

    /// Drop everything declared in `module` (the file changed).
    pub fn remove_module(&self, module: FileId) {
        let mut inner = self.inner.write();
        inner.by_module.remove(&module);
        inner.names.retain(|id, _| id.file != module);
        inner.next_local.remove(&module);
    }
}

impl MemberTable for StaticMemberTable {
    fn members_named(&self, module: FileId, name: &str) -> Vec<MemberDecl> {
        self.inner
            .read()
            .by_module
            .get(&module)
            .and_then(|names| names.get(name))
            .cloned()
            .unwrap_or_default()
    }

    fn member_name(&self, id: MemberId) -> Option<SmolStr> {
        self.inner.read().names.get(&id).cloned()
    }
}
