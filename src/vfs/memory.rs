//! In-memory project filesystem.

use indexmap::IndexMap;
use parking_lot::RwLock;
use smol_str::SmolStr;

use crate::base::FileId;
use super::ProjectFs;

/// An in-memory tree implementing [`ProjectFs`].
///
/// Hosts use it by mirroring their project layout into it up front; tests
/// use it to build fixture trees without touching the disk.
///
/// The tree can simulate a case-insensitive filesystem: with
/// [`MemoryFs::case_insensitive`], child lookup falls back to
/// case-folded matching and hands back the differently-cased node, the way
/// a Windows or macOS VFS would. Resolution stays case-sensitive on top of
/// that because the resolver re-checks the returned node's real name.
#[derive(Debug)]
pub struct MemoryFs {
    inner: RwLock<MemoryFsInner>,
    case_fold_lookup: bool,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct MemoryFsInner {
    /// All nodes, indexed by FileId. Node 0 is the root directory.
    nodes: Vec<NodeData>,
}

#[derive(Debug)]
struct NodeData {
    name: SmolStr,
    parent: Option<FileId>,
    is_dir: bool,
    /// Children by exact name. IndexMap keeps insertion order stable for
    /// deterministic iteration in dumps and tests.
    children: IndexMap<SmolStr, FileId>,
    /// Canonical counterpart for editor-transient views.
    original: Option<FileId>,
    /// Cleared by [`MemoryFs::remove`]; dead nodes answer no queries.
    alive: bool,
}

impl NodeData {
    fn new(name: SmolStr, parent: Option<FileId>, is_dir: bool) -> Self {
        Self {
            name,
            parent,
            is_dir,
            children: IndexMap::new(),
            original: None,
            alive: true,
        }
    }
}

impl MemoryFs {
    /// Create an empty tree with a root directory.
    pub fn new() -> Self {
        Self::with_case_fold(false)
    }

    /// Create a tree whose child lookup simulates a case-insensitive
    /// filesystem.
    pub fn case_insensitive() -> Self {
        Self::with_case_fold(true)
    }

    fn with_case_fold(case_fold_lookup: bool) -> Self {
        let fs = Self {
            inner: RwLock::new(MemoryFsInner::default()),
            case_fold_lookup,
        };
        fs.inner
            .write()
            .nodes
            .push(NodeData::new(SmolStr::default(), None, true));
        fs
    }

    /// The root directory.
    pub fn root(&self) -> FileId {
        FileId::new(0)
    }

    /// Add a subdirectory under `parent`, returning its id.
    ///
    /// Adding a name that already exists returns the existing node.
    pub fn add_dir(&self, parent: FileId, name: &str) -> FileId {
        self.add_node(parent, name, true)
    }

    /// Add a file under `parent`, returning its id.
    ///
    /// Adding a name that already exists returns the existing node.
    pub fn add_file(&self, parent: FileId, name: &str) -> FileId {
        self.add_node(parent, name, false)
    }

    fn add_node(&self, parent: FileId, name: &str, is_dir: bool) -> FileId {
        let mut inner = self.inner.write();
        if let Some(node) = inner.nodes.get(parent.index() as usize) {
            if let Some(&existing) = node.children.get(name) {
                return existing;
            }
        }

        let id = FileId::new(inner.nodes.len() as u32);
        inner
            .nodes
            .push(NodeData::new(SmolStr::new(name), Some(parent), is_dir));
        if let Some(node) = inner.nodes.get_mut(parent.index() as usize) {
            node.children.insert(SmolStr::new(name), id);
        }
        id
    }

    /// Remove a node, detaching it from its parent.
    ///
    /// The id stays allocated; any handle to it becomes stale and
    /// [`ProjectFs::exists`] answers `false` from now on.
    pub fn remove(&self, node: FileId) {
        let mut inner = self.inner.write();
        let Some(data) = inner.nodes.get_mut(node.index() as usize) else {
            return;
        };
        data.alive = false;
        let name = data.name.clone();
        let parent = data.parent.take();
        if let Some(parent) = parent {
            if let Some(parent_data) = inner.nodes.get_mut(parent.index() as usize) {
                parent_data.children.shift_remove(&name);
            }
        }
    }

    /// Register `view` as an editor-transient copy of `canonical`.
    pub fn set_original(&self, view: FileId, canonical: FileId) {
        let mut inner = self.inner.write();
        if let Some(data) = inner.nodes.get_mut(view.index() as usize) {
            data.original = Some(canonical);
        }
    }

    fn child_named(&self, dir: FileId, name: &str, want_dir: bool) -> Option<FileId> {
        let inner = self.inner.read();
        let node = inner.nodes.get(dir.index() as usize)?;
        if !node.alive || !node.is_dir {
            return None;
        }

        let hit = node.children.get(name).copied().or_else(|| {
            if !self.case_fold_lookup {
                return None;
            }
            node.children
                .iter()
                .find(|(child_name, _)| child_name.eq_ignore_ascii_case(name))
                .map(|(_, &id)| id)
        })?;

        let child = inner.nodes.get(hit.index() as usize)?;
        (child.alive && child.is_dir == want_dir).then_some(hit)
    }
}

impl ProjectFs for MemoryFs {
    fn exists(&self, node: FileId) -> bool {
        self.inner
            .read()
            .nodes
            .get(node.index() as usize)
            .is_some_and(|n| n.alive)
    }

    fn is_dir(&self, node: FileId) -> bool {
        self.inner
            .read()
            .nodes
            .get(node.index() as usize)
            .is_some_and(|n| n.alive && n.is_dir)
    }

    fn name(&self, node: FileId) -> Option<SmolStr> {
        let inner = self.inner.read();
        let data = inner.nodes.get(node.index() as usize)?;
        (data.alive && !data.name.is_empty()).then(|| data.name.clone())
    }

    fn parent(&self, node: FileId) -> Option<FileId> {
        let inner = self.inner.read();
        let data = inner.nodes.get(node.index() as usize)?;
        if !data.alive {
            return None;
        }
        data.parent
    }

    fn child_dir(&self, dir: FileId, name: &str) -> Option<FileId> {
        self.child_named(dir, name, true)
    }

    fn child_file(&self, dir: FileId, name: &str) -> Option<FileId> {
        self.child_named(dir, name, false)
    }

    fn original_file(&self, node: FileId) -> FileId {
        self.inner
            .read()
            .nodes
            .get(node.index() as usize)
            .and_then(|n| n.original)
            .unwrap_or(node)
    }
}
