//! Package-hood rules and extension priority.

use smol_str::SmolStr;

use crate::base::FileId;
use crate::vfs::ProjectFs;
use super::result::Entity;

/// Host-provided predicate deciding which directories are importable.
///
/// The default rules live in [`MarkerPackagePolicy`]; hosts with
/// project-level configuration (per-root namespace-package settings,
/// language-version-dependent marker names) supply their own
/// implementation.
pub trait PackagePolicy: Send + Sync {
    /// Whether `dir` qualifies as an importable package, as seen from
    /// `containing` (the file the resolution request originated in, when
    /// known).
    fn is_package(&self, fs: &dyn ProjectFs, dir: FileId, containing: Option<FileId>) -> bool;

    /// The entity representing the package body for member lookups: the
    /// init-marker module file when present, the directory itself for a
    /// namespace package, `None` for a plain directory.
    fn package_entity(
        &self,
        fs: &dyn ProjectFs,
        dir: FileId,
        containing: Option<FileId>,
    ) -> Option<Entity>;

    /// Whether `file` is itself a package init marker.
    fn is_package_file(&self, fs: &dyn ProjectFs, file: FileId) -> bool;
}

/// Marker-file based package rules.
///
/// A directory is a package when it directly contains one of the marker
/// files (checked in order), or unconditionally when namespace packages
/// are enabled.
#[derive(Clone, Debug)]
pub struct MarkerPackagePolicy {
    markers: Vec<SmolStr>,
    namespace_packages: bool,
}

impl MarkerPackagePolicy {
    pub fn new<I>(markers: I, namespace_packages: bool) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|m| SmolStr::new(m.as_ref()))
                .collect(),
            namespace_packages,
        }
    }

    /// Enable or disable namespace packages on an existing policy.
    pub fn with_namespace_packages(mut self, enabled: bool) -> Self {
        self.namespace_packages = enabled;
        self
    }

    /// The init-marker file of `dir`, if present.
    pub fn marker_file(&self, fs: &dyn ProjectFs, dir: FileId) -> Option<FileId> {
        self.markers.iter().find_map(|marker| {
            let file = fs.child_file(dir, marker)?;
            // a case-folding filesystem may hand back a differently-cased
            // file; that one is not a marker
            (fs.name(file).as_deref() == Some(marker.as_str())).then_some(file)
        })
    }
}

impl Default for MarkerPackagePolicy {
    fn default() -> Self {
        Self::new(["__init__.py", "__init__.pyi"], false)
    }
}

impl PackagePolicy for MarkerPackagePolicy {
    fn is_package(&self, fs: &dyn ProjectFs, dir: FileId, _containing: Option<FileId>) -> bool {
        self.namespace_packages || self.marker_file(fs, dir).is_some()
    }

    fn package_entity(
        &self,
        fs: &dyn ProjectFs,
        dir: FileId,
        _containing: Option<FileId>,
    ) -> Option<Entity> {
        if let Some(marker) = self.marker_file(fs, dir) {
            return Some(Entity::Module(marker));
        }
        self.namespace_packages.then_some(Entity::Package(dir))
    }

    fn is_package_file(&self, fs: &dyn ProjectFs, file: FileId) -> bool {
        fs.name(file)
            .is_some_and(|name| self.markers.iter().any(|marker| *marker == name))
    }
}

/// Ordered set of recognized module-file extensions.
///
/// Lookup priority is fixed: the stub extension first, then the primary
/// implementation extension, then any extra registered extensions in
/// registration order. The registry is plain configuration — the actual
/// project-wide file-type registry stays with the host; this carries just
/// the ordered extension list the resolver needs.
#[derive(Clone, Debug)]
pub struct ExtensionRegistry {
    stub: SmolStr,
    primary: SmolStr,
    extra: Vec<SmolStr>,
}

impl ExtensionRegistry {
    pub fn new(stub: impl AsRef<str>, primary: impl AsRef<str>) -> Self {
        Self {
            stub: SmolStr::new(stub.as_ref()),
            primary: SmolStr::new(primary.as_ref()),
            extra: Vec::new(),
        }
    }

    /// Register an additional implementation extension. Registration order
    /// is lookup order.
    pub fn register(&mut self, ext: impl AsRef<str>) {
        self.extra.push(SmolStr::new(ext.as_ref()));
    }

    pub fn stub(&self) -> &str {
        &self.stub
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// Extensions in lookup-priority order.
    pub fn lookup_order(&self, without_stubs: bool) -> impl Iterator<Item = &SmolStr> {
        let stub = (!without_stubs).then_some(&self.stub);
        stub.into_iter()
            .chain(std::iter::once(&self.primary))
            .chain(self.extra.iter())
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new("pyi", "py")
    }
}
