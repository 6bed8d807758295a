//! The resolution engine.
//!
//! Ties the pieces together: normalizes a request into a
//! [`ResolveContext`], consults the cache, walks directories component by
//! component, resolves trailing members, rates the candidates, and caches
//! the ranked list.
//!
//! Resolution failure is not an error — an unresolvable name yields an
//! empty list, silently. The only hard failures are cancellation and stale
//! entity handles.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::base::{FileId, QualifiedName};
use crate::vfs::ProjectFs;
use super::ResolveError;
use super::cache::{ResolutionKey, ResolveCache};
use super::context::ResolveContext;
use super::guard::CycleGuard;
use super::members::{EXPORT_LIST_NAME, MemberDecl, MemberHit, MemberTable};
use super::policy::{ExtensionRegistry, PackagePolicy};
use super::rating::ResolveRater;
use super::result::{Entity, RATE_HIGH, RATE_LOW, RATE_NORMAL, RatedResult, ResolveResultList};

// ============================================================================
// CHILD RESOLUTION OPTIONS
// ============================================================================

/// Flags for one [`ResolveEngine::resolve_children`] step.
///
/// Multi-component resolution threads these unchanged through every level
/// of the descent.
#[derive(Clone, Copy, Debug)]
pub struct ChildOptions {
    /// Only file/directory results are valid; member hits are ignored.
    pub file_only: bool,
    /// Directories count only when they qualify as packages.
    pub check_for_package: bool,
    /// Skip stub files during module-file lookup.
    pub without_stubs: bool,
    /// Disable the foreign-import fallback.
    pub without_foreign: bool,
}

impl Default for ChildOptions {
    fn default() -> Self {
        Self {
            file_only: false,
            check_for_package: true,
            without_stubs: false,
            without_foreign: false,
        }
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Qualified-name resolver over a project filesystem.
///
/// The engine owns nothing but references into host state: the filesystem
/// view, the package policy, the member table, and the rater list are all
/// supplied at construction. Per-request state (the cycle guard) lives on
/// the call stack, so a single engine serves concurrent callers.
pub struct ResolveEngine {
    fs: Arc<dyn ProjectFs>,
    policy: Arc<dyn PackagePolicy>,
    extensions: ExtensionRegistry,
    members: Arc<dyn MemberTable>,
    raters: Vec<Arc<dyn ResolveRater>>,
    roots: Vec<FileId>,
    cache: ResolveCache,
    cancel: CancellationToken,
}

impl ResolveEngine {
    pub fn new(
        fs: Arc<dyn ProjectFs>,
        policy: Arc<dyn PackagePolicy>,
        extensions: ExtensionRegistry,
        members: Arc<dyn MemberTable>,
    ) -> Self {
        Self {
            fs,
            policy,
            extensions,
            members,
            raters: Vec::new(),
            roots: Vec::new(),
            cache: ResolveCache::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Set the ordered search roots (project sources, libraries, SDK).
    pub fn with_roots(mut self, roots: impl IntoIterator<Item = FileId>) -> Self {
        self.roots = roots.into_iter().collect();
        debug!(roots = self.roots.len(), "configured search roots");
        self
    }

    /// Register a rate-adjusting extension.
    pub fn with_rater(mut self, rater: Arc<dyn ResolveRater>) -> Self {
        self.raters.push(rater);
        self
    }

    /// Attach a cooperative cancellation token, polled during enumeration.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn roots(&self) -> &[FileId] {
        &self.roots
    }

    // ========================================================================
    // PUBLIC OPERATIONS
    // ========================================================================

    /// Resolve a qualified name seen in `source`.
    ///
    /// `relative_level > 0` steps back that many package levels from
    /// `source` before resolving, regardless of `absolute_import_enabled`.
    /// With `relative_level == 0` and absolute imports disabled, the
    /// source file's own directory is tried before the configured roots.
    ///
    /// Returns the ranked candidate list — possibly empty, never an error
    /// for a merely unresolvable name. Results are memoized per
    /// `(name, source, absolute, level)` until [`Self::invalidate_file`].
    pub fn resolve(
        &self,
        name: &QualifiedName,
        source: FileId,
        absolute_import_enabled: bool,
        relative_level: u32,
    ) -> Result<Arc<[RatedResult]>, ResolveError> {
        if !self.fs.exists(source) {
            return Err(ResolveError::StaleEntity(Entity::Module(source)));
        }
        let source = self.fs.original_file(source);

        let key = ResolutionKey::new(
            name.clone(),
            source,
            absolute_import_enabled,
            relative_level,
        );
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }
        trace!(%name, %source, relative_level, "resolve cache miss");

        let guard = CycleGuard::new();
        let entities =
            self.resolve_module(name, source, absolute_import_enabled, relative_level, &guard)?;
        debug_assert!(guard.is_empty(), "cycle guard leaked markers");

        let rated: Arc<[RatedResult]> = self.rate_results(entities).sorted().into();
        self.cache.insert(key, Arc::clone(&rated));
        Ok(rated)
    }

    /// The single best candidate, if any.
    pub fn resolve_best(
        &self,
        name: &QualifiedName,
        source: FileId,
        absolute_import_enabled: bool,
        relative_level: u32,
    ) -> Result<Option<Entity>, ResolveError> {
        let results = self.resolve(name, source, absolute_import_enabled, relative_level)?;
        Ok(results.first().map(|r| r.entity))
    }

    /// Resolve a single name component under `parent`.
    ///
    /// This is the primitive the qualified-name descent is built on,
    /// exposed for callers that need finer control than [`Self::resolve`].
    pub fn resolve_children(
        &self,
        parent: &Entity,
        name: &str,
        containing: Option<FileId>,
        options: ChildOptions,
    ) -> Result<Vec<RatedResult>, ResolveError> {
        let guard = CycleGuard::new();
        let containing = containing.map(|f| self.fs.original_file(f));
        self.resolve_children_guarded(parent, name, containing, options, &guard)
    }

    /// Re-rate an externally produced candidate list: every registered
    /// rater's delta is applied and duplicates are poke-merged.
    pub fn update_rated_results<I>(&self, results: I) -> ResolveResultList
    where
        I: IntoIterator<Item = RatedResult>,
    {
        let mut updated = ResolveResultList::new();
        for result in results {
            let delta: i32 = self.raters.iter().map(|r| r.rate(&result.entity)).sum();
            updated.poke(result.entity, result.rate + delta);
        }
        updated
    }

    /// The directory `depth` package levels above `file`.
    ///
    /// `depth == 0` is the containing directory. For `depth > 0` every
    /// stepped-through directory must be a package; stepping above the top
    /// package boundary yields `None`.
    pub fn step_back_from(&self, file: FileId, depth: u32) -> Option<FileId> {
        let file = self.fs.original_file(file);
        if depth == 0 {
            return self.fs.containing_dir(file);
        }
        let mut result = self.fs.containing_dir(file)?;
        let mut count = 1;
        while self.policy.is_package(&*self.fs, result, Some(file)) {
            if count >= depth {
                return Some(result);
            }
            result = self.fs.parent(result)?;
            count += 1;
        }
        None
    }

    /// Drop cached results whose request originated in `file`. Driven by
    /// the host's change-notification mechanism.
    pub fn invalidate_file(&self, file: FileId) {
        self.cache.invalidate_file(self.fs.original_file(file));
    }

    // ========================================================================
    // MODULE RESOLUTION
    // ========================================================================

    fn resolve_module(
        &self,
        name: &QualifiedName,
        source: FileId,
        absolute_import_enabled: bool,
        relative_level: u32,
        guard: &CycleGuard,
    ) -> Result<Vec<Entity>, ResolveError> {
        let marker = format!("{name}#{relative_level}");
        let Some(_entry) = guard.enter(marker) else {
            trace!(%name, relative_level, "import cycle broken");
            return Ok(Vec::new());
        };

        let initial = ResolveContext::from_roots(self.roots.as_slice())
            .with_absolute_import(absolute_import_enabled);
        let context = if relative_level > 0 {
            initial.with_relative(relative_level).without_roots()
        } else if absolute_import_enabled {
            initial
        } else {
            initial.with_relative(0)
        };
        self.resolve_with_context(name, source, &context, guard)
    }

    fn resolve_with_context(
        &self,
        name: &QualifiedName,
        source: FileId,
        context: &ResolveContext,
        guard: &CycleGuard,
    ) -> Result<Vec<Entity>, ResolveError> {
        // The empty name denotes "this module's package": meaningful only
        // relative to the source file.
        if name.is_empty() {
            return Ok(match context.relative_level() {
                Some(level) => self
                    .step_back_from(source, level)
                    .map(Entity::Package)
                    .into_iter()
                    .collect(),
                None => Vec::new(),
            });
        }

        let mut found: Vec<Entity> = Vec::new();
        for dir in self.start_dirs(source, context) {
            self.check_canceled()?;
            let mut candidates = vec![Entity::Package(dir)];
            for component in name.components() {
                let mut next: Vec<Entity> = Vec::new();
                for parent in &candidates {
                    self.check_canceled()?;
                    let children = self.resolve_children_guarded(
                        parent,
                        component,
                        Some(source),
                        ChildOptions::default(),
                        guard,
                    )?;
                    for child in children {
                        if !next.contains(&child.entity) {
                            next.push(child.entity);
                        }
                    }
                }
                candidates = next;
                if candidates.is_empty() {
                    break;
                }
            }
            for entity in candidates {
                if !found.contains(&entity) {
                    found.push(entity);
                }
            }
        }
        Ok(found)
    }

    /// Starting directories for a resolution, in priority order.
    fn start_dirs(&self, source: FileId, context: &ResolveContext) -> Vec<FileId> {
        let mut dirs: Vec<FileId> = Vec::new();
        match context.relative_level() {
            Some(level) if level > 0 => {
                if let Some(dir) = self.step_back_from(source, level) {
                    dirs.push(dir);
                }
            }
            Some(_) => {
                // relative-then-absolute: source directory first
                if let Some(dir) = self.fs.containing_dir(source) {
                    dirs.push(dir);
                }
                for &root in context.roots() {
                    if !dirs.contains(&root) {
                        dirs.push(root);
                    }
                }
            }
            None => {
                if context.roots().is_empty() {
                    // rootless context: anywhere reachable from the source
                    // file, nearest directory first
                    let mut dir = self.fs.containing_dir(source);
                    while let Some(d) = dir {
                        dirs.push(d);
                        dir = self.fs.parent(d);
                    }
                } else {
                    dirs.extend(context.roots().iter().copied());
                }
            }
        }
        dirs
    }

    // ========================================================================
    // CHILD RESOLUTION
    // ========================================================================

    fn resolve_children_guarded(
        &self,
        parent: &Entity,
        name: &str,
        containing: Option<FileId>,
        options: ChildOptions,
        guard: &CycleGuard,
    ) -> Result<Vec<RatedResult>, ResolveError> {
        if let Some(node) = parent.node() {
            if !self.fs.exists(node) {
                return Err(ResolveError::StaleEntity(*parent));
            }
        }
        match parent {
            Entity::Module(file) => {
                self.resolve_in_package_module(*file, name, containing, options, guard)
            }
            Entity::Package(_) => {
                self.resolve_in_package_directory(parent, name, containing, options, guard)
            }
            // Resolving through an opaque member would need type
            // information; that lives outside this crate.
            Entity::Member(_) => Ok(Vec::new()),
        }
    }

    /// Resolve `name` against a module file: its members first, then the
    /// sibling directory tree.
    fn resolve_in_package_module(
        &self,
        file: FileId,
        name: &str,
        containing: Option<FileId>,
        options: ChildOptions,
        guard: &CycleGuard,
    ) -> Result<Vec<RatedResult>, ResolveError> {
        let member_hits = self.resolve_module_member(file, name, guard)?;

        let mut results: Vec<RatedResult> = Vec::new();
        let mut resolved_in_module: Vec<RatedResult> = Vec::new();
        for hit in member_hits {
            if options.file_only && !hit.entity.is_file_or_dir() {
                continue;
            }
            results.push(RatedResult::new(hit.entity, hit.rate));
            if !hit.prefer_directory() {
                resolved_in_module.push(RatedResult::new(hit.entity, hit.rate));
            }
        }
        if !resolved_in_module.is_empty() {
            return Ok(resolved_in_module);
        }

        let parent = Entity::Module(file);
        let resolved_in_directory =
            self.resolve_in_package_directory(&parent, name, containing, options, guard)?;
        if !resolved_in_directory.is_empty() {
            return Ok(resolved_in_directory);
        }

        Ok(results)
    }

    fn resolve_in_package_directory(
        &self,
        parent: &Entity,
        name: &str,
        containing: Option<FileId>,
        options: ChildOptions,
        guard: &CycleGuard,
    ) -> Result<Vec<RatedResult>, ResolveError> {
        let Some(dir) = self.as_directory(parent) else {
            return Ok(Vec::new());
        };

        let resolved = self.resolve_in_directory(name, containing, dir, options, guard)?;
        if resolved.iter().any(|r| r.rate > RATE_LOW) {
            return Ok(resolved);
        }

        if !options.without_foreign {
            if let Entity::Module(file) = parent {
                if let Some(foreign) = self.resolve_foreign(*file, name, guard)? {
                    trace!(name, "foreign import fallback hit");
                    let mut merged = ResolveResultList::from(resolved);
                    merged.poke(foreign, RATE_NORMAL);
                    return Ok(merged.into_iter().collect());
                }
            }
        }
        Ok(resolved)
    }

    /// The directory a parent entity stands for: a package directory
    /// itself, or the directory of a package init file.
    fn as_directory(&self, parent: &Entity) -> Option<FileId> {
        match parent {
            Entity::Package(dir) => Some(*dir),
            Entity::Module(file) => self
                .policy
                .is_package_file(&*self.fs, *file)
                .then(|| self.fs.containing_dir(*file))
                .flatten(),
            Entity::Member(_) => None,
        }
    }

    /// One component under one directory: subdirectory-as-package, then
    /// module file by extension priority, then a re-exported member of the
    /// directory's package file.
    fn resolve_in_directory(
        &self,
        name: &str,
        containing: Option<FileId>,
        dir: FileId,
        options: ChildOptions,
        guard: &CycleGuard,
    ) -> Result<Vec<RatedResult>, ResolveError> {
        if let Some(subdir) = self.fs.child_dir(dir, name) {
            // resolution is case sensitive even when the filesystem is not
            if self.fs.name(subdir).as_deref() == Some(name)
                && (!options.check_for_package
                    || self.policy.is_package(&*self.fs, subdir, containing))
            {
                return Ok(ResolveResultList::to(Entity::Package(subdir))
                    .into_iter()
                    .collect());
            }
        }

        if let Some(module) = self.find_module_file(dir, name, options.without_stubs) {
            return Ok(ResolveResultList::to(Entity::Module(module))
                .into_iter()
                .collect());
        }

        if !options.file_only {
            if let Some(Entity::Module(package_file)) =
                self.policy.package_entity(&*self.fs, dir, containing)
            {
                if containing == Some(package_file) {
                    return Ok(Vec::new()); // don't dive into the file the request came from
                }
                let hits = self.resolve_module_member(package_file, name, guard)?;
                return Ok(hits
                    .into_iter()
                    .map(|h| RatedResult::new(h.entity, h.rate))
                    .collect());
            }
        }
        Ok(Vec::new())
    }

    /// The module file for `name` in `dir`, honoring extension priority.
    /// The first filesystem hit wins, but only if its stem matches the
    /// requested name exactly.
    fn find_module_file(&self, dir: FileId, name: &str, without_stubs: bool) -> Option<FileId> {
        let mut found = None;
        for ext in self.extensions.lookup_order(without_stubs) {
            let file_name = format!("{name}.{ext}");
            if let Some(file) = self.fs.child_file(dir, &file_name) {
                found = Some(file);
                break;
            }
        }
        let file = found?;
        let file_name = self.fs.name(file)?;
        let stem = file_name
            .rsplit_once('.')
            .map_or(file_name.as_str(), |(stem, _)| stem);
        (stem == name).then_some(file)
    }

    // ========================================================================
    // MEMBERS, FOREIGN FALLBACK, RATING
    // ========================================================================

    fn resolve_module_member(
        &self,
        module: FileId,
        name: &str,
        guard: &CycleGuard,
    ) -> Result<Vec<MemberHit>, ResolveError> {
        let mut hits = Vec::new();
        for decl in self.members.members_named(module, name) {
            self.check_canceled()?;
            match decl {
                MemberDecl::Symbol {
                    id,
                    in_exception_handler,
                } => {
                    let is_export_list = name == EXPORT_LIST_NAME;
                    hits.push(MemberHit {
                        entity: Entity::Member(id),
                        rate: if is_export_list { RATE_NORMAL } else { RATE_HIGH },
                        in_exception_handler,
                        is_export_list,
                    });
                }
                MemberDecl::Reexport { source } => {
                    // re-exports go back through module resolution so that
                    // self-referential imports hit the cycle guard
                    let entities = self.resolve_module(&source, module, true, 0, guard)?;
                    for rated in self.rate_results(entities) {
                        hits.push(MemberHit {
                            entity: rated.entity,
                            rate: rated.rate,
                            in_exception_handler: false,
                            is_export_list: false,
                        });
                    }
                }
            }
        }
        Ok(hits)
    }

    /// Retry a failed member lookup as a fully qualified name with the
    /// root restriction lifted — the name might be a re-export sourced
    /// from anywhere visible to `file`.
    fn resolve_foreign(
        &self,
        file: FileId,
        name: &str,
        guard: &CycleGuard,
    ) -> Result<Option<Entity>, ResolveError> {
        let context = ResolveContext::from_roots(self.roots.as_slice()).without_roots();
        let qname = QualifiedName::from_dotted(name);
        let entities = self.resolve_with_context(&qname, file, &context, guard)?;
        Ok(entities.into_iter().next())
    }

    /// Assign base rates and rater deltas to raw candidates.
    fn rate_results(&self, targets: Vec<Entity>) -> ResolveResultList {
        let mut rated = ResolveResultList::new();
        for entity in targets {
            let mut rate = RATE_HIGH;
            match entity {
                Entity::Module(_) => {
                    for rater in &self.raters {
                        rate += rater.rate(&entity);
                    }
                }
                Entity::Member(id) => {
                    if self.members.member_name(id).as_deref() == Some(EXPORT_LIST_NAME) {
                        rate = RATE_NORMAL;
                    }
                }
                Entity::Package(_) => {}
            }
            rated.poke(entity, rate);
        }
        rated
    }

    fn check_canceled(&self) -> Result<(), ResolveError> {
        if self.cancel.is_cancelled() {
            return Err(ResolveError::Canceled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::members::StaticMemberTable;
    use crate::resolve::policy::MarkerPackagePolicy;
    use crate::vfs::MemoryFs;

    struct Fixture {
        fs: Arc<MemoryFs>,
        members: Arc<StaticMemberTable>,
        src: FileId,
    }

    impl Fixture {
        /// `/src` root with `pkg/__init__.py`, `pkg/mod.py` declaring `X`,
        /// and a free-standing `main.py` to resolve from.
        fn new() -> Self {
            let fs = Arc::new(MemoryFs::new());
            let src = fs.add_dir(fs.root(), "src");
            let pkg = fs.add_dir(src, "pkg");
            fs.add_file(pkg, "__init__.py");
            let module = fs.add_file(pkg, "mod.py");
            fs.add_file(src, "main.py");

            let members = Arc::new(StaticMemberTable::new());
            members.add_symbol(module, "X");

            Self {
                fs,
                members,
                src,
            }
        }

        fn engine(&self) -> ResolveEngine {
            ResolveEngine::new(
                self.fs.clone(),
                Arc::new(MarkerPackagePolicy::default()),
                ExtensionRegistry::default(),
                self.members.clone(),
            )
            .with_roots([self.src])
        }

        fn main(&self) -> FileId {
            self.fs.child_file(self.src, "main.py").unwrap()
        }
    }

    fn qn(s: &str) -> QualifiedName {
        QualifiedName::from_dotted(s)
    }

    #[test]
    fn test_end_to_end_member_resolution() {
        let fx = Fixture::new();
        let engine = fx.engine();
        let module = {
            let pkg = fx.fs.child_dir(fx.src, "pkg").unwrap();
            fx.fs.child_file(pkg, "mod.py").unwrap()
        };

        let results = engine.resolve(&qn("pkg.mod.X"), fx.main(), true, 0).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].rate, RATE_HIGH);
        match results[0].entity {
            Entity::Member(id) => assert_eq!(id.file, module),
            other => panic!("expected member, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_package_and_module() {
        let fx = Fixture::new();
        let engine = fx.engine();
        let pkg = fx.fs.child_dir(fx.src, "pkg").unwrap();
        let module = fx.fs.child_file(pkg, "mod.py").unwrap();

        let best = engine.resolve_best(&qn("pkg"), fx.main(), true, 0).unwrap();
        assert_eq!(best, Some(Entity::Package(pkg)));

        let best = engine
            .resolve_best(&qn("pkg.mod"), fx.main(), true, 0)
            .unwrap();
        assert_eq!(best, Some(Entity::Module(module)));
    }

    #[test]
    fn test_memoization_returns_identical_list() {
        let fx = Fixture::new();
        let engine = fx.engine();

        let first = engine.resolve(&qn("pkg.mod"), fx.main(), true, 0).unwrap();
        let second = engine.resolve(&qn("pkg.mod"), fx.main(), true, 0).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        engine.invalidate_file(fx.main());
        let third = engine.resolve(&qn("pkg.mod"), fx.main(), true, 0).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(&*first, &*third);
    }

    #[test]
    fn test_unresolvable_name_is_empty_not_error() {
        let fx = Fixture::new();
        let engine = fx.engine();

        let results = engine
            .resolve(&qn("no.such.thing"), fx.main(), true, 0)
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_stale_source_is_hard_failure() {
        let fx = Fixture::new();
        let engine = fx.engine();
        let main = fx.main();
        fx.fs.remove(main);

        let err = engine.resolve(&qn("pkg"), main, true, 0).unwrap_err();
        assert!(matches!(err, ResolveError::StaleEntity(_)));
    }

    #[test]
    fn test_stale_parent_in_resolve_children() {
        let fx = Fixture::new();
        let engine = fx.engine();
        let pkg = fx.fs.child_dir(fx.src, "pkg").unwrap();
        fx.fs.remove(pkg);

        let err = engine
            .resolve_children(&Entity::Package(pkg), "mod", None, ChildOptions::default())
            .unwrap_err();
        assert!(matches!(err, ResolveError::StaleEntity(_)));
    }

    #[test]
    fn test_package_shadows_module_file() {
        // dir `dual/__init__.py` and file `dual.py` side by side
        let fx = Fixture::new();
        let dual_dir = fx.fs.add_dir(fx.src, "dual");
        fx.fs.add_file(dual_dir, "__init__.py");
        fx.fs.add_file(fx.src, "dual.py");
        let engine = fx.engine();

        let checked = engine
            .resolve_children(
                &Entity::Package(fx.src),
                "dual",
                Some(fx.main()),
                ChildOptions::default(),
            )
            .unwrap();
        assert_eq!(checked.len(), 1);
        assert_eq!(checked[0].entity, Entity::Package(dual_dir));

        // with the package check disabled the subdirectory still wins the
        // first step, marker or not
        let unchecked = engine
            .resolve_children(
                &Entity::Package(fx.src),
                "dual",
                Some(fx.main()),
                ChildOptions {
                    file_only: true,
                    check_for_package: false,
                    ..ChildOptions::default()
                },
            )
            .unwrap();
        assert_eq!(unchecked[0].entity, Entity::Package(dual_dir));
    }

    #[test]
    fn test_unpackaged_directory_falls_through_to_module() {
        // a directory without an init marker loses to a sibling module
        let fx = Fixture::new();
        fx.fs.add_dir(fx.src, "plain");
        let plain_file = fx.fs.add_file(fx.src, "plain.py");
        let engine = fx.engine();

        let results = engine
            .resolve_children(
                &Entity::Package(fx.src),
                "plain",
                Some(fx.main()),
                ChildOptions::default(),
            )
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entity, Entity::Module(plain_file));
    }

    #[test]
    fn test_stub_preferred_over_implementation() {
        let fx = Fixture::new();
        let stub = fx.fs.add_file(fx.src, "lib.pyi");
        fx.fs.add_file(fx.src, "lib.py");
        let engine = fx.engine();

        let results = engine
            .resolve_children(
                &Entity::Package(fx.src),
                "lib",
                Some(fx.main()),
                ChildOptions {
                    file_only: true,
                    ..ChildOptions::default()
                },
            )
            .unwrap();
        assert_eq!(results[0].entity, Entity::Module(stub));

        let without_stubs = engine
            .resolve_children(
                &Entity::Package(fx.src),
                "lib",
                Some(fx.main()),
                ChildOptions {
                    file_only: true,
                    without_stubs: true,
                    ..ChildOptions::default()
                },
            )
            .unwrap();
        assert_eq!(
            without_stubs[0].entity,
            Entity::Module(fx.fs.child_file(fx.src, "lib.py").unwrap())
        );
    }

    #[test]
    fn test_case_folded_hit_is_rejected() {
        let fs = Arc::new(MemoryFs::case_insensitive());
        let src = fs.add_dir(fs.root(), "src");
        let foo = fs.add_dir(src, "Foo");
        fs.add_file(foo, "__init__.py");
        let main = fs.add_file(src, "main.py");

        let engine = ResolveEngine::new(
            fs.clone(),
            Arc::new(MarkerPackagePolicy::default()),
            ExtensionRegistry::default(),
            Arc::new(StaticMemberTable::new()),
        )
        .with_roots([src]);

        assert!(
            engine
                .resolve(&qn("foo"), main, true, 0)
                .unwrap()
                .is_empty()
        );
        assert!(
            !engine
                .resolve(&qn("Foo"), main, true, 0)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_relative_level_within_bounds() {
        let fx = Fixture::new();
        let pkg = fx.fs.child_dir(fx.src, "pkg").unwrap();
        let sub = fx.fs.add_dir(pkg, "sub");
        fx.fs.add_file(sub, "__init__.py");
        let deep = fx.fs.add_file(sub, "deep.py");
        let engine = fx.engine();

        // `from .. import mod` inside pkg/sub/deep.py
        let results = engine.resolve(&qn("mod"), deep, true, 2).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].entity,
            Entity::Module(fx.fs.child_file(pkg, "mod.py").unwrap())
        );
    }

    #[test]
    fn test_relative_level_past_top_package_is_empty() {
        let fx = Fixture::new();
        let pkg = fx.fs.child_dir(fx.src, "pkg").unwrap();
        let sub = fx.fs.add_dir(pkg, "sub");
        fx.fs.add_file(sub, "__init__.py");
        let deep = fx.fs.add_file(sub, "deep.py");
        let engine = fx.engine();

        // three levels up crosses /src, which is not a package
        let results = engine.resolve(&qn("pkg"), deep, true, 3).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_empty_name_resolves_to_stepped_package() {
        let fx = Fixture::new();
        let pkg = fx.fs.child_dir(fx.src, "pkg").unwrap();
        let module = fx.fs.child_file(pkg, "mod.py").unwrap();
        let engine = fx.engine();

        // `from . import ...` in pkg/mod.py
        let results = engine.resolve(&QualifiedName::empty(), module, true, 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entity, Entity::Package(pkg));

        // absolute empty name denotes nothing
        assert!(
            engine
                .resolve(&QualifiedName::empty(), module, true, 0)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_relative_first_when_absolute_disabled() {
        // main.py sits next to a `local.py` that shadows a root-level name
        let fx = Fixture::new();
        let inner = fx.fs.add_dir(fx.src, "inner");
        fx.fs.add_file(inner, "__init__.py");
        let local = fx.fs.add_file(inner, "util.py");
        let here = fx.fs.add_file(inner, "here.py");
        let global = fx.fs.add_file(fx.src, "util.py");
        let engine = fx.engine();

        let legacy = engine.resolve(&qn("util"), here, false, 0).unwrap();
        assert_eq!(legacy.first().map(|r| r.entity), Some(Entity::Module(local)));

        let absolute = engine.resolve(&qn("util"), here, true, 0).unwrap();
        assert_eq!(
            absolute.first().map(|r| r.entity),
            Some(Entity::Module(global))
        );
    }

    #[test]
    fn test_self_import_terminates() {
        let fx = Fixture::new();
        let pkg = fx.fs.child_dir(fx.src, "pkg").unwrap();
        let init = fx.fs.child_file(pkg, "__init__.py").unwrap();
        // pkg/__init__.py re-exports `pkg.loop` from itself
        fx.members.add_reexport(init, "looped", qn("pkg.looped"));
        let engine = fx.engine();

        let results = engine.resolve(&qn("pkg.looped"), fx.main(), true, 0).unwrap();
        assert!(results.is_empty());

        // a later, unrelated resolution still works (no leaked markers)
        assert!(!engine.resolve(&qn("pkg"), fx.main(), true, 0).unwrap().is_empty());
    }

    #[test]
    fn test_reexport_through_package_init() {
        let fx = Fixture::new();
        let pkg = fx.fs.child_dir(fx.src, "pkg").unwrap();
        let init = fx.fs.child_file(pkg, "__init__.py").unwrap();
        let module = fx.fs.child_file(pkg, "mod.py").unwrap();
        // pkg/__init__.py does `from pkg.mod import X` → `pkg.X` works
        fx.members.add_reexport(init, "X", qn("pkg.mod.X"));
        let engine = fx.engine();

        let results = engine.resolve(&qn("pkg.X"), fx.main(), true, 0).unwrap();
        assert_eq!(results.len(), 1);
        match results[0].entity {
            Entity::Member(id) => assert_eq!(id.file, module),
            other => panic!("expected member, got {other:?}"),
        }
    }

    #[test]
    fn test_export_list_member_rates_normal() {
        let fx = Fixture::new();
        let pkg = fx.fs.child_dir(fx.src, "pkg").unwrap();
        let module = fx.fs.child_file(pkg, "mod.py").unwrap();
        fx.members.add_symbol(module, EXPORT_LIST_NAME);
        let engine = fx.engine();

        let results = engine
            .resolve(&qn("pkg.mod.__all__"), fx.main(), true, 0)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].rate, RATE_NORMAL);
    }

    #[test]
    fn test_handler_member_shadowed_by_sibling_file() {
        // pkg/__init__.py binds `extra` inside an except block AND
        // pkg/extra.py exists: the directory wins
        let fx = Fixture::new();
        let pkg = fx.fs.child_dir(fx.src, "pkg").unwrap();
        let init = fx.fs.child_file(pkg, "__init__.py").unwrap();
        fx.members.add_symbol_in_handler(init, "extra");
        let extra = fx.fs.add_file(pkg, "extra.py");
        let engine = fx.engine();

        let results = engine
            .resolve_children(
                &Entity::Module(init),
                "extra",
                Some(fx.main()),
                ChildOptions::default(),
            )
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entity, Entity::Module(extra));
    }

    #[test]
    fn test_reliable_member_beats_sibling_file() {
        let fx = Fixture::new();
        let pkg = fx.fs.child_dir(fx.src, "pkg").unwrap();
        let init = fx.fs.child_file(pkg, "__init__.py").unwrap();
        let member = fx.members.add_symbol(init, "extra");
        fx.fs.add_file(pkg, "extra.py");
        let engine = fx.engine();

        let results = engine
            .resolve_children(
                &Entity::Module(init),
                "extra",
                Some(fx.main()),
                ChildOptions::default(),
            )
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entity, Entity::Member(member));
    }

    #[test]
    fn test_plain_module_keeps_member_hits() {
        // a non-init module has no directory to retry into; its member
        // hits stand even when flagged unreliable
        let fx = Fixture::new();
        let pkg = fx.fs.child_dir(fx.src, "pkg").unwrap();
        let module = fx.fs.child_file(pkg, "mod.py").unwrap();
        let member = fx.members.add_symbol_in_handler(module, "extra");
        fx.fs.add_file(pkg, "extra.py");
        let engine = fx.engine();

        let results = engine
            .resolve_children(
                &Entity::Module(module),
                "extra",
                Some(fx.main()),
                ChildOptions::default(),
            )
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entity, Entity::Member(member));
    }

    #[test]
    fn test_foreign_fallback_finds_reexport_source() {
        // pkg/__init__.py has no member `distant` and the package
        // directory has no such module; a rootless search from the file
        // finds it in an ancestor directory — the "re-exported from
        // elsewhere" case — and merges it at NORMAL.
        let fx = Fixture::new();
        let pkg = fx.fs.child_dir(fx.src, "pkg").unwrap();
        let init = fx.fs.child_file(pkg, "__init__.py").unwrap();
        let distant = fx.fs.add_file(fx.src, "distant.py");
        let engine = fx.engine();

        let without = engine
            .resolve_children(
                &Entity::Module(init),
                "distant",
                Some(fx.main()),
                ChildOptions {
                    without_foreign: true,
                    ..ChildOptions::default()
                },
            )
            .unwrap();
        assert!(without.is_empty());

        let with = engine
            .resolve_children(
                &Entity::Module(init),
                "distant",
                Some(fx.main()),
                ChildOptions::default(),
            )
            .unwrap();
        assert_eq!(with.len(), 1);
        assert_eq!(with[0].entity, Entity::Module(distant));
        assert_eq!(with[0].rate, RATE_NORMAL);
    }

    #[test]
    fn test_rater_adjusts_module_rank() {
        struct DemoteStubs {
            fs: Arc<MemoryFs>,
        }
        impl ResolveRater for DemoteStubs {
            fn rate(&self, entity: &Entity) -> i32 {
                match entity {
                    Entity::Module(file)
                        if self
                            .fs
                            .name(*file)
                            .is_some_and(|n| n.ends_with(".pyi")) =>
                    {
                        -5
                    }
                    _ => 0,
                }
            }
        }

        let fx = Fixture::new();
        fx.fs.add_file(fx.src, "lib.pyi");
        let engine = fx
            .engine()
            .with_rater(Arc::new(DemoteStubs { fs: fx.fs.clone() }));

        let results = engine.resolve(&qn("lib"), fx.main(), true, 0).unwrap();
        assert_eq!(results[0].rate, RATE_HIGH - 5);
    }

    #[test]
    fn test_cancellation_propagates() {
        let fx = Fixture::new();
        let token = CancellationToken::new();
        let engine = fx.engine().with_cancellation(token.clone());
        token.cancel();

        let err = engine.resolve(&qn("pkg.mod"), fx.main(), true, 0).unwrap_err();
        assert!(matches!(err, ResolveError::Canceled));
    }

    #[test]
    fn test_transient_view_resolves_like_original() {
        let fx = Fixture::new();
        let main = fx.main();
        let view = fx.fs.add_file(fx.src, "main.py [view]");
        fx.fs.set_original(view, main);
        let engine = fx.engine();

        let from_view = engine.resolve(&qn("pkg.mod"), view, true, 0).unwrap();
        let from_original = engine.resolve(&qn("pkg.mod"), main, true, 0).unwrap();
        assert!(Arc::ptr_eq(&from_view, &from_original));
    }
}
