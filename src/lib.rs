//! # pythia-base
//!
//! Core library for qualified-name import resolution: given a dotted or
//! relative import reference inside a source file, find the project
//! entities (packages, modules, re-exported symbols) it denotes, across
//! multiple search roots.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! resolve → resolution engine (cache, cycle guard, directory walk,
//!   ↓       member lookup, rating, foreign-import fallback)
//! syntax  → import-construct classification for callers
//!   ↓
//! vfs     → project filesystem abstraction (+ in-memory implementation)
//!   ↓
//! base    → primitives (FileId, MemberId, QualifiedName)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use pythia::resolve::{ExtensionRegistry, MarkerPackagePolicy, ResolveEngine, StaticMemberTable};
//! use pythia::vfs::MemoryFs;
//! use pythia::QualifiedName;
//!
//! let fs = Arc::new(MemoryFs::new());
//! let src = fs.add_dir(fs.root(), "src");
//! // ... mirror the project tree and member tables ...
//!
//! let engine = ResolveEngine::new(
//!     fs.clone(),
//!     Arc::new(MarkerPackagePolicy::default()),
//!     ExtensionRegistry::default(),
//!     Arc::new(StaticMemberTable::new()),
//! )
//! .with_roots([src]);
//!
//! let results = engine.resolve(&QualifiedName::from_dotted("pkg.mod"), source_file, true, 0)?;
//! ```

/// Foundation types: FileId, MemberId, QualifiedName
pub mod base;

/// Project filesystem abstraction
pub mod vfs;

/// Import-construct classification
pub mod syntax;

/// The resolution engine
pub mod resolve;

// Re-export commonly needed items
pub use base::{FileId, LocalMemberId, MemberId, QualifiedName};
pub use resolve::{Entity, RatedResult, ResolveEngine, ResolveError};
