//! Qualified-name resolution.
//!
//! The entry point is [`ResolveEngine`]: configure it with a filesystem
//! view, a package policy, an extension registry, a member table, and the
//! search roots, then call [`ResolveEngine::resolve`] per import reference.
//!
//! ## Key Data Structures
//!
//! - [`ResolveContext`] - roots / absolute flag / relative level
//! - [`Entity`], [`RatedResult`], [`ResolveResultList`] - ranked candidates
//! - [`ResolutionKey`], [`ResolveCache`] - per-request memoization

mod cache;
mod context;
mod engine;
mod guard;
mod members;
mod policy;
mod rating;
mod result;

pub use cache::{ResolutionKey, ResolveCache};
pub use context::ResolveContext;
pub use engine::{ChildOptions, ResolveEngine};
pub use members::{EXPORT_LIST_NAME, MemberDecl, MemberTable, StaticMemberTable};
pub use policy::{ExtensionRegistry, MarkerPackagePolicy, PackagePolicy};
pub use rating::ResolveRater;
pub use result::{Entity, RATE_HIGH, RATE_LOW, RATE_NORMAL, RatedResult, ResolveResultList};

use thiserror::Error;

/// Hard failures of a resolution request.
///
/// "Name not found" is deliberately not here — it is the expected common
/// case and comes back as an empty result list.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The cooperative cancellation signal fired; the in-flight resolve
    /// aborted without caching partial results.
    #[error("resolution canceled")]
    Canceled,

    /// A handle fed into the resolver points at a deleted entity. This is
    /// a contract violation in the caller or the filesystem abstraction,
    /// kept distinct from "not found" so staleness bugs surface.
    #[error("stale entity handle: {0:?}")]
    StaleEntity(Entity),
}
