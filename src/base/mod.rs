//! Foundation types for the resolver.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`FileId`] - Interned filesystem-node identifiers
//! - [`MemberId`], [`LocalMemberId`] - Identifiers for symbols inside modules
//! - [`QualifiedName`] - Dotted reference names
//!
//! This module has NO dependencies on other pythia modules.

mod file_id;
mod ids;
mod qname;

pub use file_id::FileId;
pub use ids::{LocalMemberId, MemberId};
pub use qname::QualifiedName;
