//! Pluggable candidate raters.

use super::result::Entity;

/// A rate adjustment applied to resolution candidates.
///
/// Raters are registered on the engine at construction time and composed
/// statically — the resolver depends only on this trait, never on concrete
/// raters. Every registered rater is consulted for every rated candidate
/// and the deltas are applied additively to the base rate, so independent
/// concerns (prefer sources over binaries, demote vendored copies, boost
/// the active SDK) stack without knowing about each other.
pub trait ResolveRater: Send + Sync {
    /// Signed rate delta for `entity`. Return 0 to leave it alone.
    fn rate(&self, entity: &Entity) -> i32;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;

    struct DemoteEverything;

    impl ResolveRater for DemoteEverything {
        fn rate(&self, _entity: &Entity) -> i32 {
            -10
        }
    }

    #[test]
    fn test_rater_object_safety() {
        let rater: Box<dyn ResolveRater> = Box::new(DemoteEverything);
        assert_eq!(rater.rate(&Entity::Module(FileId::new(1))), -10);
    }
}
