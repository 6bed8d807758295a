//! Qualified names — dotted references like `pkg.mod.X`.

use std::fmt;

use smol_str::SmolStr;

/// An immutable ordered sequence of name components.
///
/// A `QualifiedName` represents a dotted reference as written in an import
/// statement. It may be empty, which denotes "this module" (the source of a
/// purely relative import such as `from . import x`).
///
/// Equality and hashing are structural, by component sequence, which makes
/// the type usable directly inside the resolution cache key.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct QualifiedName {
    components: Vec<SmolStr>,
}

impl QualifiedName {
    /// The empty qualified name.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a qualified name from individual components.
    pub fn from_components<I>(components: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            components: components
                .into_iter()
                .map(|c| SmolStr::new(c.as_ref()))
                .collect(),
        }
    }

    /// Parse a dotted string like `"pkg.mod.X"`.
    ///
    /// An empty string yields the empty name. No identifier validation is
    /// performed: the user may be mid-typing and partial names must still
    /// flow through resolution (and resolve to nothing).
    pub fn from_dotted(s: &str) -> Self {
        if s.is_empty() {
            return Self::empty();
        }
        Self {
            components: s.split('.').map(SmolStr::new).collect(),
        }
    }

    /// The components, in order.
    pub fn components(&self) -> &[SmolStr] {
        &self.components
    }

    /// The first component, if any.
    pub fn first_component(&self) -> Option<&str> {
        self.components.first().map(|c| c.as_str())
    }

    /// The last component, if any.
    pub fn last_component(&self) -> Option<&str> {
        self.components.last().map(|c| c.as_str())
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether this is the empty name.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// A new name with `component` appended.
    pub fn append(&self, component: impl AsRef<str>) -> Self {
        let mut components = self.components.clone();
        components.push(SmolStr::new(component.as_ref()));
        Self { components }
    }

    /// A new name with the last component removed.
    ///
    /// Removing from the empty name yields the empty name.
    pub fn remove_last(&self) -> Self {
        let mut components = self.components.clone();
        components.pop();
        Self { components }
    }

    /// A new name with the first component removed.
    pub fn remove_head(&self) -> Self {
        Self {
            components: self.components.iter().skip(1).cloned().collect(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QualifiedName({self})")
    }
}
