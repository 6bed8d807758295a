//! Minimal import-construct classification.
//!
//! The source-file syntax tree lives with the host; the resolver only
//! needs to know how an element relates to an enclosing import construct
//! so callers can pick a resolution strategy. The host answers that one
//! question through [`ImportSite`].

/// How a syntactic element relates to an enclosing import construct.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointInImport {
    /// The element names a module: the source of a `from … import …`, or
    /// an element of a plain `import …`.
    AsModule,
    /// The element names an imported symbol of a `from … import …`.
    AsName,
    /// The element is not part of an import construct.
    None,
}

/// The nearest enclosing import construct of an element, as reported by
/// the host's syntax tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnclosingImport {
    /// Inside the source part of a `from … import …` statement.
    FromImportSource,
    /// An import element of a plain `import …` statement.
    PlainImportElement,
    /// An imported name of a `from … import …` statement.
    FromImportElement,
}

/// Host-provided view of the syntax around one element.
pub trait ImportSite {
    /// The nearest enclosing import construct, if any.
    fn enclosing_import(&self) -> Option<EnclosingImport>;
}

/// Classify how `site` relates to an enclosing import construct.
pub fn point_in_import(site: &dyn ImportSite) -> PointInImport {
    match site.enclosing_import() {
        Some(EnclosingImport::FromImportSource) | Some(EnclosingImport::PlainImportElement) => {
            PointInImport::AsModule
        }
        Some(EnclosingImport::FromImportElement) => PointInImport::AsName,
        None => PointInImport::None,
    }
}
