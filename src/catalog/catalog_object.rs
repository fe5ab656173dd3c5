use crate::{catalog::QuerySegment, names::QualifiedName};

/// Anything the catalog declares: a catalog, schema, table or column.
pub trait CatalogObject: Send + Sync {
    fn name(&self) -> &QualifiedName;

    /// The template binding this object in the graph. `None` for synthetic
    /// objects (function results, literals) that only exist relationally.
    fn segment(&self) -> Option<&QuerySegment> {
        None
    }

    fn is_synthetic(&self) -> bool {
        self.segment().is_none()
    }
}
