use std::sync::Arc;

use crate::{
    catalog::{Catalog, CatalogObject, CatalogTable},
    names::QualifiedName,
};

/// Read-only access to the tables a translation may reference.
pub trait CatalogProvider: Send + Sync {
    fn tables(&self) -> Vec<Arc<CatalogTable>>;

    /// Tables whose name matches `pattern`, in declaration order.
    fn find_tables(&self, pattern: &QualifiedName) -> Vec<Arc<CatalogTable>> {
        self.tables().into_iter().filter(|t| t.name().matches(pattern)).collect()
    }
}

impl CatalogProvider for Catalog {
    fn tables(&self) -> Vec<Arc<CatalogTable>> {
        self.all_tables()
    }
}

/// Several catalogs served as one.
#[derive(Debug, Clone, Default)]
pub struct CatalogSet {
    catalogs: Vec<Arc<Catalog>>,
}

impl CatalogSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, catalog: Catalog) -> Self {
        self.catalogs.push(Arc::new(catalog));
        self
    }

    pub fn catalogs(&self) -> &[Arc<Catalog>] {
        &self.catalogs
    }
}

impl CatalogProvider for CatalogSet {
    fn tables(&self) -> Vec<Arc<CatalogTable>> {
        self.catalogs.iter().flat_map(|c| c.all_tables()).collect()
    }
}
