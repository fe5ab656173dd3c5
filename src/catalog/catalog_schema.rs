use std::sync::Arc;

use crate::{
    catalog::{CatalogObject, CatalogTable},
    names::QualifiedName,
    translator::TranslationError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSchema {
    name: QualifiedName,
    tables: Vec<Arc<CatalogTable>>,
}

impl CatalogSchema {
    pub fn new(name: QualifiedName) -> Self {
        Self { name, tables: Vec::new() }
    }

    pub fn add_table(&mut self, table: CatalogTable) -> Result<(), TranslationError> {
        let owner = table.name();
        if owner.catalog() != self.name.catalog() || owner.schema() != self.name.schema() {
            return TranslationError::invalid_name(
                owner.to_string(),
                format!("table does not belong to schema `{}`", self.name),
            )
            .err();
        }
        if self.table(table.table_name()).is_some() {
            return TranslationError::invalid_name(owner.to_string(), "table declared twice").err();
        }
        self.tables.push(Arc::new(table));
        Ok(())
    }

    pub fn schema_name(&self) -> &str {
        self.name.schema().unwrap_or_default()
    }

    pub fn tables(&self) -> &[Arc<CatalogTable>] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&Arc<CatalogTable>> {
        self.tables.iter().find(|t| t.table_name() == name)
    }
}

impl CatalogObject for CatalogSchema {
    fn name(&self) -> &QualifiedName {
        &self.name
    }
}
