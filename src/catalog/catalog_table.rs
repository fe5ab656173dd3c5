use std::sync::Arc;

use crate::{
    catalog::{CatalogColumn, CatalogObject, QuerySegment},
    names::QualifiedName,
    translator::TranslationError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogTable {
    name: QualifiedName,
    segment: Option<QuerySegment>,
    remarks: Option<String>,
    columns: Vec<Arc<CatalogColumn>>,
}

impl CatalogTable {
    pub fn new(name: QualifiedName, segment: Option<QuerySegment>) -> Self {
        Self { name, segment, remarks: None, columns: Vec::new() }
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    /// Append a column. It must be a child of this table and not repeat a name.
    pub fn add_column(&mut self, column: CatalogColumn) -> Result<(), TranslationError> {
        let parent = column.name().table_part()?;
        if parent.guid() != self.name.guid() {
            return TranslationError::invalid_name(
                column.name().to_string(),
                format!("column does not belong to table `{}`", self.name),
            )
            .err();
        }
        if self.column(column.column_name()).is_some() {
            return TranslationError::invalid_name(column.name().to_string(), "column declared twice").err();
        }
        self.columns.push(Arc::new(column));
        Ok(())
    }

    pub fn table_name(&self) -> &str {
        self.name.table().unwrap_or_default()
    }

    pub fn columns(&self) -> &[Arc<CatalogColumn>] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Arc<CatalogColumn>> {
        self.columns.iter().find(|c| c.column_name() == name)
    }

    pub fn remarks(&self) -> Option<&str> {
        self.remarks.as_deref()
    }
}

impl CatalogObject for CatalogTable {
    fn name(&self) -> &QualifiedName {
        &self.name
    }

    fn segment(&self) -> Option<&QuerySegment> {
        self.segment.as_ref()
    }
}
