use std::{path::Path, sync::Arc};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    catalog::{CatalogColumn, CatalogObject, CatalogSchema, CatalogTable, QuerySegment, SqlType},
    names::QualifiedName,
    translator::TranslationError,
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogDoc {
    name: String,
    #[serde(default)]
    schemas: Vec<SchemaDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDoc {
    name: String,
    #[serde(default)]
    tables: Vec<TableDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableDoc {
    name: String,
    #[serde(default)]
    template: Option<String>,
    #[serde(default)]
    remarks: Option<String>,
    #[serde(default)]
    columns: Vec<ColumnDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ColumnDoc {
    name: String,
    #[serde(rename = "type")]
    sql_type: SqlType,
    #[serde(default)]
    nullable: bool,
    #[serde(default)]
    template: Option<String>,
    #[serde(default)]
    display_size: Option<u32>,
    #[serde(default)]
    precision: Option<u32>,
    #[serde(default)]
    scale: Option<u32>,
    #[serde(default)]
    auto_increment: bool,
    #[serde(default)]
    remarks: Option<String>,
}

/// The root of the relational view over the graph. Immutable once loaded and
/// shared between translations through `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    name: QualifiedName,
    schemas: Vec<Arc<CatalogSchema>>,
}

impl Catalog {
    pub fn new(name: QualifiedName) -> Self {
        Self { name, schemas: Vec::new() }
    }

    pub fn add_schema(&mut self, schema: CatalogSchema) -> Result<(), TranslationError> {
        if schema.name().catalog() != self.name.catalog() {
            return TranslationError::invalid_name(
                schema.name().to_string(),
                format!("schema does not belong to catalog `{}`", self.name),
            )
            .err();
        }
        if self.schema(schema.schema_name()).is_some() {
            return TranslationError::invalid_name(schema.name().to_string(), "schema declared twice").err();
        }
        self.schemas.push(Arc::new(schema));
        Ok(())
    }

    pub fn catalog_name(&self) -> &str {
        self.name.catalog().unwrap_or_default()
    }

    pub fn schemas(&self) -> &[Arc<CatalogSchema>] {
        &self.schemas
    }

    pub fn schema(&self, name: &str) -> Option<&Arc<CatalogSchema>> {
        self.schemas.iter().find(|s| s.schema_name() == name)
    }

    pub fn from_json(value: &Value) -> Result<Self, TranslationError> {
        let doc: CatalogDoc =
            serde_json::from_value(value.clone()).map_err(|e| TranslationError::InvalidCatalog(e.to_string()))?;
        Self::from_doc(doc)
    }

    pub fn from_json_str(text: &str) -> Result<Self, TranslationError> {
        let doc: CatalogDoc = serde_json::from_str(text).map_err(|e| TranslationError::InvalidCatalog(e.to_string()))?;
        Self::from_doc(doc)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, TranslationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| TranslationError::InvalidCatalog(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    fn from_doc(doc: CatalogDoc) -> Result<Self, TranslationError> {
        let mut catalog = Catalog::new(QualifiedName::catalog_name(&doc.name)?);
        for schema_doc in doc.schemas {
            let mut schema = CatalogSchema::new(QualifiedName::schema_name(&doc.name, &schema_doc.name)?);
            for table_doc in schema_doc.tables {
                let table_name = QualifiedName::table_name(&doc.name, &schema_doc.name, &table_doc.name)?;
                let segment = table_doc
                    .template
                    .as_deref()
                    .map(|t| QuerySegment::parse_table(&table_name.to_string(), t))
                    .transpose()?;
                let mut table = CatalogTable::new(table_name.clone(), segment);
                if let Some(remarks) = table_doc.remarks {
                    table = table.with_remarks(remarks);
                }
                for column_doc in table_doc.columns {
                    table.add_column(Self::column_from_doc(&table_name, column_doc)?)?;
                }
                debug!(table = %table.name(), columns = table.columns().len(), "loaded catalog table");
                schema.add_table(table)?;
            }
            catalog.add_schema(schema)?;
        }
        Ok(catalog)
    }

    fn column_from_doc(table: &QualifiedName, doc: ColumnDoc) -> Result<CatalogColumn, TranslationError> {
        let name = table.child_column(&doc.name)?;
        let mut column = CatalogColumn::new(name.clone(), doc.sql_type)
            .with_nullable(doc.nullable)
            .with_auto_increment(doc.auto_increment)
            .with_size(doc.display_size, doc.precision, doc.scale);
        if let Some(template) = doc.template.as_deref() {
            column = column.with_segment(QuerySegment::parse_column(&name.to_string(), template)?);
        }
        if let Some(remarks) = doc.remarks {
            column = column.with_remarks(remarks);
        }
        Ok(column)
    }

    /// Every table of every schema, in declaration order.
    pub fn all_tables(&self) -> Vec<Arc<CatalogTable>> {
        self.schemas.iter().flat_map(|s| s.tables().iter().cloned()).collect()
    }
}

impl CatalogObject for Catalog {
    fn name(&self) -> &QualifiedName {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn loads_nested_document() {
        let doc = json!({
            "name": "shop",
            "schemas": [{
                "name": "sales",
                "tables": [{
                    "name": "orders",
                    "template": "%1$s a ex:Order",
                    "columns": [
                        { "name": "id", "type": "INTEGER", "template": "%1$s ex:id %2$s" },
                        { "name": "note", "type": "VARCHAR", "nullable": true, "template": "%1$s ex:note %2$s",
                          "display_size": 80 }
                    ]
                }]
            }]
        });
        let catalog = Catalog::from_json(&doc).unwrap();
        let orders = catalog.schema("sales").and_then(|s| s.table("orders")).unwrap();
        assert_eq!(orders.name().to_string(), "shop.sales.orders");
        assert_eq!(orders.columns().len(), 2);
        let note = orders.column("note").unwrap();
        assert!(note.nullable());
        assert_eq!(note.display_size(), 80);
        assert_eq!(note.name().to_string(), "shop.sales.orders.note");
        assert!(!orders.column("id").unwrap().is_synthetic());
        assert_eq!(catalog.all_tables().len(), 1);
    }

    #[test]
    fn bad_documents_are_reported() {
        let err = Catalog::from_json_str("{ \"schemas\": [] }").unwrap_err();
        assert!(matches!(err, TranslationError::InvalidCatalog(_)));

        let bad_template = json!({
            "name": "c",
            "schemas": [{ "name": "s", "tables": [{
                "name": "t", "columns": [{ "name": "x", "type": "INTEGER", "template": "%1$s ex:x ?o" }]
            }]}]
        });
        assert!(matches!(Catalog::from_json(&bad_template), Err(TranslationError::InvalidTemplate { .. })));

        let dup = json!({
            "name": "c",
            "schemas": [{ "name": "s", "tables": [{ "name": "t" }, { "name": "t" }] }]
        });
        assert!(matches!(Catalog::from_json(&dup), Err(TranslationError::InvalidName { .. })));
    }

    #[test]
    fn loads_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "name": "c", "schemas": [{{ "name": "s", "tables": [{{ "name": "t", "template": "%1$s a ex:T" }}] }}] }}"#
        )
        .unwrap();
        let catalog = Catalog::load_from_file(file.path()).unwrap();
        assert_eq!(catalog.all_tables()[0].table_name(), "t");

        assert!(matches!(
            Catalog::load_from_file("/definitely/not/here.json"),
            Err(TranslationError::InvalidCatalog(_))
        ));
    }
}
