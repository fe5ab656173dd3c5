use crate::{
    catalog::{CatalogObject, QuerySegment, SqlType},
    names::QualifiedName,
};

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogColumn {
    name: QualifiedName,
    sql_type: SqlType,
    nullable: bool,
    display_size: u32,
    precision: u32,
    scale: u32,
    auto_increment: bool,
    remarks: Option<String>,
    segment: Option<QuerySegment>,
}

impl CatalogColumn {
    pub fn new(name: QualifiedName, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            nullable: false,
            display_size: sql_type.display_size(),
            precision: sql_type.default_precision(),
            scale: sql_type.default_scale(),
            auto_increment: false,
            remarks: None,
            segment: None,
        }
    }

    /// A column produced by an expression rather than read from the graph.
    pub fn synthetic(name: QualifiedName, sql_type: SqlType, nullable: bool) -> Self {
        Self::new(name, sql_type).with_nullable(nullable)
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_segment(mut self, segment: QuerySegment) -> Self {
        self.segment = Some(segment);
        self
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    pub fn with_auto_increment(mut self, auto_increment: bool) -> Self {
        self.auto_increment = auto_increment;
        self
    }

    pub fn with_size(mut self, display_size: Option<u32>, precision: Option<u32>, scale: Option<u32>) -> Self {
        if let Some(size) = display_size {
            self.display_size = size;
        }
        if let Some(precision) = precision {
            self.precision = precision;
        }
        if let Some(scale) = scale {
            self.scale = scale;
        }
        self
    }

    /// The bare column name.
    pub fn column_name(&self) -> &str {
        self.name.column().unwrap_or_default()
    }

    pub fn sql_type(&self) -> SqlType {
        self.sql_type
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn display_size(&self) -> u32 {
        self.display_size
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn auto_increment(&self) -> bool {
        self.auto_increment
    }

    pub fn remarks(&self) -> Option<&str> {
        self.remarks.as_deref()
    }
}

impl CatalogObject for CatalogColumn {
    fn name(&self) -> &QualifiedName {
        &self.name
    }

    fn segment(&self) -> Option<&QuerySegment> {
        self.segment.as_ref()
    }
}
