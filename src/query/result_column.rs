use serde::Serialize;

use crate::{catalog::SqlType, graph::Variable};

/// Relational metadata for one column of the translated result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultColumn {
    /// The SQL label (`alias`, or the column name qualified just enough to be unique).
    pub label: String,
    /// The projected variable carrying the value.
    pub variable: Variable,
    pub sql_type: SqlType,
    pub nullable: bool,
}
