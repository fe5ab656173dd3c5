use std::sync::Arc;

use uuid::Uuid;

use crate::{
    catalog::{CatalogColumn, CatalogObject},
    graph::{Expression, Variable},
    names::QualifiedName,
    query::{QueryColumnInfo, QueryTableInfo},
    translator::{TranslationError, TranslatorConfig},
};

pub struct ColumnBinder;

impl ColumnBinder {
    /// Identity of `column` as seen through one table instance. Two aliases of
    /// one table give the same column two identities, so self-joins keep
    /// their sides apart.
    pub fn identity(table: &QueryTableInfo, column: &CatalogColumn) -> Result<Uuid, TranslationError> {
        Ok(table.name().child_column(column.column_name())?.guid())
    }

    /// Wrap `column` for this query. The item is optional when its table joins
    /// through an optional block or when the column itself may be absent.
    pub fn bind(
        table: &QueryTableInfo,
        column: Arc<CatalogColumn>,
        local_name: Option<QualifiedName>,
        prefix: &str,
    ) -> Result<QueryColumnInfo, TranslationError> {
        let own = table.name().child_column(column.column_name())?;
        let identity = own.guid();
        let optional = table.optional() || column.nullable();
        Ok(QueryColumnInfo::new(column, local_name.unwrap_or(own), optional, identity, prefix))
    }

    /// Whether a coercion binding is produced for this column.
    pub fn coerces(column: &QueryColumnInfo, config: &TranslatorConfig) -> bool {
        config.coerce_values
            && column.base().segment().is_some()
            && column.base().sql_type().coercion_function().is_some()
    }

    /// The variable holding the value the relational layer sees.
    pub fn value_variable(column: &QueryColumnInfo, config: &TranslatorConfig) -> Variable {
        if Self::coerces(column, config) {
            Variable::new(format!("{}_c", column.variable().name()))
        } else {
            column.variable().clone()
        }
    }

    pub fn value_expression(column: &QueryColumnInfo, config: &TranslatorConfig) -> Expression {
        match column.expression() {
            Some(expression) => expression.clone(),
            None => Expression::var(&Self::value_variable(column, config)),
        }
    }
}
