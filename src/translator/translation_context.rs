use std::{fmt, sync::Arc};

use tracing::debug;

use crate::{
    builder::{BlockId, QueryBuilder},
    catalog::{CatalogColumn, CatalogObject, CatalogProvider, CatalogTable},
    functions::FunctionRegistry,
    names::{QualifiedName, SegmentMask},
    query::{QueryColumnInfo, QueryTableInfo},
    sql::ast::{Collection, Column, JoinType, Query},
    translator::{ReferenceKind, TranslationError, TranslatorConfig},
};

/// The clause an expression is being translated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Select,
    JoinOn,
    Where,
    GroupBy,
    Having,
    OrderBy,
}

impl Clause {
    pub fn allows_aggregates(self) -> bool {
        matches!(self, Clause::Select | Clause::Having | Clause::OrderBy)
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Select => write!(f, "SELECT"),
            Clause::JoinOn => write!(f, "JOIN ... ON"),
            Clause::Where => write!(f, "WHERE"),
            Clause::GroupBy => write!(f, "GROUP BY"),
            Clause::Having => write!(f, "HAVING"),
            Clause::OrderBy => write!(f, "ORDER BY"),
        }
    }
}

/// Per-statement state: the builder under construction plus the read-only
/// collaborators every translation step needs.
pub struct TranslationContext<'a> {
    pub builder: QueryBuilder,
    pub catalog: &'a dyn CatalogProvider,
    pub functions: &'a FunctionRegistry,
    pub config: &'a TranslatorConfig,
}

impl<'a> TranslationContext<'a> {
    pub fn new(catalog: &'a dyn CatalogProvider, functions: &'a FunctionRegistry, config: &'a TranslatorConfig) -> Self {
        Self { builder: QueryBuilder::new(config), catalog, functions, config }
    }

    /// Register every FROM and JOIN table, in declaration order. Returns the
    /// block opened for each join.
    pub fn build_from_query(&mut self, query: &Query) -> Result<Vec<BlockId>, TranslationError> {
        if query.collections.is_empty() {
            return TranslationError::unsupported("SELECT without FROM").err();
        }
        for collection in &query.collections {
            self.add_collection(collection, false)?;
        }
        let mut join_blocks = Vec::with_capacity(query.joins.len());
        for join in &query.joins {
            if join.natural {
                return TranslationError::unsupported("NATURAL JOIN").err();
            }
            let optional = match join.join_type {
                JoinType::Inner | JoinType::Cross => false,
                JoinType::Left => true,
                JoinType::Right => return TranslationError::unsupported("RIGHT JOIN").err(),
                JoinType::Full => return TranslationError::unsupported("FULL JOIN").err(),
            };
            let (_, block) = self.add_collection(&join.collection, optional)?;
            join_blocks.push(block);
        }
        Ok(join_blocks)
    }

    fn add_collection(&mut self, collection: &Collection, optional: bool) -> Result<(QueryTableInfo, BlockId), TranslationError> {
        match collection {
            Collection::Table { name, alias } => {
                let table = self.find_table(name)?;
                let local_name = match alias {
                    Some(alias) => QualifiedName::pattern(None, None, Some(alias), None)?,
                    None => table.name().clone(),
                };
                debug!(table = %table.name(), local = %local_name, optional, "FROM table");
                self.builder.add_table(table, local_name, optional)
            }
            Collection::Query { .. } => TranslationError::unsupported("subquery in FROM").err(),
        }
    }

    /// Look a FROM name up in the catalog, narrowing by the configured
    /// default catalog and schema when the name alone is ambiguous.
    pub fn find_table(&self, name: &[String]) -> Result<Arc<CatalogTable>, TranslationError> {
        let pattern = QualifiedName::pattern_from_parts(name, SegmentMask::TABLE)?;
        let mut found = self.catalog.find_tables(&pattern);
        if found.len() > 1 {
            let scoped: Vec<Arc<CatalogTable>> = found
                .iter()
                .filter(|t| {
                    self.config.default_catalog.as_deref().is_none_or(|c| t.name().catalog() == Some(c))
                        && self.config.default_schema.as_deref().is_none_or(|s| t.name().schema() == Some(s))
                })
                .cloned()
                .collect();
            if !scoped.is_empty() {
                found = scoped;
            }
        }
        match found.len() {
            0 => Err(TranslationError::unknown(ReferenceKind::Table, name.join("."))),
            1 => Ok(found.remove(0)),
            _ => Err(TranslationError::AmbiguousReference {
                name: name.join("."),
                matches: found.iter().map(|t| t.name().to_string()).collect(),
            }),
        }
    }

    /// Which table instance and catalog column a column reference denotes.
    pub fn locate_column(&self, column: &Column) -> Result<(QueryTableInfo, Arc<CatalogColumn>), TranslationError> {
        let symbols = self.builder.symbols();
        if column.is_qualified() {
            return symbols.resolve_qualified(&column.path, &column.name);
        }
        symbols
            .resolve_unqualified(&column.name)?
            .ok_or_else(|| TranslationError::unknown(ReferenceKind::Column, column.name.clone()))
    }

    /// Resolve and bind a column reference. Unqualified names that are not a
    /// table column fall back to select-list aliases, then to computed items.
    pub fn resolve_column(&mut self, column: &Column) -> Result<QueryColumnInfo, TranslationError> {
        if !column.is_qualified() && self.builder.symbols().resolve_unqualified(&column.name)?.is_none() {
            if let Some(aliased) = self.builder.symbols().label(&column.name) {
                return Ok(aliased.clone());
            }
            let pattern = QualifiedName::pattern(None, None, None, Some(&column.name))?;
            return self
                .builder
                .symbols()
                .columns()
                .get(&pattern)?
                .cloned()
                .ok_or_else(|| TranslationError::unknown(ReferenceKind::Column, column.name.clone()));
        }
        let (table, base) = self.locate_column(column)?;
        self.builder.bind_column(&table, base)
    }
}
