use std::collections::HashSet;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::{
    graph::{Expression, Variable},
    query::{QueryColumnInfo, QueryTableInfo},
};

/// Position of a table's block in the assembled pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub(crate) usize);

impl BlockId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Everything one FROM/JOIN table contributes to the WHERE clause. Created
/// empty when the table is registered so blocks keep declaration order, and
/// filled as columns are referenced.
#[derive(Debug, Clone)]
pub struct TableBlock {
    table: QueryTableInfo,
    columns: IndexMap<Uuid, QueryColumnInfo>,
    equals: IndexMap<Uuid, Variable>,
    promoted: HashSet<Uuid>,
    filters: Vec<Expression>,
}

impl TableBlock {
    pub fn new(table: QueryTableInfo) -> Self {
        Self { table, columns: IndexMap::new(), equals: IndexMap::new(), promoted: HashSet::new(), filters: Vec::new() }
    }

    pub fn table(&self) -> &QueryTableInfo {
        &self.table
    }

    pub fn optional(&self) -> bool {
        self.table.optional()
    }

    /// Record a referenced column; later aliases of the same column are no-ops.
    pub fn reference(&mut self, column: QueryColumnInfo) {
        self.columns.entry(column.identity()).or_insert(column);
    }

    pub fn columns(&self) -> impl Iterator<Item = &QueryColumnInfo> {
        self.columns.values()
    }

    pub fn is_referenced(&self, identity: Uuid) -> bool {
        self.columns.contains_key(&identity)
    }

    /// Bind the column's object position to `outer` instead of its own variable.
    pub fn set_equals(&mut self, identity: Uuid, outer: Variable) {
        self.equals.insert(identity, outer);
        self.promoted.insert(identity);
    }

    pub fn equals_for(&self, identity: Uuid) -> Option<&Variable> {
        self.equals.get(&identity)
    }

    /// Move a nullable column from its own optional sub-block into the block body.
    pub fn promote(&mut self, identity: Uuid) {
        self.promoted.insert(identity);
    }

    pub fn is_promoted(&self, identity: Uuid) -> bool {
        self.promoted.contains(&identity)
    }

    /// Columns whose triples go into the block body rather than an optional sub-block.
    pub fn is_required(&self, column: &QueryColumnInfo) -> bool {
        !column.base().nullable() || self.is_promoted(column.identity())
    }

    pub fn add_filter(&mut self, filter: Expression) {
        self.filters.push(filter);
    }

    pub fn filters(&self) -> &[Expression] {
        &self.filters
    }
}
