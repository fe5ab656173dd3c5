use std::{collections::HashSet, sync::Arc};

use tracing::debug;

use crate::{
    binder::{ColumnBinder, TableBinder},
    builder::{BlockId, TableBlock},
    catalog::{CatalogColumn, CatalogTable, SqlType},
    graph::{
        Expression, GraphQuery, GroupCondition, GroupPattern, OrderCondition, PatternElement, ProjectVariable, Variable,
    },
    names::QualifiedName,
    query::{QueryColumnInfo, QuerySymbolSet, QueryTableInfo, ResultColumn},
    translator::{ReferenceKind, TranslationError, Translation, TranslatorConfig},
};

/// An ORDER BY key: a result column (by 0-based position) or an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderKey {
    Position(usize),
    Expression(Expression),
}

/// Mutable assembler for one SELECT (or one UNION of SELECTs).
pub struct QueryBuilder {
    config: TranslatorConfig,
    symbols: QuerySymbolSet,
    blocks: Vec<TableBlock>,
    filters: Vec<Expression>,
    group_by: Vec<Expression>,
    having: Option<Expression>,
    order_by: Vec<(OrderKey, bool)>,
    distinct: bool,
    limit: Option<u64>,
    offset: Option<u64>,
    union: Option<(Vec<QueryBuilder>, bool)>,
}

impl QueryBuilder {
    pub fn new(config: &TranslatorConfig) -> Self {
        Self {
            config: config.clone(),
            symbols: QuerySymbolSet::new(&config.variable_prefix),
            blocks: Vec::new(),
            filters: Vec::new(),
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            distinct: false,
            limit: None,
            offset: None,
            union: None,
        }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn symbols(&self) -> &QuerySymbolSet {
        &self.symbols
    }

    /// Register a table and open its (still empty) block.
    pub fn add_table(
        &mut self,
        table: Arc<CatalogTable>,
        local_name: QualifiedName,
        optional: bool,
    ) -> Result<(QueryTableInfo, BlockId), TranslationError> {
        let info = self.symbols.add_table(table, local_name, optional)?;
        self.blocks.push(TableBlock::new(info.clone()));
        Ok((info, BlockId(self.blocks.len() - 1)))
    }

    pub fn block(&self, id: BlockId) -> Option<&TableBlock> {
        self.blocks.get(id.0)
    }

    pub fn block_of(&self, table: &QueryTableInfo) -> Result<BlockId, TranslationError> {
        self.blocks
            .iter()
            .position(|b| b.table() == table)
            .map(BlockId)
            .ok_or_else(|| TranslationError::unknown(ReferenceKind::Table, table.name().to_string()))
    }

    fn block_mut(&mut self, id: BlockId) -> Result<&mut TableBlock, TranslationError> {
        self.blocks
            .get_mut(id.0)
            .ok_or_else(|| TranslationError::unknown(ReferenceKind::Table, format!("block #{}", id.0)))
    }

    /// Bind a column of a registered table and mark it referenced in its block.
    pub fn bind_column(
        &mut self,
        table: &QueryTableInfo,
        column: Arc<CatalogColumn>,
    ) -> Result<QueryColumnInfo, TranslationError> {
        let info = ColumnBinder::bind(table, column, None, &self.config.variable_prefix)?;
        self.symbols.add_column(info.clone())?;
        let id = self.block_of(table)?;
        self.block_mut(id)?.reference(info.clone());
        Ok(info)
    }

    /// Register a select-list alias for `column`. The alias shares the variable.
    pub fn bind_alias(&mut self, column: &QueryColumnInfo, alias: &str) -> Result<QueryColumnInfo, TranslationError> {
        self.symbols.add_label(alias, column)
    }

    /// Register a computed select item behind a synthetic column.
    pub fn add_computed(
        &mut self,
        position: usize,
        expression: Expression,
        sql_type: SqlType,
        nullable: bool,
    ) -> Result<QueryColumnInfo, TranslationError> {
        let name = QualifiedName::pattern(None, None, None, Some(&format!("expr{}", position)))?;
        let base = Arc::new(CatalogColumn::synthetic(name.clone(), sql_type, nullable));
        let info = QueryColumnInfo::computed(base, name, expression, &self.config.variable_prefix);
        self.symbols.add_column(info.clone())?;
        Ok(info)
    }

    pub fn set_equals(&mut self, id: BlockId, column: &QueryColumnInfo, outer: Variable) -> Result<(), TranslationError> {
        self.block_mut(id)?.set_equals(column.identity(), outer);
        Ok(())
    }

    pub fn promote(&mut self, id: BlockId, column: &QueryColumnInfo) -> Result<(), TranslationError> {
        self.block_mut(id)?.promote(column.identity());
        Ok(())
    }

    pub fn add_block_filter(&mut self, id: BlockId, filter: Expression) -> Result<(), TranslationError> {
        self.block_mut(id)?.add_filter(filter);
        Ok(())
    }

    /// The expression carrying the column's relational value.
    pub fn value_expression(&self, column: &QueryColumnInfo) -> Expression {
        ColumnBinder::value_expression(column, &self.config)
    }

    pub fn add_projection(&mut self, column: &QueryColumnInfo, alias: Option<&str>) -> Result<(), TranslationError> {
        self.symbols.add_result(column, alias)
    }

    /// AND-ed with every filter added before.
    pub fn add_filter(&mut self, filter: Expression) {
        self.filters.push(filter);
    }

    pub fn add_group_by(&mut self, expression: Expression) {
        self.group_by.push(expression);
    }

    pub fn set_having(&mut self, having: Expression) {
        self.having = Some(having);
    }

    pub fn add_order_by(&mut self, key: OrderKey, ascending: bool) {
        self.order_by.push((key, ascending));
    }

    pub fn set_distinct(&mut self, distinct: bool) {
        self.distinct = distinct;
    }

    pub fn set_limit(&mut self, limit: u64) {
        self.limit = Some(limit);
    }

    pub fn set_offset(&mut self, offset: u64) {
        self.offset = Some(offset);
    }

    /// Turn this builder into the union of `branches`, each already filled.
    pub fn union(&mut self, branches: Vec<QueryBuilder>, all: bool) {
        self.union = Some((branches, all));
    }

    /// Result columns, labels settled, in select-list order.
    pub fn result_columns(&self) -> Result<Vec<ResultColumn>, TranslationError> {
        match &self.union {
            Some((branches, _)) => match branches.first() {
                Some(first) => first.result_columns(),
                None => Ok(Vec::new()),
            },
            None => Ok(self.symbols.result_columns()?.into_iter().map(|(_, c)| c).collect()),
        }
    }

    pub fn build(&self) -> Result<Translation, TranslationError> {
        if let Some((branches, all)) = &self.union {
            return self.build_union(branches, *all);
        }
        let results = self.symbols.result_columns()?;
        if results.is_empty() {
            return TranslationError::unsupported("SELECT without any result column").err();
        }

        let mut query = GraphQuery {
            prefixes: self.config.prefixes.clone(),
            distinct: self.distinct,
            limit: self.limit,
            offset: self.offset,
            ..GraphQuery::default()
        };
        for block in &self.blocks {
            query.pattern.push(TableBinder::render(block, &self.config)?);
        }
        query.filters = self.filters.clone();
        query.projection = results
            .iter()
            .map(|(info, column)| ProjectVariable {
                variable: column.variable.clone(),
                expression: Some(self.value_expression(info)),
            })
            .collect();
        let columns: Vec<ResultColumn> = results.into_iter().map(|(_, c)| c).collect();

        let groups = self.group_conditions(&columns);
        for project in &mut query.projection {
            if let Some(expression) = &mut project.expression {
                *expression = Self::read_group_keys(expression, &groups);
            }
        }
        self.check_grouping(&groups, &query.projection, &columns)?;
        query.having = self.having.as_ref().map(|h| Self::read_group_keys(h, &groups));
        query.order_by = self.order_conditions(&columns, &groups)?;
        query.group_by = groups;

        debug!(
            tables = self.blocks.len(),
            filters = query.filters.len(),
            columns = ?columns.iter().map(|c| c.label.as_str()).collect::<Vec<_>>(),
            "assembled graph query"
        );
        Ok(Translation::new(query, columns))
    }

    /// GROUP BY keys. A plain variable groups as itself; any other key is bound
    /// to a fresh variable.
    fn group_conditions(&self, columns: &[ResultColumn]) -> Vec<GroupCondition> {
        let mut taken: HashSet<String> = columns.iter().map(|c| c.variable.name().to_string()).collect();
        let mut n = 0;
        self.group_by
            .iter()
            .map(|expression| {
                let variable = match expression {
                    Expression::Variable(_) => None,
                    _ => loop {
                        n += 1;
                        let candidate = format!("{}group{}", self.config.variable_prefix, n);
                        if taken.insert(candidate.clone()) {
                            break Some(Variable::new(candidate));
                        }
                    },
                };
                GroupCondition { expression: expression.clone(), variable }
            })
            .collect()
    }

    /// `expression` with every computed group key read from its bound variable.
    fn read_group_keys(expression: &Expression, groups: &[GroupCondition]) -> Expression {
        groups.iter().fold(expression.clone(), |e, group| match &group.variable {
            Some(variable) => e.substitute(&group.expression, &Expression::var(variable)),
            None => e,
        })
    }

    /// Outside aggregates, a grouped query may only project group keys.
    fn check_grouping(
        &self,
        groups: &[GroupCondition],
        projection: &[ProjectVariable],
        columns: &[ResultColumn],
    ) -> Result<(), TranslationError> {
        let aggregated = projection.iter().any(|p| p.expression.as_ref().is_some_and(Expression::contains_aggregate));
        if groups.is_empty() && !aggregated {
            return Ok(());
        }
        let keys: HashSet<&Variable> = groups
            .iter()
            .filter_map(|g| match (&g.variable, &g.expression) {
                (Some(variable), _) | (None, Expression::Variable(variable)) => Some(variable),
                _ => None,
            })
            .collect();
        for (project, column) in projection.iter().zip(columns) {
            let Some(expression) = &project.expression else { continue };
            if expression.contains_aggregate() {
                continue;
            }
            if !expression.variables().iter().all(|v| keys.contains(v)) {
                return TranslationError::unsupported(format!(
                    "`{}` must appear in GROUP BY or inside an aggregate",
                    column.label
                ))
                .err();
            }
        }
        Ok(())
    }

    fn order_conditions(
        &self,
        columns: &[ResultColumn],
        groups: &[GroupCondition],
    ) -> Result<Vec<OrderCondition>, TranslationError> {
        self.order_by
            .iter()
            .map(|(key, ascending)| {
                let expression = match key {
                    OrderKey::Position(i) => {
                        let column = columns
                            .get(*i)
                            .ok_or_else(|| TranslationError::unknown(ReferenceKind::Label, format!("#{}", i + 1)))?;
                        Expression::var(&column.variable)
                    }
                    OrderKey::Expression(e) => Self::read_group_keys(e, groups),
                };
                Ok(OrderCondition { expression, ascending: *ascending })
            })
            .collect()
    }

    fn build_union(&self, branches: &[QueryBuilder], all: bool) -> Result<Translation, TranslationError> {
        let built = branches.iter().map(QueryBuilder::build).collect::<Result<Vec<_>, _>>()?;
        let Some(first) = built.first() else {
            return TranslationError::unsupported("UNION without branches").err();
        };
        let mut columns = first.columns.clone();
        for branch in &built[1..] {
            if branch.columns.len() != columns.len() {
                return TranslationError::unsupported(format!(
                    "UNION branches project {} and {} columns",
                    columns.len(),
                    branch.columns.len()
                ))
                .err();
            }
            for (column, other) in columns.iter_mut().zip(&branch.columns) {
                column.nullable |= other.nullable;
            }
        }

        let mut groups = Vec::with_capacity(built.len());
        for branch in built {
            let mut sub = branch.query;
            sub.prefixes.clear();
            for (project, column) in sub.projection.iter_mut().zip(&columns) {
                project.variable = column.variable.clone();
            }
            let mut group = GroupPattern::new();
            group.push(PatternElement::SubSelect(Box::new(sub)));
            groups.push(group);
        }

        let mut query = GraphQuery {
            prefixes: self.config.prefixes.clone(),
            distinct: self.distinct || !all,
            projection: columns.iter().map(|c| ProjectVariable { variable: c.variable.clone(), expression: None }).collect(),
            limit: self.limit,
            offset: self.offset,
            ..GraphQuery::default()
        };
        query.pattern.push(PatternElement::Union(groups));
        query.order_by = self.order_conditions(&columns, &[])?;
        debug!(branches = branches.len(), all, "assembled union");
        Ok(Translation::new(query, columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogObject, QuerySegment};

    fn table(name: &str, columns: &[(&str, bool)]) -> Arc<CatalogTable> {
        let table_name = QualifiedName::table_name("db", "main", name).unwrap();
        let template = format!("%1$s a ex:{}", name);
        let mut table = CatalogTable::new(table_name.clone(), Some(QuerySegment::parse_table(name, &template).unwrap()));
        for (column, nullable) in columns {
            let template = format!("%1$s ex:{} %2$s", column);
            table
                .add_column(
                    CatalogColumn::new(table_name.child_column(column).unwrap(), SqlType::Integer)
                        .with_nullable(*nullable)
                        .with_segment(QuerySegment::parse_column(column, &template).unwrap()),
                )
                .unwrap();
        }
        Arc::new(table)
    }

    #[test]
    fn projection_follows_result_order_not_binding_order() {
        let t = table("t", &[("a", false), ("b", false)]);
        let mut builder = QueryBuilder::new(&TranslatorConfig::raw());
        let (info, _) = builder.add_table(t.clone(), t.name().clone(), false).unwrap();
        let a = builder.bind_column(&info, t.columns()[0].clone()).unwrap();
        let b = builder.bind_column(&info, t.columns()[1].clone()).unwrap();
        builder.add_projection(&b, None).unwrap();

        let translation = builder.build().unwrap();
        assert_eq!(translation.labels(), vec!["b"]);
        assert_eq!(translation.query.projection[0].expression, Some(Expression::var(b.variable())));
        assert!(!translation.query.to_string().contains(&format!("AS {})", a.variable())));
    }

    #[test]
    fn grouping_rejects_loose_columns() {
        let t = table("t", &[("a", false), ("b", false)]);
        let mut builder = QueryBuilder::new(&TranslatorConfig::raw());
        let (info, _) = builder.add_table(t.clone(), t.name().clone(), false).unwrap();
        let a = builder.bind_column(&info, t.columns()[0].clone()).unwrap();
        let b = builder.bind_column(&info, t.columns()[1].clone()).unwrap();
        builder.add_projection(&a, None).unwrap();
        builder.add_projection(&b, None).unwrap();
        builder.add_group_by(builder.value_expression(&a));
        assert!(matches!(builder.build(), Err(TranslationError::UnsupportedConstruct(_))));
    }

    #[test]
    fn computed_group_keys_are_projected_through_their_variable() {
        let t = table("t", &[("a", false), ("b", false)]);
        let mut builder = QueryBuilder::new(&TranslatorConfig::raw());
        let (info, _) = builder.add_table(t.clone(), t.name().clone(), false).unwrap();
        let a = builder.bind_column(&info, t.columns()[0].clone()).unwrap();
        let key = Expression::call("STR", vec![builder.value_expression(&a)]);
        let computed = builder.add_computed(1, key.clone(), SqlType::Varchar, false).unwrap();
        builder.add_projection(&computed, Some("label")).unwrap();
        builder.add_group_by(key.clone());

        let translation = builder.build().unwrap();
        let group = &translation.query.group_by[0];
        let variable = group.variable.clone().unwrap();
        assert_eq!(group.expression, key);
        assert_eq!(translation.query.projection[0].expression, Some(Expression::var(&variable)));
        assert!(translation.text().contains(&format!("GROUP BY ({} AS {})", key, variable)));

        // grouping by a computed key does not make its inputs group keys
        builder.add_projection(&a, None).unwrap();
        assert!(matches!(builder.build(), Err(TranslationError::UnsupportedConstruct(_))));
    }

    #[test]
    fn union_renames_branch_projections() {
        let config = TranslatorConfig::raw();
        let t = table("t", &[("a", false)]);
        let u = table("u", &[("z", true)]);

        let mut left = QueryBuilder::new(&config);
        let (ti, _) = left.add_table(t.clone(), t.name().clone(), false).unwrap();
        let a = left.bind_column(&ti, t.columns()[0].clone()).unwrap();
        left.add_projection(&a, None).unwrap();

        let mut right = QueryBuilder::new(&config);
        let (ui, _) = right.add_table(u.clone(), u.name().clone(), false).unwrap();
        let z = right.bind_column(&ui, u.columns()[0].clone()).unwrap();
        right.add_projection(&z, None).unwrap();

        let mut builder = QueryBuilder::new(&config);
        builder.union(vec![left, right], false);
        builder.add_order_by(OrderKey::Position(0), true);
        let translation = builder.build().unwrap();

        assert!(translation.query.distinct);
        assert_eq!(translation.labels(), vec!["a"]);
        assert!(translation.columns[0].nullable);
        let text = translation.text();
        assert_eq!(text.matches("AS ?a)").count(), 2);
        assert!(text.contains("UNION"));
        assert!(text.contains("ORDER BY ASC(?a)"));
    }

    #[test]
    fn union_branches_must_agree_on_arity() {
        let config = TranslatorConfig::raw();
        let t = table("t", &[("a", false), ("b", false)]);
        let mut branches = Vec::new();
        for width in [1, 2] {
            let mut branch = QueryBuilder::new(&config);
            let (info, _) = branch.add_table(t.clone(), t.name().clone(), false).unwrap();
            for column in &t.columns()[..width] {
                let bound = branch.bind_column(&info, column.clone()).unwrap();
                branch.add_projection(&bound, None).unwrap();
            }
            branches.push(branch);
        }
        let mut builder = QueryBuilder::new(&config);
        builder.union(branches, true);
        assert!(matches!(builder.build(), Err(TranslationError::UnsupportedConstruct(_))));
    }
}
