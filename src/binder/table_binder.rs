use tracing::trace;

use crate::{
    binder::{ColumnBinder, TypeFilters},
    builder::TableBlock,
    catalog::CatalogObject,
    graph::{Expression, GroupPattern, PatternElement, TriplePattern, Variable},
    query::{QueryColumnInfo, QueryTableInfo},
    translator::{TranslationError, TranslatorConfig},
};

/// Turns a table block into graph patterns.
pub struct TableBinder;

impl TableBinder {
    /// The table's own template, with the table variable as subject.
    pub fn table_triples(table: &QueryTableInfo) -> Result<Vec<TriplePattern>, TranslationError> {
        match table.base().segment() {
            Some(segment) => segment.instantiate(table.variable(), None),
            None => Ok(Vec::new()),
        }
    }

    /// The column's template, subject = table variable. When `object` is given the
    /// column's own variable is replaced by it after instantiation, so helper
    /// nodes stay named after the column.
    pub fn column_triples(
        table: &QueryTableInfo,
        column: &QueryColumnInfo,
        object: Option<&Variable>,
    ) -> Result<Vec<TriplePattern>, TranslationError> {
        let Some(segment) = column.base().segment() else {
            return Ok(Vec::new());
        };
        let triples = segment.instantiate(table.variable(), Some(column.variable()))?;
        Ok(match object {
            Some(outer) => triples.iter().map(|t| t.substitute(column.variable(), outer)).collect(),
            None => triples,
        })
    }

    /// `OPTIONAL { column triples . type filter . coercion }` for a nullable column.
    pub fn optional_column_block(
        table: &QueryTableInfo,
        column: &QueryColumnInfo,
        config: &TranslatorConfig,
    ) -> Result<GroupPattern, TranslationError> {
        let mut group = GroupPattern::new();
        for triple in Self::column_triples(table, column, None)? {
            group.push_triple(triple);
        }
        for element in TypeFilters::column_filters(column, config) {
            group.push(element);
        }
        Ok(group)
    }

    /// The whole block: table template, every required column, equality
    /// bindings, lazily attached optional columns, block filters, then the
    /// per-column filters of referenced required columns.
    pub fn render(block: &TableBlock, config: &TranslatorConfig) -> Result<PatternElement, TranslationError> {
        let table = block.table();
        let mut group = GroupPattern::new();
        for triple in Self::table_triples(table)? {
            group.push_triple(triple);
        }

        let mut binds = Vec::new();
        for column in table.base().columns() {
            let info = ColumnBinder::bind(table, column.clone(), None, &config.variable_prefix)?;
            if !block.is_required(&info) {
                continue;
            }
            let outer = block.equals_for(info.identity());
            for triple in Self::column_triples(table, &info, outer)? {
                group.push_triple(triple);
            }
            if let Some(outer) = outer {
                binds.push(PatternElement::Bind {
                    expression: Expression::var(outer),
                    variable: info.variable().clone(),
                });
            }
        }
        for bind in binds {
            group.push(bind);
        }

        for column in block.columns().filter(|c| !block.is_required(c)) {
            trace!(table = %table.name(), column = %column.name(), "optional column block");
            group.push(PatternElement::Optional(Self::optional_column_block(table, column, config)?));
        }
        for filter in block.filters() {
            group.push_filter(filter.clone());
        }
        for column in block.columns().filter(|c| block.is_required(c)) {
            for element in TypeFilters::column_filters(column, config) {
                group.push(element);
            }
        }

        Ok(if block.optional() { PatternElement::Optional(group) } else { PatternElement::Group(group) })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        catalog::{CatalogColumn, CatalogTable, QuerySegment, SqlType},
        names::QualifiedName,
    };

    fn people() -> Arc<CatalogTable> {
        let name = QualifiedName::table_name("db", "main", "people").unwrap();
        let mut table = CatalogTable::new(name.clone(), Some(QuerySegment::parse_table("people", "%1$s a ex:Person").unwrap()));
        let columns = [
            ("id", SqlType::Integer, false, "%1$s ex:id %2$s"),
            ("name", SqlType::Varchar, false, "%1$s ex:name %2$s"),
            ("email", SqlType::Varchar, true, "%1$s ex:contact ?c . ?c ex:email %2$s"),
        ];
        for (column, sql_type, nullable, template) in columns {
            table
                .add_column(
                    CatalogColumn::new(name.child_column(column).unwrap(), sql_type)
                        .with_nullable(nullable)
                        .with_segment(QuerySegment::parse_column(column, template).unwrap()),
                )
                .unwrap();
        }
        Arc::new(table)
    }

    fn block(optional: bool) -> TableBlock {
        let table = people();
        let name = table.name().clone();
        TableBlock::new(QueryTableInfo::new(table, name.clone(), optional, name.guid(), "v"))
    }

    fn column(block: &TableBlock, name: &str) -> QueryColumnInfo {
        let table = block.table();
        let base = table.base().column(name).unwrap().clone();
        ColumnBinder::bind(table, base, None, "v").unwrap()
    }

    fn body(element: PatternElement) -> GroupPattern {
        match element {
            PatternElement::Group(g) | PatternElement::Optional(g) => g,
            other => panic!("expected a group, got {:?}", other),
        }
    }

    #[test]
    fn required_block_holds_required_columns_only() {
        let block = block(false);
        let group = body(TableBinder::render(&block, &TranslatorConfig::raw()).unwrap());
        assert_eq!(group.triples().count(), 3);
        assert_eq!(group.optionals().count(), 0);
        assert!(matches!(TableBinder::render(&block, &TranslatorConfig::raw()).unwrap(), PatternElement::Group(_)));
    }

    #[test]
    fn nullable_column_is_attached_only_when_referenced() {
        let mut block = block(true);
        let email = column(&block, "email");
        block.reference(email.clone());
        let rendered = TableBinder::render(&block, &TranslatorConfig::new()).unwrap();
        assert!(matches!(rendered, PatternElement::Optional(_)));
        let group = body(rendered);
        let optional: Vec<&GroupPattern> = group.optionals().collect();
        assert_eq!(optional.len(), 1);
        assert_eq!(optional[0].triples().count(), 2);
        assert_eq!(optional[0].filters().count(), 1);
        let helper = format!("?{}_h_c", email.variable().name());
        assert!(optional[0].to_string().contains(&helper));
    }

    #[test]
    fn set_equals_reuses_the_outer_variable() {
        let mut block = block(true);
        let id = column(&block, "id");
        let outer = Variable::new("outer");
        block.reference(id.clone());
        block.set_equals(id.identity(), outer.clone());
        block.add_filter(Expression::Bound(id.variable().clone()));
        let group = body(TableBinder::render(&block, &TranslatorConfig::raw()).unwrap());
        let text = group.to_string();
        assert!(text.contains("ex:id ?outer ."));
        assert!(text.contains(&format!("BIND(?outer AS {})", id.variable())));
        assert!(text.contains(&format!("FILTER (BOUND({}))", id.variable())));
    }

    #[test]
    fn aliases_do_not_duplicate_type_filters() {
        let mut block = block(false);
        let id = column(&block, "id");
        block.reference(id.clone());
        block.reference(id.aliased(QualifiedName::pattern(None, None, Some("people"), Some("pid")).unwrap()));
        let group = body(TableBinder::render(&block, &TranslatorConfig::new()).unwrap());
        assert_eq!(group.filters().count(), 1);
    }
}
