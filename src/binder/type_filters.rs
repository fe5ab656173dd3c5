use crate::{
    binder::ColumnBinder,
    catalog::{CatalogObject, TypeConstraint},
    graph::{Expression, PatternElement},
    query::QueryColumnInfo,
    translator::TranslatorConfig,
};

/// Per-column checks that keep heterogeneous store literals out of a typed column.
pub struct TypeFilters;

impl TypeFilters {
    /// Assert the raw bound value is compatible with the column's SQL type.
    /// Columns without a template are well-typed by construction.
    pub fn type_filter(column: &QueryColumnInfo) -> Option<Expression> {
        column.base().segment()?;
        let raw = Expression::var(column.variable());
        match column.base().sql_type().constraint() {
            TypeConstraint::Datatypes(types) => Some(Expression::In {
                expr: Box::new(Expression::call("DATATYPE", vec![raw])),
                list: types.iter().map(|t| Expression::Prefixed(t.to_string())).collect(),
                negated: false,
            }),
            TypeConstraint::LiteralOrIri => Expression::or_all(vec![
                Expression::call("ISLITERAL", vec![raw.clone()]),
                Expression::call("ISIRI", vec![raw]),
            ]),
            TypeConstraint::Any => None,
        }
    }

    /// `BIND(coerce(?raw) AS ?raw_c)`, when coercion applies.
    pub fn coercion(column: &QueryColumnInfo, config: &TranslatorConfig) -> Option<PatternElement> {
        if !ColumnBinder::coerces(column, config) {
            return None;
        }
        let function = column.base().sql_type().coercion_function()?;
        Some(PatternElement::Bind {
            expression: Expression::call(function, vec![Expression::var(column.variable())]),
            variable: ColumnBinder::value_variable(column, config),
        })
    }

    /// Type filter then coercion, as configured.
    pub fn column_filters(column: &QueryColumnInfo, config: &TranslatorConfig) -> Vec<PatternElement> {
        let mut out = Vec::with_capacity(2);
        if config.type_filters {
            if let Some(filter) = Self::type_filter(column) {
                out.push(PatternElement::Filter(filter));
            }
        }
        if let Some(bind) = Self::coercion(column, config) {
            out.push(bind);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        catalog::{CatalogColumn, QuerySegment, SqlType},
        names::QualifiedName,
    };

    fn column(sql_type: SqlType, templated: bool) -> QueryColumnInfo {
        let name = QualifiedName::column_name("c", "s", "t", "x").unwrap();
        let mut base = CatalogColumn::new(name.clone(), sql_type);
        if templated {
            base = base.with_segment(QuerySegment::parse_column("x", "%1$s ex:x %2$s").unwrap());
        }
        QueryColumnInfo::new(Arc::new(base), name.clone(), false, name.guid(), "v")
    }

    #[test]
    fn integer_column_gets_datatype_filter_and_cast() {
        let info = column(SqlType::Integer, true);
        let raw = info.variable().name().to_string();
        let rendered: Vec<String> = TypeFilters::column_filters(&info, &TranslatorConfig::new())
            .iter()
            .map(|e| match e {
                PatternElement::Filter(f) => format!("FILTER {}", f),
                PatternElement::Bind { expression, variable } => format!("BIND({} AS {})", expression, variable),
                other => panic!("unexpected element {:?}", other),
            })
            .collect();
        assert_eq!(rendered.len(), 2);
        assert!(rendered[0].starts_with(&format!("FILTER (DATATYPE(?{}) IN (xsd:integer", raw)));
        assert_eq!(rendered[1], format!("BIND(xsd:integer(?{0}) AS ?{0}_c)", raw));
    }

    #[test]
    fn strings_accept_literals_or_iris() {
        let info = column(SqlType::Varchar, true);
        let filter = TypeFilters::type_filter(&info).unwrap();
        let raw = info.variable();
        assert_eq!(filter.to_string(), format!("(ISLITERAL({0}) || ISIRI({0}))", raw));
        match TypeFilters::coercion(&info, &TranslatorConfig::new()) {
            Some(PatternElement::Bind { expression, .. }) => assert_eq!(expression.to_string(), format!("STR({})", raw)),
            other => panic!("expected a bind, got {:?}", other),
        }
    }

    #[test]
    fn synthetic_and_untyped_columns_are_left_alone() {
        assert!(TypeFilters::type_filter(&column(SqlType::Integer, false)).is_none());
        assert!(TypeFilters::type_filter(&column(SqlType::Other, true)).is_none());
        assert!(TypeFilters::column_filters(&column(SqlType::Integer, true), &TranslatorConfig::raw()).is_empty());
    }
}
