use crate::{
    builder::{OrderKey, QueryBuilder},
    query::ResultColumn,
    sql::ast::{Literal, OrderBy, ScalarExpr},
    translator::{Clause, ReferenceKind, ScalarTranslator, TranslationContext, TranslationError},
};

pub struct OrderByResolver;

impl OrderByResolver {
    pub fn resolve(order_bys: &[OrderBy], ctx: &mut TranslationContext) -> Result<(), TranslationError> {
        let results = ctx.builder.result_columns()?;
        for order_by in order_bys {
            let key = match Self::output_position(&order_by.expr, &results)? {
                Some(position) => OrderKey::Position(position),
                None => OrderKey::Expression(ScalarTranslator::translate(&order_by.expr, ctx, Clause::OrderBy)?.expression),
            };
            ctx.builder.add_order_by(key, order_by.ascending);
        }
        Ok(())
    }

    /// A union can only be ordered by its output columns.
    pub fn resolve_union(order_bys: &[OrderBy], builder: &mut QueryBuilder) -> Result<(), TranslationError> {
        let results = builder.result_columns()?;
        for order_by in order_bys {
            let Some(position) = Self::output_position(&order_by.expr, &results)? else {
                return TranslationError::unsupported(format!(
                    "ORDER BY `{}` on a UNION must name an output column",
                    order_by.expr
                ))
                .err();
            };
            builder.add_order_by(OrderKey::Position(position), order_by.ascending);
        }
        Ok(())
    }

    /// 0-based output position for a 1-based ordinal or a bare output label
    /// (case-insensitive).
    fn output_position(expr: &ScalarExpr, results: &[ResultColumn]) -> Result<Option<usize>, TranslationError> {
        match expr {
            ScalarExpr::Literal(Literal::Int(value)) => {
                if *value < 1 || *value as usize > results.len() {
                    return Err(TranslationError::unknown(
                        ReferenceKind::Label,
                        format!("ORDER BY position {} out of range [1..{}]", value, results.len()),
                    ));
                }
                Ok(Some(*value as usize - 1))
            }
            ScalarExpr::Column(column) if !column.is_qualified() => {
                Ok(results.iter().position(|r| r.label.eq_ignore_ascii_case(&column.name)))
            }
            _ => Ok(None),
        }
    }
}
