use tracing::trace;

use crate::{
    graph::Expression,
    sql::ast::{Literal, Query, ScalarExpr},
    translator::{
        Clause, JoinRewriter, OrderByResolver, PredicateTranslator, ProjectionResolver, ReferenceKind,
        ScalarTranslator, TranslationContext, TranslationError,
    },
};

/// Drives one plain SELECT through the builder, clause by clause.
pub struct SelectTranslator;

impl SelectTranslator {
    pub fn translate(query: &Query, ctx: &mut TranslationContext) -> Result<(), TranslationError> {
        // 1) FROM and JOIN tables, in declaration order
        let join_blocks = ctx.build_from_query(query)?;
        trace!(tables = ctx.builder.symbols().tables().len(), "FROM bound");

        // 2) ON conditions
        for (join, block) in query.joins.iter().zip(join_blocks) {
            JoinRewriter::rewrite(join, block, ctx)?;
        }

        // 3) WHERE
        if let Some(criteria) = &query.criteria {
            let filter = PredicateTranslator::translate(criteria, ctx, Clause::Where)?;
            ctx.builder.add_filter(filter);
        }

        // 4) select list
        ProjectionResolver::resolve(&query.projection, ctx)?;
        trace!(results = ctx.builder.symbols().result_count(), "select list bound");

        // 5) GROUP BY / HAVING
        for key in &query.group_by {
            let expression = Self::group_key(key, ctx)?;
            ctx.builder.add_group_by(expression);
        }
        if let Some(having) = &query.having {
            let having = PredicateTranslator::translate(having, ctx, Clause::Having)?;
            ctx.builder.set_having(having);
        }

        // 6) ORDER BY, DISTINCT, LIMIT/OFFSET
        OrderByResolver::resolve(&query.order_by, ctx)?;
        ctx.builder.set_distinct(query.distinct);
        if let Some(limit) = query.limit {
            ctx.builder.set_limit(Self::row_count(limit, "LIMIT")?);
        }
        if let Some(offset) = query.offset {
            ctx.builder.set_offset(Self::row_count(offset, "OFFSET")?);
        }
        Ok(())
    }

    /// A grouping key: a 1-based select position, or any non-aggregate expression.
    fn group_key(key: &ScalarExpr, ctx: &mut TranslationContext) -> Result<Expression, TranslationError> {
        if let ScalarExpr::Literal(Literal::Int(position)) = key {
            let results = ctx.builder.symbols().result_columns()?;
            let index = usize::try_from(*position).ok().and_then(|p| p.checked_sub(1));
            let Some((column, _)) = index.and_then(|i| results.get(i)) else {
                return Err(TranslationError::unknown(
                    ReferenceKind::Label,
                    format!("GROUP BY position {} out of range [1..{}]", position, results.len()),
                ));
            };
            if column.expression().is_some_and(Expression::contains_aggregate) {
                return TranslationError::unsupported(format!("GROUP BY {} names an aggregate", position)).err();
            }
            return Ok(ctx.builder.value_expression(column));
        }
        let expression = ScalarTranslator::translate(key, ctx, Clause::GroupBy)?.expression;
        if expression.contains_aggregate() {
            return TranslationError::unsupported(format!("GROUP BY `{}` names an aggregate", key)).err();
        }
        Ok(expression)
    }

    pub fn row_count(value: i64, clause: &str) -> Result<u64, TranslationError> {
        u64::try_from(value).map_err(|_| TranslationError::unsupported(format!("negative {} {}", clause, value)))
    }
}
