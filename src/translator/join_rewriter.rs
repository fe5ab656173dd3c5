use tracing::debug;

use crate::{
    builder::BlockId,
    graph::{Expression, Variable},
    sql::ast::{ComparatorOp, Join, JoinType, Predicate, ScalarExpr},
    translator::{Clause, PredicateTranslator, ReferenceKind, TranslationContext, TranslationError},
};

/// Folds JOIN ... ON conditions into the query. Inner conditions become
/// ordinary filters; a LEFT JOIN condition moves into the joined table's
/// optional block so unmatched rows survive.
pub struct JoinRewriter;

impl JoinRewriter {
    pub fn rewrite(join: &Join, block: BlockId, ctx: &mut TranslationContext) -> Result<(), TranslationError> {
        match (join.join_type, &join.predicate) {
            (JoinType::Left, Some(predicate)) => Self::left_outer(predicate, block, ctx),
            (JoinType::Left, None) => TranslationError::unsupported("LEFT JOIN without ON").err(),
            (_, Some(predicate)) => {
                let filter = PredicateTranslator::translate(predicate, ctx, Clause::JoinOn)?;
                ctx.builder.add_filter(filter);
                Ok(())
            }
            (_, None) => Ok(()),
        }
    }

    fn left_outer(predicate: &Predicate, block: BlockId, ctx: &mut TranslationContext) -> Result<(), TranslationError> {
        let Predicate::Compare { left: ScalarExpr::Column(a), op: ComparatorOp::Eq, right: ScalarExpr::Column(b) } = predicate
        else {
            return TranslationError::unsupported("LEFT JOIN ... ON must be a single column equality").err();
        };
        let joined = ctx
            .builder
            .block(block)
            .map(|b| b.table().clone())
            .ok_or_else(|| TranslationError::unknown(ReferenceKind::Table, format!("block #{}", block.index())))?;

        let first = ctx.locate_column(a)?;
        let second = ctx.locate_column(b)?;
        let ((own_table, own_column), (outer_table, outer_column)) = match (first.0 == joined, second.0 == joined) {
            (true, false) => (first, second),
            (false, true) => (second, first),
            _ => {
                return TranslationError::unsupported(format!(
                    "LEFT JOIN ... ON must compare `{}` with an earlier table",
                    joined.name()
                ))
                .err()
            }
        };
        if ctx.builder.block_of(&outer_table)?.index() > block.index() {
            return TranslationError::unsupported(format!(
                "LEFT JOIN ... ON references `{}`, joined later",
                outer_table.name()
            ))
            .err();
        }

        let own = ctx.builder.bind_column(&own_table, own_column)?;
        let outer = ctx.builder.bind_column(&outer_table, outer_column)?;
        let own_var: Variable = own.variable().clone();
        let outer_var: Variable = outer.variable().clone();

        if outer.optional() {
            // the outer value may itself be missing; match only when it is bound
            debug!(joined = %joined.name(), outer = %outer.name(), "LEFT JOIN on a nullable column");
            ctx.builder.promote(block, &own)?;
            ctx.builder.add_block_filter(
                block,
                Expression::And(vec![
                    Expression::Bound(outer_var.clone()),
                    Expression::equals(Expression::var(&outer_var), Expression::var(&own_var)),
                ]),
            )?;
        } else {
            debug!(joined = %joined.name(), outer = %outer.name(), "LEFT JOIN on a required column");
            ctx.builder.set_equals(block, &own, outer_var)?;
            ctx.builder.add_block_filter(block, Expression::Bound(own_var))?;
        }
        Ok(())
    }
}
