use crate::{
    graph::{CompareOp, Expression, GraphLiteral},
    sql::ast::{ComparatorOp, Literal, Predicate, ScalarExpr},
    translator::{Clause, LikeTranslator, ScalarTranslator, TranslationContext, TranslationError},
};

pub struct PredicateTranslator;

impl PredicateTranslator {
    pub fn translate(
        predicate: &Predicate,
        ctx: &mut TranslationContext,
        clause: Clause,
    ) -> Result<Expression, TranslationError> {
        match predicate {
            Predicate::And(parts) => {
                let parts = Self::translate_all(parts, ctx, clause)?;
                Ok(Expression::and_all(parts).unwrap_or_else(|| Self::constant(true)))
            }
            Predicate::Or(parts) => {
                let parts = Self::translate_all(parts, ctx, clause)?;
                Ok(Expression::or_all(parts).unwrap_or_else(|| Self::constant(false)))
            }
            Predicate::Not(inner) => Ok(Expression::not(Self::translate(inner, ctx, clause)?)),
            Predicate::Compare { left, op, right } => {
                let (left, right) = Self::operands(left, right, ctx, clause)?;
                Ok(Expression::compare(Self::compare_op(*op), left, right))
            }
            Predicate::IsNull { expr, negated } => {
                let ScalarExpr::Column(column) = expr else {
                    return TranslationError::unsupported(format!("IS NULL on `{}`", expr)).err();
                };
                let info = ctx.resolve_column(column)?;
                if info.expression().is_some() {
                    return TranslationError::unsupported(format!("IS NULL on computed column `{}`", column)).err();
                }
                let bound = Expression::Bound(info.variable().clone());
                Ok(if *negated { bound } else { Expression::not(bound) })
            }
            Predicate::InList { expr, list, negated } => {
                let value = ScalarTranslator::translate(expr, ctx, clause)?;
                let list = list
                    .iter()
                    .map(|item| ScalarTranslator::translate_as(item, value.sql_type, ctx, clause).map(|t| t.expression))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Expression::In { expr: Box::new(value.expression), list, negated: *negated })
            }
            Predicate::Like { expr, pattern, negated } => {
                let ScalarExpr::Literal(Literal::String(pattern)) = pattern else {
                    return TranslationError::unsupported(format!("LIKE pattern `{}` is not a string literal", pattern)).err();
                };
                let value = ScalarTranslator::translate(expr, ctx, clause)?;
                LikeTranslator::translate(value.expression, pattern, *negated)
            }
            Predicate::Between { expr, low, high, negated } => {
                let value = ScalarTranslator::translate(expr, ctx, clause)?;
                let low = ScalarTranslator::translate_as(low, value.sql_type, ctx, clause)?;
                let high = ScalarTranslator::translate_as(high, value.sql_type, ctx, clause)?;
                let range = Expression::And(vec![
                    Expression::compare(CompareOp::GtEq, value.expression.clone(), low.expression),
                    Expression::compare(CompareOp::LtEq, value.expression, high.expression),
                ]);
                Ok(if *negated { Expression::not(range) } else { range })
            }
            Predicate::Exists { .. } => TranslationError::unsupported("EXISTS").err(),
            Predicate::InSubQuery { .. } => TranslationError::unsupported("IN (subquery)").err(),
            Predicate::Const(value) => Ok(Self::constant(*value)),
        }
    }

    fn translate_all(
        parts: &[Predicate],
        ctx: &mut TranslationContext,
        clause: Clause,
    ) -> Result<Vec<Expression>, TranslationError> {
        parts.iter().map(|p| Self::translate(p, ctx, clause)).collect()
    }

    /// Both sides of a comparison, reading a string literal on either side
    /// with the other side's type when that type is temporal.
    fn operands(
        left: &ScalarExpr,
        right: &ScalarExpr,
        ctx: &mut TranslationContext,
        clause: Clause,
    ) -> Result<(Expression, Expression), TranslationError> {
        if matches!(left, ScalarExpr::Literal(_)) && !matches!(right, ScalarExpr::Literal(_)) {
            let right = ScalarTranslator::translate(right, ctx, clause)?;
            let left = ScalarTranslator::translate_as(left, right.sql_type, ctx, clause)?;
            return Ok((left.expression, right.expression));
        }
        let left = ScalarTranslator::translate(left, ctx, clause)?;
        let right = ScalarTranslator::translate_as(right, left.sql_type, ctx, clause)?;
        Ok((left.expression, right.expression))
    }

    fn constant(value: bool) -> Expression {
        Expression::Literal(GraphLiteral::boolean(value))
    }

    fn compare_op(op: ComparatorOp) -> CompareOp {
        match op {
            ComparatorOp::Eq => CompareOp::Eq,
            ComparatorOp::NotEq => CompareOp::NotEq,
            ComparatorOp::Lt => CompareOp::Lt,
            ComparatorOp::LtEq => CompareOp::LtEq,
            ComparatorOp::Gt => CompareOp::Gt,
            ComparatorOp::GtEq => CompareOp::GtEq,
        }
    }
}
