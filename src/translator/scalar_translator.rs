use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    catalog::SqlType,
    functions::{FunctionCall, TypedExpression},
    graph::{ArithmeticOp as GraphArithmetic, Expression, GraphLiteral},
    sql::ast::{ArithmeticOp, Function, Literal, ScalarExpr},
    translator::{Clause, TranslationContext, TranslationError},
};

pub struct ScalarTranslator;

impl ScalarTranslator {
    pub fn translate(
        expr: &ScalarExpr,
        ctx: &mut TranslationContext,
        clause: Clause,
    ) -> Result<TypedExpression, TranslationError> {
        match expr {
            ScalarExpr::Literal(literal) => Self::literal(literal),
            ScalarExpr::Column(column) => {
                let info = ctx.resolve_column(column)?;
                let nullable = info.optional() || info.base().nullable();
                let sql_type = info.base().sql_type();
                Ok(TypedExpression::new(ctx.builder.value_expression(&info), sql_type, nullable))
            }
            ScalarExpr::Function(function) => Self::function(function, ctx, clause),
            ScalarExpr::Arithmetic { op, left, right } => {
                let left = Self::translate(left, ctx, clause)?;
                let right = Self::translate(right, ctx, clause)?;
                for side in [&left, &right] {
                    if !side.sql_type.is_numeric() && side.sql_type != SqlType::Other {
                        return TranslationError::unsupported(format!("arithmetic on {} operand", side.sql_type)).err();
                    }
                }
                Ok(TypedExpression::new(
                    Expression::Arithmetic {
                        op: Self::arithmetic_op(*op),
                        left: Box::new(left.expression),
                        right: Box::new(right.expression),
                    },
                    SqlType::promote(left.sql_type, right.sql_type),
                    left.nullable || right.nullable,
                ))
            }
            ScalarExpr::Negate(inner) => {
                let inner = Self::translate(inner, ctx, clause)?;
                Ok(TypedExpression::new(Expression::Negate(Box::new(inner.expression)), inner.sql_type, inner.nullable))
            }
            ScalarExpr::WildCard | ScalarExpr::WildCardWithCollection(_) => {
                TranslationError::unsupported(format!("`{}` outside the select list", expr)).err()
            }
            ScalarExpr::Case { .. } => TranslationError::unsupported("CASE expression").err(),
            ScalarExpr::SubQuery(_) => TranslationError::unsupported("scalar subquery").err(),
        }
    }

    /// Translate `expr` for comparison against a value of type `target`. A
    /// string literal compared with a temporal column is read as a typed date
    /// or timestamp.
    pub fn translate_as(
        expr: &ScalarExpr,
        target: SqlType,
        ctx: &mut TranslationContext,
        clause: Clause,
    ) -> Result<TypedExpression, TranslationError> {
        if let ScalarExpr::Literal(Literal::String(text)) = expr {
            if let Some(literal) = Self::temporal_literal(text, target)? {
                return Ok(TypedExpression::new(Expression::Literal(literal), target, false));
            }
        }
        Self::translate(expr, ctx, clause)
    }

    fn temporal_literal(text: &str, target: SqlType) -> Result<Option<GraphLiteral>, TranslationError> {
        let invalid = || TranslationError::unsupported(format!("'{}' is not a valid {} value", text, target));
        match target {
            SqlType::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(|d| Some(GraphLiteral::date(d)))
                .map_err(|_| invalid()),
            SqlType::Timestamp => ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|t| Some(GraphLiteral::date_time(t)))
                .ok_or_else(invalid),
            _ => Ok(None),
        }
    }

    pub fn literal(literal: &Literal) -> Result<TypedExpression, TranslationError> {
        let (value, sql_type) = match literal {
            Literal::String(s) => (GraphLiteral::string(s.as_str()), SqlType::Varchar),
            Literal::Int(i) => (GraphLiteral::integer(*i), SqlType::BigInt),
            Literal::Float(f) => (GraphLiteral::decimal(f.into_inner()), SqlType::Decimal),
            Literal::Bool(b) => (GraphLiteral::boolean(*b), SqlType::Boolean),
            Literal::Date(d) => (GraphLiteral::date(*d), SqlType::Date),
            Literal::Timestamp(t) => (GraphLiteral::date_time(*t), SqlType::Timestamp),
            Literal::Null => return TranslationError::unsupported("NULL literal outside IS [NOT] NULL").err(),
        };
        Ok(TypedExpression::new(Expression::Literal(value), sql_type, false))
    }

    fn function(
        function: &Function,
        ctx: &mut TranslationContext,
        clause: Clause,
    ) -> Result<TypedExpression, TranslationError> {
        if function.over.is_some() {
            return TranslationError::unsupported(format!("window function {}", function.upper_name())).err();
        }
        let name = function.upper_name();
        if ctx.functions.is_aggregate(&name) && !clause.allows_aggregates() {
            return TranslationError::unsupported(format!("aggregate {} in {}", name, clause)).err();
        }

        let star = matches!(function.args.as_slice(), [ScalarExpr::WildCard]);
        let args = if star {
            Vec::new()
        } else {
            function
                .args
                .iter()
                .map(|arg| Self::translate(arg, ctx, clause))
                .collect::<Result<Vec<_>, _>>()?
        };
        let call = FunctionCall { distinct: function.distinct, star, ..FunctionCall::new(&name, args) };
        ctx.functions.handle(&call)
    }

    fn arithmetic_op(op: ArithmeticOp) -> GraphArithmetic {
        match op {
            ArithmeticOp::Add => GraphArithmetic::Add,
            ArithmeticOp::Sub => GraphArithmetic::Subtract,
            ArithmeticOp::Mul => GraphArithmetic::Multiply,
            ArithmeticOp::Div => GraphArithmetic::Divide,
        }
    }
}
