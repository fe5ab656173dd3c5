use crate::{
    catalog::SqlType,
    functions::{FunctionCall, FunctionHandler, TypedExpression},
    graph::{Expression, GraphLiteral, XSD_DATE},
    translator::TranslationError,
};

pub struct SystemFunctionHandler;

impl FunctionHandler for SystemFunctionHandler {
    fn name(&self) -> &'static str { "system" }

    fn functions(&self) -> &'static [&'static str] {
        &["COALESCE", "CURRENT_DATE", "CURRENT_TIMESTAMP", "NOW"]
    }

    fn bind(&self, call: &FunctionCall) -> Result<Option<TypedExpression>, TranslationError> {
        match call.name.as_str() {
            "NOW" | "CURRENT_TIMESTAMP" => {
                call.expect_args(0, 0)?;
                Ok(Some(TypedExpression::new(Expression::call("NOW", vec![]), SqlType::Timestamp, false)))
            }
            "CURRENT_DATE" => {
                call.expect_args(0, 0)?;
                // STRDT(SUBSTR(STR(NOW()), 1, 10), xsd:date)
                let day = Expression::call(
                    "SUBSTR",
                    vec![
                        Expression::call("STR", vec![Expression::call("NOW", vec![])]),
                        Expression::Literal(GraphLiteral::integer(1)),
                        Expression::Literal(GraphLiteral::integer(10)),
                    ],
                );
                let date = Expression::call("STRDT", vec![day, Expression::Prefixed(XSD_DATE.to_string())]);
                Ok(Some(TypedExpression::new(date, SqlType::Date, false)))
            }
            "COALESCE" => {
                call.expect_args(1, usize::MAX)?;
                let sql_type = call.args.iter().map(|a| a.sql_type).reduce(SqlType::promote).unwrap_or(SqlType::Other);
                // nullable only when every input is
                let nullable = call.args.iter().all(|a| a.nullable);
                Ok(Some(TypedExpression::new(Expression::call("COALESCE", call.arg_expressions()), sql_type, nullable)))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Variable;

    #[test]
    fn coalesce_promotes_and_tracks_nullability() {
        let a = TypedExpression::new(Expression::var(&Variable::new("a")), SqlType::Integer, true);
        let b = TypedExpression::new(Expression::Literal(GraphLiteral::decimal(0.5)), SqlType::Decimal, false);
        let bound = SystemFunctionHandler.bind(&FunctionCall::new("coalesce", vec![a.clone(), b])).unwrap().unwrap();
        assert_eq!(bound.sql_type, SqlType::Decimal);
        assert!(!bound.nullable);
        assert_eq!(bound.expression.to_string(), "COALESCE(?a, 0.5)");

        let only = SystemFunctionHandler.bind(&FunctionCall::new("coalesce", vec![a])).unwrap().unwrap();
        assert!(only.nullable);
    }

    #[test]
    fn current_date_is_a_typed_date() {
        let bound = SystemFunctionHandler.bind(&FunctionCall::new("current_date", vec![])).unwrap().unwrap();
        assert_eq!(bound.sql_type, SqlType::Date);
        assert_eq!(bound.expression.to_string(), "STRDT(SUBSTR(STR(NOW()), 1, 10), xsd:date)");
    }
}
