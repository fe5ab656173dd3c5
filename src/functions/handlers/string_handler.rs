use crate::{
    catalog::SqlType,
    functions::{FunctionCall, FunctionHandler, TypedExpression},
    graph::{Expression, GraphLiteral},
    translator::TranslationError,
};

pub struct StringFunctionHandler;

impl StringFunctionHandler {
    /// Non-string arguments are flattened with `STR` first.
    fn as_string(arg: &TypedExpression) -> Expression {
        if arg.sql_type.is_string() {
            arg.expression.clone()
        } else {
            Expression::call("STR", vec![arg.expression.clone()])
        }
    }
}

impl FunctionHandler for StringFunctionHandler {
    fn name(&self) -> &'static str { "string" }

    fn functions(&self) -> &'static [&'static str] {
        &["CHAR_LENGTH", "CONCAT", "LCASE", "LENGTH", "LOWER", "SUBSTR", "SUBSTRING", "TRIM", "UCASE", "UPPER"]
    }

    fn bind(&self, call: &FunctionCall) -> Result<Option<TypedExpression>, TranslationError> {
        let nullable = call.any_nullable();
        let (expression, sql_type) = match call.name.as_str() {
            "UPPER" | "UCASE" => {
                call.expect_args(1, 1)?;
                (Expression::call("UCASE", vec![Self::as_string(&call.args[0])]), SqlType::Varchar)
            }
            "LOWER" | "LCASE" => {
                call.expect_args(1, 1)?;
                (Expression::call("LCASE", vec![Self::as_string(&call.args[0])]), SqlType::Varchar)
            }
            "LENGTH" | "CHAR_LENGTH" => {
                call.expect_args(1, 1)?;
                (Expression::call("STRLEN", vec![Self::as_string(&call.args[0])]), SqlType::Integer)
            }
            "SUBSTRING" | "SUBSTR" => {
                call.expect_args(2, 3)?;
                let mut args = vec![Self::as_string(&call.args[0])];
                for bound in &call.args[1..] {
                    if !bound.sql_type.is_integral() {
                        return TranslationError::unsupported(format!("{} bounds must be integers", call.name)).err();
                    }
                    args.push(bound.expression.clone());
                }
                (Expression::call("SUBSTR", args), SqlType::Varchar)
            }
            "CONCAT" => {
                call.expect_args(1, usize::MAX)?;
                (Expression::call("CONCAT", call.args.iter().map(Self::as_string).collect()), SqlType::Varchar)
            }
            "TRIM" => {
                call.expect_args(1, 1)?;
                let args = vec![
                    Self::as_string(&call.args[0]),
                    Expression::Literal(GraphLiteral::string("^\\s+|\\s+$")),
                    Expression::Literal(GraphLiteral::string("")),
                ];
                (Expression::call("REPLACE", args), SqlType::Varchar)
            }
            _ => return Ok(None),
        };
        Ok(Some(TypedExpression::new(expression, sql_type, nullable)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Variable;

    fn arg(sql_type: SqlType) -> TypedExpression {
        TypedExpression::new(Expression::var(&Variable::new("x")), sql_type, false)
    }

    fn bound(call: &FunctionCall) -> TypedExpression {
        StringFunctionHandler.bind(call).unwrap().expect("handler should accept the call")
    }

    #[test]
    fn non_strings_are_flattened() {
        let lowered = bound(&FunctionCall::new("lower", vec![arg(SqlType::Integer)]));
        assert_eq!(lowered.expression.to_string(), "LCASE(STR(?x))");
    }

    #[test]
    fn trim_strips_both_ends() {
        let trimmed = bound(&FunctionCall::new("trim", vec![arg(SqlType::Varchar)]));
        assert_eq!(trimmed.expression.to_string(), "REPLACE(?x, \"^\\\\s+|\\\\s+$\", \"\")");
    }

    #[test]
    fn substring_checks_its_bounds() {
        let ok = FunctionCall::new("substring", vec![arg(SqlType::Varchar), arg(SqlType::Integer)]);
        assert_eq!(bound(&ok).expression.to_string(), "SUBSTR(?x, ?x)");
        let bad = FunctionCall::new("substring", vec![arg(SqlType::Varchar), arg(SqlType::Varchar)]);
        assert!(StringFunctionHandler.bind(&bad).is_err());
        assert!(StringFunctionHandler.bind(&FunctionCall::new("substr", vec![arg(SqlType::Varchar)])).is_err());
    }
}
