use crate::{
    catalog::SqlType,
    functions::{FunctionCall, FunctionHandler, TypedExpression},
    graph::Expression,
    translator::TranslationError,
};

pub struct NumericFunctionHandler;

impl FunctionHandler for NumericFunctionHandler {
    fn name(&self) -> &'static str { "numeric" }

    fn functions(&self) -> &'static [&'static str] {
        &["ABS", "CEIL", "CEILING", "FLOOR", "RAND", "ROUND"]
    }

    fn bind(&self, call: &FunctionCall) -> Result<Option<TypedExpression>, TranslationError> {
        if !self.supports(&call.name) {
            return Ok(None);
        }
        if call.name == "RAND" {
            call.expect_args(0, 0)?;
            return Ok(Some(TypedExpression::new(Expression::call("RAND", vec![]), SqlType::Double, false)));
        }

        call.expect_args(1, 1)?;
        let arg = &call.args[0];
        if !arg.sql_type.is_numeric() && arg.sql_type != SqlType::Other {
            return TranslationError::unsupported(format!("{} expects a numeric argument, got {}", call.name, arg.sql_type)).err();
        }
        let function = match call.name.as_str() {
            "CEILING" => "CEIL",
            other => other,
        };
        Ok(Some(TypedExpression::new(Expression::call(function, call.arg_expressions()), arg.sql_type, arg.nullable)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Variable;

    #[test]
    fn ceiling_is_an_alias_of_ceil() {
        let x = TypedExpression::new(Expression::var(&Variable::new("x")), SqlType::Double, true);
        let bound = NumericFunctionHandler.bind(&FunctionCall::new("ceiling", vec![x])).unwrap().unwrap();
        assert_eq!(bound.expression.to_string(), "CEIL(?x)");
        assert!(bound.nullable);
    }

    #[test]
    fn rand_takes_no_arguments() {
        assert!(NumericFunctionHandler.bind(&FunctionCall::new("rand", vec![])).unwrap().is_some());
        let one = TypedExpression::new(Expression::var(&Variable::new("x")), SqlType::Integer, false);
        assert!(NumericFunctionHandler.bind(&FunctionCall::new("rand", vec![one])).is_err());
    }
}
