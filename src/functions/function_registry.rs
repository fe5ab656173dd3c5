use std::sync::Arc;

use tracing::trace;

use crate::{
    functions::{
        AggregateFunctionHandler, FunctionCall, FunctionHandler, NumericFunctionHandler, StringFunctionHandler,
        SystemFunctionHandler, TypedExpression,
    },
    translator::TranslationError,
};

/// Ordered chain of function handlers. A call goes to each handler claiming its
/// name in registration order until one binds it.
#[derive(Default, Clone)]
pub struct FunctionRegistry {
    handlers: Vec<Arc<dyn FunctionHandler>>,
}

impl FunctionRegistry {
    pub fn new() -> Self { Self { handlers: Vec::new() } }

    pub fn register<H: FunctionHandler + 'static>(&mut self, handler: H) {
        self.handlers.push(Arc::new(handler));
    }

    pub fn handler_for(&self, function: &str) -> Option<&Arc<dyn FunctionHandler>> {
        self.handlers.iter().find(|h| h.supports(function))
    }

    pub fn is_aggregate(&self, function: &str) -> bool {
        self.handler_for(function).is_some_and(|h| h.is_aggregate())
    }

    pub fn handle(&self, call: &FunctionCall) -> Result<TypedExpression, TranslationError> {
        for handler in self.handlers.iter().filter(|h| h.supports(&call.name)) {
            if let Some(bound) = handler.bind(call)? {
                trace!(function = %call.name, handler = handler.name(), "bound function");
                return Ok(bound);
            }
            trace!(function = %call.name, handler = handler.name(), "handler declined");
        }
        Err(TranslationError::UnsupportedFunction(call.name.clone()))
    }

    pub fn list(&self) -> Vec<&'static str> {
        let mut v: Vec<_> = self.handlers.iter().flat_map(|h| h.functions().iter().copied()).collect();
        v.sort();
        v
    }

    pub fn default_registry() -> Self {
        let mut registry = Self::new();
        registry.register(AggregateFunctionHandler);
        registry.register(NumericFunctionHandler);
        registry.register(StringFunctionHandler);
        registry.register(SystemFunctionHandler);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::SqlType, graph::{Expression, Variable}};

    fn column(sql_type: SqlType) -> TypedExpression {
        TypedExpression::new(Expression::var(&Variable::new("x")), sql_type, false)
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = FunctionRegistry::default_registry();
        assert!(registry.handler_for("upper").is_some());
        assert!(registry.handler_for("Count").is_some());
        assert!(registry.is_aggregate("max"));
        assert!(!registry.is_aggregate("abs"));
        assert!(registry.list().contains(&"COALESCE"));
    }

    #[test]
    fn unknown_function_is_reported() {
        let registry = FunctionRegistry::default_registry();
        let call = FunctionCall::new("soundex", vec![column(SqlType::Varchar)]);
        match registry.handle(&call) {
            Err(TranslationError::UnsupportedFunction(name)) => assert_eq!(name, "SOUNDEX"),
            other => panic!("expected unsupported function, got {:?}", other),
        }
    }

    /// Claims UPPER but only binds integer arguments.
    struct IntegerUpper;

    impl FunctionHandler for IntegerUpper {
        fn name(&self) -> &'static str { "integer-upper" }

        fn functions(&self) -> &'static [&'static str] {
            &["UPPER", "MEDIAN"]
        }

        fn bind(&self, call: &FunctionCall) -> Result<Option<TypedExpression>, TranslationError> {
            match call.args.as_slice() {
                [arg] if arg.sql_type == SqlType::Integer => {
                    Ok(Some(TypedExpression::new(Expression::call("STR", call.arg_expressions()), SqlType::Varchar, false)))
                }
                _ => Ok(None),
            }
        }
    }

    #[test]
    fn declined_calls_fall_through_the_chain() {
        let mut registry = FunctionRegistry::new();
        registry.register(IntegerUpper);
        registry.register(StringFunctionHandler);

        let integer = registry.handle(&FunctionCall::new("upper", vec![column(SqlType::Integer)])).unwrap();
        assert_eq!(integer.expression.to_string(), "STR(?x)");

        let text = registry.handle(&FunctionCall::new("upper", vec![column(SqlType::Varchar)])).unwrap();
        assert_eq!(text.expression.to_string(), "UCASE(?x)");

        // declined by every claimant
        assert!(matches!(
            registry.handle(&FunctionCall::new("median", vec![column(SqlType::Varchar)])),
            Err(TranslationError::UnsupportedFunction(name)) if name == "MEDIAN"
        ));
    }

    #[test]
    fn handlers_type_their_results() {
        let registry = FunctionRegistry::default_registry();
        let upper = registry.handle(&FunctionCall::new("upper", vec![column(SqlType::Varchar)])).unwrap();
        assert_eq!(upper.sql_type, SqlType::Varchar);
        assert_eq!(upper.expression.to_string(), "UCASE(?x)");

        let length = registry.handle(&FunctionCall::new("length", vec![column(SqlType::Varchar)])).unwrap();
        assert_eq!(length.sql_type, SqlType::Integer);
        assert_eq!(length.expression.to_string(), "STRLEN(?x)");

        let abs = registry.handle(&FunctionCall::new("abs", vec![column(SqlType::Decimal)])).unwrap();
        assert_eq!(abs.sql_type, SqlType::Decimal);

        assert!(matches!(
            registry.handle(&FunctionCall::new("abs", vec![column(SqlType::Varchar)])),
            Err(TranslationError::UnsupportedConstruct(_))
        ));
    }
}
