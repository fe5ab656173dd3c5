use crate::{
    functions::{FunctionCall, TypedExpression},
    translator::TranslationError,
};

/// One link of the function chain.
pub trait FunctionHandler: Send + Sync {
    fn name(&self) -> &'static str;

    /// Upper-case names this handler claims.
    fn functions(&self) -> &'static [&'static str];

    fn supports(&self, function: &str) -> bool {
        self.functions().iter().any(|f| f.eq_ignore_ascii_case(function))
    }

    /// Aggregates fold many rows into one and are rejected in WHERE.
    fn is_aggregate(&self) -> bool {
        false
    }

    /// Bind the call, or return `Ok(None)` to let the next handler in the chain
    /// try it. An error is final.
    fn bind(&self, call: &FunctionCall) -> Result<Option<TypedExpression>, TranslationError>;
}
