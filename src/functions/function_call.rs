use crate::{catalog::SqlType, graph::Expression, translator::TranslationError};

/// A translated scalar: the graph expression plus its relational type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpression {
    pub expression: Expression,
    pub sql_type: SqlType,
    pub nullable: bool,
}

impl TypedExpression {
    pub fn new(expression: Expression, sql_type: SqlType, nullable: bool) -> Self {
        Self { expression, sql_type, nullable }
    }
}

/// A function call whose arguments are already translated.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Upper-cased function name.
    pub name: String,
    pub args: Vec<TypedExpression>,
    pub distinct: bool,
    /// `COUNT(*)`
    pub star: bool,
}

impl FunctionCall {
    pub fn new(name: &str, args: Vec<TypedExpression>) -> Self {
        Self { name: name.to_ascii_uppercase(), args, distinct: false, star: false }
    }

    pub fn any_nullable(&self) -> bool {
        self.args.iter().any(|a| a.nullable)
    }

    pub fn arg_expressions(&self) -> Vec<Expression> {
        self.args.iter().map(|a| a.expression.clone()).collect()
    }

    /// Fail unless the call has between `min` and `max` arguments.
    pub fn expect_args(&self, min: usize, max: usize) -> Result<(), TranslationError> {
        let n = self.args.len();
        if self.star || n < min || n > max {
            let expected = if min == max { min.to_string() } else { format!("{} to {}", min, max) };
            let got = if self.star { "*".to_string() } else { n.to_string() };
            return TranslationError::unsupported(format!("{} expects {} argument(s), got {}", self.name, expected, got)).err();
        }
        if self.distinct {
            return TranslationError::unsupported(format!("DISTINCT is only allowed in aggregates, not {}", self.name)).err();
        }
        Ok(())
    }
}
