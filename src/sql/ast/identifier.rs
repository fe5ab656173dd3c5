use crate::sql::ast::ScalarExpr;

/// One entry of the select list.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub expression: ScalarExpr,
    pub alias: Option<String>,
}

impl Identifier {
    pub fn new(expression: ScalarExpr) -> Self {
        Self { expression, alias: None }
    }

    pub fn aliased(expression: ScalarExpr, alias: &str) -> Self {
        Self { expression, alias: Some(alias.to_string()) }
    }
}
