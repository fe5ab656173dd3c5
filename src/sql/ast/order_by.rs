use crate::sql::ast::ScalarExpr;

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub expr: ScalarExpr,
    pub ascending: bool,
}

impl OrderBy {
    pub fn asc(expr: ScalarExpr) -> Self {
        Self { expr, ascending: true }
    }

    pub fn desc(expr: ScalarExpr) -> Self {
        Self { expr, ascending: false }
    }
}
