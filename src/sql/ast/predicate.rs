use crate::sql::ast::{ComparatorOp, Query, ScalarExpr};

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    Compare { left: ScalarExpr, op: ComparatorOp, right: ScalarExpr },
    IsNull { expr: ScalarExpr, negated: bool },
    InList { expr: ScalarExpr, list: Vec<ScalarExpr>, negated: bool },
    Like { expr: ScalarExpr, pattern: ScalarExpr, negated: bool },
    Between { expr: ScalarExpr, low: ScalarExpr, high: ScalarExpr, negated: bool },
    Exists { query: Box<Query>, negated: bool },
    InSubQuery { expr: ScalarExpr, query: Box<Query>, negated: bool },
    Const(bool),
}

impl Predicate {
    pub fn equals(left: ScalarExpr, right: ScalarExpr) -> Self {
        Predicate::Compare { left, op: ComparatorOp::Eq, right }
    }

    pub fn compare(left: ScalarExpr, op: ComparatorOp, right: ScalarExpr) -> Self {
        Predicate::Compare { left, op, right }
    }

    pub fn like(expr: ScalarExpr, pattern: &str) -> Self {
        Predicate::Like { expr, pattern: ScalarExpr::string(pattern), negated: false }
    }
}
