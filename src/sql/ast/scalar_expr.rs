use std::fmt;

use crate::sql::ast::{ArithmeticOp, Column, Function, Literal, Query};

#[derive(Clone, PartialEq)]
pub enum ScalarExpr {
    Literal(Literal),
    Column(Column),
    Function(Function),
    WildCard,
    /// `t.*` or `s.t.*`
    WildCardWithCollection(Vec<String>),
    Arithmetic { op: ArithmeticOp, left: Box<ScalarExpr>, right: Box<ScalarExpr> },
    Negate(Box<ScalarExpr>),
    Case {
        operand: Option<Box<ScalarExpr>>,
        branches: Vec<(ScalarExpr, ScalarExpr)>,
        otherwise: Option<Box<ScalarExpr>>,
    },
    SubQuery(Box<Query>),
}

impl ScalarExpr {
    pub fn column(dotted: &str) -> Self {
        ScalarExpr::Column(Column::parse(dotted))
    }

    pub fn string(value: &str) -> Self {
        ScalarExpr::Literal(Literal::String(value.to_string()))
    }

    pub fn int(value: i64) -> Self {
        ScalarExpr::Literal(Literal::Int(value))
    }

    pub fn call(name: &str, args: Vec<ScalarExpr>) -> Self {
        ScalarExpr::Function(Function::new(name, args))
    }

    pub fn arithmetic(op: ArithmeticOp, left: ScalarExpr, right: ScalarExpr) -> Self {
        ScalarExpr::Arithmetic { op, left: Box::new(left), right: Box::new(right) }
    }
}

impl fmt::Display for ScalarExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarExpr::Literal(l) => write!(f, "{}", l),
            ScalarExpr::Column(c) => write!(f, "{}", c),
            ScalarExpr::Function(fun) => write!(f, "{}", fun),
            ScalarExpr::WildCard => write!(f, "*"),
            ScalarExpr::WildCardWithCollection(path) => write!(f, "{}.*", path.join(".")),
            ScalarExpr::Arithmetic { op, left, right } => write!(f, "({} {} {})", left, op, right),
            ScalarExpr::Negate(e) => write!(f, "-{}", e),
            ScalarExpr::Case { .. } => write!(f, "CASE ... END"),
            ScalarExpr::SubQuery(_) => write!(f, "(SELECT ...)"),
        }
    }
}

impl fmt::Debug for ScalarExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarExpr::Literal(l) => write!(f, "Literal({:?})", l),
            ScalarExpr::Column(c) => write!(f, "{:?}", c),
            ScalarExpr::Function(_) => write!(f, "Function({})", self),
            ScalarExpr::WildCard => write!(f, "WildCard(*)"),
            ScalarExpr::WildCardWithCollection(_) => write!(f, "WildCardWithCollection({})", self),
            ScalarExpr::Arithmetic { .. } => write!(f, "Arithmetic{}", self),
            ScalarExpr::Negate(_) => write!(f, "Negate({})", self),
            ScalarExpr::Case { .. } => write!(f, "Case"),
            ScalarExpr::SubQuery(q) => write!(f, "SubQuery({:?})", q),
        }
    }
}
