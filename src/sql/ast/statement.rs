use crate::sql::ast::{OrderBy, Query};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Query),
    Union(SetOperation),
}

/// `q1 UNION [ALL] q2 ...` with the ordering and slicing that apply to the whole.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SetOperation {
    pub all: bool,
    pub branches: Vec<Query>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
