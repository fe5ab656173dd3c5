use std::fmt;

use crate::sql::ast::{Collection, Identifier, Join, OrderBy, Predicate, ScalarExpr};

/// One plain SELECT, as handed over by the SQL parser.
#[derive(Default, Clone, PartialEq)]
pub struct Query {
    pub distinct: bool,
    pub projection: Vec<Identifier>,
    pub collections: Vec<Collection>,
    pub joins: Vec<Join>,
    pub criteria: Option<Predicate>,
    pub group_by: Vec<ScalarExpr>,
    pub having: Option<Predicate>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let proj = self.projection.iter().map(|p| format!("{:?}", p)).collect::<Vec<_>>().join(", ");
        let cols = self.collections.iter().map(|c| format!("{:?}", c)).collect::<Vec<_>>().join(", ");
        let joins = self.joins.iter().map(|j| format!("{:?}", j)).collect::<Vec<_>>().join(", ");
        let crit = match &self.criteria {
            Some(c) => format!("{:?}", c),
            None => "None".to_string(),
        };
        let group = self.group_by.iter().map(|g| format!("{:?}", g)).collect::<Vec<_>>().join(", ");
        let order = self.order_by.iter().map(|o| format!("{:?}", o)).collect::<Vec<_>>().join(", ");
        write!(
            f,
            "Query(distinct={}, projection=[{}], collections=[{}], joins=[{}], criteria={}, group_by=[{}], order_by=[{}], limit={:?}, offset={:?})",
            self.distinct, proj, cols, joins, crit, group, order, self.limit, self.offset
        )
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
