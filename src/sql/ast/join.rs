use crate::sql::ast::{Collection, Predicate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub collection: Collection,
    pub predicate: Option<Predicate>,
    pub natural: bool,
}

impl Join {
    pub fn new(join_type: JoinType, collection: Collection, predicate: Option<Predicate>) -> Self {
        Self { join_type, collection, predicate, natural: false }
    }
}
