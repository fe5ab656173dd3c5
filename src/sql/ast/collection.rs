use crate::sql::ast::Query;

#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    /// `[catalog.][schema.]table [alias]`
    Table { name: Vec<String>, alias: Option<String> },
    Query { query: Box<Query>, alias: Option<String> },
}

impl Collection {
    pub fn table(dotted: &str, alias: Option<&str>) -> Self {
        Collection::Table {
            name: dotted.split('.').map(str::to_string).collect(),
            alias: alias.map(str::to_string),
        }
    }
}
