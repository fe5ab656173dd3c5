use serde::Serialize;

use crate::{
    graph::{EngineError, GraphQuery, QueryEngine},
    query::ResultColumn,
    translator::{ResultRow, ResultShaper},
};

/// A translated statement: the graph query plus the relational shape of its result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Translation {
    pub query: GraphQuery,
    pub columns: Vec<ResultColumn>,
}

impl Translation {
    pub fn new(query: GraphQuery, columns: Vec<ResultColumn>) -> Self {
        Self { query, columns }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    /// Rendered query text.
    pub fn text(&self) -> String {
        self.query.to_string()
    }

    pub fn execute(&self, engine: &dyn QueryEngine) -> Result<Vec<ResultRow>, EngineError> {
        let solutions = engine.execute(&self.query)?;
        Ok(ResultShaper::shape(&self.columns, &solutions))
    }
}
