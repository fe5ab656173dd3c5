use indexmap::IndexMap;
use thiserror::Error;

use crate::graph::{GraphQuery, Term, Variable};

/// One row of variable bindings. Variables the engine left unbound are absent.
pub type Solution = IndexMap<Variable, Term>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("query rejected by engine: {0}")]
    Rejected(String),
    #[error("engine failure: {0}")]
    Failed(String),
}

/// The external store that evaluates a finished graph query.
pub trait QueryEngine: Send + Sync {
    fn execute(&self, query: &GraphQuery) -> Result<Vec<Solution>, EngineError>;
}
