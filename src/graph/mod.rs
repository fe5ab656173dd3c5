pub mod term;
pub use term::*;

pub mod expression;
pub use expression::*;

pub mod pattern;
pub use pattern::*;

pub mod graph_query;
pub use graph_query::*;

pub mod engine;
pub use engine::*;
