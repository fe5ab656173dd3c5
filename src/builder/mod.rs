pub mod table_block;
pub use table_block::*;

pub mod query_builder;
pub use query_builder::*;
