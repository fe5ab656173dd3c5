pub mod query_item_info;
pub use query_item_info::*;

pub mod query_item_collection;
pub use query_item_collection::*;

pub mod query_symbol_set;
pub use query_symbol_set::*;

pub mod result_column;
pub use result_column::*;
