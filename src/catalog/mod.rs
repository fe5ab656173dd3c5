pub mod sql_type;
pub use sql_type::*;

pub mod query_segment;
pub use query_segment::*;

pub mod catalog_object;
pub use catalog_object::*;

pub mod catalog_column;
pub use catalog_column::*;

pub mod catalog_table;
pub use catalog_table::*;

pub mod catalog_schema;
pub use catalog_schema::*;

#[allow(clippy::module_inception)]
pub mod catalog;
pub use catalog::*;

pub mod catalog_provider;
pub use catalog_provider::*;
