pub mod column_binder;
pub use column_binder::*;

pub mod type_filters;
pub use type_filters::*;

pub mod table_binder;
pub use table_binder::*;
