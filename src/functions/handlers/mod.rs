pub mod aggregate_handler;
pub use aggregate_handler::*;

pub mod numeric_handler;
pub use numeric_handler::*;

pub mod string_handler;
pub use string_handler::*;

pub mod system_handler;
pub use system_handler::*;
