pub mod function_call;
pub use function_call::*;

pub mod function_handler;
pub use function_handler::*;

pub mod function_registry;
pub use function_registry::*;

pub mod handlers;
pub use handlers::*;
