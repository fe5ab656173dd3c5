pub mod segment_mask;
pub use segment_mask::*;

pub mod qualified_name;
pub use qualified_name::*;
