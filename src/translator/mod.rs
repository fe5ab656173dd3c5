pub mod translation_error;
pub use translation_error::*;

pub mod translator_config;
pub use translator_config::*;

pub mod translation;
pub use translation::*;

pub mod result_shaper;
pub use result_shaper::*;

pub mod translation_context;
pub use translation_context::*;

pub mod like_translator;
pub use like_translator::*;

pub mod scalar_translator;
pub use scalar_translator::*;

pub mod predicate_translator;
pub use predicate_translator::*;

pub mod join_rewriter;
pub use join_rewriter::*;

pub mod projection_resolver;
pub use projection_resolver::*;

pub mod order_by_resolver;
pub use order_by_resolver::*;

pub mod select_translator;
pub use select_translator::*;

#[allow(clippy::module_inception)]
pub mod translator;
pub use translator::*;
