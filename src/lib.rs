pub mod names;
pub use names::{NameStyle, QualifiedName, SegmentMask};

pub mod catalog;
pub use catalog::{Catalog, CatalogColumn, CatalogProvider, CatalogSet, CatalogTable, QuerySegment, SqlType};

pub mod graph;
pub use graph::{GraphQuery, QueryEngine, Solution, Term, Variable};

pub mod sql;

pub mod query;
pub mod binder;
pub mod builder;
pub mod functions;
pub use functions::{FunctionHandler, FunctionRegistry};

pub mod translator;
pub use translator::{ResultShaper, Translation, TranslationError, Translator, TranslatorConfig};
