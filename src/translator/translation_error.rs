use std::fmt;

use thiserror::Error;

/// What kind of catalog or query object a reference was expected to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Catalog,
    Schema,
    Table,
    Column,
    /// An output label (select-list alias) used by ORDER BY.
    Label,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Catalog => write!(f, "catalog"),
            ReferenceKind::Schema => write!(f, "schema"),
            ReferenceKind::Table => write!(f, "table"),
            ReferenceKind::Column => write!(f, "column"),
            ReferenceKind::Label => write!(f, "label"),
        }
    }
}

/// Every way a translation can fail. None of them leave a partial query behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranslationError {
    #[error("invalid name `{name}`: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("ambiguous reference `{name}`, candidates: {}", .matches.join(", "))]
    AmbiguousReference { name: String, matches: Vec<String> },

    #[error("unknown {kind} `{name}`")]
    UnknownReference { kind: ReferenceKind, name: String },

    #[error("column `{column}` is already bound as `{existing}`, cannot bind it again as `{requested}`")]
    DuplicateBinding { column: String, existing: String, requested: String },

    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),

    #[error("unsupported function `{0}`")]
    UnsupportedFunction(String),

    #[error("invalid query segment template for `{owner}`: {reason}")]
    InvalidTemplate { owner: String, reason: String },

    #[error("invalid catalog document: {0}")]
    InvalidCatalog(String),
}

impl TranslationError {
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        TranslationError::InvalidName { name: name.into(), reason: reason.into() }
    }

    pub fn unknown(kind: ReferenceKind, name: impl Into<String>) -> Self {
        TranslationError::UnknownReference { kind, name: name.into() }
    }

    pub fn unsupported(what: impl Into<String>) -> Self {
        TranslationError::UnsupportedConstruct(what.into())
    }

    pub fn err<T>(self) -> Result<T, TranslationError> {
        Err(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_reference() {
        let e = TranslationError::AmbiguousReference {
            name: "id".into(),
            matches: vec!["people.id".into(), "orders.id".into()],
        };
        assert_eq!(e.to_string(), "ambiguous reference `id`, candidates: people.id, orders.id");

        let e = TranslationError::unknown(ReferenceKind::Table, "shop.nope");
        assert_eq!(e.to_string(), "unknown table `shop.nope`");
    }
}
