use std::{fmt, sync::Arc};

use once_cell::unsync::OnceCell;
use uuid::Uuid;

use crate::{
    catalog::{CatalogColumn, CatalogObject, CatalogTable},
    graph::{Expression, Variable},
    names::QualifiedName,
};

/// A catalog object as it takes part in one query: its query-local name
/// (possibly an alias), whether it joins through an optional block, and the
/// variable it binds.
///
/// The variable is derived from `identity`, which is the GUID of the object as
/// seen through its table instance. Aliasing a column keeps the identity, so
/// every alias of one column shares one variable.
pub struct QueryItemInfo<T: CatalogObject> {
    base: Arc<T>,
    name: QualifiedName,
    optional: bool,
    identity: Uuid,
    prefix: String,
    expression: Option<Expression>,
    variable: OnceCell<Variable>,
}

pub type QueryTableInfo = QueryItemInfo<CatalogTable>;
pub type QueryColumnInfo = QueryItemInfo<CatalogColumn>;

impl<T: CatalogObject> QueryItemInfo<T> {
    pub fn new(base: Arc<T>, name: QualifiedName, optional: bool, identity: Uuid, prefix: &str) -> Self {
        Self {
            base,
            name,
            optional,
            identity,
            prefix: prefix.to_string(),
            expression: None,
            variable: OnceCell::new(),
        }
    }

    /// A synthetic item whose value is computed by `expression`.
    pub fn computed(base: Arc<T>, name: QualifiedName, expression: Expression, prefix: &str) -> Self {
        let identity = name.guid();
        Self { expression: Some(expression), ..Self::new(base, name, false, identity, prefix) }
    }

    pub fn base(&self) -> &Arc<T> {
        &self.base
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn optional(&self) -> bool {
        self.optional
    }

    pub fn identity(&self) -> Uuid {
        self.identity
    }

    pub fn expression(&self) -> Option<&Expression> {
        self.expression.as_ref()
    }

    pub fn is_synthetic(&self) -> bool {
        self.base.is_synthetic()
    }

    /// Same underlying catalog object as `other`.
    pub fn same_base(&self, other: &T) -> bool {
        self.base.name().guid() == other.name().guid()
    }

    pub fn variable(&self) -> &Variable {
        self.variable
            .get_or_init(|| Self::variable_for(&self.prefix, self.identity))
    }

    pub fn variable_for(prefix: &str, identity: Uuid) -> Variable {
        Variable::new(format!("{}{}", prefix, identity.simple()))
    }

    /// The same item under another query-local name.
    pub fn aliased(&self, name: QualifiedName) -> Self {
        Self {
            base: self.base.clone(),
            name,
            optional: self.optional,
            identity: self.identity,
            prefix: self.prefix.clone(),
            expression: self.expression.clone(),
            variable: self.variable.clone(),
        }
    }
}

impl<T: CatalogObject> Clone for QueryItemInfo<T> {
    fn clone(&self) -> Self {
        self.aliased(self.name.clone())
    }
}

impl<T: CatalogObject> PartialEq for QueryItemInfo<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.identity == other.identity
    }
}

impl<T: CatalogObject> fmt::Debug for QueryItemInfo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "QueryItemInfo({} -> {}, optional={})",
            self.name,
            self.base.name(),
            self.optional
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SqlType;

    #[test]
    fn aliases_share_the_variable() {
        let name = QualifiedName::column_name("c", "s", "t", "x").unwrap();
        let column = Arc::new(CatalogColumn::new(name.clone(), SqlType::Integer));
        let info = QueryColumnInfo::new(column, name.clone(), false, name.guid(), "v");
        let alias = info.aliased(QualifiedName::pattern(None, None, Some("t"), Some("y")).unwrap());
        assert_ne!(info, alias);
        assert_eq!(info.variable(), alias.variable());
        assert_eq!(info.variable().name(), format!("v{}", name.guid().simple()));
    }
}
