use crate::{
    catalog::CatalogObject,
    names::QualifiedName,
    query::QueryItemInfo,
    translator::TranslationError,
};

/// Ordered, duplicate-free list of query items, searchable by identity, by
/// underlying catalog object, and by partial name.
pub struct QueryItemCollection<T: CatalogObject> {
    items: Vec<QueryItemInfo<T>>,
}

impl<T: CatalogObject> Default for QueryItemCollection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: CatalogObject> QueryItemCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` unless an identical one is already present.
    pub fn add(&mut self, item: QueryItemInfo<T>) -> bool {
        if self.items.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// The single item whose name matches `name`.
    pub fn get(&self, name: &QualifiedName) -> Result<Option<&QueryItemInfo<T>>, TranslationError> {
        let found: Vec<&QueryItemInfo<T>> = self.items.iter().filter(|i| i.name().matches(name)).collect();
        match found.len() {
            0 => Ok(None),
            1 => Ok(found.into_iter().next()),
            _ => Err(TranslationError::AmbiguousReference {
                name: name.to_string(),
                matches: found.iter().map(|i| i.name().to_string()).collect(),
            }),
        }
    }

    /// Every item, under any alias, that wraps `base`.
    pub fn find_by_base(&self, base: &T) -> Vec<&QueryItemInfo<T>> {
        self.items.iter().filter(|i| i.same_base(base)).collect()
    }

    /// The item with exactly this query-local name.
    pub fn find_exact(&self, name: &QualifiedName) -> Option<&QueryItemInfo<T>> {
        self.items.iter().find(|i| i.name() == name)
    }

    /// Keep only items matching at least one of `names`.
    pub fn retain_matching(&mut self, names: &[QualifiedName]) {
        self.items.retain(|i| names.iter().any(|n| i.name().matches(n)));
    }

    /// Drop every item matching `name`; returns how many were removed.
    pub fn remove_matching(&mut self, name: &QualifiedName) -> usize {
        let before = self.items.len();
        self.items.retain(|i| !i.name().matches(name));
        before - self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryItemInfo<T>> {
        self.items.iter()
    }

    pub fn position(&self, name: &QualifiedName) -> Option<usize> {
        self.items.iter().position(|i| i.name() == name)
    }

    pub fn at(&self, index: usize) -> Option<&QueryItemInfo<T>> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::{CatalogColumn, SqlType};

    fn item(table: &str, column: &str) -> QueryItemInfo<CatalogColumn> {
        let name = QualifiedName::column_name("c", "s", table, column).unwrap();
        let base = Arc::new(CatalogColumn::new(name.clone(), SqlType::Varchar));
        QueryItemInfo::new(base, name.clone(), false, name.guid(), "v")
    }

    fn col(column: &str) -> QualifiedName {
        QualifiedName::pattern(None, None, None, Some(column)).unwrap()
    }

    #[test]
    fn add_is_idempotent() {
        let mut items = QueryItemCollection::new();
        assert!(items.add(item("t", "a")));
        assert!(!items.add(item("t", "a")));
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn get_reports_ambiguity_instead_of_guessing() {
        let mut items = QueryItemCollection::new();
        items.add(item("t", "a"));
        items.add(item("u", "a"));
        items.add(item("u", "b"));
        match items.get(&col("a")) {
            Err(TranslationError::AmbiguousReference { matches, .. }) => assert_eq!(matches.len(), 2),
            other => panic!("expected ambiguity, got {:?}", other),
        }
        assert!(items.get(&col("b")).unwrap().is_some());
        assert!(items.get(&col("z")).unwrap().is_none());
        let qualified = QualifiedName::pattern(None, None, Some("u"), Some("a")).unwrap();
        assert_eq!(items.get(&qualified).unwrap().unwrap().name().to_string(), "c.s.u.a");
    }

    #[test]
    fn find_by_base_sees_aliases() {
        let mut items = QueryItemCollection::new();
        let original = item("t", "a");
        let alias = original.aliased(QualifiedName::pattern(None, None, Some("t"), Some("x")).unwrap());
        let base = original.base().clone();
        items.add(original);
        items.add(alias);
        items.add(item("t", "b"));
        assert_eq!(items.find_by_base(&base).len(), 2);
    }

    #[test]
    fn retain_and_remove() {
        let mut items = QueryItemCollection::new();
        items.add(item("t", "a"));
        items.add(item("t", "b"));
        items.add(item("u", "a"));
        assert_eq!(items.remove_matching(&QualifiedName::pattern(None, None, Some("u"), None).unwrap()), 1);
        items.retain_matching(&[col("b")]);
        assert_eq!(items.len(), 1);
        assert_eq!(items.iter().next().unwrap().name().column(), Some("b"));
    }
}
