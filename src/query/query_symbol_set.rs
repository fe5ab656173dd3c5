use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use indexmap::IndexMap;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::{
    catalog::{CatalogColumn, CatalogObject, CatalogTable},
    graph::Variable,
    names::{NameStyle, QualifiedName, SegmentMask},
    query::{QueryColumnInfo, QueryItemCollection, QueryTableInfo, ResultColumn},
    translator::{ReferenceKind, TranslationError},
};

#[derive(Debug, Clone)]
struct ResultEntry {
    column: QualifiedName,
    alias: Option<String>,
}

/// The tables and columns in play for one translated SELECT.
pub struct QuerySymbolSet {
    prefix: String,
    tables: QueryItemCollection<CatalogTable>,
    columns: QueryItemCollection<CatalogColumn>,
    by_identity: HashMap<Uuid, Vec<usize>>,
    /// Select-list aliases, keyed lower-case. Kept apart from table columns so
    /// an alias may reuse another column's name.
    labels: IndexMap<String, QueryColumnInfo>,
    results: Vec<ResultEntry>,
}

impl QuerySymbolSet {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            tables: QueryItemCollection::new(),
            columns: QueryItemCollection::new(),
            by_identity: HashMap::new(),
            labels: IndexMap::new(),
            results: Vec::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn tables(&self) -> &QueryItemCollection<CatalogTable> {
        &self.tables
    }

    pub fn columns(&self) -> &QueryItemCollection<CatalogColumn> {
        &self.columns
    }

    /// Register a table under `local_name` (its alias, or its catalog name).
    pub fn add_table(
        &mut self,
        table: Arc<CatalogTable>,
        local_name: QualifiedName,
        optional: bool,
    ) -> Result<QueryTableInfo, TranslationError> {
        if let Some(existing) = self.tables.iter().find(|t| t.name().matches(&local_name)) {
            return TranslationError::invalid_name(
                local_name.to_string(),
                format!("collides with `{}` already in FROM; add an alias", existing.name()),
            )
            .err();
        }
        let identity = local_name.guid();
        let info = QueryTableInfo::new(table, local_name, optional, identity, &self.prefix);
        debug!(table = %info.name(), base = %info.base().name(), optional, "registered table");
        self.tables.add(info.clone());
        Ok(info)
    }

    /// The registered table `name` refers to, if any.
    pub fn table(&self, name: &QualifiedName) -> Result<Option<&QueryTableInfo>, TranslationError> {
        self.tables.get(name)
    }

    pub fn table_index(&self, table: &QueryTableInfo) -> Option<usize> {
        self.tables.position(table.name())
    }

    /// Register a column binding. Binding a second, different column under a
    /// local name that is already taken is a `DuplicateBinding`.
    pub fn add_column(&mut self, column: QueryColumnInfo) -> Result<bool, TranslationError> {
        if let Some(existing) = self.columns.find_exact(column.name()) {
            if existing.identity() != column.identity() {
                return Err(TranslationError::DuplicateBinding {
                    column: column.name().to_string(),
                    existing: existing.base().name().to_string(),
                    requested: column.base().name().to_string(),
                });
            }
            return Ok(false);
        }
        let identity = column.identity();
        trace!(column = %column.name(), variable = %column.variable(), "registered column");
        self.columns.add(column);
        self.by_identity.entry(identity).or_default().push(self.columns.len() - 1);
        Ok(true)
    }

    /// Register `alias` as an output label for `column`. Giving one alias to two
    /// different columns is a `DuplicateBinding`.
    pub fn add_label(&mut self, alias: &str, column: &QueryColumnInfo) -> Result<QueryColumnInfo, TranslationError> {
        let key = alias.to_ascii_lowercase();
        if let Some(existing) = self.labels.get(&key) {
            if existing.identity() != column.identity() {
                return Err(TranslationError::DuplicateBinding {
                    column: alias.to_string(),
                    existing: existing.base().name().to_string(),
                    requested: column.base().name().to_string(),
                });
            }
            return Ok(existing.clone());
        }
        let aliased = column.aliased(QualifiedName::pattern(None, None, None, Some(alias))?);
        trace!(alias, column = %column.name(), "registered label");
        self.labels.insert(key, aliased.clone());
        Ok(aliased)
    }

    /// The column behind a select-list alias (case-insensitive).
    pub fn label(&self, alias: &str) -> Option<&QueryColumnInfo> {
        self.labels.get(&alias.to_ascii_lowercase())
    }

    pub fn column(&self, name: &QualifiedName) -> Option<&QueryColumnInfo> {
        self.columns.find_exact(name)
    }

    /// All bindings (under every alias) sharing `identity`.
    pub fn columns_with_identity(&self, identity: Uuid) -> Vec<&QueryColumnInfo> {
        self.by_identity
            .get(&identity)
            .map(|indexes| indexes.iter().filter_map(|i| self.columns.at(*i)).collect())
            .unwrap_or_default()
    }

    /// Find the table that declares an unqualified column.
    pub fn resolve_unqualified(
        &self,
        column: &str,
    ) -> Result<Option<(QueryTableInfo, Arc<CatalogColumn>)>, TranslationError> {
        let found: Vec<(&QueryTableInfo, &Arc<CatalogColumn>)> = self
            .tables
            .iter()
            .filter_map(|t| t.base().column(column).map(|c| (t, c)))
            .collect();
        match found.len() {
            0 => Ok(None),
            1 => Ok(found.into_iter().next().map(|(t, c)| (t.clone(), c.clone()))),
            _ => Err(TranslationError::AmbiguousReference {
                name: column.to_string(),
                matches: found.iter().map(|(t, _)| format!("{}.{}", t.name(), column)).collect(),
            }),
        }
    }

    /// Find a column qualified by 1 to 3 leading segments.
    pub fn resolve_qualified(
        &self,
        path: &[String],
        column: &str,
    ) -> Result<(QueryTableInfo, Arc<CatalogColumn>), TranslationError> {
        let pattern = QualifiedName::pattern_from_parts(path, SegmentMask::TABLE)?;
        let table = self
            .tables
            .get(&pattern)?
            .ok_or_else(|| TranslationError::unknown(ReferenceKind::Table, path.join(".")))?;
        let found = table
            .base()
            .column(column)
            .ok_or_else(|| TranslationError::unknown(ReferenceKind::Column, format!("{}.{}", path.join("."), column)))?;
        Ok((table.clone(), found.clone()))
    }

    /// The smallest qualification under which every registered table and
    /// column reads differently from every other.
    pub fn minimal_qualification(&self) -> SegmentMask {
        (1..=4)
            .map(|n| SegmentMask::trailing(SegmentMask::COLUMN, n))
            .find(|mask| self.distinct_under(*mask))
            .unwrap_or(SegmentMask::ALL)
    }

    fn distinct_under(&self, mask: SegmentMask) -> bool {
        let table_mask = mask.without(SegmentMask::COLUMN) | SegmentMask::TABLE;
        let mut seen = HashSet::new();
        if !self.tables.iter().all(|t| seen.insert(t.name().with_mask(table_mask).display_name(NameStyle::Relational))) {
            return false;
        }
        let mut seen = HashSet::new();
        let mut identities = HashSet::new();
        self.columns
            .iter()
            .filter(|c| !c.is_synthetic())
            .filter(|c| identities.insert(c.identity()))
            .all(|c| seen.insert(c.name().with_mask(mask).display_name(NameStyle::Relational)))
    }

    /// Mark a registered column as part of the visible result.
    pub fn add_result(&mut self, column: &QueryColumnInfo, alias: Option<&str>) -> Result<(), TranslationError> {
        if self.columns.find_exact(column.name()).is_none() {
            return Err(TranslationError::unknown(ReferenceKind::Column, column.name().to_string()));
        }
        self.results.push(ResultEntry { column: column.name().clone(), alias: alias.map(str::to_string) });
        Ok(())
    }

    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    /// Result columns in select-list order, with unique labels and variables.
    pub fn result_columns(&self) -> Result<Vec<(QueryColumnInfo, ResultColumn)>, TranslationError> {
        let mask = self.minimal_qualification();
        let mut used = HashSet::new();
        let mut out = Vec::with_capacity(self.results.len());
        for entry in &self.results {
            let column = self
                .columns
                .find_exact(&entry.column)
                .ok_or_else(|| TranslationError::unknown(ReferenceKind::Column, entry.column.to_string()))?;
            let shown = if column.is_synthetic() { column.name().with_mask(SegmentMask::COLUMN) } else { column.name().with_mask(mask) };
            let label = entry.alias.clone().unwrap_or_else(|| shown.display_name(NameStyle::Relational));
            let graph_label = match &entry.alias {
                Some(alias) => alias.clone(),
                None => shown.display_name(NameStyle::Graph),
            };
            let variable = Self::unique_variable(&graph_label, &mut used);
            out.push((
                column.clone(),
                ResultColumn {
                    label,
                    variable,
                    sql_type: column.base().sql_type(),
                    nullable: column.optional() || column.base().nullable(),
                },
            ));
        }
        Ok(out)
    }

    fn unique_variable(label: &str, used: &mut HashSet<String>) -> Variable {
        let base = Self::sanitize(label);
        let mut candidate = base.clone();
        let mut n = 2;
        while !used.insert(candidate.clone()) {
            candidate = format!("{}_{}", base, n);
            n += 1;
        }
        Variable::new(candidate)
    }

    /// Make `label` a legal variable name: U+00B7 may appear after the first
    /// character, anything else outside letters, digits and `_` becomes `_`.
    fn sanitize(label: &str) -> String {
        let mut out: String = label
            .chars()
            .enumerate()
            .map(|(i, c)| match c {
                c if c.is_alphanumeric() || c == '_' => c,
                '\u{00B7}' if i > 0 => c,
                _ => '_',
            })
            .collect();
        if out.is_empty() {
            out.push('_');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{QuerySegment, SqlType};

    fn table(schema: &str, name: &str, columns: &[&str]) -> Arc<CatalogTable> {
        let table_name = QualifiedName::table_name("c", schema, name).unwrap();
        let mut table = CatalogTable::new(table_name.clone(), Some(QuerySegment::parse_table("t", "%1$s a ex:T").unwrap()));
        for column in columns {
            let segment = QuerySegment::parse_column("c", "%1$s ex:p %2$s").unwrap();
            table
                .add_column(CatalogColumn::new(table_name.child_column(column).unwrap(), SqlType::Integer).with_segment(segment))
                .unwrap();
        }
        Arc::new(table)
    }

    fn bind(set: &mut QuerySymbolSet, table: &QueryTableInfo, column: &Arc<CatalogColumn>) -> QueryColumnInfo {
        let name = table.name().child_column(column.column_name()).unwrap();
        let info = QueryColumnInfo::new(column.clone(), name.clone(), false, name.guid(), set.prefix());
        set.add_column(info.clone()).unwrap();
        info
    }

    #[test]
    fn unqualified_resolution_and_ambiguity() {
        let mut set = QuerySymbolSet::new("v");
        let t1 = table("s", "t1", &["k", "a"]);
        let t2 = table("s", "t2", &["k", "b"]);
        set.add_table(t1.clone(), t1.name().clone(), false).unwrap();
        set.add_table(t2.clone(), t2.name().clone(), false).unwrap();

        let (found_table, found_column) = set.resolve_unqualified("a").unwrap().unwrap();
        assert_eq!(found_table.name().table(), Some("t1"));
        assert_eq!(found_column.column_name(), "a");
        assert!(set.resolve_unqualified("zzz").unwrap().is_none());
        assert!(matches!(set.resolve_unqualified("k"), Err(TranslationError::AmbiguousReference { .. })));
    }

    #[test]
    fn qualified_resolution_uses_aliases() {
        let mut set = QuerySymbolSet::new("v");
        let t = table("s", "orders", &["id"]);
        let alias = QualifiedName::pattern(None, None, Some("o"), None).unwrap();
        set.add_table(t, alias, false).unwrap();

        let (table, column) = set.resolve_qualified(&["o".to_string()], "id").unwrap();
        assert_eq!(table.name().to_string(), "o");
        assert_eq!(column.name().to_string(), "c.s.orders.id");
        assert!(matches!(
            set.resolve_qualified(&["orders".to_string()], "id"),
            Err(TranslationError::UnknownReference { kind: ReferenceKind::Table, .. })
        ));
        assert!(matches!(
            set.resolve_qualified(&["o".to_string()], "nope"),
            Err(TranslationError::UnknownReference { kind: ReferenceKind::Column, .. })
        ));
    }

    #[test]
    fn same_table_twice_needs_an_alias() {
        let mut set = QuerySymbolSet::new("v");
        let t = table("s", "t", &["a"]);
        set.add_table(t.clone(), t.name().clone(), false).unwrap();
        assert!(set.add_table(t.clone(), t.name().clone(), false).is_err());
        let alias = QualifiedName::pattern(None, None, Some("t2"), None).unwrap();
        assert!(set.add_table(t, alias, true).is_ok());
    }

    #[test]
    fn duplicate_binding_of_a_local_name() {
        let mut set = QuerySymbolSet::new("v");
        let t = table("s", "t", &["a", "b"]);
        let info = set.add_table(t.clone(), t.name().clone(), false).unwrap();
        let a = bind(&mut set, &info, &t.columns()[0]);
        let b = bind(&mut set, &info, &t.columns()[1]);

        let x = info.name().child_column("x").unwrap();
        assert!(set.add_column(a.aliased(x.clone())).unwrap());
        assert!(!set.add_column(a.aliased(x.clone())).unwrap());
        match set.add_column(b.aliased(x)) {
            Err(TranslationError::DuplicateBinding { existing, requested, .. }) => {
                assert_eq!(existing, "c.s.t.a");
                assert_eq!(requested, "c.s.t.b");
            }
            other => panic!("expected duplicate binding, got {:?}", other),
        }
        assert_eq!(set.columns_with_identity(a.identity()).len(), 2);
    }

    #[test]
    fn labels_live_apart_from_table_columns() {
        let mut set = QuerySymbolSet::new("v");
        let t = table("s", "t", &["a", "b"]);
        let info = set.add_table(t.clone(), t.name().clone(), false).unwrap();
        let a = bind(&mut set, &info, &t.columns()[0]);
        let b = bind(&mut set, &info, &t.columns()[1]);

        // `a AS b, b AS a` swaps names without touching the column bindings
        let as_b = set.add_label("b", &a).unwrap();
        set.add_label("a", &b).unwrap();
        assert_eq!(as_b.variable(), a.variable());
        assert_eq!(set.label("B").map(|c| c.identity()), Some(a.identity()));
        assert_eq!(set.column(b.name()).map(|c| c.identity()), Some(b.identity()));
        assert_eq!(set.columns_with_identity(a.identity()).len(), 1);

        assert!(set.add_label("B", &a).is_ok());
        assert!(matches!(set.add_label("b", &b), Err(TranslationError::DuplicateBinding { .. })));
    }

    #[test]
    fn minimal_qualification_grows_only_when_needed() {
        let mut set = QuerySymbolSet::new("v");
        let t1 = table("s", "t1", &["k", "a"]);
        let info1 = set.add_table(t1.clone(), t1.name().clone(), false).unwrap();
        bind(&mut set, &info1, &t1.columns()[0]);
        assert_eq!(set.minimal_qualification(), SegmentMask::COLUMN);

        let t2 = table("s", "t2", &["k"]);
        let info2 = set.add_table(t2.clone(), t2.name().clone(), false).unwrap();
        bind(&mut set, &info2, &t2.columns()[0]);
        assert_eq!(set.minimal_qualification(), SegmentMask::TABLE | SegmentMask::COLUMN);

        let t3 = table("x", "t1", &["z"]);
        set.add_table(t3.clone(), QualifiedName::pattern(None, None, Some("other"), None).unwrap(), false).unwrap();
        assert_eq!(set.minimal_qualification(), SegmentMask::TABLE | SegmentMask::COLUMN);
    }

    #[test]
    fn result_labels_are_unique_variables() {
        let mut set = QuerySymbolSet::new("v");
        let t1 = table("s", "t1", &["k"]);
        let t2 = table("s", "t2", &["k"]);
        let i1 = set.add_table(t1.clone(), t1.name().clone(), false).unwrap();
        let i2 = set.add_table(t2.clone(), t2.name().clone(), false).unwrap();
        let k1 = bind(&mut set, &i1, &t1.columns()[0]);
        let k2 = bind(&mut set, &i2, &t2.columns()[0]);
        set.add_result(&k1, None).unwrap();
        set.add_result(&k2, None).unwrap();
        set.add_result(&k1, Some("key")).unwrap();
        set.add_result(&k2, Some("key")).unwrap();

        let labels: Vec<(String, String)> = set
            .result_columns()
            .unwrap()
            .into_iter()
            .map(|(_, r)| (r.label, r.variable.name().to_string()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("t1.k".to_string(), "t1\u{00B7}k".to_string()),
                ("t2.k".to_string(), "t2\u{00B7}k".to_string()),
                ("key".to_string(), "key".to_string()),
                ("key".to_string(), "key_2".to_string()),
            ]
        );
    }
}
