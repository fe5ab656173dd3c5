use std::{fmt, hash::{Hash, Hasher}};

use uuid::Uuid;

use crate::{names::SegmentMask, translator::TranslationError};

/// Separator of the dot-joined relational form (`schema.table.column`).
pub const RELATIONAL_SEPARATOR: char = '.';
/// Separator of the graph-identifier form. U+00B7 is legal inside SPARQL
/// variable names, so a graph-form name can be used directly as a variable.
pub const GRAPH_SEPARATOR: char = '\u{00B7}';

const NAME_NAMESPACE: Uuid = Uuid::from_u128(0x5f3a_2c1e_8b7d_4e90_a1c2_6d3e_9f40_7b15);

/// The two serialization forms of a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStyle {
    /// `catalog.schema.table.column`
    Relational,
    /// `catalog·schema·table·column`
    Graph,
}

impl NameStyle {
    pub fn separator(self) -> char {
        match self {
            NameStyle::Relational => RELATIONAL_SEPARATOR,
            NameStyle::Graph => GRAPH_SEPARATOR,
        }
    }
}

/// An immutable catalog/schema/table/column name with a mask of active segments.
///
/// Identity (`guid`) is a content hash over all four segments and never changes
/// when the name is re-masked. Equality and hashing use `(guid, mask)`, so the
/// same underlying name viewed at two mask levels compares unequal, while
/// [`QualifiedName::matches`] compares content only.
#[derive(Clone)]
pub struct QualifiedName {
    catalog: Option<String>,
    schema: Option<String>,
    table: Option<String>,
    column: Option<String>,
    mask: SegmentMask,
    guid: Uuid,
    display: String,
}

impl QualifiedName {
    /// Build a concrete name. The narrowest present segment fixes the level and
    /// every segment above it must be present too.
    pub fn new(
        catalog: Option<&str>,
        schema: Option<&str>,
        table: Option<&str>,
        column: Option<&str>,
    ) -> Result<Self, TranslationError> {
        let segments = [catalog, schema, table, column];
        if let Some(level) = segments.iter().rposition(|s| s.is_some()) {
            if let Some(missing) = segments[..level].iter().position(|s| s.is_none()) {
                let labels = ["catalog", "schema", "table", "column"];
                return TranslationError::invalid_name(
                    Self::join(&segments, RELATIONAL_SEPARATOR),
                    format!("{} name requires a {} segment", labels[level], labels[missing]),
                )
                .err();
            }
        }
        Self::build(catalog, schema, table, column, None)
    }

    pub fn catalog_name(catalog: &str) -> Result<Self, TranslationError> {
        Self::new(Some(catalog), None, None, None)
    }

    pub fn schema_name(catalog: &str, schema: &str) -> Result<Self, TranslationError> {
        Self::new(Some(catalog), Some(schema), None, None)
    }

    pub fn table_name(catalog: &str, schema: &str, table: &str) -> Result<Self, TranslationError> {
        Self::new(Some(catalog), Some(schema), Some(table), None)
    }

    pub fn column_name(catalog: &str, schema: &str, table: &str, column: &str) -> Result<Self, TranslationError> {
        Self::new(Some(catalog), Some(schema), Some(table), Some(column))
    }

    /// Build a lookup pattern from user input. Missing broader segments are
    /// allowed; only the supplied segments are active.
    pub fn pattern(
        catalog: Option<&str>,
        schema: Option<&str>,
        table: Option<&str>,
        column: Option<&str>,
    ) -> Result<Self, TranslationError> {
        Self::build(catalog, schema, table, column, None)
    }

    /// A pattern for `parts` read right-to-left from `lowest`, e.g.
    /// `["s", "t", "c"]` ending at COLUMN gives schema `s`, table `t`, column `c`.
    /// Empty parts are absent segments; the result must still name `lowest` and
    /// must not be an ambiguous wildcard (`s..c`).
    pub fn pattern_from_parts(parts: &[String], lowest: SegmentMask) -> Result<Self, TranslationError> {
        let mut slots: [Option<&str>; 4] = [None; 4];
        let Some(lowest_index) = SegmentMask::SEGMENTS.iter().position(|s| *s == lowest) else {
            return TranslationError::invalid_name(parts.join("."), "no segment to anchor the name").err();
        };
        if parts.is_empty() || parts.len() > lowest_index + 1 {
            return TranslationError::invalid_name(
                parts.join("."),
                format!("expected between 1 and {} name parts", lowest_index + 1),
            )
            .err();
        }
        let start = lowest_index + 1 - parts.len();
        for (offset, part) in parts.iter().enumerate() {
            if !part.is_empty() {
                slots[start + offset] = Some(part.as_str());
            }
        }
        let name = Self::pattern(slots[0], slots[1], slots[2], slots[3])?;
        if name.segment(lowest).is_none() || name.is_ambiguous_wildcard() {
            return TranslationError::invalid_name(parts.join("."), "name parts leave a gap in the qualification").err();
        }
        Ok(name)
    }

    fn build(
        catalog: Option<&str>,
        schema: Option<&str>,
        table: Option<&str>,
        column: Option<&str>,
        mask: Option<SegmentMask>,
    ) -> Result<Self, TranslationError> {
        let segments = [catalog, schema, table, column];
        for segment in segments.iter().flatten() {
            Self::validate_segment(segment, &segments)?;
        }
        let present = segments
            .iter()
            .zip(SegmentMask::SEGMENTS)
            .filter(|(s, _)| s.is_some())
            .fold(SegmentMask::NONE, |acc, (_, m)| acc | m);
        let mask = mask.unwrap_or(present);
        let guid = Uuid::new_v5(&NAME_NAMESPACE, Self::identity_key_of(&segments).as_bytes());
        let mut name = Self {
            catalog: catalog.map(str::to_string),
            schema: schema.map(str::to_string),
            table: table.map(str::to_string),
            column: column.map(str::to_string),
            mask,
            guid,
            display: String::new(),
        };
        name.display = name.display_name(NameStyle::Relational);
        Ok(name)
    }

    fn validate_segment(segment: &str, all: &[Option<&str>; 4]) -> Result<(), TranslationError> {
        if segment.contains(RELATIONAL_SEPARATOR) || segment.contains(GRAPH_SEPARATOR) {
            return TranslationError::invalid_name(
                Self::join(all, RELATIONAL_SEPARATOR),
                format!("segment `{}` contains a reserved separator", segment),
            )
            .err();
        }
        Ok(())
    }

    fn identity_key_of(segments: &[Option<&str>; 4]) -> String {
        // Debug formatting quotes and escapes each segment, so `None` and any
        // string value can never produce the same key.
        segments.iter().map(|s| format!("{:?}", s)).collect::<Vec<_>>().join("|")
    }

    fn join(segments: &[Option<&str>; 4], separator: char) -> String {
        segments.iter().flatten().copied().collect::<Vec<_>>().join(&separator.to_string())
    }

    /// A re-masked view of this name. Never re-validates and keeps the GUID.
    pub fn with_mask(&self, mask: SegmentMask) -> QualifiedName {
        let mut name = self.clone();
        name.mask = SegmentMask::from_bits(mask.bits());
        name.display = name.display_name(NameStyle::Relational);
        name
    }

    /// The column-level child of a table-level name.
    pub fn child_column(&self, column: &str) -> Result<QualifiedName, TranslationError> {
        let mut name = Self::build(
            self.catalog.as_deref(),
            self.schema.as_deref(),
            self.table.as_deref(),
            Some(column),
            None,
        )?;
        name.mask = self.mask | SegmentMask::COLUMN;
        name.display = name.display_name(NameStyle::Relational);
        Ok(name)
    }

    /// The table-level parent of a column-level name (all present segments active).
    pub fn table_part(&self) -> Result<QualifiedName, TranslationError> {
        Self::build(self.catalog.as_deref(), self.schema.as_deref(), self.table.as_deref(), None, None)
    }

    pub fn catalog(&self) -> Option<&str> {
        self.catalog.as_deref()
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn mask(&self) -> SegmentMask {
        self.mask
    }

    pub fn guid(&self) -> Uuid {
        self.guid
    }

    /// The narrowest segment that carries a value.
    pub fn level(&self) -> Option<SegmentMask> {
        self.present().lowest()
    }

    /// Segments carrying a value, regardless of the mask.
    pub fn present(&self) -> SegmentMask {
        self.segments()
            .iter()
            .zip(SegmentMask::SEGMENTS)
            .filter(|(s, _)| s.is_some())
            .fold(SegmentMask::NONE, |acc, (_, m)| acc | m)
    }

    fn segments(&self) -> [Option<&str>; 4] {
        [self.catalog(), self.schema(), self.table(), self.column()]
    }

    pub fn segment(&self, which: SegmentMask) -> Option<&str> {
        SegmentMask::SEGMENTS
            .iter()
            .position(|s| *s == which)
            .and_then(|i| self.segments()[i])
    }

    /// Name A matches name B when every segment active in either side agrees,
    /// ignoring segments that one of the sides does not carry at all.
    pub fn matches(&self, other: &QualifiedName) -> bool {
        let active = self.mask | other.mask;
        let mine = self.segments();
        let theirs = other.segments();
        SegmentMask::SEGMENTS.iter().enumerate().all(|(i, segment)| {
            if !active.contains(*segment) {
                return true;
            }
            match (mine[i], theirs[i]) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
        })
    }

    pub fn display_name(&self, style: NameStyle) -> String {
        let segments = self.segments();
        SegmentMask::SEGMENTS
            .iter()
            .enumerate()
            .filter(|(_, m)| self.mask.contains(**m))
            .filter_map(|(i, _)| segments[i])
            .collect::<Vec<_>>()
            .join(&style.separator().to_string())
    }

    /// No active segment: the name matches everything.
    pub fn is_wild(&self) -> bool {
        self.mask.is_empty()
    }

    /// More than one segment is active but they do not spell a full
    /// qualification down to this name's level: a gap (`s..c`), or a run that
    /// stops above the level. A name missing only its leading segments (`t.c`)
    /// is an ordinary partial qualification.
    pub fn is_ambiguous_wildcard(&self) -> bool {
        self.mask.count() > 1 && !(self.mask.is_contiguous() && self.mask.lowest() == self.level())
    }

    /// The key the GUID is computed from.
    pub fn identity_key(&self) -> String {
        Self::identity_key_of(&self.segments())
    }
}

impl PartialEq for QualifiedName {
    fn eq(&self, other: &Self) -> bool {
        self.guid == other.guid && self.mask == other.mask
    }
}

impl Eq for QualifiedName {}

impl Hash for QualifiedName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.guid.hash(state);
        self.mask.hash(state);
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QualifiedName({}, {:?})", self.display_name(NameStyle::Relational), self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col() -> QualifiedName {
        QualifiedName::column_name("shop", "sales", "orders", "id").unwrap()
    }

    #[test]
    fn guid_is_stable_across_masks_but_equality_is_not() {
        let full = col();
        let short = full.with_mask(SegmentMask::TABLE | SegmentMask::COLUMN);
        assert_eq!(full.guid(), short.guid());
        assert_ne!(full, short);
        assert_eq!(short.to_string(), "orders.id");
        assert_eq!(full.to_string(), "shop.sales.orders.id");
    }

    #[test]
    fn graph_form_uses_reserved_separator() {
        let name = col().with_mask(SegmentMask::TABLE | SegmentMask::COLUMN);
        assert_eq!(name.display_name(NameStyle::Graph), "orders\u{00B7}id");
    }

    #[test]
    fn missing_required_segment_is_rejected() {
        let err = QualifiedName::new(Some("shop"), None, Some("orders"), Some("id")).unwrap_err();
        assert!(matches!(err, TranslationError::InvalidName { .. }));
    }

    #[test]
    fn reserved_separators_are_rejected() {
        assert!(QualifiedName::table_name("shop", "sa.les", "orders").is_err());
        assert!(QualifiedName::table_name("shop", "sales", "ord\u{00B7}ers").is_err());
        assert!(QualifiedName::pattern(None, None, Some("a.b"), None).is_err());
    }

    #[test]
    fn matches_is_reflexive_and_symmetric_over_masks() {
        let full = col();
        let masks = [
            SegmentMask::NONE,
            SegmentMask::COLUMN,
            SegmentMask::TABLE | SegmentMask::COLUMN,
            SegmentMask::SCHEMA | SegmentMask::TABLE | SegmentMask::COLUMN,
            SegmentMask::ALL,
            SegmentMask::CATALOG | SegmentMask::TABLE,
        ];
        for a in masks {
            for b in masks {
                let x = full.with_mask(a);
                let y = full.with_mask(b);
                assert!(x.matches(&x));
                assert!(x.matches(&y));
                assert_eq!(x.matches(&y), y.matches(&x));
            }
        }
    }

    #[test]
    fn patterns_match_by_content() {
        let full = col();
        let by_column = QualifiedName::pattern(None, None, None, Some("id")).unwrap();
        let by_table = QualifiedName::pattern(None, None, Some("orders"), Some("id")).unwrap();
        let other_table = QualifiedName::pattern(None, None, Some("people"), Some("id")).unwrap();
        let other_column = QualifiedName::pattern(None, None, None, Some("total")).unwrap();
        assert!(full.matches(&by_column));
        assert!(by_table.matches(&full));
        assert!(!full.matches(&other_table));
        assert!(!other_column.matches(&full));
    }

    #[test]
    fn pattern_from_parts_anchors_on_the_lowest_segment() {
        let parts = vec!["sales".to_string(), "orders".to_string(), "id".to_string()];
        let p = QualifiedName::pattern_from_parts(&parts, SegmentMask::COLUMN).unwrap();
        assert_eq!(p.schema(), Some("sales"));
        assert_eq!(p.table(), Some("orders"));
        assert_eq!(p.column(), Some("id"));
        assert_eq!(p.catalog(), None);

        let too_many = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert!(QualifiedName::pattern_from_parts(&too_many, SegmentMask::SCHEMA).is_err());
    }

    #[test]
    fn pattern_from_parts_rejects_gaps() {
        let parts = |p: &[&str]| p.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let invalid = |p: &[&str], lowest| {
            matches!(
                QualifiedName::pattern_from_parts(&parts(p), lowest),
                Err(TranslationError::InvalidName { .. })
            )
        };
        assert!(invalid(&["s", "", "c"], SegmentMask::COLUMN));
        assert!(invalid(&["t", ""], SegmentMask::COLUMN));
        assert!(invalid(&[""], SegmentMask::TABLE));
        // a leading empty part is just a shorter qualification
        let short = QualifiedName::pattern_from_parts(&parts(&["", "t", "c"]), SegmentMask::COLUMN).unwrap();
        assert_eq!(short.mask(), SegmentMask::TABLE | SegmentMask::COLUMN);
        assert!(!short.is_ambiguous_wildcard());
    }

    #[test]
    fn wildcards() {
        let full = col();
        assert!(full.with_mask(SegmentMask::NONE).is_wild());
        assert!(!full.is_wild());
        assert!(!full.is_ambiguous_wildcard());
        assert!(!full.with_mask(SegmentMask::TABLE | SegmentMask::COLUMN).is_ambiguous_wildcard());
        assert!(full.with_mask(SegmentMask::CATALOG | SegmentMask::COLUMN).is_ambiguous_wildcard());
        assert!(full.with_mask(SegmentMask::SCHEMA | SegmentMask::TABLE).is_ambiguous_wildcard());
        assert!(!full.with_mask(SegmentMask::TABLE).is_ambiguous_wildcard());
    }

    #[test]
    fn none_and_empty_segments_have_distinct_identities() {
        let a = QualifiedName::pattern(None, None, Some("t"), None).unwrap();
        let b = QualifiedName::pattern(None, Some(""), Some("t"), None).unwrap();
        assert_ne!(a.guid(), b.guid());
    }

    #[test]
    fn child_and_parent_round_trip() {
        let table = QualifiedName::table_name("shop", "sales", "orders").unwrap();
        let column = table.child_column("id").unwrap();
        assert_eq!(column.guid(), col().guid());
        assert_eq!(column.table_part().unwrap(), table);
    }
}
