use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::{
    XSD_BOOLEAN, XSD_DATE, XSD_DATE_TIME, XSD_DECIMAL, XSD_DOUBLE, XSD_INTEGER, XSD_STRING, XSD_TIME,
};

const INTEGER_TYPES: &[&str] = &[
    XSD_INTEGER,
    "xsd:int",
    "xsd:long",
    "xsd:short",
    "xsd:byte",
    "xsd:nonNegativeInteger",
    "xsd:positiveInteger",
    "xsd:nonPositiveInteger",
    "xsd:negativeInteger",
    "xsd:unsignedLong",
    "xsd:unsignedInt",
    "xsd:unsignedShort",
    "xsd:unsignedByte",
];

const DECIMAL_TYPES: &[&str] = &[
    XSD_DECIMAL,
    XSD_INTEGER,
    "xsd:int",
    "xsd:long",
    "xsd:short",
    "xsd:byte",
    "xsd:nonNegativeInteger",
    "xsd:positiveInteger",
];

const FLOAT_TYPES: &[&str] = &[XSD_DOUBLE, "xsd:float", XSD_DECIMAL, XSD_INTEGER, "xsd:int", "xsd:long"];
const BOOLEAN_TYPES: &[&str] = &[XSD_BOOLEAN];
const DATE_TYPES: &[&str] = &[XSD_DATE];
const TIME_TYPES: &[&str] = &[XSD_TIME];
const TIMESTAMP_TYPES: &[&str] = &[XSD_DATE_TIME, "xsd:dateTimeStamp"];

/// Relational column types, with their JDBC type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SqlType {
    Char,
    Varchar,
    #[serde(alias = "LONGVARCHAR")]
    LongVarchar,
    Boolean,
    #[serde(alias = "TINYINT")]
    TinyInt,
    #[serde(alias = "SMALLINT")]
    SmallInt,
    Integer,
    #[serde(alias = "BIGINT")]
    BigInt,
    Decimal,
    Numeric,
    Real,
    Float,
    Double,
    Date,
    Time,
    Timestamp,
    Other,
}

/// What the bound value of a column must look like to be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeConstraint {
    /// The literal's datatype must be one of these prefixed names.
    Datatypes(&'static [&'static str]),
    /// Any literal or IRI; blank nodes are rejected.
    LiteralOrIri,
    /// No check at all.
    Any,
}

impl SqlType {
    pub fn code(self) -> i32 {
        match self {
            SqlType::Char => 1,
            SqlType::Varchar => 12,
            SqlType::LongVarchar => -1,
            SqlType::Boolean => 16,
            SqlType::TinyInt => -6,
            SqlType::SmallInt => 5,
            SqlType::Integer => 4,
            SqlType::BigInt => -5,
            SqlType::Decimal => 3,
            SqlType::Numeric => 2,
            SqlType::Real => 7,
            SqlType::Float => 6,
            SqlType::Double => 8,
            SqlType::Date => 91,
            SqlType::Time => 92,
            SqlType::Timestamp => 93,
            SqlType::Other => 1111,
        }
    }

    pub fn from_code(code: i32) -> Option<SqlType> {
        Self::all().iter().copied().find(|t| t.code() == code)
    }

    pub fn all() -> &'static [SqlType] {
        &[
            SqlType::Char,
            SqlType::Varchar,
            SqlType::LongVarchar,
            SqlType::Boolean,
            SqlType::TinyInt,
            SqlType::SmallInt,
            SqlType::Integer,
            SqlType::BigInt,
            SqlType::Decimal,
            SqlType::Numeric,
            SqlType::Real,
            SqlType::Float,
            SqlType::Double,
            SqlType::Date,
            SqlType::Time,
            SqlType::Timestamp,
            SqlType::Other,
        ]
    }

    pub fn is_string(self) -> bool {
        matches!(self, SqlType::Char | SqlType::Varchar | SqlType::LongVarchar)
    }

    pub fn is_integral(self) -> bool {
        matches!(self, SqlType::TinyInt | SqlType::SmallInt | SqlType::Integer | SqlType::BigInt)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integral()
            || matches!(self, SqlType::Decimal | SqlType::Numeric | SqlType::Real | SqlType::Float | SqlType::Double)
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, SqlType::Date | SqlType::Time | SqlType::Timestamp)
    }

    pub fn display_size(self) -> u32 {
        match self {
            SqlType::Char | SqlType::Varchar | SqlType::Other => 255,
            SqlType::LongVarchar => 65_535,
            SqlType::Boolean => 5,
            SqlType::TinyInt => 4,
            SqlType::SmallInt => 6,
            SqlType::Integer => 11,
            SqlType::BigInt => 20,
            SqlType::Decimal | SqlType::Numeric => 40,
            SqlType::Real => 14,
            SqlType::Float | SqlType::Double => 24,
            SqlType::Date => 10,
            SqlType::Time => 8,
            SqlType::Timestamp => 26,
        }
    }

    pub fn default_precision(self) -> u32 {
        match self {
            SqlType::TinyInt => 3,
            SqlType::SmallInt => 5,
            SqlType::Integer => 10,
            SqlType::BigInt => 19,
            SqlType::Decimal | SqlType::Numeric => 38,
            SqlType::Real => 7,
            SqlType::Float | SqlType::Double => 15,
            SqlType::Boolean => 1,
            other => other.display_size(),
        }
    }

    pub fn default_scale(self) -> u32 {
        match self {
            SqlType::Decimal | SqlType::Numeric => 10,
            _ => 0,
        }
    }

    /// The common type of two operands. Numerics widen (integral < exact <
    /// approximate); anything else keeps the left-hand type.
    pub fn promote(a: SqlType, b: SqlType) -> SqlType {
        if a == b {
            return a;
        }
        match (a, b) {
            (x, y) if x.is_numeric() && y.is_numeric() => {
                let rank = |t: SqlType| match t {
                    t if t.is_integral() => 0,
                    SqlType::Decimal | SqlType::Numeric => 1,
                    _ => 2,
                };
                match rank(x).max(rank(y)) {
                    0 => SqlType::BigInt,
                    1 => SqlType::Decimal,
                    _ => SqlType::Double,
                }
            }
            (x, y) if x.is_string() && y.is_string() => SqlType::Varchar,
            (SqlType::Other, y) => y,
            (x, _) => x,
        }
    }

    pub fn is_signed(self) -> bool {
        self.is_numeric()
    }

    pub fn constraint(self) -> TypeConstraint {
        match self {
            SqlType::Char | SqlType::Varchar | SqlType::LongVarchar => TypeConstraint::LiteralOrIri,
            SqlType::Boolean => TypeConstraint::Datatypes(BOOLEAN_TYPES),
            SqlType::TinyInt | SqlType::SmallInt | SqlType::Integer | SqlType::BigInt => {
                TypeConstraint::Datatypes(INTEGER_TYPES)
            }
            SqlType::Decimal | SqlType::Numeric => TypeConstraint::Datatypes(DECIMAL_TYPES),
            SqlType::Real | SqlType::Float | SqlType::Double => TypeConstraint::Datatypes(FLOAT_TYPES),
            SqlType::Date => TypeConstraint::Datatypes(DATE_TYPES),
            SqlType::Time => TypeConstraint::Datatypes(TIME_TYPES),
            SqlType::Timestamp => TypeConstraint::Datatypes(TIMESTAMP_TYPES),
            SqlType::Other => TypeConstraint::Any,
        }
    }

    /// The graph datatype a value of this type is coerced to.
    pub fn datatype(self) -> Option<&'static str> {
        match self {
            SqlType::Char | SqlType::Varchar | SqlType::LongVarchar => Some(XSD_STRING),
            SqlType::Boolean => Some(XSD_BOOLEAN),
            SqlType::TinyInt | SqlType::SmallInt | SqlType::Integer | SqlType::BigInt => Some(XSD_INTEGER),
            SqlType::Decimal | SqlType::Numeric => Some(XSD_DECIMAL),
            SqlType::Real | SqlType::Float | SqlType::Double => Some(XSD_DOUBLE),
            SqlType::Date => Some(XSD_DATE),
            SqlType::Time => Some(XSD_TIME),
            SqlType::Timestamp => Some(XSD_DATE_TIME),
            SqlType::Other => None,
        }
    }

    /// Name of the function that coerces a bound value to this type.
    /// Strings go through `STR` so IRIs and language-tagged literals flatten too.
    pub fn coercion_function(self) -> Option<&'static str> {
        match self {
            t if t.is_string() => Some("STR"),
            t => t.datatype(),
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SqlType::Char => "CHAR",
            SqlType::Varchar => "VARCHAR",
            SqlType::LongVarchar => "LONGVARCHAR",
            SqlType::Boolean => "BOOLEAN",
            SqlType::TinyInt => "TINYINT",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Decimal => "DECIMAL",
            SqlType::Numeric => "NUMERIC",
            SqlType::Real => "REAL",
            SqlType::Float => "FLOAT",
            SqlType::Double => "DOUBLE",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Other => "OTHER",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_widens_numerics() {
        assert_eq!(SqlType::promote(SqlType::Integer, SqlType::Integer), SqlType::Integer);
        assert_eq!(SqlType::promote(SqlType::SmallInt, SqlType::Integer), SqlType::BigInt);
        assert_eq!(SqlType::promote(SqlType::Integer, SqlType::Decimal), SqlType::Decimal);
        assert_eq!(SqlType::promote(SqlType::Real, SqlType::Decimal), SqlType::Double);
        assert_eq!(SqlType::promote(SqlType::Char, SqlType::Varchar), SqlType::Varchar);
        assert_eq!(SqlType::promote(SqlType::Date, SqlType::Integer), SqlType::Date);
        assert_eq!(SqlType::promote(SqlType::Other, SqlType::Integer), SqlType::Integer);
    }

    #[test]
    fn codes_round_trip() {
        for t in SqlType::all() {
            assert_eq!(SqlType::from_code(t.code()), Some(*t));
        }
        assert_eq!(SqlType::from_code(4242), None);
    }

    #[test]
    fn deserializes_from_screaming_case() {
        let t: SqlType = serde_json::from_str("\"BIG_INT\"").unwrap();
        assert_eq!(t, SqlType::BigInt);
        let t: SqlType = serde_json::from_str("\"BIGINT\"").unwrap();
        assert_eq!(t, SqlType::BigInt);
        let t: SqlType = serde_json::from_str("\"VARCHAR\"").unwrap();
        assert_eq!(t, SqlType::Varchar);
    }

    #[test]
    fn coercions() {
        assert_eq!(SqlType::Varchar.coercion_function(), Some("STR"));
        assert_eq!(SqlType::Integer.coercion_function(), Some(XSD_INTEGER));
        assert_eq!(SqlType::Other.coercion_function(), None);
        assert!(matches!(SqlType::Other.constraint(), TypeConstraint::Any));
        assert!(matches!(SqlType::Date.constraint(), TypeConstraint::Datatypes(d) if d == [XSD_DATE]));
    }
}
