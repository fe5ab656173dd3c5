use std::fmt::{self, Display};

use chrono::{NaiveDate, NaiveDateTime};
use ordered_float::NotNan;

#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    String(String),
    Int(i64),
    Float(NotNan<f64>),
    Bool(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Null,
}

impl Literal {
    /// A float literal; NaN has no SQL spelling and is rejected.
    pub fn float(value: f64) -> Option<Literal> {
        NotNan::new(value).ok().map(Literal::Float)
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Float(n) => write!(f, "{}", n.into_inner()),
            Literal::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Literal::Date(d) => write!(f, "DATE '{}'", d.format("%Y-%m-%d")),
            Literal::Timestamp(t) => write!(f, "TIMESTAMP '{}'", t.format("%Y-%m-%d %H:%M:%S%.f")),
            Literal::Null => write!(f, "NULL"),
        }
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(_) => write!(f, "String({})", self),
            Literal::Int(_) => write!(f, "Int({})", self),
            Literal::Float(_) => write!(f, "Float({})", self),
            Literal::Bool(_) => write!(f, "Bool({})", self),
            Literal::Date(_) => write!(f, "Date({})", self),
            Literal::Timestamp(_) => write!(f, "Timestamp({})", self),
            Literal::Null => write!(f, "Null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_spelling() {
        assert_eq!(Literal::String("O'Neil".into()).to_string(), "'O''Neil'");
        assert_eq!(Literal::float(1.5).unwrap().to_string(), "1.5");
        assert!(Literal::float(f64::NAN).is_none());
        let d = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        assert_eq!(Literal::Date(d).to_string(), "DATE '2025-02-01'");
    }
}
