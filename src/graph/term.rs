use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

pub const XSD_STRING: &str = "xsd:string";
pub const XSD_INTEGER: &str = "xsd:integer";
pub const XSD_DECIMAL: &str = "xsd:decimal";
pub const XSD_DOUBLE: &str = "xsd:double";
pub const XSD_BOOLEAN: &str = "xsd:boolean";
pub const XSD_DATE: &str = "xsd:date";
pub const XSD_TIME: &str = "xsd:time";
pub const XSD_DATE_TIME: &str = "xsd:dateTime";
pub const RDF_TYPE: &str = "rdf:type";

/// A query variable, stored without the leading `?`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Variable(String);

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.strip_prefix('?') {
            Some(stripped) => Variable(stripped.to_string()),
            None => Variable(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

/// A literal value as it appears in a graph query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GraphLiteral {
    pub lexical: String,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl GraphLiteral {
    pub fn string(value: impl Into<String>) -> Self {
        Self { lexical: value.into(), datatype: None, language: None }
    }

    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self { lexical: lexical.into(), datatype: Some(datatype.into()), language: None }
    }

    pub fn lang(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self { lexical: lexical.into(), datatype: None, language: Some(language.into()) }
    }

    pub fn integer(value: i64) -> Self {
        Self::typed(value.to_string(), XSD_INTEGER)
    }

    pub fn decimal(value: f64) -> Self {
        Self::typed(value.to_string(), XSD_DECIMAL)
    }

    pub fn double(value: f64) -> Self {
        Self::typed(format!("{:e}", value), XSD_DOUBLE)
    }

    pub fn boolean(value: bool) -> Self {
        Self::typed(value.to_string(), XSD_BOOLEAN)
    }

    pub fn date(value: NaiveDate) -> Self {
        Self::typed(value.format("%Y-%m-%d").to_string(), XSD_DATE)
    }

    pub fn date_time(value: NaiveDateTime) -> Self {
        Self::typed(value.format("%Y-%m-%dT%H:%M:%S%.f").to_string(), XSD_DATE_TIME)
    }

    fn escape(value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        for ch in value.chars() {
            match ch {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c => out.push(c),
            }
        }
        out
    }
}

impl fmt::Display for GraphLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.datatype.as_deref(), self.language.as_deref()) {
            (Some(XSD_INTEGER), _) | (Some(XSD_BOOLEAN), _) => f.write_str(&self.lexical),
            (Some(XSD_DECIMAL), _) if self.lexical.contains('.') => f.write_str(&self.lexical),
            (Some(dt), _) => write!(f, "\"{}\"^^{}", Self::escape(&self.lexical), dt),
            (None, Some(lang)) => write!(f, "\"{}\"@{}", Self::escape(&self.lexical), lang),
            (None, None) => write!(f, "\"{}\"", Self::escape(&self.lexical)),
        }
    }
}

/// One position of a triple pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Term {
    Variable(Variable),
    /// A full IRI, rendered in angle brackets.
    Iri(String),
    /// A prefixed name such as `rdf:type`, rendered verbatim.
    Prefixed(String),
    Literal(GraphLiteral),
    BlankNode(String),
}

impl Term {
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Term::Variable(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Variable> for Term {
    fn from(v: Variable) -> Self {
        Term::Variable(v)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(v) => write!(f, "{}", v),
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::Prefixed(name) => f.write_str(name),
            Term::Literal(l) => write!(f, "{}", l),
            Term::BlankNode(b) => write!(f, "_:{}", b),
        }
    }
}
