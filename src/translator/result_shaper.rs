use serde_json::{Map, Number, Value};

use crate::{
    graph::{Solution, Term, XSD_BOOLEAN, XSD_DECIMAL, XSD_DOUBLE, XSD_INTEGER},
    query::ResultColumn,
};

/// One relational row; `None` is SQL NULL (the variable was left unbound).
pub type ResultRow = Vec<Option<Term>>;

pub struct ResultShaper;

impl ResultShaper {
    /// Order each solution's bindings by result column.
    pub fn shape(columns: &[ResultColumn], solutions: &[Solution]) -> Vec<ResultRow> {
        solutions
            .iter()
            .map(|solution| columns.iter().map(|c| solution.get(&c.variable).cloned()).collect())
            .collect()
    }

    /// Rows as JSON objects keyed by label. Numeric and boolean literals become
    /// JSON numbers and booleans, IRIs and other literals become strings.
    pub fn to_json(columns: &[ResultColumn], rows: &[ResultRow]) -> Vec<Value> {
        rows.iter()
            .map(|row| {
                let mut object = Map::new();
                for (column, value) in columns.iter().zip(row) {
                    object.insert(column.label.clone(), value.as_ref().map_or(Value::Null, Self::term_to_json));
                }
                Value::Object(object)
            })
            .collect()
    }

    fn term_to_json(term: &Term) -> Value {
        match term {
            Term::Literal(literal) => match literal.datatype.as_deref() {
                Some(XSD_INTEGER) => literal
                    .lexical
                    .parse::<i64>()
                    .map(|i| Value::Number(Number::from(i)))
                    .unwrap_or_else(|_| Value::String(literal.lexical.clone())),
                Some(XSD_DECIMAL) | Some(XSD_DOUBLE) => literal
                    .lexical
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::String(literal.lexical.clone())),
                Some(XSD_BOOLEAN) => match literal.lexical.as_str() {
                    "true" | "1" => Value::Bool(true),
                    "false" | "0" => Value::Bool(false),
                    other => Value::String(other.to_string()),
                },
                _ => Value::String(literal.lexical.clone()),
            },
            Term::Iri(iri) => Value::String(iri.clone()),
            other => Value::String(other.to_string()),
        }
    }
}
