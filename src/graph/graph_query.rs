use std::fmt::{self, Write};

use indexmap::IndexMap;
use serde::Serialize;

use crate::graph::{Expression, GroupPattern, Variable};

/// One entry of the SELECT list: a variable, optionally computed by an expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectVariable {
    pub variable: Variable,
    pub expression: Option<Expression>,
}

impl fmt::Display for ProjectVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expression {
            Some(e) => write!(f, "({} AS {})", e, self.variable),
            None => write!(f, "{}", self.variable),
        }
    }
}

/// A GROUP BY key. A computed key is bound to `variable` (`(expr AS ?g)`) so
/// the projection can read it back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCondition {
    pub expression: Expression,
    pub variable: Option<Variable>,
}

impl fmt::Display for GroupCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.expression, &self.variable) {
            (e, Some(v)) => write!(f, "({} AS {})", e, v),
            (Expression::Variable(v), None) => write!(f, "{}", v),
            (e, None) => write!(f, "({})", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderCondition {
    pub expression: Expression,
    pub ascending: bool,
}

/// The finished graph query handed to an execution engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphQuery {
    pub prefixes: IndexMap<String, String>,
    pub distinct: bool,
    pub projection: Vec<ProjectVariable>,
    pub pattern: GroupPattern,
    /// Top-level filters, implicitly AND-ed, applied to the whole pattern.
    pub filters: Vec<Expression>,
    pub group_by: Vec<GroupCondition>,
    pub having: Option<Expression>,
    pub order_by: Vec<OrderCondition>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl GraphQuery {
    pub fn projected_variables(&self) -> Vec<&Variable> {
        self.projection.iter().map(|p| &p.variable).collect()
    }

    pub(crate) fn render(&self, out: &mut String, indent: usize, with_prefixes: bool) -> fmt::Result {
        let pad = "  ".repeat(indent);
        if with_prefixes {
            for (prefix, iri) in &self.prefixes {
                writeln!(out, "{}PREFIX {}: <{}>", pad, prefix, iri)?;
            }
        }
        write!(out, "{}SELECT ", pad)?;
        if self.distinct {
            out.push_str("DISTINCT ");
        }
        if self.projection.is_empty() {
            out.push('*');
        } else {
            let list = self.projection.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(" ");
            out.push_str(&list);
        }
        out.push('\n');
        write!(out, "{}WHERE ", pad)?;

        let mut pattern = self.pattern.clone();
        for filter in &self.filters {
            pattern.push_filter(filter.clone());
        }
        pattern.render(out, indent)?;
        out.push('\n');

        if !self.group_by.is_empty() {
            let list = self.group_by.iter().map(|g| g.to_string()).collect::<Vec<_>>().join(" ");
            writeln!(out, "{}GROUP BY {}", pad, list)?;
        }
        if let Some(having) = &self.having {
            writeln!(out, "{}HAVING ({})", pad, having)?;
        }
        if !self.order_by.is_empty() {
            let list = self
                .order_by
                .iter()
                .map(|o| format!("{}({})", if o.ascending { "ASC" } else { "DESC" }, o.expression))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(out, "{}ORDER BY {}", pad, list)?;
        }
        if let Some(limit) = self.limit {
            writeln!(out, "{}LIMIT {}", pad, limit)?;
        }
        if let Some(offset) = self.offset {
            writeln!(out, "{}OFFSET {}", pad, offset)?;
        }
        Ok(())
    }
}

impl fmt::Display for GraphQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(&mut out, 0, true)?;
        f.write_str(&out)
    }
}
