use std::fmt::{self, Write};

use serde::Serialize;

use crate::graph::{Expression, GraphQuery, Term, Variable};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TriplePattern {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl TriplePattern {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self { subject, predicate, object }
    }

    /// Replace every occurrence of `from` with `to`.
    pub fn substitute(&self, from: &Variable, to: &Variable) -> TriplePattern {
        let swap = |t: &Term| match t {
            Term::Variable(v) if v == from => Term::Variable(to.clone()),
            other => other.clone(),
        };
        TriplePattern { subject: swap(&self.subject), predicate: swap(&self.predicate), object: swap(&self.object) }
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// One element of a group graph pattern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PatternElement {
    Triple(TriplePattern),
    Group(GroupPattern),
    Optional(GroupPattern),
    Union(Vec<GroupPattern>),
    Filter(Expression),
    Bind { expression: Expression, variable: Variable },
    SubSelect(Box<GraphQuery>),
}

/// `{ ... }`: an ordered list of pattern elements evaluated as one group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupPattern {
    pub elements: Vec<PatternElement>,
}

impl GroupPattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: PatternElement) {
        self.elements.push(element);
    }

    pub fn push_triple(&mut self, triple: TriplePattern) {
        self.elements.push(PatternElement::Triple(triple));
    }

    pub fn push_filter(&mut self, expression: Expression) {
        self.elements.push(PatternElement::Filter(expression));
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn triples(&self) -> impl Iterator<Item = &TriplePattern> {
        self.elements.iter().filter_map(|e| match e {
            PatternElement::Triple(t) => Some(t),
            _ => None,
        })
    }

    pub fn filters(&self) -> impl Iterator<Item = &Expression> {
        self.elements.iter().filter_map(|e| match e {
            PatternElement::Filter(x) => Some(x),
            _ => None,
        })
    }

    pub fn optionals(&self) -> impl Iterator<Item = &GroupPattern> {
        self.elements.iter().filter_map(|e| match e {
            PatternElement::Optional(g) => Some(g),
            _ => None,
        })
    }

    /// Every filter in this group and in nested groups, depth first.
    pub fn all_filters(&self) -> Vec<&Expression> {
        let mut out = Vec::new();
        for element in &self.elements {
            match element {
                PatternElement::Filter(x) => out.push(x),
                PatternElement::Group(g) | PatternElement::Optional(g) => out.extend(g.all_filters()),
                PatternElement::Union(branches) => branches.iter().for_each(|b| out.extend(b.all_filters())),
                _ => {}
            }
        }
        out
    }

    pub(crate) fn render(&self, out: &mut String, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        out.push_str("{\n");
        for element in &self.elements {
            match element {
                PatternElement::Triple(t) => writeln!(out, "{}  {}", pad, t)?,
                PatternElement::Filter(e) => writeln!(out, "{}  FILTER {}", pad, Self::bracketed(e))?,
                PatternElement::Bind { expression, variable } => {
                    writeln!(out, "{}  BIND({} AS {})", pad, expression, variable)?
                }
                PatternElement::Group(g) => {
                    write!(out, "{}  ", pad)?;
                    g.render(out, indent + 1)?;
                    out.push('\n');
                }
                PatternElement::Optional(g) => {
                    write!(out, "{}  OPTIONAL ", pad)?;
                    g.render(out, indent + 1)?;
                    out.push('\n');
                }
                PatternElement::Union(branches) => {
                    write!(out, "{}  ", pad)?;
                    for (i, branch) in branches.iter().enumerate() {
                        if i > 0 {
                            out.push_str(" UNION ");
                        }
                        branch.render(out, indent + 1)?;
                    }
                    out.push('\n');
                }
                PatternElement::SubSelect(query) => {
                    writeln!(out, "{}  {{", pad)?;
                    query.render(out, indent + 2, false)?;
                    writeln!(out, "{}  }}", pad)?;
                }
            }
        }
        write!(out, "{}}}", pad)
    }

    fn bracketed(e: &Expression) -> String {
        let text = e.to_string();
        if text.starts_with('(') { text } else { format!("({})", text) }
    }
}

impl fmt::Display for GroupPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(&mut out, 0)?;
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_optional() {
        let s = Variable::new("s");
        let o = Variable::new("o");
        let mut inner = GroupPattern::new();
        inner.push_triple(TriplePattern::new(s.clone().into(), Term::Prefixed("ex:p".into()), o.clone().into()));
        let mut outer = GroupPattern::new();
        outer.push_triple(TriplePattern::new(s.into(), Term::Prefixed("a".into()), Term::Prefixed("ex:T".into())));
        outer.push(PatternElement::Optional(inner));
        outer.push_filter(Expression::Bound(o));
        assert_eq!(
            outer.to_string(),
            "{\n  ?s a ex:T .\n  OPTIONAL {\n    ?s ex:p ?o .\n  }\n  FILTER (BOUND(?o))\n}"
        );
    }

    #[test]
    fn substitute_rewrites_all_positions() {
        let t = TriplePattern::new(
            Term::Variable(Variable::new("a")),
            Term::Prefixed("ex:p".into()),
            Term::Variable(Variable::new("a")),
        );
        let r = t.substitute(&Variable::new("a"), &Variable::new("b"));
        assert_eq!(r.to_string(), "?b ex:p ?b .");
    }
}
