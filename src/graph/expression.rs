use std::fmt;

use serde::Serialize;

use crate::graph::{GraphLiteral, Variable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "="),
            CompareOp::NotEq => write!(f, "!="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::LtEq => write!(f, "<="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::GtEq => write!(f, ">="),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithmeticOp::Add => write!(f, "+"),
            ArithmeticOp::Subtract => write!(f, "-"),
            ArithmeticOp::Multiply => write!(f, "*"),
            ArithmeticOp::Divide => write!(f, "/"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateFunction::Count => write!(f, "COUNT"),
            AggregateFunction::Sum => write!(f, "SUM"),
            AggregateFunction::Avg => write!(f, "AVG"),
            AggregateFunction::Min => write!(f, "MIN"),
            AggregateFunction::Max => write!(f, "MAX"),
        }
    }
}

/// A graph-query expression, used by FILTER, BIND, projections, grouping and ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Expression {
    Variable(Variable),
    Literal(GraphLiteral),
    Iri(String),
    /// A prefixed name such as `xsd:integer`, rendered verbatim.
    Prefixed(String),
    And(Vec<Expression>),
    Or(Vec<Expression>),
    Not(Box<Expression>),
    Compare { op: CompareOp, left: Box<Expression>, right: Box<Expression> },
    Arithmetic { op: ArithmeticOp, left: Box<Expression>, right: Box<Expression> },
    Negate(Box<Expression>),
    Bound(Variable),
    In { expr: Box<Expression>, list: Vec<Expression>, negated: bool },
    Regex { expr: Box<Expression>, pattern: String, flags: Option<String> },
    /// A built-in or cast call: `UCASE(?x)`, `xsd:integer(?x)`, `DATATYPE(?x)`.
    Call { function: String, args: Vec<Expression> },
    /// `None` argument means `COUNT(*)`.
    Aggregate { function: AggregateFunction, distinct: bool, arg: Option<Box<Expression>> },
}

impl Expression {
    pub fn var(v: &Variable) -> Self {
        Expression::Variable(v.clone())
    }

    pub fn call(function: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Call { function: function.into(), args }
    }

    pub fn compare(op: CompareOp, left: Expression, right: Expression) -> Self {
        Expression::Compare { op, left: Box::new(left), right: Box::new(right) }
    }

    pub fn equals(left: Expression, right: Expression) -> Self {
        Self::compare(CompareOp::Eq, left, right)
    }

    pub fn not(inner: Expression) -> Self {
        Expression::Not(Box::new(inner))
    }

    /// Conjunction that flattens nested ANDs and collapses a single operand.
    pub fn and_all(parts: Vec<Expression>) -> Option<Expression> {
        let mut flat = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                Expression::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => None,
            1 => flat.pop(),
            _ => Some(Expression::And(flat)),
        }
    }

    pub fn or_all(parts: Vec<Expression>) -> Option<Expression> {
        let mut flat = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                Expression::Or(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => None,
            1 => flat.pop(),
            _ => Some(Expression::Or(flat)),
        }
    }

    /// Variables the expression reads, in first-seen order.
    pub fn variables(&self) -> Vec<&Variable> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'a>(&'a self, out: &mut Vec<&'a Variable>) {
        let push = |v: &'a Variable, out: &mut Vec<&'a Variable>| {
            if !out.contains(&v) {
                out.push(v);
            }
        };
        match self {
            Expression::Variable(v) | Expression::Bound(v) => push(v, out),
            Expression::Literal(_) | Expression::Iri(_) | Expression::Prefixed(_) => {}
            Expression::And(list) | Expression::Or(list) => list.iter().for_each(|e| e.collect_variables(out)),
            Expression::Call { args, .. } => args.iter().for_each(|e| e.collect_variables(out)),
            Expression::Not(e) | Expression::Negate(e) => e.collect_variables(out),
            Expression::Compare { left, right, .. } | Expression::Arithmetic { left, right, .. } => {
                left.collect_variables(out);
                right.collect_variables(out);
            }
            Expression::In { expr, list, .. } => {
                expr.collect_variables(out);
                list.iter().for_each(|e| e.collect_variables(out));
            }
            Expression::Regex { expr, .. } => expr.collect_variables(out),
            Expression::Aggregate { arg, .. } => {
                if let Some(arg) = arg {
                    arg.collect_variables(out);
                }
            }
        }
    }

    /// Replace every occurrence of `from` with `to`. Aggregate arguments are
    /// left alone.
    pub fn substitute(&self, from: &Expression, to: &Expression) -> Expression {
        if self == from {
            return to.clone();
        }
        let each = |list: &[Expression]| list.iter().map(|e| e.substitute(from, to)).collect::<Vec<_>>();
        let boxed = |e: &Expression| Box::new(e.substitute(from, to));
        match self {
            Expression::Variable(_)
            | Expression::Literal(_)
            | Expression::Iri(_)
            | Expression::Prefixed(_)
            | Expression::Bound(_)
            | Expression::Aggregate { .. } => self.clone(),
            Expression::And(list) => Expression::And(each(list)),
            Expression::Or(list) => Expression::Or(each(list)),
            Expression::Not(e) => Expression::Not(boxed(e)),
            Expression::Negate(e) => Expression::Negate(boxed(e)),
            Expression::Compare { op, left, right } => Expression::Compare { op: *op, left: boxed(left), right: boxed(right) },
            Expression::Arithmetic { op, left, right } => {
                Expression::Arithmetic { op: *op, left: boxed(left), right: boxed(right) }
            }
            Expression::In { expr, list, negated } => Expression::In { expr: boxed(expr), list: each(list), negated: *negated },
            Expression::Regex { expr, pattern, flags } => {
                Expression::Regex { expr: boxed(expr), pattern: pattern.clone(), flags: flags.clone() }
            }
            Expression::Call { function, args } => Expression::Call { function: function.clone(), args: each(args) },
        }
    }

    pub fn contains_aggregate(&self) -> bool {
        match self {
            Expression::Aggregate { .. } => true,
            Expression::Variable(_)
            | Expression::Literal(_)
            | Expression::Iri(_)
            | Expression::Prefixed(_)
            | Expression::Bound(_) => false,
            Expression::And(list) | Expression::Or(list) => list.iter().any(Self::contains_aggregate),
            Expression::Call { args, .. } => args.iter().any(Self::contains_aggregate),
            Expression::Not(e) | Expression::Negate(e) | Expression::Regex { expr: e, .. } => e.contains_aggregate(),
            Expression::Compare { left, right, .. } | Expression::Arithmetic { left, right, .. } => {
                left.contains_aggregate() || right.contains_aggregate()
            }
            Expression::In { expr, list, .. } => expr.contains_aggregate() || list.iter().any(Self::contains_aggregate),
        }
    }

    fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expression], separator: &str) -> fmt::Result {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                f.write_str(separator)?;
            }
            write!(f, "{}", item)?;
        }
        Ok(())
    }

    fn escape_pattern(pattern: &str) -> String {
        pattern.replace('\\', "\\\\").replace('"', "\\\"")
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Variable(v) => write!(f, "{}", v),
            Expression::Literal(l) => write!(f, "{}", l),
            Expression::Iri(iri) => write!(f, "<{}>", iri),
            Expression::Prefixed(name) => f.write_str(name),
            Expression::And(list) => {
                f.write_str("(")?;
                Self::write_list(f, list, " && ")?;
                f.write_str(")")
            }
            Expression::Or(list) => {
                f.write_str("(")?;
                Self::write_list(f, list, " || ")?;
                f.write_str(")")
            }
            Expression::Not(e) => write!(f, "!({})", e),
            Expression::Compare { op, left, right } => write!(f, "({} {} {})", left, op, right),
            Expression::Arithmetic { op, left, right } => write!(f, "({} {} {})", left, op, right),
            Expression::Negate(e) => write!(f, "-({})", e),
            Expression::Bound(v) => write!(f, "BOUND({})", v),
            Expression::In { expr, list, negated } => {
                write!(f, "({} {}IN (", expr, if *negated { "NOT " } else { "" })?;
                Self::write_list(f, list, ", ")?;
                f.write_str("))")
            }
            Expression::Regex { expr, pattern, flags } => match flags {
                Some(flags) => write!(f, "REGEX({}, \"{}\", \"{}\")", expr, Self::escape_pattern(pattern), flags),
                None => write!(f, "REGEX({}, \"{}\")", expr, Self::escape_pattern(pattern)),
            },
            Expression::Call { function, args } => {
                write!(f, "{}(", function)?;
                Self::write_list(f, args, ", ")?;
                f.write_str(")")
            }
            Expression::Aggregate { function, distinct, arg } => {
                let distinct = if *distinct { "DISTINCT " } else { "" };
                match arg {
                    Some(arg) => write!(f, "{}({}{})", function, distinct, arg),
                    None => write!(f, "{}({}*)", function, distinct),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_all_flattens_and_collapses() {
        let a = Expression::Bound(Variable::new("a"));
        let b = Expression::Bound(Variable::new("b"));
        assert_eq!(Expression::and_all(vec![]), None);
        assert_eq!(Expression::and_all(vec![a.clone()]), Some(a.clone()));
        let nested = Expression::and_all(vec![Expression::And(vec![a.clone(), b.clone()]), a.clone()]).unwrap();
        assert_eq!(nested, Expression::And(vec![a.clone(), b, a]));
    }

    #[test]
    fn rendering() {
        let x = Variable::new("x");
        let e = Expression::equals(Expression::var(&x), Expression::Literal(GraphLiteral::integer(3)));
        assert_eq!(e.to_string(), "(?x = 3)");
        let r = Expression::Regex { expr: Box::new(Expression::var(&x)), pattern: "^a\\.b$".into(), flags: None };
        assert_eq!(r.to_string(), "REGEX(?x, \"^a\\\\.b$\")");
        let c = Expression::Aggregate { function: AggregateFunction::Count, distinct: false, arg: None };
        assert_eq!(c.to_string(), "COUNT(*)");
    }

    #[test]
    fn substitute_skips_aggregate_arguments() {
        let x = Variable::new("x");
        let g = Expression::var(&Variable::new("g"));
        let upper = Expression::call("UCASE", vec![Expression::var(&x)]);
        let count = Expression::Aggregate { function: AggregateFunction::Count, distinct: false, arg: Some(Box::new(upper.clone())) };
        let e = Expression::call("CONCAT", vec![upper.clone(), count.clone()]);
        assert_eq!(e.substitute(&upper, &g), Expression::call("CONCAT", vec![g.clone(), count]));
        assert_eq!(upper.substitute(&upper, &g), g);
    }

    #[test]
    fn variables_are_collected_once() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        let e = Expression::And(vec![
            Expression::Bound(x.clone()),
            Expression::equals(Expression::var(&x), Expression::var(&y)),
        ]);
        assert_eq!(e.variables(), vec![&x, &y]);
    }
}
