use std::fmt;

use crate::sql::ast::{OrderBy, ScalarExpr};

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub args: Vec<ScalarExpr>,
    pub distinct: bool,
    /// `OVER (...)`; present only for window calls.
    pub over: Option<WindowSpec>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowSpec {
    pub partition_by: Vec<ScalarExpr>,
    pub order_by: Vec<OrderBy>,
}

impl Function {
    pub fn new(name: &str, args: Vec<ScalarExpr>) -> Self {
        Self { name: name.to_string(), args, distinct: false, over: None }
    }

    pub fn distinct(name: &str, args: Vec<ScalarExpr>) -> Self {
        Self { distinct: true, ..Self::new(name, args) }
    }

    pub fn upper_name(&self) -> String {
        self.name.to_ascii_uppercase()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self.args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ");
        let distinct = if self.distinct { "DISTINCT " } else { "" };
        write!(f, "{}({}{})", self.name, distinct, args)?;
        if self.over.is_some() {
            write!(f, " OVER (...)")?;
        }
        Ok(())
    }
}
