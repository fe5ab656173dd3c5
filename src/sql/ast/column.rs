use std::fmt;

/// A column reference with zero to three qualifying segments
/// (`c`, `t.c`, `s.t.c`, `cat.s.t.c`).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Column {
    pub path: Vec<String>,
    pub name: String,
}

impl Column {
    pub fn named(name: &str) -> Self {
        Self { path: Vec::new(), name: name.to_string() }
    }

    /// Split a dotted reference such as `orders.id`.
    pub fn parse(dotted: &str) -> Self {
        let mut parts: Vec<String> = dotted.split('.').map(str::to_string).collect();
        let name = parts.pop().unwrap_or_default();
        Self { path: parts, name }
    }

    pub fn is_qualified(&self) -> bool {
        !self.path.is_empty()
    }

    /// Qualifier plus name, in order.
    pub fn parts(&self) -> Vec<String> {
        let mut parts = self.path.clone();
        parts.push(self.name.clone());
        parts
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts().join("."))
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Column({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dotted_reference() {
        let c = Column::parse("sales.orders.id");
        assert_eq!(c.path, vec!["sales", "orders"]);
        assert_eq!(c.name, "id");
        assert!(c.is_qualified());
        assert!(!Column::parse("id").is_qualified());
        assert_eq!(c.to_string(), "sales.orders.id");
    }
}
