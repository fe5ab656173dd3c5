use tracing::trace;

use crate::{
    graph::{Expression, GraphLiteral},
    translator::TranslationError,
};

/// A LIKE pattern after wildcard analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikePattern {
    /// No live wildcard: plain string equality against the unescaped text.
    Exact(String),
    /// Anchored regular expression.
    Regex(String),
}

const REGEX_META: &[char] = &['[', ']', '^', '.', '?', '*', '+', '{', '}', '(', ')', '|', '$', '\\'];

pub struct LikeTranslator;

impl LikeTranslator {
    /// Rewrite a SQL LIKE pattern. `%` becomes `(.+)`, `_` becomes `.`, regex
    /// metacharacters are escaped, and `\` escapes the character after it.
    pub fn compile(pattern: &str) -> Result<LikePattern, TranslationError> {
        let chars: Vec<char> = pattern.chars().collect();
        let mut regex = String::from("^");
        let mut exact = String::new();
        let mut wildcard = false;

        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if c == '\\' {
                let start = i;
                while i < chars.len() && chars[i] == '\\' {
                    i += 1;
                }
                let run = i - start;
                let next = chars.get(i).copied();
                let escapes_next = matches!(next, Some(n) if n == '%' || n == '_' || REGEX_META.contains(&n));
                let mut backslashes = run / 2;
                if run % 2 == 1 && !escapes_next {
                    backslashes += 1;
                }
                for _ in 0..backslashes {
                    regex.push_str("\\\\");
                    exact.push('\\');
                }
                if let (1, true, Some(n)) = (run % 2, escapes_next, next) {
                    Self::push_literal(&mut regex, &mut exact, n);
                    i += 1;
                }
                continue;
            }
            match c {
                '%' => {
                    regex.push_str("(.+)");
                    wildcard = true;
                }
                '_' => {
                    regex.push('.');
                    wildcard = true;
                }
                other => Self::push_literal(&mut regex, &mut exact, other),
            }
            i += 1;
        }
        regex.push('$');

        if !wildcard {
            return Ok(LikePattern::Exact(exact));
        }
        if let Err(e) = regex::Regex::new(&regex) {
            return TranslationError::unsupported(format!("LIKE pattern '{}' does not compile: {}", pattern, e)).err();
        }
        trace!(like = pattern, regex = %regex, "LIKE rewritten");
        Ok(LikePattern::Regex(regex))
    }

    fn push_literal(regex: &mut String, exact: &mut String, c: char) {
        if REGEX_META.contains(&c) {
            regex.push('\\');
        }
        regex.push(c);
        exact.push(c);
    }

    /// The filter for `value [NOT] LIKE pattern`. Both sides compare as plain strings.
    pub fn translate(value: Expression, pattern: &str, negated: bool) -> Result<Expression, TranslationError> {
        let value = Expression::call("STR", vec![value]);
        let filter = match Self::compile(pattern)? {
            LikePattern::Exact(text) => Expression::equals(value, Expression::Literal(GraphLiteral::string(text))),
            LikePattern::Regex(pattern) => Expression::Regex { expr: Box::new(value), pattern, flags: None },
        };
        Ok(if negated { Expression::not(filter) } else { filter })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Variable;

    fn regex(p: &str) -> String {
        match LikeTranslator::compile(p).unwrap() {
            LikePattern::Regex(r) => r,
            other => panic!("expected a regex for {:?}, got {:?}", p, other),
        }
    }

    fn exact(p: &str) -> String {
        match LikeTranslator::compile(p).unwrap() {
            LikePattern::Exact(s) => s,
            other => panic!("expected equality for {:?}, got {:?}", p, other),
        }
    }

    #[test]
    fn no_wildcard_is_equality() {
        assert_eq!(exact("abc"), "abc");
        assert_eq!(exact("a.c"), "a.c");
    }

    #[test]
    fn wildcards_become_anchored_regex() {
        assert_eq!(regex("a%c"), "^a(.+)c$");
        assert_eq!(regex("a_c"), "^a.c$");
        assert_eq!(regex("%"), "^(.+)$");
    }

    #[test]
    fn metacharacters_are_escaped() {
        assert_eq!(regex("a.b%"), "^a\\.b(.+)$");
        assert_eq!(regex("(x)|[y]%"), "^\\(x\\)\\|\\[y\\](.+)$");
        assert!(regex::Regex::new(&regex("$^*+?{}%")).is_ok());
    }

    #[test]
    fn escaped_wildcards_are_literal() {
        assert_eq!(exact("a\\%c"), "a%c");
        assert_eq!(exact("a\\_c"), "a_c");
        assert_eq!(regex("a\\%c%"), "^a%c(.+)$");
    }

    #[test]
    fn backslash_runs() {
        // an even run escapes itself and leaves the wildcard live
        assert_eq!(regex("a\\\\%"), "^a\\\\(.+)$");
        // an odd run leaves one backslash and escapes the wildcard
        assert_eq!(exact("a\\\\\\%"), "a\\%");
        // a lone backslash before an ordinary character stays a backslash
        assert_eq!(exact("a\\b"), "a\\b");
        assert_eq!(exact("ab\\"), "ab\\");
    }

    #[test]
    fn translate_shapes() {
        let v = Expression::var(&Variable::new("x"));
        assert_eq!(
            LikeTranslator::translate(v.clone(), "abc", false).unwrap().to_string(),
            "(STR(?x) = \"abc\")"
        );
        let negated = LikeTranslator::translate(v, "a%", true).unwrap();
        assert!(matches!(negated, Expression::Not(ref inner) if matches!(**inner, Expression::Regex { .. })));
    }
}
