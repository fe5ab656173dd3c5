use std::{fmt, iter::Peekable, str::Chars};

use crate::{
    graph::{GraphLiteral, Term, TriplePattern, Variable},
    translator::TranslationError,
};

const SUBJECT_PLACEHOLDER: &str = "%1$s";
const OBJECT_PLACEHOLDER: &str = "%2$s";

#[derive(Debug, Clone, PartialEq, Eq)]
enum SegmentTerm {
    Subject,
    Object,
    Fixed(Term),
    /// `?name` or `_:name`; renamed on every instantiation.
    Helper(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SegmentTriple {
    subject: SegmentTerm,
    predicate: SegmentTerm,
    object: SegmentTerm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Term(SegmentTerm),
    Dot,
    Semicolon,
    Comma,
}

/// A parsed query-segment template: the graph triples that bind a table or
/// column, parameterized by `%1$s` (subject) and `%2$s` (object).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySegment {
    source: String,
    triples: Vec<SegmentTriple>,
}

impl QuerySegment {
    pub fn parse(owner: &str, text: &str) -> Result<Self, TranslationError> {
        let fail = |reason: String| TranslationError::InvalidTemplate { owner: owner.to_string(), reason };
        let tokens = Self::tokenize(text).map_err(fail)?;
        let triples = Self::assemble(tokens).map_err(fail)?;
        if triples.is_empty() {
            return Err(fail("template has no triples".into()));
        }
        Ok(Self { source: text.trim().to_string(), triples })
    }

    /// A table template: must reference the subject placeholder.
    pub fn parse_table(owner: &str, text: &str) -> Result<Self, TranslationError> {
        let segment = Self::parse(owner, text)?;
        if !segment.uses_subject() {
            return Err(TranslationError::InvalidTemplate {
                owner: owner.to_string(),
                reason: format!("table template must use {}", SUBJECT_PLACEHOLDER),
            });
        }
        Ok(segment)
    }

    /// A column template: must reference both placeholders.
    pub fn parse_column(owner: &str, text: &str) -> Result<Self, TranslationError> {
        let segment = Self::parse(owner, text)?;
        if !segment.uses_subject() || !segment.uses_object() {
            return Err(TranslationError::InvalidTemplate {
                owner: owner.to_string(),
                reason: format!("column template must use {} and {}", SUBJECT_PLACEHOLDER, OBJECT_PLACEHOLDER),
            });
        }
        Ok(segment)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn uses_subject(&self) -> bool {
        self.uses(&SegmentTerm::Subject)
    }

    pub fn uses_object(&self) -> bool {
        self.uses(&SegmentTerm::Object)
    }

    fn uses(&self, term: &SegmentTerm) -> bool {
        self.triples.iter().any(|t| t.subject == *term || t.predicate == *term || t.object == *term)
    }

    /// Fill the placeholders. Helper variables are renamed after the object
    /// variable when there is one, otherwise after the subject, so two
    /// instantiations never share intermediate nodes.
    pub fn instantiate(
        &self,
        subject: &Variable,
        object: Option<&Variable>,
    ) -> Result<Vec<TriplePattern>, TranslationError> {
        if object.is_none() && self.uses_object() {
            return Err(TranslationError::InvalidTemplate {
                owner: self.source.clone(),
                reason: "template needs an object variable".into(),
            });
        }
        let anchor = object.unwrap_or(subject);
        let fill = |term: &SegmentTerm| -> Term {
            match term {
                SegmentTerm::Subject => Term::Variable(subject.clone()),
                SegmentTerm::Object => Term::Variable(object.unwrap_or(subject).clone()),
                SegmentTerm::Fixed(t) => t.clone(),
                SegmentTerm::Helper(name) => Term::Variable(Variable::new(format!("{}_h_{}", anchor.name(), name))),
            }
        };
        Ok(self
            .triples
            .iter()
            .map(|t| TriplePattern::new(fill(&t.subject), fill(&t.predicate), fill(&t.object)))
            .collect())
    }

    fn assemble(tokens: Vec<Token>) -> Result<Vec<SegmentTriple>, String> {
        let mut triples = Vec::new();
        let mut subject: Option<SegmentTerm> = None;
        let mut predicate: Option<SegmentTerm> = None;
        let mut object: Option<SegmentTerm> = None;

        for token in tokens {
            match token {
                Token::Term(term) => {
                    if subject.is_none() {
                        if matches!(term, SegmentTerm::Fixed(Term::Literal(_))) {
                            return Err("a literal cannot be a subject".into());
                        }
                        subject = Some(term);
                    } else if predicate.is_none() {
                        if matches!(term, SegmentTerm::Fixed(Term::Literal(_) | Term::BlankNode(_))) {
                            return Err("predicate must be an IRI or a variable".into());
                        }
                        predicate = Some(term);
                    } else if object.is_none() {
                        object = Some(term);
                    } else {
                        return Err("missing `.` between triples".into());
                    }
                }
                Token::Dot | Token::Semicolon | Token::Comma => {
                    let (Some(s), Some(p), Some(o)) = (subject.clone(), predicate.clone(), object.take()) else {
                        return Err("incomplete triple".into());
                    };
                    triples.push(SegmentTriple { subject: s, predicate: p, object: o });
                    match token {
                        Token::Dot => {
                            subject = None;
                            predicate = None;
                        }
                        Token::Semicolon => predicate = None,
                        _ => {}
                    }
                }
            }
        }
        match (subject, predicate, object) {
            (Some(s), Some(p), Some(o)) => triples.push(SegmentTriple { subject: s, predicate: p, object: o }),
            (None, None, None) => {}
            _ => return Err("incomplete triple at end of template".into()),
        }
        Ok(triples)
    }

    fn tokenize(text: &str) -> Result<Vec<Token>, String> {
        let mut tokens = Vec::new();
        let mut chars = text.chars().peekable();
        while let Some(&c) = chars.peek() {
            match c {
                c if c.is_whitespace() => {
                    chars.next();
                }
                '.' | ';' | ',' => {
                    chars.next();
                    tokens.push(match c {
                        '.' => Token::Dot,
                        ';' => Token::Semicolon,
                        _ => Token::Comma,
                    });
                }
                '<' => {
                    chars.next();
                    let iri = Self::read_until(&mut chars, '>')?;
                    tokens.push(Token::Term(SegmentTerm::Fixed(Term::Iri(iri))));
                }
                '"' => {
                    chars.next();
                    let literal = Self::read_literal(&mut chars)?;
                    tokens.push(Token::Term(SegmentTerm::Fixed(Term::Literal(literal))));
                }
                _ => {
                    let word = Self::read_word(&mut chars);
                    tokens.push(Token::Term(Self::classify(&word)?));
                }
            }
        }
        Ok(tokens)
    }

    fn read_until(chars: &mut Peekable<Chars<'_>>, end: char) -> Result<String, String> {
        let mut out = String::new();
        for c in chars.by_ref() {
            if c == end {
                return Ok(out);
            }
            out.push(c);
        }
        Err(format!("unterminated `{}`", end))
    }

    fn read_literal(chars: &mut Peekable<Chars<'_>>) -> Result<GraphLiteral, String> {
        let mut lexical = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some('n') => lexical.push('\n'),
                    Some('t') => lexical.push('\t'),
                    Some('r') => lexical.push('\r'),
                    Some(other) => lexical.push(other),
                    None => return Err("dangling escape in literal".into()),
                },
                '"' => {
                    closed = true;
                    break;
                }
                c => lexical.push(c),
            }
        }
        if !closed {
            return Err("unterminated string literal".into());
        }
        match chars.peek() {
            Some('@') => {
                chars.next();
                let lang = Self::read_word(chars);
                if lang.is_empty() {
                    return Err("empty language tag".into());
                }
                Ok(GraphLiteral::lang(lexical, lang))
            }
            Some('^') => {
                chars.next();
                if chars.next() != Some('^') {
                    return Err("expected `^^` before datatype".into());
                }
                let datatype = if chars.peek() == Some(&'<') {
                    chars.next();
                    format!("<{}>", Self::read_until(chars, '>')?)
                } else {
                    Self::read_word(chars)
                };
                if datatype.is_empty() {
                    return Err("empty datatype".into());
                }
                Ok(GraphLiteral::typed(lexical, datatype))
            }
            _ => Ok(GraphLiteral::string(lexical)),
        }
    }

    /// A bare word ends at whitespace, or at a separator followed by
    /// whitespace or the end of input.
    fn read_word(chars: &mut Peekable<Chars<'_>>) -> String {
        let mut word = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                break;
            }
            if matches!(c, '.' | ';' | ',') {
                let mut ahead = chars.clone();
                ahead.next();
                if ahead.peek().is_none_or(|n| n.is_whitespace()) {
                    break;
                }
            }
            word.push(c);
            chars.next();
        }
        word
    }

    fn classify(word: &str) -> Result<SegmentTerm, String> {
        match word {
            SUBJECT_PLACEHOLDER => return Ok(SegmentTerm::Subject),
            OBJECT_PLACEHOLDER => return Ok(SegmentTerm::Object),
            "a" => return Ok(SegmentTerm::Fixed(Term::Prefixed("a".into()))),
            "" => return Err("empty term".into()),
            _ => {}
        }
        if let Some(name) = word.strip_prefix('?').or_else(|| word.strip_prefix("_:")) {
            if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Err(format!("invalid helper variable `{}`", word));
            }
            return Ok(SegmentTerm::Helper(name.to_string()));
        }
        if let Ok(n) = word.parse::<i64>() {
            return Ok(SegmentTerm::Fixed(Term::Literal(GraphLiteral::integer(n))));
        }
        if word == "true" || word == "false" {
            return Ok(SegmentTerm::Fixed(Term::Literal(GraphLiteral::boolean(word == "true"))));
        }
        if word.contains('%') {
            return Err(format!("unknown placeholder `{}`", word));
        }
        if word.contains(':') {
            return Ok(SegmentTerm::Fixed(Term::Prefixed(word.to_string())));
        }
        Err(format!("unrecognized term `{}`", word))
    }
}

impl fmt::Display for QuerySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
