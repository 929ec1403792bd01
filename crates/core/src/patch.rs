//! The declarative property-update patch language.
//!
//! A patch is one or more `INSERT DATA { … }` / `DELETE DATA { … }` clauses,
//! each stating triples about the resource being patched (subject `<>`).
//! Parsing is strict and total: the whole text is validated into a [`Patch`]
//! before anything is applied, so a malformed patch can never leave a
//! property set half-updated.
//!
//! ```text
//! INSERT DATA { <> <http://purl.org/dc/elements/1.1/identifier> 'test' . }
//! DELETE DATA { <> <http://purl.org/dc/elements/1.1/title> 'old title' . }
//! ```
//!
//! Keywords are case-insensitive; whitespace and newlines are free; literals
//! accept `\'`, `\"` and `\\` escapes; objects are quoted literals or
//! `<iri>` references.

use vor_types::PropertyValue;

/// Errors produced while parsing a patch.
///
/// Each variant names the offending token so the caller's diagnostic points
/// at the problem rather than at "syntax error".
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("patch contains no INSERT or DELETE clause")]
    Empty,
    #[error("expected INSERT or DELETE, found {0:?}")]
    ExpectedVerb(String),
    #[error("expected DATA after the verb, found {0:?}")]
    ExpectedData(String),
    #[error("expected '{{' to open the data block")]
    ExpectedOpenBrace,
    #[error("data block is not closed by '}}'")]
    UnterminatedBlock,
    #[error("only the empty subject <> is supported, found {0:?}")]
    UnsupportedSubject(String),
    #[error("expected a predicate IRI, found {0:?}")]
    ExpectedPredicate(String),
    #[error("IRI is empty")]
    EmptyIri,
    #[error("IRI is not closed by '>'")]
    UnterminatedIri,
    #[error("expected a literal or IRI object, found {0:?}")]
    ExpectedObject(String),
    #[error("string literal is not terminated")]
    UnterminatedLiteral,
    #[error("expected '.' after the triple, found {0:?}")]
    ExpectedDot(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchVerb {
    Insert,
    Delete,
}

/// One parsed statement: insert or delete a (predicate, value) pair on the
/// patched resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOp {
    pub verb: PatchVerb,
    pub predicate: String,
    pub value: PropertyValue,
}

/// A fully parsed patch, ready to apply atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub ops: Vec<PatchOp>,
}

impl Patch {
    /// Parse the full patch text.
    ///
    /// # Errors
    ///
    /// Returns the first [`PatchError`] encountered; no partial result is
    /// ever produced.
    pub fn parse(input: &str) -> Result<Self, PatchError> {
        let mut s = Scanner::new(input);
        let mut ops = Vec::new();
        let mut clauses = 0usize;

        s.skip_ws();
        while !s.at_end() {
            let verb_word = s.read_word();
            let verb = if verb_word.eq_ignore_ascii_case("INSERT") {
                PatchVerb::Insert
            } else if verb_word.eq_ignore_ascii_case("DELETE") {
                PatchVerb::Delete
            } else {
                return Err(PatchError::ExpectedVerb(or_snippet(verb_word, &s)));
            };

            s.skip_ws();
            let data_word = s.read_word();
            if !data_word.eq_ignore_ascii_case("DATA") {
                return Err(PatchError::ExpectedData(or_snippet(data_word, &s)));
            }

            s.skip_ws();
            if !s.eat('{') {
                return Err(PatchError::ExpectedOpenBrace);
            }

            loop {
                s.skip_ws();
                if s.eat('}') {
                    break;
                }
                if s.at_end() {
                    return Err(PatchError::UnterminatedBlock);
                }
                ops.push(parse_triple(&mut s, verb)?);
            }

            clauses += 1;
            s.skip_ws();
        }

        if clauses == 0 {
            return Err(PatchError::Empty);
        }
        Ok(Self { ops })
    }
}

fn parse_triple(s: &mut Scanner<'_>, verb: PatchVerb) -> Result<PatchOp, PatchError> {
    // Subject: only <> (the patched resource itself).
    match s.read_iri() {
        Some(subject) => {
            let subject = subject?;
            if !subject.is_empty() {
                return Err(PatchError::UnsupportedSubject(subject));
            }
        }
        None => return Err(PatchError::UnsupportedSubject(s.snippet())),
    }

    s.skip_ws();
    let predicate = match s.read_iri() {
        Some(iri) => iri?,
        None => return Err(PatchError::ExpectedPredicate(s.snippet())),
    };
    if predicate.is_empty() {
        return Err(PatchError::EmptyIri);
    }

    s.skip_ws();
    let value = match s.peek() {
        Some(q @ ('\'' | '"')) => PropertyValue::Literal(s.read_quoted(q)?),
        Some('<') => {
            let iri = s.read_iri().unwrap_or(Err(PatchError::EmptyIri))?;
            if iri.is_empty() {
                return Err(PatchError::EmptyIri);
            }
            PropertyValue::Uri(iri)
        }
        _ => return Err(PatchError::ExpectedObject(s.snippet())),
    };

    s.skip_ws();
    if !s.eat('.') {
        return Err(PatchError::ExpectedDot(s.snippet()));
    }

    Ok(PatchOp {
        verb,
        predicate,
        value,
    })
}

fn or_snippet(word: String, s: &Scanner<'_>) -> String {
    if word.is_empty() {
        s.snippet()
    } else {
        word
    }
}

/// Minimal cursor over the patch text.
struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// Read a run of ASCII letters (the keyword tokens).
    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            word.push(self.bump().expect("peeked char"));
        }
        word
    }

    /// Read `<…>`, returning the inner text (possibly empty for `<>`).
    ///
    /// Returns `None` when the cursor is not on `<`, leaving it in place so
    /// the caller can report a position-specific error.
    fn read_iri(&mut self) -> Option<Result<String, PatchError>> {
        if !self.eat('<') {
            return None;
        }
        let mut iri = String::new();
        loop {
            match self.bump() {
                Some('>') => return Some(Ok(iri)),
                Some(c) => iri.push(c),
                None => return Some(Err(PatchError::UnterminatedIri)),
            }
        }
    }

    /// Read a quoted literal starting at the quote character `q`.
    fn read_quoted(&mut self, q: char) -> Result<String, PatchError> {
        self.bump(); // opening quote
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some(escaped) => out.push(escaped),
                    None => return Err(PatchError::UnterminatedLiteral),
                },
                Some(c) if c == q => return Ok(out),
                Some(c) => out.push(c),
                None => return Err(PatchError::UnterminatedLiteral),
            }
        }
    }

    /// A short excerpt of the remaining input, for diagnostics.
    fn snippet(&self) -> String {
        self.rest().chars().take(24).collect()
    }
}
