//! Visibility labels, authorizations, and the provenance label algebra
//!
//! A [`Visibility`] is a boolean expression over authorization tokens
//! (`a&b`, `a|b`, parentheses). The empty label is readable by everyone;
//! a label that fails to parse is readable by no one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Marker label carried by every provenance record unless configured otherwise
pub const DEFAULT_MARKER: &str = "termMention";

/// A security label attached to a graph element or property
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Visibility(String);

impl Visibility {
    /// Create a visibility from an expression string
    pub fn new(expression: impl Into<String>) -> Self {
        Self(expression.into())
    }

    /// The empty visibility (readable by everyone)
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Get the expression string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the empty visibility
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Conjunction of two labels
    ///
    /// Empty operands are absorbed and identical operands collapse, so
    /// `a.and(a) == a`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lineage_domain::Visibility;
    ///
    /// let v = Visibility::new("secret").and(&Visibility::new("termMention"));
    /// assert_eq!(v.as_str(), "(secret)&(termMention)");
    /// assert_eq!(Visibility::empty().and(&v), v);
    /// ```
    pub fn and(&self, other: &Visibility) -> Visibility {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() || self == other {
            return self.clone();
        }
        Visibility(format!("({})&({})", self.0, other.0))
    }

    /// Check that the expression parses
    pub fn validate(&self) -> Result<(), String> {
        parse(&self.0, MAX_NESTING).map(|_| ())
    }

    /// Evaluate this label against a set of authorizations
    pub fn can_read(&self, authorizations: &Authorizations) -> bool {
        // Room for the wrapping added by `and` and `combine`
        match parse(&self.0, 2 * MAX_NESTING) {
            Ok(None) => true,
            Ok(Some(expr)) => expr.evaluate(authorizations),
            Err(_) => false,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Visibility {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Opaque set of authorization tokens presented by a caller
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Authorizations(BTreeSet<String>);

impl Authorizations {
    /// Create authorizations from a list of tokens
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tokens.into_iter().map(Into::into).collect())
    }

    /// No authorizations at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the token is present
    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    /// A copy of these authorizations with one more token
    pub fn with(&self, token: &str) -> Self {
        let mut tokens = self.0.clone();
        tokens.insert(token.to_string());
        Self(tokens)
    }

    /// Iterate over the tokens in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no tokens are present
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Combines caller labels with the reserved provenance marker
///
/// The marker is configuration injected at construction. Provenance records
/// are always labelled `combine(visibility)`, which makes them invisible to
/// ordinary callers; [`VisibilityAlgebra::widen`] lets provenance-aware
/// operations see them again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityAlgebra {
    marker: Visibility,
}

impl VisibilityAlgebra {
    /// Create an algebra for the given marker token
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: Visibility::new(marker),
        }
    }

    /// The marker token
    pub fn marker(&self) -> &str {
        self.marker.as_str()
    }

    /// `base AND marker`
    pub fn combine(&self, base: &Visibility) -> Visibility {
        base.and(&self.marker)
    }

    /// Append the marker to a caller's authorizations
    pub fn widen(&self, authorizations: &Authorizations) -> Authorizations {
        authorizations.with(self.marker.as_str())
    }

    /// Whether `label` is readable under `authorizations`
    pub fn is_visible(&self, label: &Visibility, authorizations: &Authorizations) -> bool {
        label.can_read(authorizations)
    }
}

impl Default for VisibilityAlgebra {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

/// Whether `token` can appear bare inside a visibility expression
pub fn is_valid_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(is_token_byte)
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b':' | b'.' | b'/')
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Token(String),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    fn evaluate(&self, authorizations: &Authorizations) -> bool {
        match self {
            Expr::Token(token) => authorizations.contains(token),
            Expr::And(terms) => terms.iter().all(|t| t.evaluate(authorizations)),
            Expr::Or(terms) => terms.iter().any(|t| t.evaluate(authorizations)),
        }
    }
}

/// Deepest parenthesis nesting a caller-supplied label may use
pub const MAX_NESTING: usize = 64;

fn parse(input: &str, max_depth: usize) -> Result<Option<Expr>, String> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    let mut parser = Parser {
        input: input.as_bytes(),
        pos: 0,
        depth: 0,
        max_depth,
    };
    let expr = parser.parse_or()?;
    parser.skip_whitespace();
    if parser.pos != parser.input.len() {
        return Err(format!(
            "Unexpected character at offset {} in visibility '{}'",
            parser.pos, input
        ));
    }
    Ok(Some(expr))
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser<'_> {
    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: u8) -> bool {
        self.skip_whitespace();
        if self.input.get(self.pos) == Some(&expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut terms = vec![self.parse_and()?];
        while self.eat(b'|') {
            terms.push(self.parse_and()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expr::Or(terms)
        })
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut terms = vec![self.parse_atom()?];
        while self.eat(b'&') {
            terms.push(self.parse_atom()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expr::And(terms)
        })
    }

    fn parse_atom(&mut self) -> Result<Expr, String> {
        if self.eat(b'(') {
            if self.depth == self.max_depth {
                return Err(format!(
                    "Parentheses nested deeper than {} at offset {}",
                    self.max_depth, self.pos
                ));
            }
            self.depth += 1;
            let inner = self.parse_or()?;
            self.depth -= 1;
            if !self.eat(b')') {
                return Err(format!("Unclosed parenthesis at offset {}", self.pos));
            }
            return Ok(inner);
        }

        self.skip_whitespace();
        let start = self.pos;
        while self.pos < self.input.len() && is_token_byte(self.input[self.pos]) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(format!("Expected token at offset {}", start));
        }
        let token = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
        Ok(Expr::Token(token))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn token() -> impl Strategy<Value = String> {
        "[a-d]"
    }

    proptest! {
        /// Property: combine always yields a label that requires the marker
        #[test]
        fn test_combined_label_requires_marker(
            base in token(),
            tokens in prop::collection::btree_set(token(), 0..4),
        ) {
            let algebra = VisibilityAlgebra::new("m");
            let combined = algebra.combine(&Visibility::new(base));
            let without = Authorizations::new(tokens.iter().cloned());
            prop_assert!(!combined.can_read(&without));
        }

        /// Property: conjunction is associative in meaning
        #[test]
        fn test_and_associative(
            a in token(),
            b in token(),
            c in token(),
            tokens in prop::collection::btree_set(token(), 0..4),
        ) {
            let (a, b, c) = (Visibility::new(a), Visibility::new(b), Visibility::new(c));
            let left = a.and(&b).and(&c);
            let right = a.and(&b.and(&c));
            let auths = Authorizations::new(tokens);
            prop_assert_eq!(left.can_read(&auths), right.can_read(&auths));
        }

        /// Property: a label readable before widening stays readable after
        #[test]
        fn test_widen_is_monotonic(
            label in token(),
            tokens in prop::collection::btree_set(token(), 0..4),
        ) {
            let algebra = VisibilityAlgebra::new("m");
            let label = Visibility::new(label);
            let auths = Authorizations::new(tokens);
            if label.can_read(&auths) {
                prop_assert!(label.can_read(&algebra.widen(&auths)));
            }
        }
    }
}
