//! Ordered token storage with positional lookups.

use crate::span::{Loc, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Punctuator,
    String,
    Number,
    Identifier,
    Keyword,
    Template,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub loc: Loc,
    /// Raw source text of the token, verbatim.
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Line,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
    pub span: Span,
    pub loc: Loc,
    /// Comment text with delimiters stripped.
    pub text: String,
}

/// Read-only, binary-searchable view over a program's ordered tokens.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    tokens: Vec<Token>,
}

impl TokenStore {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Index of the first token whose span does not end before `offset`.
    fn lower_bound(&self, offset: usize) -> usize {
        self.tokens.partition_point(|t| t.span.end <= offset)
    }

    pub fn first_token(&self, span: Span, pred: impl Fn(&Token) -> bool) -> Option<&Token> {
        let start = self.lower_bound(span.start);
        self.tokens[start..]
            .iter()
            .take_while(|t| t.span.start < span.end)
            .find(|t| pred(t))
    }

    pub fn last_token(&self, span: Span, pred: impl Fn(&Token) -> bool) -> Option<&Token> {
        let start = self.lower_bound(span.start);
        self.tokens[start..]
            .iter()
            .take_while(|t| t.span.start < span.end)
            .filter(|t| pred(t))
            .next_back()
    }

    pub fn token_before(&self, span: Span, pred: impl Fn(&Token) -> bool) -> Option<&Token> {
        let end = self.lower_bound(span.start);
        self.tokens[..end].iter().rev().find(|t| pred(t))
    }

    pub fn token_after(&self, span: Span, pred: impl Fn(&Token) -> bool) -> Option<&Token> {
        let start = self.lower_bound(span.end);
        self.tokens[start..].iter().find(|t| pred(t))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tok(start: usize, end: usize, text: &str) -> Token {
        Token {
            kind: TokenKind::Punctuator,
            span: Span::new(start, end),
            loc: Loc::default(),
            text: text.to_string(),
        }
    }

    #[test]
    fn before_and_after_walk_outward_from_anchor() {
        let store = TokenStore::new(vec![
            tok(0, 1, "{"),
            tok(1, 4, "\"a\""),
            tok(4, 5, ":"),
            tok(5, 6, "1"),
            tok(6, 7, "}"),
        ]);
        let anchor = Span::new(4, 5);
        let before = store.token_before(anchor, |_| true).unwrap();
        assert_eq!(before.text, "\"a\"");
        let after = store.token_after(anchor, |_| true).unwrap();
        assert_eq!(after.text, "1");
    }

    #[test]
    fn first_and_last_within_span() {
        let store = TokenStore::new(vec![
            tok(0, 1, "["),
            tok(1, 2, "1"),
            tok(2, 3, ","),
            tok(3, 4, "2"),
            tok(4, 5, "]"),
        ]);
        let span = Span::new(0, 5);
        assert_eq!(store.first_token(span, |_| true).unwrap().text, "[");
        assert_eq!(store.last_token(span, |_| true).unwrap().text, "]");
    }

    #[test]
    fn predicate_skips_non_matching_tokens() {
        let store = TokenStore::new(vec![tok(0, 1, "["), tok(1, 2, "1"), tok(2, 3, "]")]);
        let span = Span::new(0, 3);
        let num = store
            .first_token(span, |t| t.text.chars().all(|c| c.is_ascii_digit()))
            .unwrap();
        assert_eq!(num.text, "1");
    }
}
