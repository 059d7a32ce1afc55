//! Low-level source cursor and trivia (whitespace/comment) scanning.
//!
//! The grammar itself lives in [`crate::parser`]; this module only tracks
//! position and recognizes the lexical fragments ([`Cursor::mark`] /
//! [`Cursor::slice_since`]) that the parser assembles into tokens and nodes.
//! There is no pre-tokenizing pass: a cursor tracks `pos` plus pending
//! comments, and trivia is skipped between every grammar production instead.

use crate::error::ParseError;
use crate::span::{Loc, Position, Span};
use crate::token::{Comment, CommentKind};

/// A saved cursor position, used to compute the span/loc/text of whatever
/// was scanned since the mark was taken.
#[derive(Debug, Clone, Copy)]
pub struct Mark {
    idx: usize,
    line: u32,
    col: u32,
}

pub struct Cursor<'a> {
    source: &'a str,
    chars: Vec<char>,
    /// `offsets[i]` is the byte offset of `chars[i]`; `offsets[chars.len()]`
    /// is `source.len()`, so spans can always be computed by index.
    offsets: Vec<usize>,
    pos: usize,
    line: u32,
    col: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = Vec::with_capacity(source.len());
        let mut offsets = Vec::with_capacity(source.len() + 1);
        for (i, c) in source.char_indices() {
            offsets.push(i);
            chars.push(c);
        }
        offsets.push(source.len());
        Cursor {
            source,
            chars,
            offsets,
            pos: 0,
            line: 1,
            col: 0,
        }
    }

    pub fn mark(&self) -> Mark {
        Mark {
            idx: self.pos,
            line: self.line,
            col: self.col,
        }
    }

    pub fn span_since(&self, mark: Mark) -> Span {
        Span::new(self.offsets[mark.idx], self.offsets[self.pos])
    }

    pub fn loc_since(&self, mark: Mark) -> Loc {
        Loc {
            start: Position::new(mark.line, mark.col),
            end: Position::new(self.line, self.col),
        }
    }

    pub fn slice_since(&self, mark: Mark) -> &'a str {
        &self.source[self.offsets[mark.idx]..self.offsets[self.pos]]
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.col)
    }

    pub fn offset(&self) -> usize {
        self.offsets[self.pos]
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn peek_at(&self, lookahead: usize) -> Option<char> {
        self.chars.get(self.pos + lookahead).copied()
    }

    pub fn starts_with(&self, s: &str) -> bool {
        self.source[self.offset()..].starts_with(s)
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    /// Consume `s` verbatim if it matches at the current position.
    pub fn eat_str(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            for _ in 0..s.chars().count() {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    /// Rewind to an earlier mark, for the few productions that need
    /// lookahead beyond one character (e.g. an `e`/`E` that turns out not to
    /// introduce an exponent).
    pub fn reset_to(&mut self, mark: Mark) {
        self.pos = mark.idx;
        self.line = mark.line;
        self.col = mark.col;
    }
}

/// Skip whitespace and comments, collecting every comment seen into
/// `comments` unconditionally — dialect gating on whether comments are
/// *allowed* happens later, in the parser, so the rejection can point at the
/// comment's own span.
pub fn skip_trivia(cursor: &mut Cursor<'_>, comments: &mut Vec<Comment>) -> Result<(), ParseError> {
    loop {
        match cursor.peek() {
            Some(c) if c.is_whitespace() => {
                cursor.bump();
            }
            Some('/') if cursor.peek_at(1) == Some('/') => {
                let mark = cursor.mark();
                cursor.bump();
                cursor.bump();
                let text_start = cursor.mark();
                while let Some(c) = cursor.peek() {
                    if c == '\n' {
                        break;
                    }
                    cursor.bump();
                }
                let text = cursor.slice_since(text_start).to_string();
                comments.push(Comment {
                    kind: CommentKind::Line,
                    span: cursor.span_since(mark),
                    loc: cursor.loc_since(mark),
                    text,
                });
            }
            Some('/') if cursor.peek_at(1) == Some('*') => {
                let mark = cursor.mark();
                cursor.bump();
                cursor.bump();
                let text_start = cursor.mark();
                let mut closed = false;
                while !cursor.is_eof() {
                    if cursor.starts_with("*/") {
                        closed = true;
                        break;
                    }
                    cursor.bump();
                }
                let text = cursor.slice_since(text_start).to_string();
                if !closed {
                    return Err(ParseError::UnexpectedToken {
                        found: "/*".to_string(),
                        span: cursor.span_since(mark),
                        loc: cursor.position(),
                    });
                }
                cursor.bump();
                cursor.bump();
                comments.push(Comment {
                    kind: CommentKind::Block,
                    span: cursor.span_since(mark),
                    loc: cursor.loc_since(mark),
                    text,
                });
            }
            _ => break,
        }
    }
    Ok(())
}

pub fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

pub fn is_identifier_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn skip_trivia_collects_both_comment_styles() {
        let mut cursor = Cursor::new("  // line\n/* block */rest");
        let mut comments = Vec::new();
        skip_trivia(&mut cursor, &mut comments).unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, " line");
        assert_eq!(comments[1].text, " block ");
        assert_eq!(cursor.peek(), Some('r'));
    }

    #[test]
    fn unterminated_block_comment_errors() {
        let mut cursor = Cursor::new("/* oops");
        let mut comments = Vec::new();
        assert!(skip_trivia(&mut cursor, &mut comments).is_err());
    }

    #[test]
    fn line_tracking_resets_column_on_newline() {
        let mut cursor = Cursor::new("ab\ncd");
        cursor.bump();
        cursor.bump();
        assert_eq!(cursor.position(), Position::new(1, 2));
        cursor.bump(); // consumes '\n'
        assert_eq!(cursor.position(), Position::new(2, 0));
    }
}
