//! Recursive-descent parser and AST builder.
//!
//! There is no separate tokenize-then-parse stage: the parser scans
//! characters directly off a [`Cursor`] and records a [`Token`] each time it
//! commits to one. That sidesteps the classic `/` division-vs-regex-literal
//! ambiguity for free — a `/` is only ever read as the start of a regex
//! literal from [`Parser::parse_value`] (value position), never from the
//! infix-operator loops in [`Parser::parse_term`].

use crate::ast::{
    Arena, BinaryOperator, IdentifierName, KeywordValue, NodeId, NodeKind, NumberIdentKind,
    UnaryOperator,
};
use crate::dialect::{Capabilities, Dialect};
use crate::error::ParseError;
use crate::lexer::{self, Cursor, Mark};
use crate::span::{Loc, Span};
use crate::token::{Comment, Token, TokenKind, TokenStore};

pub struct ParseOutput {
    pub arena: Arena,
    pub root: NodeId,
    pub tokens: TokenStore,
    pub comments: Vec<Comment>,
}

#[tracing::instrument(skip_all, fields(dialect = ?dialect))]
pub fn parse_program(
    source: &str,
    dialect: Dialect,
    caps: Capabilities,
) -> Result<ParseOutput, ParseError> {
    let mut parser = Parser {
        cursor: Cursor::new(source),
        dialect,
        caps,
        allow_binary: dialect == Dialect::Unrestricted,
        arena: Arena::default(),
        tokens: Vec::new(),
        comments: Vec::new(),
    };
    parser.skip_trivia()?;
    if parser.cursor.is_eof() {
        tracing::debug!("empty document");
        return Err(ParseError::EmptyInput);
    }
    let expression = parser.parse_expression()?;
    parser.skip_trivia()?;
    if !parser.cursor.is_eof() {
        let offset = parser.cursor.offset();
        return Err(ParseError::UnexpectedExtraArgument {
            span: Span::new(offset, offset),
            loc: parser.cursor.position(),
        });
    }

    let expr_span = parser.arena.get(expression).span;
    let expr_loc = parser.arena.get(expression).loc;
    let statement = parser.arena.push(
        expr_span,
        expr_loc,
        NodeKind::ExpressionStatement {
            expression,
        },
    );
    parser.arena.set_parent(expression, statement);
    let root = parser
        .arena
        .push(expr_span, expr_loc, NodeKind::Program { body: statement });
    parser.arena.set_parent(statement, root);

    tracing::trace!(nodes = parser.arena.len(), tokens = parser.tokens.len(), "parse complete");
    Ok(ParseOutput {
        arena: parser.arena,
        root,
        tokens: TokenStore::new(parser.tokens),
        comments: parser.comments,
    })
}

struct Parser<'a> {
    cursor: Cursor<'a>,
    dialect: Dialect,
    caps: Capabilities,
    allow_binary: bool,
    arena: Arena,
    tokens: Vec<Token>,
    comments: Vec<Comment>,
}

impl<'a> Parser<'a> {
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        let before = self.comments.len();
        lexer::skip_trivia(&mut self.cursor, &mut self.comments)?;
        if !self.caps.comments {
            if let Some(comment) = self.comments.get(before) {
                return Err(ParseError::UnexpectedComment {
                    span: comment.span,
                    loc: comment.loc.start,
                });
            }
        }
        Ok(())
    }

    fn push_token(&mut self, kind: TokenKind, mark: Mark) {
        self.tokens.push(Token {
            kind,
            span: self.cursor.span_since(mark),
            loc: self.cursor.loc_since(mark),
            text: self.cursor.slice_since(mark).to_string(),
        });
    }

    fn unexpected_here(&self, found: impl Into<String>) -> ParseError {
        let start = self.cursor.offset();
        let end = self
            .cursor
            .peek()
            .map_or(start, |c| start + c.len_utf8());
        ParseError::UnexpectedToken {
            found: found.into(),
            span: Span::new(start, end),
            loc: self.cursor.position(),
        }
    }

    fn trailing_comma_error(&self, comma_mark: Mark) -> ParseError {
        let span = self.cursor.span_since(comma_mark);
        let loc = self.cursor.position();
        if self.dialect == Dialect::Json {
            ParseError::UnexpectedToken {
                found: ",".to_string(),
                span,
                loc,
            }
        } else {
            ParseError::InvalidForDialect {
                feature: "trailing comma",
                span,
                loc,
            }
        }
    }

    // ---- expression grammar -------------------------------------------------

    fn parse_expression(&mut self) -> Result<NodeId, ParseError> {
        if self.allow_binary {
            self.parse_additive()
        } else {
            self.parse_value()
        }
    }

    fn parse_additive(&mut self) -> Result<NodeId, ParseError> {
        let mut left = self.parse_term()?;
        loop {
            self.skip_trivia()?;
            let operator = match self.cursor.peek() {
                Some('+') => BinaryOperator::Add,
                Some('-') => BinaryOperator::Sub,
                _ => break,
            };
            let op_mark = self.cursor.mark();
            self.cursor.bump();
            self.push_token(TokenKind::Punctuator, op_mark);
            self.skip_trivia()?;
            let right = self.parse_term()?;
            left = self.combine_binary(left, operator, right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<NodeId, ParseError> {
        let mut left = self.parse_pow()?;
        loop {
            self.skip_trivia()?;
            let operator = match self.cursor.peek() {
                Some('*') if self.cursor.peek_at(1) != Some('*') => BinaryOperator::Mul,
                Some('/') => BinaryOperator::Div,
                Some('%') => BinaryOperator::Mod,
                _ => break,
            };
            let op_mark = self.cursor.mark();
            self.cursor.bump();
            self.push_token(TokenKind::Punctuator, op_mark);
            self.skip_trivia()?;
            let right = self.parse_pow()?;
            left = self.combine_binary(left, operator, right);
        }
        Ok(left)
    }

    /// `**` binds tighter than `* / %` and is right-associative.
    fn parse_pow(&mut self) -> Result<NodeId, ParseError> {
        let base = self.parse_value()?;
        self.skip_trivia()?;
        if self.cursor.peek() == Some('*') && self.cursor.peek_at(1) == Some('*') {
            let op_mark = self.cursor.mark();
            self.cursor.bump();
            self.cursor.bump();
            self.push_token(TokenKind::Punctuator, op_mark);
            self.skip_trivia()?;
            let exponent = self.parse_pow()?;
            return Ok(self.combine_binary(base, BinaryOperator::Pow, exponent));
        }
        Ok(base)
    }

    fn combine_binary(&mut self, left: NodeId, operator: BinaryOperator, right: NodeId) -> NodeId {
        let left_node = self.arena.get(left);
        let right_node = self.arena.get(right);
        let span = left_node.span.to(right_node.span);
        let loc = Loc {
            start: left_node.loc.start,
            end: right_node.loc.end,
        };
        let node = self
            .arena
            .push(span, loc, NodeKind::BinaryExpression { operator, left, right });
        self.arena.set_parent(left, node);
        self.arena.set_parent(right, node);
        node
    }

    /// A value in primary position: object, array, literal, or a leading
    /// `+`/`-` applied to a numeric form.
    fn parse_value(&mut self) -> Result<NodeId, ParseError> {
        self.skip_trivia()?;
        match self.cursor.peek() {
            None => Err(ParseError::EmptyInput),
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"') | Some('\'') => self.parse_string(),
            Some('`') => self.parse_template(),
            Some('/') => self.parse_regex(),
            Some('+') => self.parse_signed_number(UnaryOperator::Plus),
            Some('-') => self.parse_signed_number(UnaryOperator::Minus),
            Some(c) if c.is_ascii_digit() => self.parse_number(),
            Some('.') if matches!(self.cursor.peek_at(1), Some(d) if d.is_ascii_digit()) => {
                self.parse_number()
            }
            Some(c) if lexer::is_identifier_start(c) => self.parse_identifier_value(),
            Some(c) => Err(self.unexpected_here(c.to_string())),
        }
    }

    fn parse_signed_number(&mut self, operator: UnaryOperator) -> Result<NodeId, ParseError> {
        let start_mark = self.cursor.mark();
        if operator == UnaryOperator::Plus && !self.caps.plus_signs {
            return Err(ParseError::InvalidForDialect {
                feature: "plus sign",
                span: Span::new(self.cursor.offset(), self.cursor.offset() + 1),
                loc: self.cursor.position(),
            });
        }
        self.cursor.bump();
        self.push_token(TokenKind::Punctuator, start_mark);
        let after_sign = self.cursor.mark();
        let had_space = matches!(self.cursor.peek(), Some(c) if c.is_whitespace());
        self.skip_trivia()?;
        if had_space && !self.caps.spaced_signs {
            return Err(ParseError::InvalidForDialect {
                feature: "space between sign and number",
                span: self.cursor.span_since(after_sign),
                loc: self.cursor.position(),
            });
        }
        let argument = self.parse_numeric_operand()?;
        let span = self.cursor.span_since(start_mark);
        let loc = self.cursor.loc_since(start_mark);
        let node = self.arena.push(
            span,
            loc,
            NodeKind::UnaryExpression {
                operator,
                argument,
            },
        );
        self.arena.set_parent(argument, node);
        Ok(node)
    }

    /// The operand of a unary sign: a numeric literal, `Infinity`, `NaN`, or
    /// another signed numeric form (`- -2` nests a `UnaryExpression` inside a
    /// `UnaryExpression`). Never a bigint — a sign directly in front of a
    /// `BigInt` literal isn't legal syntax.
    fn parse_numeric_operand(&mut self) -> Result<NodeId, ParseError> {
        match self.cursor.peek() {
            Some('+') => self.parse_signed_number(UnaryOperator::Plus),
            Some('-') => self.parse_signed_number(UnaryOperator::Minus),
            Some(c) if c.is_ascii_digit() || c == '.' => self.parse_signed_numeric_literal(),
            Some(c) if lexer::is_identifier_start(c) => {
                let mark = self.cursor.mark();
                let name = self.scan_identifier_text_raw();
                match name.as_str() {
                    "Infinity" => self.finish_number_ident(mark, NumberIdentKind::Infinity),
                    "NaN" => self.finish_number_ident(mark, NumberIdentKind::Nan),
                    _ => Err(self.unexpected_here(name)),
                }
            }
            Some(c) => Err(self.unexpected_here(c.to_string())),
            None => Err(ParseError::EmptyInput),
        }
    }

    /// A `NumberLiteral` (never `BigIntLiteral`) reached as the operand of a
    /// leading sign.
    fn parse_signed_numeric_literal(&mut self) -> Result<NodeId, ParseError> {
        let node = self.parse_number()?;
        if let NodeKind::BigIntLiteral { .. } = &self.arena.get(node).kind {
            let span = self.arena.get(node).span;
            let loc = self.arena.get(node).loc;
            return Err(ParseError::UnexpectedToken {
                found: "n".to_string(),
                span,
                loc: loc.start,
            });
        }
        Ok(node)
    }

    fn finish_number_ident(&mut self, mark: Mark, kind: NumberIdentKind) -> Result<NodeId, ParseError> {
        let (allowed, label) = match kind {
            NumberIdentKind::Infinity => (self.caps.infinities, "Infinity"),
            NumberIdentKind::Nan => (self.caps.nans, "NaN"),
        };
        let span = self.cursor.span_since(mark);
        let loc = self.cursor.loc_since(mark);
        if !allowed {
            return Err(ParseError::InvalidForDialect {
                feature: label,
                span,
                loc: loc.start,
            });
        }
        self.push_token(TokenKind::Keyword, mark);
        Ok(self.arena.push(
            span,
            loc,
            NodeKind::Identifier {
                name: IdentifierName::Number(kind),
                is_expression: true,
            },
        ))
    }

    fn scan_identifier_text_raw(&mut self) -> String {
        let mark = self.cursor.mark();
        while let Some(c) = self.cursor.peek() {
            if lexer::is_identifier_continue(c) {
                self.cursor.bump();
            } else {
                break;
            }
        }
        self.cursor.slice_since(mark).to_string()
    }

    /// A bare identifier reached from value position. The only legal forms
    /// are the fixed set of keyword-shaped values; anything else isn't a
    /// valid JSON-family value (bare identifiers are otherwise only legal as
    /// property keys, via [`Parser::parse_property_key`]).
    fn parse_identifier_value(&mut self) -> Result<NodeId, ParseError> {
        let mark = self.cursor.mark();
        let name = self.scan_identifier_text_raw();
        let span = self.cursor.span_since(mark);
        let loc = self.cursor.loc_since(mark);
        match name.as_str() {
            "true" => {
                self.push_token(TokenKind::Keyword, mark);
                Ok(self
                    .arena
                    .push(span, loc, NodeKind::KeywordLiteral { value: KeywordValue::True }))
            }
            "false" => {
                self.push_token(TokenKind::Keyword, mark);
                Ok(self
                    .arena
                    .push(span, loc, NodeKind::KeywordLiteral { value: KeywordValue::False }))
            }
            "null" => {
                self.push_token(TokenKind::Keyword, mark);
                Ok(self
                    .arena
                    .push(span, loc, NodeKind::KeywordLiteral { value: KeywordValue::Null }))
            }
            "Infinity" => {
                if !self.caps.infinities {
                    return Err(ParseError::InvalidForDialect {
                        feature: "Infinity",
                        span,
                        loc: loc.start,
                    });
                }
                self.push_token(TokenKind::Keyword, mark);
                Ok(self.arena.push(
                    span,
                    loc,
                    NodeKind::Identifier {
                        name: IdentifierName::Number(NumberIdentKind::Infinity),
                        is_expression: true,
                    },
                ))
            }
            "NaN" => {
                if !self.caps.nans {
                    return Err(ParseError::InvalidForDialect {
                        feature: "NaN",
                        span,
                        loc: loc.start,
                    });
                }
                self.push_token(TokenKind::Keyword, mark);
                Ok(self.arena.push(
                    span,
                    loc,
                    NodeKind::Identifier {
                        name: IdentifierName::Number(NumberIdentKind::Nan),
                        is_expression: true,
                    },
                ))
            }
            "undefined" => {
                if !self.caps.undefined_keywords {
                    return Err(ParseError::InvalidForDialect {
                        feature: "undefined",
                        span,
                        loc: loc.start,
                    });
                }
                self.push_token(TokenKind::Keyword, mark);
                Ok(self.arena.push(
                    span,
                    loc,
                    NodeKind::Identifier {
                        name: IdentifierName::Undefined,
                        is_expression: true,
                    },
                ))
            }
            _ => Err(ParseError::UnexpectedToken {
                found: name,
                span,
                loc: loc.start,
            }),
        }
    }

    // ---- objects and arrays -------------------------------------------------

    fn parse_object(&mut self) -> Result<NodeId, ParseError> {
        let start_mark = self.cursor.mark();
        self.cursor.bump();
        self.push_token(TokenKind::Punctuator, start_mark);
        let mut properties = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.cursor.peek() == Some('}') {
                break;
            }
            let property = self.parse_property()?;
            properties.push(property);
            self.skip_trivia()?;
            match self.cursor.peek() {
                Some(',') => {
                    let comma_mark = self.cursor.mark();
                    self.cursor.bump();
                    self.push_token(TokenKind::Punctuator, comma_mark);
                    self.skip_trivia()?;
                    if self.cursor.peek() == Some('}') {
                        if !self.caps.trailing_commas {
                            return Err(self.trailing_comma_error(comma_mark));
                        }
                        break;
                    }
                }
                Some('}') => break,
                Some(c) => return Err(self.unexpected_here(c.to_string())),
                None => return Err(ParseError::EmptyInput),
            }
        }
        let close_mark = self.cursor.mark();
        self.cursor.bump();
        self.push_token(TokenKind::Punctuator, close_mark);
        let span = self.cursor.span_since(start_mark);
        let loc = self.cursor.loc_since(start_mark);
        let node = self
            .arena
            .push(span, loc, NodeKind::ObjectExpression { properties: properties.clone() });
        for property in properties {
            self.arena.set_parent(property, node);
        }
        Ok(node)
    }

    fn parse_property(&mut self) -> Result<NodeId, ParseError> {
        let key = self.parse_property_key()?;
        self.skip_trivia()?;
        match self.cursor.peek() {
            Some(':') => {
                let mark = self.cursor.mark();
                self.cursor.bump();
                self.push_token(TokenKind::Punctuator, mark);
            }
            Some(c) => return Err(self.unexpected_here(c.to_string())),
            None => return Err(ParseError::EmptyInput),
        }
        self.skip_trivia()?;
        let value = self.parse_expression()?;
        let key_node = self.arena.get(key);
        let value_node = self.arena.get(value);
        let span = key_node.span.to(value_node.span);
        let loc = Loc {
            start: key_node.loc.start,
            end: value_node.loc.end,
        };
        let node = self.arena.push(span, loc, NodeKind::Property { key, value });
        self.arena.set_parent(key, node);
        self.arena.set_parent(value, node);
        Ok(node)
    }

    fn parse_property_key(&mut self) -> Result<NodeId, ParseError> {
        self.skip_trivia()?;
        match self.cursor.peek() {
            Some('"') | Some('\'') => self.parse_string(),
            Some(c) if c.is_ascii_digit() || c == '.' => {
                if !self.caps.number_properties {
                    return Err(ParseError::InvalidForDialect {
                        feature: "numeric property key",
                        span: Span::new(self.cursor.offset(), self.cursor.offset()),
                        loc: self.cursor.position(),
                    });
                }
                self.parse_number()
            }
            Some(c) if lexer::is_identifier_start(c) => {
                if !self.caps.unquote_properties {
                    return Err(ParseError::InvalidForDialect {
                        feature: "unquoted property key",
                        span: Span::new(self.cursor.offset(), self.cursor.offset()),
                        loc: self.cursor.position(),
                    });
                }
                let mark = self.cursor.mark();
                let name = self.scan_identifier_text_raw();
                let span = self.cursor.span_since(mark);
                let loc = self.cursor.loc_since(mark);
                self.push_token(TokenKind::Identifier, mark);
                let ident_name = match name.as_str() {
                    "true" => IdentifierName::Keyword(KeywordValue::True),
                    "false" => IdentifierName::Keyword(KeywordValue::False),
                    "null" => IdentifierName::Keyword(KeywordValue::Null),
                    "Infinity" => IdentifierName::Number(NumberIdentKind::Infinity),
                    "NaN" => IdentifierName::Number(NumberIdentKind::Nan),
                    "undefined" => IdentifierName::Undefined,
                    _ => IdentifierName::Plain(name),
                };
                Ok(self.arena.push(
                    span,
                    loc,
                    NodeKind::Identifier {
                        name: ident_name,
                        is_expression: false,
                    },
                ))
            }
            Some(c) => Err(self.unexpected_here(c.to_string())),
            None => Err(ParseError::EmptyInput),
        }
    }

    fn parse_array(&mut self) -> Result<NodeId, ParseError> {
        let start_mark = self.cursor.mark();
        self.cursor.bump();
        self.push_token(TokenKind::Punctuator, start_mark);
        let mut elements: Vec<Option<NodeId>> = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.cursor.peek() == Some(']') {
                break;
            }
            if self.cursor.peek() == Some(',') {
                if !self.caps.sparse_arrays {
                    return Err(ParseError::InvalidForDialect {
                        feature: "sparse array element",
                        span: Span::new(self.cursor.offset(), self.cursor.offset()),
                        loc: self.cursor.position(),
                    });
                }
                elements.push(None);
                let comma_mark = self.cursor.mark();
                self.cursor.bump();
                self.push_token(TokenKind::Punctuator, comma_mark);
                continue;
            }
            let value = self.parse_expression()?;
            elements.push(Some(value));
            self.skip_trivia()?;
            match self.cursor.peek() {
                Some(',') => {
                    let comma_mark = self.cursor.mark();
                    self.cursor.bump();
                    self.push_token(TokenKind::Punctuator, comma_mark);
                    self.skip_trivia()?;
                    if self.cursor.peek() == Some(']') {
                        if !self.caps.trailing_commas {
                            return Err(self.trailing_comma_error(comma_mark));
                        }
                        break;
                    }
                }
                Some(']') => break,
                Some(c) => return Err(self.unexpected_here(c.to_string())),
                None => return Err(ParseError::EmptyInput),
            }
        }
        let close_mark = self.cursor.mark();
        self.cursor.bump();
        self.push_token(TokenKind::Punctuator, close_mark);
        let span = self.cursor.span_since(start_mark);
        let loc = self.cursor.loc_since(start_mark);
        let node = self
            .arena
            .push(span, loc, NodeKind::ArrayExpression { elements: elements.clone() });
        for element in elements.into_iter().flatten() {
            self.arena.set_parent(element, node);
        }
        Ok(node)
    }

    // ---- literals ------------------------------------------------------------

    fn parse_string(&mut self) -> Result<NodeId, ParseError> {
        let quote = self.cursor.peek().expect("caller checked for a quote");
        let single_quoted = quote == '\'';
        if single_quoted && !self.caps.single_quotes {
            return Err(ParseError::InvalidForDialect {
                feature: "single-quoted string",
                span: Span::new(self.cursor.offset(), self.cursor.offset() + 1),
                loc: self.cursor.position(),
            });
        }
        let start_mark = self.cursor.mark();
        self.cursor.bump();
        let mut value = String::new();
        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    return Err(ParseError::UnterminatedString {
                        span: self.cursor.span_since(start_mark),
                        loc: self.cursor.position(),
                    })
                }
                Some(c) if c == quote => {
                    self.cursor.bump();
                    break;
                }
                Some('\\') => self.scan_string_escape(&mut value, start_mark)?,
                Some(c) => {
                    value.push(c);
                    self.cursor.bump();
                }
            }
        }
        let span = self.cursor.span_since(start_mark);
        let loc = self.cursor.loc_since(start_mark);
        self.push_token(TokenKind::String, start_mark);
        Ok(self.arena.push(span, loc, NodeKind::StringLiteral { value, single_quoted }))
    }

    fn scan_string_escape(&mut self, value: &mut String, start_mark: Mark) -> Result<(), ParseError> {
        let esc_mark = self.cursor.mark();
        self.cursor.bump();
        match self.cursor.peek() {
            Some('\n') => {
                if !self.caps.multiline_strings {
                    return Err(ParseError::InvalidForDialect {
                        feature: "multiline string",
                        span: self.cursor.span_since(esc_mark),
                        loc: self.cursor.position(),
                    });
                }
                self.cursor.bump();
            }
            Some('n') => {
                value.push('\n');
                self.cursor.bump();
            }
            Some('t') => {
                value.push('\t');
                self.cursor.bump();
            }
            Some('r') => {
                value.push('\r');
                self.cursor.bump();
            }
            Some('b') => {
                value.push('\u{8}');
                self.cursor.bump();
            }
            Some('f') => {
                value.push('\u{c}');
                self.cursor.bump();
            }
            Some('v') => {
                value.push('\u{b}');
                self.cursor.bump();
            }
            Some('0') if !matches!(self.cursor.peek_at(1), Some(d) if d.is_ascii_digit()) => {
                value.push('\0');
                self.cursor.bump();
            }
            Some('x') => {
                self.cursor.bump();
                let hex_mark = self.cursor.mark();
                for _ in 0..2 {
                    if matches!(self.cursor.peek(), Some(h) if h.is_ascii_hexdigit()) {
                        self.cursor.bump();
                    }
                }
                let hex = self.cursor.slice_since(hex_mark).to_string();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => value.push(ch),
                    None => {
                        return Err(ParseError::InvalidEscape {
                            text: format!("\\x{hex}"),
                            span: self.cursor.span_since(esc_mark),
                            loc: self.cursor.position(),
                        })
                    }
                }
            }
            Some('u') => {
                self.cursor.bump();
                let hex_mark = self.cursor.mark();
                for _ in 0..4 {
                    if matches!(self.cursor.peek(), Some(h) if h.is_ascii_hexdigit()) {
                        self.cursor.bump();
                    }
                }
                let hex = self.cursor.slice_since(hex_mark).to_string();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => value.push(ch),
                    None => {
                        return Err(ParseError::InvalidEscape {
                            text: format!("\\u{hex}"),
                            span: self.cursor.span_since(esc_mark),
                            loc: self.cursor.position(),
                        })
                    }
                }
            }
            Some(other) => {
                value.push(other);
                self.cursor.bump();
            }
            None => {
                return Err(ParseError::UnterminatedString {
                    span: self.cursor.span_since(start_mark),
                    loc: self.cursor.position(),
                })
            }
        }
        Ok(())
    }

    fn parse_template(&mut self) -> Result<NodeId, ParseError> {
        if !self.caps.template_literals {
            return Err(ParseError::InvalidForDialect {
                feature: "template literal",
                span: Span::new(self.cursor.offset(), self.cursor.offset() + 1),
                loc: self.cursor.position(),
            });
        }
        let start_mark = self.cursor.mark();
        self.cursor.bump();
        let raw_start = self.cursor.mark();
        let mut cooked = String::new();
        loop {
            match self.cursor.peek() {
                None => {
                    return Err(ParseError::UnterminatedString {
                        span: self.cursor.span_since(start_mark),
                        loc: self.cursor.position(),
                    })
                }
                Some('`') => break,
                Some('$') if self.cursor.peek_at(1) == Some('{') => {
                    return Err(ParseError::InvalidForDialect {
                        feature: "template substitution",
                        span: Span::new(self.cursor.offset(), self.cursor.offset() + 2),
                        loc: self.cursor.position(),
                    });
                }
                Some('\\') => {
                    self.cursor.bump();
                    match self.cursor.peek() {
                        Some('`') => {
                            cooked.push('`');
                            self.cursor.bump();
                        }
                        Some('$') => {
                            cooked.push('$');
                            self.cursor.bump();
                        }
                        Some('\\') => {
                            cooked.push('\\');
                            self.cursor.bump();
                        }
                        Some('n') => {
                            cooked.push('\n');
                            self.cursor.bump();
                        }
                        Some(other) => {
                            cooked.push(other);
                            self.cursor.bump();
                        }
                        None => {
                            return Err(ParseError::UnterminatedString {
                                span: self.cursor.span_since(start_mark),
                                loc: self.cursor.position(),
                            })
                        }
                    }
                }
                Some(c) => {
                    cooked.push(c);
                    self.cursor.bump();
                }
            }
        }
        let raw = self.cursor.slice_since(raw_start).to_string();
        self.cursor.bump();
        let span = self.cursor.span_since(start_mark);
        let loc = self.cursor.loc_since(start_mark);
        self.push_token(TokenKind::Template, start_mark);
        let quasi = self
            .arena
            .push(span, loc, NodeKind::TemplateElement { tail: true, cooked, raw });
        let node = self.arena.push(span, loc, NodeKind::TemplateLiteral { quasi });
        self.arena.set_parent(quasi, node);
        Ok(node)
    }

    fn parse_regex(&mut self) -> Result<NodeId, ParseError> {
        if !self.caps.reg_exp_literals {
            return Err(ParseError::InvalidForDialect {
                feature: "regular expression literal",
                span: Span::new(self.cursor.offset(), self.cursor.offset() + 1),
                loc: self.cursor.position(),
            });
        }
        let start_mark = self.cursor.mark();
        self.cursor.bump();
        let pattern_start = self.cursor.mark();
        let mut in_class = false;
        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    return Err(ParseError::UnterminatedString {
                        span: self.cursor.span_since(start_mark),
                        loc: self.cursor.position(),
                    })
                }
                Some('\\') => {
                    self.cursor.bump();
                    if self.cursor.peek().is_some() {
                        self.cursor.bump();
                    }
                }
                Some('[') => {
                    in_class = true;
                    self.cursor.bump();
                }
                Some(']') => {
                    in_class = false;
                    self.cursor.bump();
                }
                Some('/') if !in_class => break,
                Some(_) => {
                    self.cursor.bump();
                }
            }
        }
        let pattern = self.cursor.slice_since(pattern_start).to_string();
        self.cursor.bump();
        let flags_start = self.cursor.mark();
        while matches!(self.cursor.peek(), Some(c) if c.is_ascii_alphabetic()) {
            self.cursor.bump();
        }
        let flags = self.cursor.slice_since(flags_start).to_string();
        let span = self.cursor.span_since(start_mark);
        let loc = self.cursor.loc_since(start_mark);
        self.push_token(TokenKind::Punctuator, start_mark);
        Ok(self.arena.push(span, loc, NodeKind::RegExpLiteral { pattern, flags }))
    }

    fn parse_number(&mut self) -> Result<NodeId, ParseError> {
        let start_mark = self.cursor.mark();
        let is_hex =
            self.cursor.peek() == Some('0') && matches!(self.cursor.peek_at(1), Some('x') | Some('X'));
        let mut has_leading_dot = false;
        let mut has_trailing_dot = false;
        let mut has_exponent = false;
        let mut leading_zero = false;

        if is_hex {
            self.cursor.bump();
            self.cursor.bump();
            while matches!(self.cursor.peek(), Some(c) if c.is_ascii_hexdigit()) {
                self.cursor.bump();
            }
        } else {
            if self.cursor.peek() == Some('.') {
                has_leading_dot = true;
                self.cursor.bump();
                while matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
                    self.cursor.bump();
                }
            } else {
                let int_mark = self.cursor.mark();
                while matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
                    self.cursor.bump();
                }
                let int_text = self.cursor.slice_since(int_mark);
                leading_zero = int_text.len() > 1 && int_text.starts_with('0');
                if self.cursor.peek() == Some('.') {
                    self.cursor.bump();
                    let frac_mark = self.cursor.mark();
                    while matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
                        self.cursor.bump();
                    }
                    has_trailing_dot = self.cursor.slice_since(frac_mark).is_empty();
                }
            }
            if matches!(self.cursor.peek(), Some('e') | Some('E')) {
                let exp_mark = self.cursor.mark();
                self.cursor.bump();
                if matches!(self.cursor.peek(), Some('+') | Some('-')) {
                    self.cursor.bump();
                }
                let digits_mark = self.cursor.mark();
                while matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
                    self.cursor.bump();
                }
                if self.cursor.slice_since(digits_mark).is_empty() {
                    self.cursor.reset_to(exp_mark);
                } else {
                    has_exponent = true;
                }
            }
        }

        if (has_leading_dot || has_trailing_dot) && !self.caps.leading_or_trailing_decimal_points {
            return Err(ParseError::InvalidForDialect {
                feature: "leading or trailing decimal point",
                span: self.cursor.span_since(start_mark),
                loc: self.cursor.position(),
            });
        }
        if (is_hex || leading_zero) && !self.caps.invalid_json_numbers {
            return Err(ParseError::InvalidForDialect {
                feature: if is_hex { "hexadecimal number" } else { "leading zero" },
                span: self.cursor.span_since(start_mark),
                loc: self.cursor.position(),
            });
        }

        if self.cursor.peek() == Some('n') && !has_trailing_dot && !has_leading_dot && !has_exponent {
            if !self.caps.bigint_literals {
                return Err(ParseError::InvalidForDialect {
                    feature: "bigint literal",
                    span: self.cursor.span_since(start_mark),
                    loc: self.cursor.position(),
                });
            }
            let digits = self.cursor.slice_since(start_mark).to_string();
            self.cursor.bump();
            let span = self.cursor.span_since(start_mark);
            let loc = self.cursor.loc_since(start_mark);
            self.push_token(TokenKind::Number, start_mark);
            return Ok(self.arena.push(span, loc, NodeKind::BigIntLiteral { text: digits }));
        }

        let text = self.cursor.slice_since(start_mark).to_string();
        if text.is_empty() || text == "." {
            return Err(ParseError::InvalidNumber {
                text,
                span: self.cursor.span_since(start_mark),
                loc: self.cursor.position(),
            });
        }
        let value = if is_hex {
            i64::from_str_radix(&text[2..], 16)
                .map(|v| v as f64)
                .map_err(|_| ParseError::InvalidNumber {
                    text: text.clone(),
                    span: self.cursor.span_since(start_mark),
                    loc: self.cursor.position(),
                })?
        } else {
            text.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                text: text.clone(),
                span: self.cursor.span_since(start_mark),
                loc: self.cursor.position(),
            })?
        };
        let span = self.cursor.span_since(start_mark);
        let loc = self.cursor.loc_since(start_mark);
        self.push_token(TokenKind::Number, start_mark);
        Ok(self.arena.push(span, loc, NodeKind::NumberLiteral { value }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;

    fn parse(source: &str, dialect: Dialect) -> Result<ParseOutput, ParseError> {
        parse_program(source, dialect, Capabilities::for_dialect(dialect))
    }

    #[test]
    fn json_parses_a_plain_object() {
        let out = parse(r#"{"a": 1, "b": [true, false, null]}"#, Dialect::Json).unwrap();
        let root = out.arena.get(out.root);
        assert!(matches!(root.kind, NodeKind::Program { .. }));
    }

    #[test]
    fn json_rejects_trailing_comma_as_unexpected_token() {
        let err = parse(r#"{"a": 1,}"#, Dialect::Json).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { found, .. } if found == ","));
    }

    #[test]
    fn jsonc_allows_trailing_comma_and_comments() {
        let out = parse("{\n  // hi\n  \"a\": 1,\n}", Dialect::Jsonc).unwrap();
        assert!(!out.comments.is_empty());
    }

    #[test]
    fn jsonc_trailing_comma_without_comma_support_is_invalid_for_dialect() {
        let caps = Capabilities {
            trailing_commas: false,
            ..Capabilities::for_dialect(Dialect::Jsonc)
        };
        let err = parse_program(r#"{"a": 1,}"#, Dialect::Jsonc, caps).unwrap_err();
        assert!(matches!(err, ParseError::InvalidForDialect { feature: "trailing comma", .. }));
    }

    #[test]
    fn json5_allows_single_quotes_and_unquoted_keys() {
        let out = parse("{ unquoted: 'value', trailing: 1, }", Dialect::Json5).unwrap();
        let root = out.arena.get(out.root);
        assert!(matches!(root.kind, NodeKind::Program { .. }));
    }

    #[test]
    fn json5_rejects_single_quotes_is_invalid_for_json() {
        let err = parse("'hi'", Dialect::Json).unwrap_err();
        assert!(matches!(err, ParseError::InvalidForDialect { feature: "single-quoted string", .. }));
    }

    #[test]
    fn unrestricted_parses_binary_expression() {
        let out = parse("1 + 2 * 3", Dialect::Unrestricted).unwrap();
        let statement_id = match out.arena.get(out.root).kind {
            NodeKind::Program { body } => body,
            _ => unreachable!(),
        };
        let expr_id = match out.arena.get(statement_id).kind {
            NodeKind::ExpressionStatement { expression } => expression,
            _ => unreachable!(),
        };
        assert!(matches!(
            out.arena.get(expr_id).kind,
            NodeKind::BinaryExpression { operator: BinaryOperator::Add, .. }
        ));
    }

    #[test]
    fn unrestricted_parses_regex_literal() {
        let out = parse("/abc/gi", Dialect::Unrestricted).unwrap();
        let statement_id = match out.arena.get(out.root).kind {
            NodeKind::Program { body } => body,
            _ => unreachable!(),
        };
        let expr_id = match out.arena.get(statement_id).kind {
            NodeKind::ExpressionStatement { expression } => expression,
            _ => unreachable!(),
        };
        match &out.arena.get(expr_id).kind {
            NodeKind::RegExpLiteral { pattern, flags } => {
                assert_eq!(pattern, "abc");
                assert_eq!(flags, "gi");
            }
            other => panic!("expected RegExpLiteral, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_string_is_reported() {
        let err = parse("\"unterminated", Dialect::Json5).unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedString { .. }));
    }

    #[test]
    fn sparse_array_requires_capability() {
        let err = parse("[1,,2]", Dialect::Json5).unwrap_err();
        assert!(matches!(err, ParseError::InvalidForDialect { feature: "sparse array element", .. }));
        let out = parse("[1,,2]", Dialect::Unrestricted).unwrap();
        let statement_id = match out.arena.get(out.root).kind {
            NodeKind::Program { body } => body,
            _ => unreachable!(),
        };
        let expr_id = match out.arena.get(statement_id).kind {
            NodeKind::ExpressionStatement { expression } => expression,
            _ => unreachable!(),
        };
        match &out.arena.get(expr_id).kind {
            NodeKind::ArrayExpression { elements } => {
                assert_eq!(elements.len(), 3);
                assert!(elements[1].is_none());
            }
            other => panic!("expected ArrayExpression, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_reported() {
        assert!(matches!(parse("   ", Dialect::Json).unwrap_err(), ParseError::EmptyInput));
    }

    #[test]
    fn nested_sign_produces_nested_unary_expression() {
        let out = parse("- -2", Dialect::Unrestricted).unwrap();
        let statement_id = match out.arena.get(out.root).kind {
            NodeKind::Program { body } => body,
            _ => unreachable!(),
        };
        let expr_id = match out.arena.get(statement_id).kind {
            NodeKind::ExpressionStatement { expression } => expression,
            _ => unreachable!(),
        };
        let NodeKind::UnaryExpression { operator: UnaryOperator::Minus, argument } =
            out.arena.get(expr_id).kind
        else {
            panic!("expected outer UnaryExpression");
        };
        assert!(matches!(
            out.arena.get(argument).kind,
            NodeKind::UnaryExpression { operator: UnaryOperator::Minus, .. }
        ));
    }

    #[test]
    fn sign_directly_before_bigint_literal_is_rejected() {
        let err = parse("-123n", Dialect::Unrestricted).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { found, .. } if found == "n"));
        let err = parse("+123n", Dialect::Unrestricted).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { found, .. } if found == "n"));
    }

    #[test]
    fn template_literal_parses_under_unrestricted_and_is_rejected_under_json5() {
        let out = parse("`hello`", Dialect::Unrestricted).unwrap();
        let statement_id = match out.arena.get(out.root).kind {
            NodeKind::Program { body } => body,
            _ => unreachable!(),
        };
        let expr_id = match out.arena.get(statement_id).kind {
            NodeKind::ExpressionStatement { expression } => expression,
            _ => unreachable!(),
        };
        let NodeKind::TemplateLiteral { quasi } = out.arena.get(expr_id).kind else {
            panic!("expected TemplateLiteral");
        };
        match &out.arena.get(quasi).kind {
            NodeKind::TemplateElement { tail, cooked, .. } => {
                assert!(*tail);
                assert_eq!(cooked, "hello");
            }
            other => panic!("expected TemplateElement, got {other:?}"),
        }

        let err = parse("`hello`", Dialect::Json5).unwrap_err();
        assert!(matches!(err, ParseError::InvalidForDialect { feature: "template literal", .. }));
    }

    #[test]
    fn object_with_array_ast_shape() {
        let out = parse(r#"{"a": 1, "b": [true, null]}"#, Dialect::Json).unwrap();
        let shape: Vec<&'static str> =
            out.arena.iter().map(|(_, node)| node.kind.kind_name()).collect();
        insta::assert_debug_snapshot!(shape, @r#"
        [
            "StringLiteral",
            "NumberLiteral",
            "Property",
            "StringLiteral",
            "KeywordLiteral",
            "KeywordLiteral",
            "ArrayExpression",
            "Property",
            "ObjectExpression",
            "ExpressionStatement",
            "Program",
        ]
        "#);
    }
}
