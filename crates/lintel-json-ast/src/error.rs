//! Error taxonomy for the lexer/parser and the static evaluator.

use miette::Diagnostic;
use thiserror::Error;

use crate::span::{Position, Span};

/// A parse-time error with an exact source location.
#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    #[error("unexpected end of input")]
    #[diagnostic(code(lintel_json_ast::empty_input))]
    EmptyInput,

    #[error("unexpected token {found:?}")]
    #[diagnostic(code(lintel_json_ast::unexpected_token))]
    UnexpectedToken {
        found: String,
        #[label("here")]
        span: Span,
        loc: Position,
    },

    #[error("comments are not allowed in this dialect")]
    #[diagnostic(code(lintel_json_ast::unexpected_comment))]
    UnexpectedComment {
        #[label("here")]
        span: Span,
        loc: Position,
    },

    #[error("unexpected extra input after the top-level value")]
    #[diagnostic(code(lintel_json_ast::unexpected_extra_argument))]
    UnexpectedExtraArgument {
        #[label("here")]
        span: Span,
        loc: Position,
    },

    #[error("{feature} is not allowed in this dialect")]
    #[diagnostic(code(lintel_json_ast::invalid_for_dialect))]
    InvalidForDialect {
        feature: &'static str,
        #[label("here")]
        span: Span,
        loc: Position,
    },

    #[error("unterminated string literal")]
    #[diagnostic(code(lintel_json_ast::unterminated_string))]
    UnterminatedString {
        #[label("here")]
        span: Span,
        loc: Position,
    },

    #[error("invalid number literal {text:?}")]
    #[diagnostic(code(lintel_json_ast::invalid_number))]
    InvalidNumber {
        text: String,
        #[label("here")]
        span: Span,
        loc: Position,
    },

    #[error("invalid escape sequence {text:?}")]
    #[diagnostic(code(lintel_json_ast::invalid_escape))]
    InvalidEscape {
        text: String,
        #[label("here")]
        span: Span,
        loc: Position,
    },
}

impl ParseError {
    /// The byte offset the error is anchored at, matching the external
    /// contract's `index` field.
    pub fn index(&self) -> usize {
        self.span_and_loc().0.start
    }

    /// 1-indexed `(line, column)`, matching the external contract's
    /// `lineNumber`/`column` fields.
    pub fn line_col(&self) -> (u32, u32) {
        let (_, loc) = self.span_and_loc();
        (loc.line, loc.column)
    }

    fn span_and_loc(&self) -> (Span, Position) {
        match self {
            ParseError::EmptyInput => (Span::new(0, 0), Position::new(1, 0)),
            ParseError::UnexpectedToken { span, loc, .. }
            | ParseError::UnexpectedComment { span, loc, .. }
            | ParseError::UnexpectedExtraArgument { span, loc, .. }
            | ParseError::InvalidForDialect { span, loc, .. }
            | ParseError::UnterminatedString { span, loc, .. }
            | ParseError::InvalidNumber { span, loc, .. }
            | ParseError::InvalidEscape { span, loc, .. } => (*span, *loc),
        }
    }
}

/// An evaluation-time error raised by [`crate::eval::get_static_value`].
#[derive(Debug, Error, Diagnostic)]
pub enum EvalError {
    #[error("illegal argument: {reason}")]
    #[diagnostic(code(lintel_json_ast::illegal_argument))]
    IllegalArgument { reason: String },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_indexes_at_zero() {
        let err = ParseError::EmptyInput;
        assert_eq!(err.index(), 0);
        assert_eq!(err.line_col(), (1, 0));
    }

    #[test]
    fn unexpected_token_reports_its_span() {
        let err = ParseError::UnexpectedToken {
            found: ",".to_string(),
            span: Span::new(7, 8),
            loc: Position::new(1, 7),
        };
        assert_eq!(err.index(), 7);
        assert_eq!(err.line_col(), (1, 7));
    }
}
