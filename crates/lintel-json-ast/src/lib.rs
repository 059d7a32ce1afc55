//! Dialect-aware JSON/JSONC/JSON5/unrestricted-superset parser producing a
//! lossless AST, plus a static evaluator.
//!
//! ```
//! use lintel_json_ast::{parse, Dialect};
//!
//! let ast = parse(r#"{"a": 1, "b": [true, null]}"#, Dialect::Json).unwrap();
//! assert!(ast.comments().is_empty());
//! ```

pub mod ast;
pub mod config;
pub mod dialect;
pub mod error;
pub mod eval;
mod lexer;
pub mod parser;
pub mod span;
pub mod token;

use std::collections::HashMap;

pub use ast::{Arena, NodeId, NodeKind};
pub use config::{CapabilityOverrides, DialectConfig};
pub use dialect::{Capabilities, Dialect};
pub use error::{EvalError, ParseError};
pub use eval::{get_static_value, JsonRegex, Value};
pub use token::{Comment, CommentKind, Token, TokenKind, TokenStore};

/// A parsed program: its node arena, its root [`NodeId`], the ordered token
/// stream, and every comment encountered — all owned together so a consumer
/// never has to juggle separate lifetimes for tree, tokens, and trivia.
#[derive(Debug)]
pub struct Ast {
    arena: Arena,
    root: NodeId,
    tokens: TokenStore,
    comments: Vec<Comment>,
}

impl Ast {
    /// The arena backing every node this AST refers to.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// The root `Program` node.
    pub fn program(&self) -> NodeId {
        self.root
    }

    /// The single top-level expression the `Program`'s `ExpressionStatement` wraps.
    pub fn root_expression(&self) -> NodeId {
        match &self.arena.get(self.root).kind {
            NodeKind::Program { body } => match &self.arena.get(*body).kind {
                NodeKind::ExpressionStatement { expression } => *expression,
                other => unreachable!("Program.body was {other:?}, not ExpressionStatement"),
            },
            other => unreachable!("Ast::root was {other:?}, not Program"),
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }
}

/// Parse `source` under the capability preset for `dialect`.
#[tracing::instrument(skip_all, fields(dialect = ?dialect))]
pub fn parse(source: &str, dialect: Dialect) -> Result<Ast, ParseError> {
    let caps = Capabilities::for_dialect(dialect);
    let output = parser::parse_program(source, dialect, caps)?;
    Ok(Ast {
        arena: output.arena,
        root: output.root,
        tokens: output.tokens,
        comments: output.comments,
    })
}

/// Resolve `tag` via [`Dialect::from_tag`] and parse under its preset.
pub fn parse_with_tag(source: &str, tag: Option<&str>) -> Result<Ast, ParseError> {
    parse(source, Dialect::from_tag(tag))
}

/// Parse `source` under a [`DialectConfig`] (a tag plus optional per-bit
/// overrides), as loaded from an embedder's own configuration file.
pub fn parse_with_config(source: &str, config: &DialectConfig) -> Result<Ast, ParseError> {
    let (dialect, caps) = config.resolve();
    let output = parser::parse_program(source, dialect, caps)?;
    Ok(Ast {
        arena: output.arena,
        root: output.root,
        tokens: output.tokens,
        comments: output.comments,
    })
}

/// Map from every non-leaf node-kind name to its ordered child-bearing field
/// names, for tree walkers that don't want to hardcode the node universe.
pub fn visitor_keys() -> &'static HashMap<&'static str, &'static [&'static str]> {
    ast::visitor_keys()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_json_rejects_comments() {
        let err = parse("{} // trailing", Dialect::Json).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedComment { .. }));
    }

    #[test]
    fn parse_jsonc_accepts_comments_and_trailing_commas() {
        let ast = parse("{\n  \"a\": 1, // comment\n}", Dialect::Jsonc).unwrap();
        assert_eq!(ast.comments().len(), 1);
    }

    #[test]
    fn parse_with_tag_defaults_to_unrestricted() {
        let ast = parse_with_tag("1 + 1", None).unwrap();
        let value = get_static_value(ast.arena(), ast.root_expression()).unwrap();
        assert_eq!(value, Value::Number(2.0));
    }

    #[test]
    fn parse_with_config_applies_overrides() {
        let config = DialectConfig {
            dialect: Some("json".to_string()),
            overrides: Some(CapabilityOverrides {
                comments: Some(true),
                ..Default::default()
            }),
        };
        let ast = parse_with_config("{} // ok now", &config).unwrap();
        assert_eq!(ast.comments().len(), 1);
    }

    #[test]
    fn visitor_keys_cover_object_expression() {
        let keys = visitor_keys();
        assert_eq!(keys.get("ObjectExpression"), Some(&&["properties"][..]));
    }

    #[test]
    fn token_store_exposes_every_token_in_order() {
        let ast = parse(r#"{"a": 1}"#, Dialect::Json).unwrap();
        let texts: Vec<&str> = ast.tokens().tokens().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["{", "\"a\"", ":", "1", "}"]);
    }
}
