//! Static evaluation of a parsed AST into a runtime [`Value`].
//!
//! Mirrors `lintel-validate`'s dialect parsers in spirit (dispatch on node
//! kind, fail closed on anything not constructible) but works directly off
//! the arena instead of re-parsing through `serde_json`/`jsonc_parser`.

use indexmap::IndexMap;
use num_bigint::BigInt;

use crate::ast::{Arena, BinaryOperator, IdentifierName, KeywordValue, NodeId, NodeKind, NumberIdentKind, UnaryOperator};
use crate::error::EvalError;

/// A regex literal that evaluated successfully as *constructible* (its
/// pattern parses under `regex-syntax`'s ECMA-like grammar) but whose actual
/// match semantics this crate never executes.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRegex {
    pub pattern: String,
    pub flags: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    Bool(bool),
    Null,
    Undefined,
    /// `None` entries are elisions, carried through from the AST's sparse
    /// array representation.
    Array(Vec<Option<Value>>),
    /// Insertion-ordered, duplicate keys resolved last-write-wins.
    Object(IndexMap<String, Value>),
    Regex(JsonRegex),
    BigInt(BigInt),
}

/// Evaluate the expression rooted at `node` into a runtime [`Value`].
///
/// Hand-built trees that never went through [`crate::parser`] are evaluated
/// exactly like parser output: this function makes no dialect check of its
/// own, it only demands that every node be one of the constructible kinds.
#[tracing::instrument(skip(arena))]
pub fn get_static_value(arena: &Arena, node: NodeId) -> Result<Value, EvalError> {
    match &arena.get(node).kind {
        NodeKind::StringLiteral { value, .. } => Ok(Value::String(value.clone())),
        NodeKind::NumberLiteral { value } => Ok(Value::Number(*value)),
        NodeKind::KeywordLiteral { value } => Ok(match value {
            KeywordValue::True => Value::Bool(true),
            KeywordValue::False => Value::Bool(false),
            KeywordValue::Null => Value::Null,
        }),
        NodeKind::Identifier { name, is_expression: true } => match name {
            IdentifierName::Number(NumberIdentKind::Infinity) => Ok(Value::Number(f64::INFINITY)),
            IdentifierName::Number(NumberIdentKind::Nan) => Ok(Value::Number(f64::NAN)),
            IdentifierName::Undefined => Ok(Value::Undefined),
            IdentifierName::Keyword(_) | IdentifierName::Plain(_) => Err(EvalError::IllegalArgument {
                reason: "identifier is not a value-producing expression".to_string(),
            }),
        },
        NodeKind::Identifier { is_expression: false, .. } => Err(EvalError::IllegalArgument {
            reason: "a property-key identifier has no standalone value".to_string(),
        }),
        NodeKind::RegExpLiteral { pattern, flags } => Ok(eval_regex(pattern, flags)),
        NodeKind::BigIntLiteral { text } => Ok(eval_bigint(text, false)),
        NodeKind::UnaryExpression { operator, argument } => eval_unary(arena, *operator, *argument),
        NodeKind::BinaryExpression { operator, left, right } => eval_binary(arena, *operator, *left, *right),
        NodeKind::ObjectExpression { properties } => eval_object(arena, properties),
        NodeKind::ArrayExpression { elements } => eval_array(arena, elements),
        NodeKind::TemplateLiteral { quasi } => match &arena.get(*quasi).kind {
            NodeKind::TemplateElement { cooked, .. } => Ok(Value::String(cooked.clone())),
            other => Err(EvalError::IllegalArgument {
                reason: format!("template literal quasi was {:?}, not TemplateElement", other),
            }),
        },
        other @ (NodeKind::Program { .. }
        | NodeKind::ExpressionStatement { .. }
        | NodeKind::Property { .. }
        | NodeKind::TemplateElement { .. }) => Err(EvalError::IllegalArgument {
            reason: format!("{} is not an evaluable expression", other.kind_name()),
        }),
    }
}

fn eval_regex(pattern: &str, flags: &str) -> Value {
    const SUPPORTED_FLAGS: &str = "gimsuy";
    let flags_supported = flags.chars().all(|f| SUPPORTED_FLAGS.contains(f));
    if flags_supported && regex_syntax::Parser::new().parse(pattern).is_ok() {
        Value::Regex(JsonRegex {
            pattern: pattern.to_string(),
            flags: flags.to_string(),
        })
    } else {
        tracing::warn!(pattern, flags, "regex literal not constructible, falling back to string");
        Value::String(format!("/{pattern}/{flags}"))
    }
}

fn eval_bigint(text: &str, negative: bool) -> Value {
    let digits = text.trim_start_matches("0x").trim_start_matches("0X");
    let radix = if text.len() != digits.len() { 16 } else { 10 };
    match BigInt::parse_bytes(digits.as_bytes(), radix) {
        Some(mut n) => {
            if negative {
                n = -n;
            }
            Value::BigInt(n)
        }
        None => {
            tracing::warn!(text, "bigint literal not constructible, falling back to string");
            Value::String(if negative { format!("-{text}") } else { text.to_string() })
        }
    }
}

fn eval_unary(arena: &Arena, operator: UnaryOperator, argument: NodeId) -> Result<Value, EvalError> {
    if let NodeKind::BigIntLiteral { text } = &arena.get(argument).kind {
        return Ok(eval_bigint(text, operator == UnaryOperator::Minus));
    }
    let value = get_static_value(arena, argument)?;
    match (operator, value) {
        (UnaryOperator::Plus, Value::Number(n)) => Ok(Value::Number(n)),
        (UnaryOperator::Minus, Value::Number(n)) => Ok(Value::Number(-n)),
        (_, other) => Err(EvalError::IllegalArgument {
            reason: format!("unary operator applied to non-numeric value {other:?}"),
        }),
    }
}

fn eval_binary(
    arena: &Arena,
    operator: BinaryOperator,
    left: NodeId,
    right: NodeId,
) -> Result<Value, EvalError> {
    let (Value::Number(l), Value::Number(r)) = (get_static_value(arena, left)?, get_static_value(arena, right)?)
    else {
        return Err(EvalError::IllegalArgument {
            reason: "binary expression operands must both be numbers".to_string(),
        });
    };
    let result = match operator {
        BinaryOperator::Add => l + r,
        BinaryOperator::Sub => l - r,
        BinaryOperator::Mul => l * r,
        BinaryOperator::Div => l / r,
        BinaryOperator::Mod => l % r,
        BinaryOperator::Pow => l.powf(r),
    };
    Ok(Value::Number(result))
}

fn eval_object(arena: &Arena, properties: &[NodeId]) -> Result<Value, EvalError> {
    let mut object = IndexMap::new();
    for &property_id in properties {
        let NodeKind::Property { key, value } = &arena.get(property_id).kind else {
            return Err(EvalError::IllegalArgument {
                reason: "object expression child was not a Property".to_string(),
            });
        };
        let key_text = match &arena.get(*key).kind {
            NodeKind::StringLiteral { value, .. } => value.clone(),
            NodeKind::NumberLiteral { value } => format_number_key(*value),
            NodeKind::Identifier { name, .. } => identifier_key_text(name),
            other => {
                return Err(EvalError::IllegalArgument {
                    reason: format!("property key was {}, not a recognized key node", other.kind_name()),
                })
            }
        };
        // last-write-wins, matching plain-object assignment semantics
        object.insert(key_text, get_static_value(arena, *value)?);
    }
    Ok(Value::Object(object))
}

fn identifier_key_text(name: &IdentifierName) -> String {
    match name {
        IdentifierName::Plain(s) => s.clone(),
        IdentifierName::Undefined => "undefined".to_string(),
        IdentifierName::Keyword(KeywordValue::True) => "true".to_string(),
        IdentifierName::Keyword(KeywordValue::False) => "false".to_string(),
        IdentifierName::Keyword(KeywordValue::Null) => "null".to_string(),
        IdentifierName::Number(NumberIdentKind::Infinity) => "Infinity".to_string(),
        IdentifierName::Number(NumberIdentKind::Nan) => "NaN".to_string(),
    }
}

fn format_number_key(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn eval_array(arena: &Arena, elements: &[Option<NodeId>]) -> Result<Value, EvalError> {
    let mut values = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            Some(id) => values.push(Some(get_static_value(arena, *id)?)),
            None => values.push(None),
        }
    }
    Ok(Value::Array(values))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::dialect::{Capabilities, Dialect};
    use crate::parser::parse_program;

    fn eval_source(source: &str, dialect: Dialect) -> Value {
        let out = parse_program(source, dialect, Capabilities::for_dialect(dialect)).unwrap();
        let NodeKind::Program { body } = out.arena.get(out.root).kind else {
            unreachable!()
        };
        let NodeKind::ExpressionStatement { expression } = out.arena.get(body).kind else {
            unreachable!()
        };
        get_static_value(&out.arena, expression).unwrap()
    }

    #[test]
    fn evaluates_object_with_last_write_wins() {
        let value = eval_source(r#"{"a": 1, "a": 2}"#, Dialect::Json);
        let Value::Object(map) = value else { panic!("expected object") };
        assert_eq!(map.get("a"), Some(&Value::Number(2.0)));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn evaluates_sparse_array_with_holes() {
        let value = eval_source("[1,,2]", Dialect::Unrestricted);
        let Value::Array(items) = value else { panic!("expected array") };
        assert_eq!(items, vec![Some(Value::Number(1.0)), None, Some(Value::Number(2.0))]);
    }

    #[test]
    fn evaluates_unary_minus_on_number() {
        let value = eval_source("-5", Dialect::Json5);
        assert_eq!(value, Value::Number(-5.0));
    }

    #[test]
    fn evaluates_binary_arithmetic_with_precedence() {
        let value = eval_source("1 + 2 * 3", Dialect::Unrestricted);
        assert_eq!(value, Value::Number(7.0));
    }

    #[test]
    fn unconstructible_regex_falls_back_to_string() {
        let value = eval_source("/(/gi", Dialect::Unrestricted);
        assert_eq!(value, Value::String("/(/gi".to_string()));
    }

    #[test]
    fn valid_regex_evaluates_to_regex_value() {
        let value = eval_source("/abc/gi", Dialect::Unrestricted);
        assert_eq!(
            value,
            Value::Regex(JsonRegex {
                pattern: "abc".to_string(),
                flags: "gi".to_string()
            })
        );
    }

    #[test]
    fn bigint_literal_evaluates() {
        let value = eval_source("123n", Dialect::Unrestricted);
        assert_eq!(value, Value::BigInt(BigInt::from(123)));
    }

    #[test]
    fn evaluates_template_literal_to_its_cooked_string() {
        let value = eval_source("`hello`", Dialect::Unrestricted);
        assert_eq!(value, Value::String("hello".to_string()));
    }

    #[test]
    fn unconstructible_bigint_literal_falls_back_to_string() {
        let value = eval_bigint("not_digits", false);
        assert_eq!(value, Value::String("not_digits".to_string()));
        let value = eval_bigint("not_digits", true);
        assert_eq!(value, Value::String("-not_digits".to_string()));
    }
}
