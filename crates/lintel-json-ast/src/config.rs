//! Dialect configuration for embedders: a raw config struct that resolves a
//! dialect tag plus a set of per-bit overrides into a concrete
//! [`Capabilities`] preset, the same two-stage shape used for loading
//! formatter options (raw config struct, then an `apply_to` pass over a
//! resolved base).

use serde::Deserialize;

use crate::dialect::{Capabilities, Dialect};

/// Per-field overrides layered on top of a dialect's preset `Capabilities`.
/// Every field defaults to "no opinion" (`None`) so a config file only needs
/// to mention the bits it wants to flip.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CapabilityOverrides {
    pub trailing_commas: Option<bool>,
    pub comments: Option<bool>,
    pub plus_signs: Option<bool>,
    pub spaced_signs: Option<bool>,
    pub leading_or_trailing_decimal_points: Option<bool>,
    pub infinities: Option<bool>,
    pub nans: Option<bool>,
    pub invalid_json_numbers: Option<bool>,
    pub multiline_strings: Option<bool>,
    pub unquote_properties: Option<bool>,
    pub single_quotes: Option<bool>,
    pub number_properties: Option<bool>,
    pub undefined_keywords: Option<bool>,
    pub sparse_arrays: Option<bool>,
    pub reg_exp_literals: Option<bool>,
    pub template_literals: Option<bool>,
    pub bigint_literals: Option<bool>,
}

impl CapabilityOverrides {
    /// Apply every set override on top of `base`, leaving unset fields alone.
    pub fn apply_to(&self, base: Capabilities) -> Capabilities {
        Capabilities {
            trailing_commas: self.trailing_commas.unwrap_or(base.trailing_commas),
            comments: self.comments.unwrap_or(base.comments),
            plus_signs: self.plus_signs.unwrap_or(base.plus_signs),
            spaced_signs: self.spaced_signs.unwrap_or(base.spaced_signs),
            leading_or_trailing_decimal_points: self
                .leading_or_trailing_decimal_points
                .unwrap_or(base.leading_or_trailing_decimal_points),
            infinities: self.infinities.unwrap_or(base.infinities),
            nans: self.nans.unwrap_or(base.nans),
            invalid_json_numbers: self.invalid_json_numbers.unwrap_or(base.invalid_json_numbers),
            multiline_strings: self.multiline_strings.unwrap_or(base.multiline_strings),
            unquote_properties: self.unquote_properties.unwrap_or(base.unquote_properties),
            single_quotes: self.single_quotes.unwrap_or(base.single_quotes),
            number_properties: self.number_properties.unwrap_or(base.number_properties),
            undefined_keywords: self.undefined_keywords.unwrap_or(base.undefined_keywords),
            sparse_arrays: self.sparse_arrays.unwrap_or(base.sparse_arrays),
            reg_exp_literals: self.reg_exp_literals.unwrap_or(base.reg_exp_literals),
            template_literals: self.template_literals.unwrap_or(base.template_literals),
            bigint_literals: self.bigint_literals.unwrap_or(base.bigint_literals),
        }
    }
}

/// An embedder-supplied dialect selection, deserializable straight out of
/// their own config file (TOML, JSON, whatever `serde` format they use).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DialectConfig {
    /// `"json"` / `"jsonc"` / `"json5"` / absent (unrestricted).
    pub dialect: Option<String>,
    pub overrides: Option<CapabilityOverrides>,
}

impl DialectConfig {
    /// Resolve the dialect tag to its preset, then layer any overrides on top.
    pub fn resolve(&self) -> (Dialect, Capabilities) {
        let dialect = Dialect::from_tag(self.dialect.as_deref());
        let base = Capabilities::for_dialect(dialect);
        let caps = match &self.overrides {
            Some(overrides) => overrides.apply_to(base),
            None => base,
        };
        (dialect, caps)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn no_overrides_resolves_to_plain_preset() {
        let config = DialectConfig {
            dialect: Some("jsonc".to_string()),
            overrides: None,
        };
        let (dialect, caps) = config.resolve();
        assert_eq!(dialect, Dialect::Jsonc);
        assert!(caps.comments);
        assert!(!caps.single_quotes);
    }

    #[test]
    fn overrides_flip_individual_bits() {
        let config = DialectConfig {
            dialect: Some("json".to_string()),
            overrides: Some(CapabilityOverrides {
                comments: Some(true),
                ..Default::default()
            }),
        };
        let (dialect, caps) = config.resolve();
        assert_eq!(dialect, Dialect::Json);
        assert!(caps.comments);
        assert!(!caps.trailing_commas);
    }

    #[test]
    fn missing_dialect_tag_is_unrestricted() {
        let config = DialectConfig::default();
        let (dialect, caps) = config.resolve();
        assert_eq!(dialect, Dialect::Unrestricted);
        assert!(caps.template_literals);
    }

    #[test]
    fn deserializes_from_toml_like_source() {
        let toml_src = r#"
            dialect = "json5"
            [overrides]
            single_quotes = false
        "#;
        let config: DialectConfig = toml::from_str(toml_src).unwrap();
        let (dialect, caps) = config.resolve();
        assert_eq!(dialect, Dialect::Json5);
        assert!(!caps.single_quotes);
        assert!(caps.plus_signs);
    }
}
