//! Dialect presets and the capability record they resolve to.

/// A named JSON-family dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    Json,
    Jsonc,
    Json5,
    /// Unrestricted superset (binary expressions, template literals, etc).
    /// Used when no tag is given, matching the original parser's "no
    /// `jsonSyntax` option" behavior.
    #[default]
    Unrestricted,
}

impl Dialect {
    /// Resolve a case-insensitive dialect tag. `None` or an unrecognized tag
    /// yields [`Dialect::Unrestricted`].
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(str::to_ascii_lowercase).as_deref() {
            Some("json") => Dialect::Json,
            Some("jsonc") => Dialect::Jsonc,
            Some("json5") => Dialect::Json5,
            _ => Dialect::Unrestricted,
        }
    }
}

/// The 16-bit capability record gating every dialect-sensitive parse rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub trailing_commas: bool,
    pub comments: bool,
    pub plus_signs: bool,
    pub spaced_signs: bool,
    pub leading_or_trailing_decimal_points: bool,
    pub infinities: bool,
    pub nans: bool,
    pub invalid_json_numbers: bool,
    pub multiline_strings: bool,
    pub unquote_properties: bool,
    pub single_quotes: bool,
    pub number_properties: bool,
    pub undefined_keywords: bool,
    pub sparse_arrays: bool,
    pub reg_exp_literals: bool,
    pub template_literals: bool,
    pub bigint_literals: bool,
}

impl Capabilities {
    const ALL_FALSE: Capabilities = Capabilities {
        trailing_commas: false,
        comments: false,
        plus_signs: false,
        spaced_signs: false,
        leading_or_trailing_decimal_points: false,
        infinities: false,
        nans: false,
        invalid_json_numbers: false,
        multiline_strings: false,
        unquote_properties: false,
        single_quotes: false,
        number_properties: false,
        undefined_keywords: false,
        sparse_arrays: false,
        reg_exp_literals: false,
        template_literals: false,
        bigint_literals: false,
    };

    const ALL_TRUE: Capabilities = Capabilities {
        trailing_commas: true,
        comments: true,
        plus_signs: true,
        spaced_signs: true,
        leading_or_trailing_decimal_points: true,
        infinities: true,
        nans: true,
        invalid_json_numbers: true,
        multiline_strings: true,
        unquote_properties: true,
        single_quotes: true,
        number_properties: true,
        undefined_keywords: true,
        sparse_arrays: true,
        reg_exp_literals: true,
        template_literals: true,
        bigint_literals: true,
    };

    /// The JSON5 preset: the first eleven fields true, the rest false.
    const JSON5: Capabilities = Capabilities {
        trailing_commas: true,
        comments: true,
        plus_signs: true,
        spaced_signs: true,
        leading_or_trailing_decimal_points: true,
        infinities: true,
        nans: true,
        invalid_json_numbers: true,
        multiline_strings: true,
        unquote_properties: true,
        single_quotes: true,
        number_properties: false,
        undefined_keywords: false,
        sparse_arrays: false,
        reg_exp_literals: false,
        template_literals: false,
        bigint_literals: false,
    };

    /// Resolve the fixed preset for a dialect.
    pub const fn for_dialect(dialect: Dialect) -> Capabilities {
        match dialect {
            Dialect::Json => Capabilities::ALL_FALSE,
            Dialect::Jsonc => Capabilities {
                trailing_commas: true,
                comments: true,
                ..Capabilities::ALL_FALSE
            },
            Dialect::Json5 => Capabilities::JSON5,
            Dialect::Unrestricted => Capabilities::ALL_TRUE,
        }
    }

    pub const fn unrestricted() -> Capabilities {
        Capabilities::ALL_TRUE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn from_tag_is_case_insensitive() {
        assert_eq!(Dialect::from_tag(Some("JSON")), Dialect::Json);
        assert_eq!(Dialect::from_tag(Some("JsonC")), Dialect::Jsonc);
        assert_eq!(Dialect::from_tag(Some("json5")), Dialect::Json5);
    }

    #[test]
    fn unknown_or_missing_tag_is_unrestricted() {
        assert_eq!(Dialect::from_tag(None), Dialect::Unrestricted);
        assert_eq!(Dialect::from_tag(Some("yaml")), Dialect::Unrestricted);
    }

    #[test]
    fn json_preset_is_all_false() {
        let caps = Capabilities::for_dialect(Dialect::Json);
        assert!(!caps.trailing_commas);
        assert!(!caps.comments);
        assert!(!caps.template_literals);
    }

    #[test]
    fn jsonc_preset_only_comments_and_trailing_commas() {
        let caps = Capabilities::for_dialect(Dialect::Jsonc);
        assert!(caps.trailing_commas);
        assert!(caps.comments);
        assert!(!caps.single_quotes);
        assert!(!caps.template_literals);
    }

    #[test]
    fn json5_preset_first_eleven_true() {
        let caps = Capabilities::for_dialect(Dialect::Json5);
        assert!(caps.single_quotes);
        assert!(caps.plus_signs);
        assert!(!caps.number_properties);
        assert!(!caps.template_literals);
        assert!(!caps.bigint_literals);
    }

    #[test]
    fn unrestricted_preset_is_all_true() {
        let caps = Capabilities::for_dialect(Dialect::Unrestricted);
        assert!(caps.template_literals);
        assert!(caps.bigint_literals);
        assert!(caps.reg_exp_literals);
    }
}
