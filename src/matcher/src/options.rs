//! Matcher configuration resolved from a resource definition
//!
//! Options arrive as a string-keyed map on the resource definition and are
//! resolved once at compile time. The token-delimiter sanity check also runs
//! once here; it is never re-checked per match.

use std::collections::HashMap;

use tracing::warn;

use crate::error::{MatcherError, Result};

/// Compare values ignoring case
pub const OPTION_IGNORE_CASE: &str = "ignoreCase";
/// Switch to case-sensitive comparison when the value starts with a quote character
pub const OPTION_QUOTED_CASE_SENSITIVE: &str = "quotedCaseSensitive";
/// Characters recognized as quotes by [`OPTION_QUOTED_CASE_SENSITIVE`]
pub const OPTION_QUOTE_CHARS: &str = "quoteChars";
/// Honor `*`/`?` wildcards in pattern values
pub const OPTION_WILD_CARD_ENABLED: &str = "wildCardEnabled";
/// Substitute `{token}` placeholders from the evaluation context
pub const OPTION_REPLACE_TOKENS: &str = "replaceTokens";
/// Character opening a token placeholder
pub const OPTION_TOKEN_DELIMITER_START: &str = "tokenDelimiterStart";
/// Character closing a token placeholder
pub const OPTION_TOKEN_DELIMITER_END: &str = "tokenDelimiterEnd";
/// Character escaping the next character inside a pattern
pub const OPTION_TOKEN_DELIMITER_ESCAPE: &str = "tokenDelimiterEscape";
/// Prefix a token name must carry to be eligible for substitution
pub const OPTION_TOKEN_DELIMITER_PREFIX: &str = "tokenDelimiterPrefix";

/// Matcher configuration for one resource definition
///
/// Resolved from the definition's options map with [`MatcherOptions::from_map`];
/// absent keys take the defaults below, unknown keys are ignored.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use warden_matcher::MatcherOptions;
///
/// let mut map = HashMap::new();
/// map.insert("ignoreCase".to_string(), "false".to_string());
///
/// let options = MatcherOptions::from_map(&map).unwrap();
/// assert!(!options.ignore_case);
/// assert!(options.wild_card_enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatcherOptions {
    /// Compare resource values ignoring case (default: true)
    pub ignore_case: bool,
    /// Quoted resource values force case-sensitive comparison (default: false)
    pub quoted_case_sensitive: bool,
    /// Quote characters recognized when `quoted_case_sensitive` is set (default: `"`)
    pub quote_chars: String,
    /// Honor wildcards in pattern values (default: true)
    pub wild_card_enabled: bool,
    /// Substitute token placeholders at match time (default: true)
    pub replace_tokens: bool,
    /// Token start delimiter (default: `{`)
    pub token_delimiter_start: char,
    /// Token end delimiter (default: `}`)
    pub token_delimiter_end: char,
    /// Escape character (default: `\`)
    pub token_delimiter_escape: char,
    /// Required token-name prefix (default: empty)
    pub token_delimiter_prefix: String,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            ignore_case: true,
            quoted_case_sensitive: false,
            quote_chars: "\"".to_string(),
            wild_card_enabled: true,
            replace_tokens: true,
            token_delimiter_start: '{',
            token_delimiter_end: '}',
            token_delimiter_escape: '\\',
            token_delimiter_prefix: String::new(),
        }
    }
}

impl MatcherOptions {
    /// Resolve options from a resource definition's options map
    ///
    /// # Arguments
    ///
    /// * `map` - The string-keyed options map as stored on the resource definition
    ///
    /// # Returns
    ///
    /// The resolved options, or [`MatcherError::InvalidOption`] when a present
    /// value cannot be parsed (booleans must be `true`/`false`, delimiters a
    /// single character).
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            ignore_case: bool_option(map, OPTION_IGNORE_CASE, defaults.ignore_case)?,
            quoted_case_sensitive: bool_option(
                map,
                OPTION_QUOTED_CASE_SENSITIVE,
                defaults.quoted_case_sensitive,
            )?,
            quote_chars: string_option(map, OPTION_QUOTE_CHARS, &defaults.quote_chars),
            wild_card_enabled: bool_option(
                map,
                OPTION_WILD_CARD_ENABLED,
                defaults.wild_card_enabled,
            )?,
            replace_tokens: bool_option(map, OPTION_REPLACE_TOKENS, defaults.replace_tokens)?,
            token_delimiter_start: char_option(
                map,
                OPTION_TOKEN_DELIMITER_START,
                defaults.token_delimiter_start,
            )?,
            token_delimiter_end: char_option(
                map,
                OPTION_TOKEN_DELIMITER_END,
                defaults.token_delimiter_end,
            )?,
            token_delimiter_escape: char_option(
                map,
                OPTION_TOKEN_DELIMITER_ESCAPE,
                defaults.token_delimiter_escape,
            )?,
            token_delimiter_prefix: string_option(
                map,
                OPTION_TOKEN_DELIMITER_PREFIX,
                &defaults.token_delimiter_prefix,
            ),
        })
    }

    /// Validate the token-delimiter configuration
    ///
    /// An ambiguous configuration (escape equal to a delimiter, or a prefix
    /// containing escape/delimiter characters) disables token replacement for
    /// this resource definition entirely, with a logged diagnostic. Matching
    /// then proceeds treating every pattern as non-dynamic literal text.
    pub fn validate_token_config(&mut self, resource_name: &str) {
        if !self.replace_tokens {
            return;
        }

        let escape = self.token_delimiter_escape;
        let start = self.token_delimiter_start;
        let end = self.token_delimiter_end;
        let prefix = &self.token_delimiter_prefix;

        if escape == start
            || escape == end
            || prefix.contains(escape)
            || prefix.contains(start)
            || prefix.contains(end)
        {
            warn!(
                "invalid token-replacement parameters for resource '{}': {{ {}='{}'; {}='{}'; {}='{}'; {}='{}' }}. Token replacement disabled",
                resource_name,
                OPTION_TOKEN_DELIMITER_START,
                start,
                OPTION_TOKEN_DELIMITER_END,
                end,
                OPTION_TOKEN_DELIMITER_ESCAPE,
                escape,
                OPTION_TOKEN_DELIMITER_PREFIX,
                prefix,
            );

            self.replace_tokens = false;
        }
    }
}

fn bool_option(map: &HashMap<String, String>, key: &str, default: bool) -> Result<bool> {
    match map.get(key).map(String::as_str) {
        None | Some("") => Ok(default),
        Some(raw) if raw.eq_ignore_ascii_case("true") => Ok(true),
        Some(raw) if raw.eq_ignore_ascii_case("false") => Ok(false),
        Some(raw) => Err(MatcherError::InvalidOption {
            key: key.to_string(),
            value: raw.to_string(),
            reason: "expected 'true' or 'false'".to_string(),
        }),
    }
}

fn char_option(map: &HashMap<String, String>, key: &str, default: char) -> Result<char> {
    match map.get(key).map(String::as_str) {
        None | Some("") => Ok(default),
        Some(raw) => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(MatcherError::InvalidOption {
                    key: key.to_string(),
                    value: raw.to_string(),
                    reason: "expected a single character".to_string(),
                }),
            }
        }
    }
}

fn string_option(map: &HashMap<String, String>, key: &str, default: &str) -> String {
    map.get(key)
        .cloned()
        .unwrap_or_else(|| default.to_string())
}
