//! Token placeholder expansion
//!
//! Interprets `{token}`-style placeholders embedded in a pattern fragment,
//! substituting each recognized token's value from the evaluation context.
//! Delimiter, escape, and prefix characters are configurable per resource
//! definition; the ambiguous combinations are rejected at compile time by
//! [`crate::MatcherOptions::validate_token_config`], never here.

use crate::policy::EvalContext;

/// Expands token placeholders in a pattern fragment against an evaluation context
///
/// Expansion is deferred until match time because the context (request-scoped
/// variables) is not known at compile time. Nothing is cached across calls.
///
/// # Examples
///
/// ```
/// use warden_matcher::{EvalContext, TokenReplacer};
///
/// let replacer = TokenReplacer::new('{', '}', '\\', "");
/// let mut ctx = EvalContext::new();
/// ctx.insert("user".to_string(), "alice".to_string());
///
/// assert_eq!(replacer.expand("home/{user}/docs", &ctx), "home/alice/docs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenReplacer {
    start: char,
    end: char,
    escape: char,
    prefix: String,
}

impl TokenReplacer {
    /// Create a replacer for the given delimiter configuration
    pub fn new(start: char, end: char, escape: char, prefix: impl Into<String>) -> Self {
        Self {
            start,
            end,
            escape,
            prefix: prefix.into(),
        }
    }

    /// Whether `value` contains an unescaped start delimiter
    ///
    /// Computed once at compile time to derive a matcher's dynamic-evaluation
    /// bit; an escaped delimiter does not count.
    pub fn has_token(value: &str, start: char, escape: char) -> bool {
        let mut chars = value.chars();

        while let Some(c) = chars.next() {
            if c == escape {
                chars.next();
            } else if c == start {
                return true;
            }
        }

        false
    }

    /// Substitute recognized tokens in `value` from `ctx`
    ///
    /// Escape characters are consumed (the following character is taken
    /// literally). Tokens missing from the context, tokens without the
    /// configured prefix, and unterminated tokens pass through unexpanded.
    /// A fragment without any token expands to itself unchanged.
    pub fn expand(&self, value: &str, ctx: &EvalContext) -> String {
        // nothing to substitute: hand the fragment back untouched
        if ctx.is_empty()
            || value.trim().is_empty()
            || (!value.contains(self.start) && !value.contains(self.escape))
        {
            return value.to_string();
        }

        let mut out = String::with_capacity(value.len());
        let mut token = String::new();
        let mut in_token = false;
        let mut escaped = false;

        for c in value.chars() {
            if escaped {
                escaped = false;
                if in_token {
                    token.push(c);
                } else {
                    out.push(c);
                }
                continue;
            }

            if c == self.escape {
                escaped = true;
            } else if !in_token {
                if c == self.start {
                    in_token = true;
                    token.clear();
                } else {
                    out.push(c);
                }
            } else if c == self.end {
                in_token = false;
                self.append_token(&mut out, &token, ctx);
            } else {
                token.push(c);
            }
        }

        // unterminated token: emit what was consumed, minus processed escapes
        if in_token {
            out.push(self.start);
            out.push_str(&token);
        }

        out
    }

    fn append_token(&self, out: &mut String, name: &str, ctx: &EvalContext) {
        let resolved = name
            .strip_prefix(self.prefix.as_str())
            .and_then(|key| ctx.get(key));

        match resolved {
            Some(value) => out.push_str(value),
            None => {
                // unresolved: reconstruct the placeholder literally
                out.push(self.start);
                out.push_str(name);
                out.push(self.end);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_of(entries: &[(&str, &str)]) -> EvalContext {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn default_replacer() -> TokenReplacer {
        TokenReplacer::new('{', '}', '\\', "")
    }

    #[test]
    fn test_has_token() {
        assert!(TokenReplacer::has_token("home/{user}", '{', '\\'));
        assert!(!TokenReplacer::has_token("home/user", '{', '\\'));
        assert!(!TokenReplacer::has_token("home/\\{user}", '{', '\\'));
        assert!(TokenReplacer::has_token("\\{a}/{b}", '{', '\\'));
    }

    #[test]
    fn test_expand_substitutes_token() {
        let replacer = default_replacer();
        let ctx = ctx_of(&[("user", "alice"), ("dept", "finance")]);

        assert_eq!(replacer.expand("{dept}/{user}/docs", &ctx), "finance/alice/docs");
    }

    #[test]
    fn test_expand_unresolved_token_passes_through() {
        let replacer = default_replacer();
        let ctx = ctx_of(&[("user", "alice")]);

        assert_eq!(replacer.expand("home/{group}", &ctx), "home/{group}");
    }

    #[test]
    fn test_expand_consumes_escapes() {
        let replacer = default_replacer();
        let ctx = ctx_of(&[("user", "alice")]);

        // escaped start delimiter stays literal, escape itself is consumed
        assert_eq!(replacer.expand("\\{user}", &ctx), "{user}");
        assert_eq!(replacer.expand("a\\\\b", &ctx), "a\\b");
    }

    #[test]
    fn test_expand_empty_context_is_identity() {
        let replacer = default_replacer();

        assert_eq!(replacer.expand("home/{user}", &EvalContext::new()), "home/{user}");
    }

    #[test]
    fn test_expand_token_free_fragment_is_identity() {
        let replacer = default_replacer();
        let ctx = ctx_of(&[("user", "alice")]);

        assert_eq!(replacer.expand("home/alice", &ctx), "home/alice");
    }

    #[test]
    fn test_expand_unterminated_token() {
        let replacer = default_replacer();
        let ctx = ctx_of(&[("user", "alice")]);

        assert_eq!(replacer.expand("home/{user", &ctx), "home/{user");
    }

    #[test]
    fn test_expand_with_prefix() {
        let replacer = TokenReplacer::new('{', '}', '\\', "USER.");
        let ctx = ctx_of(&[("name", "alice")]);

        // only tokens carrying the prefix are eligible; the prefix is
        // stripped before the context lookup
        assert_eq!(replacer.expand("home/{USER.name}", &ctx), "home/alice");
        assert_eq!(replacer.expand("home/{name}", &ctx), "home/{name}");
    }

    #[test]
    fn test_expand_custom_delimiters() {
        let replacer = TokenReplacer::new('%', '%', '/', "");
        let ctx = ctx_of(&[("user", "alice")]);

        assert_eq!(replacer.expand("%user%-home", &ctx), "alice-home");
    }
}
