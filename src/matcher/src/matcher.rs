//! Leaf resource matchers
//!
//! Every policy pattern compiles into exactly one [`ResourceMatcher`]: a
//! closed shape × case-mode value carrying the fragment relevant to its
//! shape. Matchers are immutable and safe for unrestricted concurrent reads.

use std::borrow::Cow;
use std::fmt;

use crate::options::MatcherOptions;
use crate::policy::EvalContext;
use crate::token::TokenReplacer;
use crate::wildcard::{
    starts_with_any_char, wildcard_match, wildcard_prefix_match, CaseSensitivity,
};

/// Wildcard matching any run of characters
pub const WILDCARD_ASTERISK: char = '*';
/// Wildcard matching exactly one character
pub const WILDCARD_QUESTION_MARK: char = '?';

/// Priority penalty keeping dynamically-evaluated matchers behind every
/// statically-resolvable one of any shape
const DYNAMIC_EVALUATION_PENALTY: u32 = 8;

/// Matcher shape, selected by wildcard position within the pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchShape {
    /// Whole-string equality
    Exact,
    /// Pattern of form `prefix*`; fragment is the prefix
    StartsWith,
    /// Pattern of form `*suffix`; fragment is the suffix
    EndsWith,
    /// Any other wildcard arrangement; fragment is the whole pattern
    Wildcard,
}

/// Case handling mode, selected once from the matcher options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseMode {
    /// Always case-sensitive
    Sensitive,
    /// Always case-insensitive
    Insensitive,
    /// Case-sensitive only when the resource value starts with a quote character
    QuotedSensitive {
        /// Characters recognized as quotes
        quote_chars: String,
    },
}

impl CaseMode {
    /// Sensitivity applying to this resource value
    fn sensitivity_for(&self, resource_value: &str) -> CaseSensitivity {
        match self {
            Self::Sensitive => CaseSensitivity::Sensitive,
            Self::Insensitive => CaseSensitivity::Insensitive,
            Self::QuotedSensitive { quote_chars } => {
                if starts_with_any_char(resource_value, quote_chars) {
                    CaseSensitivity::Sensitive
                } else {
                    CaseSensitivity::Insensitive
                }
            }
        }
    }
}

/// A single compiled pattern
///
/// Built by [`ResourceMatcher::classify`]; owned and ordered by
/// [`crate::CompiledMatcher`]. All predicates are pure: given the same
/// resource value and context they always return the same result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMatcher {
    shape: MatchShape,
    case_mode: CaseMode,
    value: String,
    token_replacer: Option<TokenReplacer>,
}

impl ResourceMatcher {
    /// Classify a single pattern into its optimal matcher shape
    ///
    /// A single left-to-right scan finds the first/last index of the (at
    /// most one) contiguous `*` run; a `?` anywhere or a second disjoint `*`
    /// run forces the general wildcard shape. With wildcard support disabled
    /// every pattern is an exact matcher, literal `*`/`?` included.
    ///
    /// `pattern` must be non-empty; blank values are filtered out upstream.
    pub fn classify(pattern: &str, options: &MatcherOptions) -> Self {
        debug_assert!(!pattern.trim().is_empty());

        let mut wildcard_start: Option<usize> = None;
        let mut wildcard_end: Option<usize> = None;
        let mut need_wildcard_match = false;

        if options.wild_card_enabled {
            for (i, c) in pattern.char_indices() {
                if c == WILDCARD_QUESTION_MARK {
                    need_wildcard_match = true;
                    break;
                } else if c == WILDCARD_ASTERISK {
                    match wildcard_end {
                        // first run, or the current run continues
                        None => {
                            wildcard_start = Some(i);
                            wildcard_end = Some(i);
                        }
                        Some(end) if end + 1 == i => wildcard_end = Some(i),
                        // a second disjoint run
                        Some(_) => {
                            need_wildcard_match = true;
                            break;
                        }
                    }
                }
            }
        }

        let (shape, value) = if need_wildcard_match {
            // test?, test*a*, *test*a
            (MatchShape::Wildcard, pattern.to_string())
        } else {
            match (wildcard_start, wildcard_end) {
                // test, testab
                (None, _) => (MatchShape::Exact, pattern.to_string()),
                // *test, **test; a bare * leaves an empty fragment, which the
                // matcher set collapses to match-any
                (Some(0), Some(end)) => (MatchShape::EndsWith, pattern[end + 1..].to_string()),
                // test*a: the run is internal, neither edge shape suffices
                (Some(_), Some(end)) if end != pattern.len() - 1 => {
                    (MatchShape::Wildcard, pattern.to_string())
                }
                // test*, testab**
                (Some(start), _) => (MatchShape::StartsWith, pattern[..start].to_string()),
            }
        };

        let case_mode = if !options.ignore_case {
            CaseMode::Sensitive
        } else if options.quoted_case_sensitive {
            CaseMode::QuotedSensitive {
                quote_chars: options.quote_chars.clone(),
            }
        } else {
            CaseMode::Insensitive
        };

        let token_replacer = if options.replace_tokens
            && TokenReplacer::has_token(
                &value,
                options.token_delimiter_start,
                options.token_delimiter_escape,
            ) {
            Some(TokenReplacer::new(
                options.token_delimiter_start,
                options.token_delimiter_end,
                options.token_delimiter_escape,
                options.token_delimiter_prefix.clone(),
            ))
        } else {
            None
        };

        Self {
            shape,
            case_mode,
            value,
            token_replacer,
        }
    }

    /// Whether `resource_value` matches this pattern
    pub fn is_match(&self, resource_value: &str, ctx: &EvalContext) -> bool {
        let expanded = self.expanded_value(ctx);
        let case = self.case_mode.sensitivity_for(resource_value);

        match self.shape {
            MatchShape::Exact => case.str_eq(resource_value, &expanded),
            MatchShape::StartsWith => case.starts_with(resource_value, &expanded),
            MatchShape::EndsWith => case.ends_with(resource_value, &expanded),
            MatchShape::Wildcard => wildcard_match(resource_value, &expanded, case),
        }
    }

    /// Whether `resource_value` could be a prefix of some value this matcher accepts
    ///
    /// Drives hierarchical descent without enumerating children: an ends-with
    /// pattern can always be satisfied further down, the other shapes require
    /// the value to sit on the pattern's literal prefix.
    pub fn is_prefix_match(&self, resource_value: &str, ctx: &EvalContext) -> bool {
        match self.shape {
            MatchShape::EndsWith => true,
            MatchShape::Wildcard => {
                let case = self.case_mode.sensitivity_for(resource_value);
                wildcard_prefix_match(resource_value, &self.expanded_value(ctx), case)
            }
            MatchShape::Exact | MatchShape::StartsWith => {
                let case = self.case_mode.sensitivity_for(resource_value);
                case.starts_with(&self.expanded_value(ctx), resource_value)
            }
        }
    }

    /// Whether `resource_value` is an immediate child of a matching value
    ///
    /// Always false for these generic string matchers; child matching applies
    /// only to hierarchical path-aware matchers.
    pub fn is_child_match(&self, _resource_value: &str, _ctx: &EvalContext) -> bool {
        false
    }

    /// The stored fragment with tokens substituted when dynamic evaluation applies
    ///
    /// Not memoized across calls: the context varies per request.
    pub fn expanded_value<'a>(&'a self, ctx: &EvalContext) -> Cow<'a, str> {
        match &self.token_replacer {
            Some(replacer) => Cow::Owned(replacer.expand(&self.value, ctx)),
            None => Cow::Borrowed(self.value.as_str()),
        }
    }

    /// Ordering rank; lower ranks match more specific patterns
    pub fn priority(&self) -> u32 {
        let base = match (self.shape, &self.case_mode) {
            (MatchShape::Exact, CaseMode::Sensitive) => 1,
            (MatchShape::Exact, _) => 2,
            (MatchShape::StartsWith | MatchShape::EndsWith, CaseMode::Sensitive) => 3,
            (MatchShape::StartsWith | MatchShape::EndsWith, _) => 4,
            (MatchShape::Wildcard, CaseMode::Sensitive) => 5,
            (MatchShape::Wildcard, _) => 6,
        };

        if self.needs_dynamic_eval() {
            base + DYNAMIC_EVALUATION_PENALTY
        } else {
            base
        }
    }

    /// Whether matching must wait for request-scoped context
    pub fn needs_dynamic_eval(&self) -> bool {
        self.token_replacer.is_some()
    }

    /// Whether this matcher accepts every possible value
    ///
    /// True only for an empty fragment, i.e. a pattern that was all `*`
    /// characters.
    pub fn is_match_any(&self) -> bool {
        self.value.is_empty()
    }

    /// The matcher's shape
    pub fn shape(&self) -> MatchShape {
        self.shape
    }

    /// The matcher's case handling mode
    pub fn case_mode(&self) -> &CaseMode {
        &self.case_mode
    }

    /// The stored pattern fragment, unexpanded
    pub fn pattern(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ResourceMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}('{}', priority={}, dynamic={})",
            self.shape,
            self.value,
            self.priority(),
            self.needs_dynamic_eval()
        )
    }
}
