//! The compiled matcher set
//!
//! One [`CompiledMatcher`] is built per resource definition / policy resource
//! pair, once per policy version. After compilation it is immutable and
//! supports unbounded concurrent reads; the owning policy store swaps whole
//! instances on policy update and never mutates one in place.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::matcher::{ResourceMatcher, WILDCARD_ASTERISK};
use crate::options::MatcherOptions;
use crate::policy::{EvalContext, PolicyResource, ResourceDef};
use crate::wildcard::{starts_with_any_char, CaseSensitivity};

/// How a resource value relates to a policy resource element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchKind {
    /// No relationship
    None,
    /// The value itself matches
    Full,
    /// The value is an ancestor of matching values
    Prefix,
    /// The value is an immediate child of a matching value
    Child,
}

/// The compiled, immutable matcher set for one policy resource element
///
/// Owns the priority-ordered leaf matchers built from the policy's pattern
/// values, plus the match-any short-circuit and dynamic-evaluation flags.
///
/// # Examples
///
/// ```
/// use warden_matcher::{CompiledMatcher, EvalContext, PolicyResource, ResourceDef};
///
/// let def = ResourceDef::new("path");
/// let policy = PolicyResource::new(["finance/*", "hr/payroll"]);
/// let matcher = CompiledMatcher::compile(&def, &policy)?;
///
/// let ctx = EvalContext::new();
/// assert!(matcher.is_match(Some("finance/q3-report"), &ctx));
/// assert!(matcher.is_prefix_match(Some("finance"), &ctx));
/// assert!(!matcher.is_match(Some("engineering/design"), &ctx));
/// # Ok::<(), warden_matcher::MatcherError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    resource_name: String,
    options: MatcherOptions,
    policy_values: Vec<String>,
    is_excludes: bool,
    matchers: Vec<ResourceMatcher>,
    match_any: bool,
    needs_dynamic_eval: bool,
}

impl CompiledMatcher {
    /// Compile the matcher set for a resource definition / policy resource pair
    ///
    /// # Arguments
    ///
    /// * `def` - Resource definition supplying the matcher options
    /// * `policy` - Policy resource supplying pattern values and the excludes flag
    ///
    /// # Returns
    ///
    /// The compiled set, or [`crate::MatcherError::InvalidOption`] when the
    /// definition's options map holds a malformed value. An invalid
    /// token-delimiter combination is not an error: token replacement is
    /// disabled for this definition with a logged diagnostic and patterns
    /// match as literal text.
    pub fn compile(def: &ResourceDef, policy: &PolicyResource) -> Result<Self> {
        let mut options = MatcherOptions::from_map(&def.matcher_options)?;
        options.validate_token_config(&def.name);

        let policy_values: Vec<String> = policy
            .values
            .iter()
            .filter(|value| !value.trim().is_empty())
            .cloned()
            .collect();

        let mut matchers = Vec::with_capacity(policy_values.len());

        for value in &policy_values {
            let matcher = ResourceMatcher::classify(value, &options);

            if matcher.is_match_any() {
                // match-any dominates; later patterns are redundant
                matchers.clear();
                break;
            }

            matchers.push(matcher);
        }

        let match_any = matchers.is_empty();
        let needs_dynamic_eval = matchers.iter().any(ResourceMatcher::needs_dynamic_eval);

        // composite key: effective priority, then original pattern order
        let mut indexed: Vec<(usize, ResourceMatcher)> = matchers.into_iter().enumerate().collect();
        indexed.sort_by_key(|(index, matcher)| (matcher.priority(), *index));
        let matchers: Vec<ResourceMatcher> = indexed.into_iter().map(|(_, m)| m).collect();

        debug!(
            "compiled matcher for resource '{}': {} matchers, match_any={}, needs_dynamic_eval={}",
            def.name,
            matchers.len(),
            match_any,
            needs_dynamic_eval
        );

        Ok(Self {
            resource_name: def.name.clone(),
            options,
            policy_values,
            is_excludes: policy.is_excludes,
            matchers,
            match_any,
            needs_dynamic_eval,
        })
    }

    /// Whether the request denotes every possible value
    ///
    /// True for an absent resource, an empty string, and the single-character
    /// wildcard `*`; false for anything else.
    pub fn is_all_values_requested(resource: Option<&str>) -> bool {
        match resource {
            None => true,
            Some(value) => value.is_empty() || value == "*",
        }
    }

    /// Whether `resource` matches this policy resource element
    ///
    /// A request for all values matches only a match-any set. The excludes
    /// inversion rule is applied to the raw result.
    pub fn is_match(&self, resource: Option<&str>, ctx: &EvalContext) -> bool {
        let all_values_requested = Self::is_all_values_requested(resource);
        let result = self.raw_match(resource, all_values_requested, ctx);

        self.apply_excludes(all_values_requested, result)
    }

    /// Tri-state form of [`CompiledMatcher::is_match`]
    ///
    /// These generic string matchers produce only [`MatchKind::Full`] and
    /// [`MatchKind::None`]; the other kinds exist for hierarchy-aware callers
    /// and pass through the excludes inversion unchanged.
    pub fn match_type(&self, resource: Option<&str>, ctx: &EvalContext) -> MatchKind {
        let all_values_requested = Self::is_all_values_requested(resource);
        let kind = if self.raw_match(resource, all_values_requested, ctx) {
            MatchKind::Full
        } else {
            MatchKind::None
        };

        self.apply_excludes_kind(all_values_requested, kind)
    }

    /// Whether `resource` could be a prefix of some matching value
    ///
    /// Used for hierarchical descent; the excludes flag does not apply here.
    pub fn is_prefix_match(&self, resource: Option<&str>, ctx: &EvalContext) -> bool {
        if self.match_any {
            return true;
        }

        let value = resource.unwrap_or("");

        self.matchers
            .iter()
            .any(|matcher| matcher.is_prefix_match(value, ctx))
    }

    /// Whether `resource` is exactly this policy resource element
    ///
    /// Full-equality check, not the general matcher scan: defined only for
    /// zero or one configured pattern; any other count returns false. The
    /// context is accepted for signature uniformity but equality is against
    /// the raw pattern, never a token expansion.
    pub fn is_complete_match(&self, resource: Option<&str>, _ctx: &EvalContext) -> bool {
        match self.policy_values.as_slice() {
            [] => resource.is_none_or(str::is_empty),
            [policy_value] => {
                let mut result = if self.match_any {
                    resource.is_none_or(|r| r.chars().all(|c| c == WILDCARD_ASTERISK))
                } else {
                    let case = if self.options.ignore_case
                        && !(self.options.quoted_case_sensitive
                            && starts_with_any_char(
                                resource.unwrap_or(""),
                                &self.options.quote_chars,
                            )) {
                        CaseSensitivity::Insensitive
                    } else {
                        CaseSensitivity::Sensitive
                    };

                    resource.is_some_and(|r| case.str_eq(r, policy_value))
                };

                if self.is_excludes {
                    result = !result;
                }

                result
            }
            _ => false,
        }
    }

    /// Apply the excludes inversion rule to a raw boolean result
    ///
    /// The excludes flag does not change the result only when all values are
    /// requested and the policy itself does not allow all values; every other
    /// combination flips it.
    pub fn apply_excludes(&self, all_values_requested: bool, result: bool) -> bool {
        if !self.is_excludes {
            return result;
        }
        if all_values_requested && !self.match_any {
            return result;
        }

        !result
    }

    /// Tri-state form of [`CompiledMatcher::apply_excludes`]
    ///
    /// Flips strictly between [`MatchKind::None`] and [`MatchKind::Full`];
    /// any other kind is a qualifier unrelated to simple negation and passes
    /// through unchanged.
    pub fn apply_excludes_kind(&self, all_values_requested: bool, result: MatchKind) -> MatchKind {
        if !self.is_excludes {
            return result;
        }
        if all_values_requested && !self.match_any {
            return result;
        }

        match result {
            MatchKind::None => MatchKind::Full,
            MatchKind::Full => MatchKind::None,
            other => other,
        }
    }

    /// Whether this set matches every possible value
    pub fn is_match_any(&self) -> bool {
        self.match_any
    }

    /// Whether any matcher in the set needs request-scoped context
    pub fn needs_dynamic_eval(&self) -> bool {
        self.needs_dynamic_eval
    }

    /// The leaf matchers, in ascending effective-priority order
    pub fn matchers(&self) -> &[ResourceMatcher] {
        &self.matchers
    }

    /// Whether the policy resource element is an exclusion
    pub fn is_excludes(&self) -> bool {
        self.is_excludes
    }

    /// The resolved matcher options
    pub fn options(&self) -> &MatcherOptions {
        &self.options
    }

    /// The resource definition name this set was compiled for
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    fn raw_match(&self, resource: Option<&str>, all_values_requested: bool, ctx: &EvalContext) -> bool {
        if all_values_requested || self.match_any {
            return self.match_any;
        }

        let value = resource.unwrap_or("");

        self.matchers.iter().any(|matcher| matcher.is_match(value, ctx))
    }
}

impl fmt::Display for CompiledMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompiledMatcher={{resource='{}' ", self.resource_name)?;

        write!(
            f,
            "ignoreCase={} quotedCaseSensitive={} quoteChars='{}' wildCardEnabled={} replaceTokens={} ",
            self.options.ignore_case,
            self.options.quoted_case_sensitive,
            self.options.quote_chars,
            self.options.wild_card_enabled,
            self.options.replace_tokens,
        )?;

        write!(f, "policyValues=[")?;
        for (i, value) in self.policy_values.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "'{value}'")?;
        }
        write!(f, "] ")?;

        write!(
            f,
            "isExcludes={} matchAny={} needsDynamicEval={} ",
            self.is_excludes, self.match_any, self.needs_dynamic_eval
        )?;

        write!(f, "matchers=[")?;
        for (i, matcher) in self.matchers.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{matcher}")?;
        }
        write!(f, "]}}")
    }
}
