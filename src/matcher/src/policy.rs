//! Policy-model input types
//!
//! The engine consumes only a thin slice of the policy and service-definition
//! model: a resource definition's name and matcher-options map, and a policy
//! resource's configured pattern values plus its excludes flag.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Request-scoped variables for token substitution (variable name -> value)
pub type EvalContext = HashMap<String, String>;

/// One resource element of a policy: pattern values plus the excludes flag
///
/// Insertion order of `values` is irrelevant to matching semantics but is
/// preserved as the tie-break order among matchers of equal priority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyResource {
    /// Configured pattern values (may contain wildcards and token placeholders)
    #[serde(default)]
    pub values: Vec<String>,

    /// Values name things to exclude from the match set rather than include
    #[serde(default)]
    pub is_excludes: bool,
}

impl PolicyResource {
    /// Create a policy resource from pattern values
    pub fn new(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            is_excludes: false,
        }
    }

    /// Mark the values as exclusions
    pub fn with_excludes(mut self, is_excludes: bool) -> Self {
        self.is_excludes = is_excludes;
        self
    }
}

/// The matcher-relevant slice of a resource definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDef {
    /// Resource definition name (e.g. "path", "table", "topic")
    pub name: String,

    /// Matcher options map, keyed by the `OPTION_*` constants
    #[serde(default)]
    pub matcher_options: HashMap<String, String>,
}

impl ResourceDef {
    /// Create a resource definition with default matcher options
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matcher_options: HashMap::new(),
        }
    }

    /// Add a matcher option
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.matcher_options.insert(key.into(), value.into());
        self
    }
}
