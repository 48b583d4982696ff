//! # Warden Resource Matcher
//!
//! Resource-pattern matching engine for the Warden authorization platform.
//!
//! Given the resource patterns configured on a policy (path, table, or topic
//! name templates that may contain wildcards and request-time variable
//! placeholders) and a concrete resource value presented at authorization
//! time, the engine decides whether the value matches, whether it could be a
//! prefix of something that would match, and whether matching must wait for
//! request-scoped context.
//!
//! ## Features
//!
//! - **Shape classification** of each pattern into the cheapest matcher:
//!   exact, starts-with, ends-with, or general wildcard
//! - **Case handling** per resource definition, including a quoted override
//!   that switches sensitivity per request value
//! - **Lazy token expansion** of `{token}` placeholders from the evaluation
//!   context, with configurable delimiters
//! - **Priority ordering** so more specific patterns win tie-breaks, with
//!   statically-resolvable matchers ahead of dynamic ones
//! - **Excludes semantics** inverting the match set under the documented
//!   all-values guard
//! - **Lock-free reads**: a compiled matcher is immutable and shared freely
//!   across evaluation threads
//!
//! ## Example
//!
//! ```rust
//! use warden_matcher::{CompiledMatcher, EvalContext, PolicyResource, ResourceDef};
//!
//! let def = ResourceDef::new("path");
//! let policy = PolicyResource::new(["finance/*", "hr/payroll"]);
//! let matcher = CompiledMatcher::compile(&def, &policy)?;
//!
//! let ctx = EvalContext::new();
//! assert!(matcher.is_match(Some("finance/q3-report"), &ctx));
//! assert!(matcher.is_prefix_match(Some("finance"), &ctx));
//! assert!(!matcher.is_match(Some("engineering/design"), &ctx));
//! # Ok::<(), warden_matcher::MatcherError>(())
//! ```

pub mod compiled;
pub mod error;
pub mod matcher;
pub mod options;
pub mod policy;
pub mod token;
pub mod wildcard;

// Re-export commonly used types
pub use compiled::{CompiledMatcher, MatchKind};
pub use error::{MatcherError, Result};
pub use matcher::{CaseMode, MatchShape, ResourceMatcher};
pub use options::MatcherOptions;
pub use policy::{EvalContext, PolicyResource, ResourceDef};
pub use token::TokenReplacer;
pub use wildcard::CaseSensitivity;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
