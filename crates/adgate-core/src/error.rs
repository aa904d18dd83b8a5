//! # Error Hierarchy
//!
//! Structured error types shared by every adgate crate, built with
//! `thiserror`. No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Validation errors describe a malformed candidate ad and are surfaced to
//! the caller immediately; configuration errors describe a rule set that
//! cannot be turned into a permission chain.

use thiserror::Error;

use crate::domain::AdKind;

/// Reasons a candidate ad is rejected before any rule is consulted.
///
/// These are caller bugs: they are never retried and never recorded in the
/// event log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The ad identifier is empty or whitespace.
    #[error("ad identifier must be non-empty")]
    EmptyAdIdentifier,

    /// The segment is empty or whitespace.
    #[error("segment must be non-empty")]
    EmptySegment,

    /// A field required by the ad's surface is empty.
    #[error("{ad_kind} ad is missing required field \"{field}\"")]
    MissingField {
        /// The surface the candidate targets.
        ad_kind: AdKind,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A URL field does not parse or uses a non-web scheme.
    #[error("invalid URL in field \"{field}\": \"{value}\" ({reason})")]
    InvalidUrl {
        /// Name of the offending field.
        field: &'static str,
        /// The value that failed.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Errors raised while validating a permission rule configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A rule entry has an empty name.
    #[error("rule at position {0} has an empty name")]
    EmptyRuleName(usize),

    /// Two rule entries share a name, making denials ambiguous.
    #[error("duplicate rule name \"{0}\"")]
    DuplicateRuleName(String),

    /// A window or gap is zero or exceeds the supported maximum.
    #[error("rule \"{rule}\" has invalid duration {seconds}s (expected 1..={max}s)")]
    InvalidWindow {
        /// The rule name.
        rule: String,
        /// The configured duration in seconds.
        seconds: u64,
        /// The largest accepted duration in seconds.
        max: u64,
    },

    /// The configuration document could not be parsed.
    #[error("failed to parse rule configuration: {0}")]
    Parse(String),
}

/// A kind name that does not match any known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseKindError {
    /// Not one of the [`AdKind`] names.
    #[error("unknown ad kind \"{0}\"")]
    UnknownAdKind(String),

    /// Not one of the [`ConfirmationKind`](crate::ConfirmationKind) names.
    #[error("unknown confirmation kind \"{0}\"")]
    UnknownConfirmationKind(String),
}
