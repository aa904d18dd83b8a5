//! # Permission Rule Chain
//!
//! An ordered list of named [`PermissionRule`]s. A candidate is admitted
//! only if every rule allows it. Rules run in declaration order and the
//! first denial ends evaluation, so the reported rule is always the
//! earliest failing one in the configured order.
//!
//! The chain is built once from configuration and holds no other state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ad::CandidateAd;
use crate::log::EventHistory;
use crate::rules::{PermissionRule, RuleContext, RuleDecision};

// ---------------------------------------------------------------------------
// RuleEntry
// ---------------------------------------------------------------------------

/// A rule together with the name reported when it denies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Unique rule name.
    pub name: String,
    /// The rule itself.
    #[serde(flatten)]
    pub rule: PermissionRule,
}

impl RuleEntry {
    /// Create a named rule.
    pub fn new(name: impl Into<String>, rule: PermissionRule) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Which rule denied a candidate, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denial {
    /// Name of the first failing rule.
    pub rule: String,
    /// The rule's explanation.
    pub detail: String,
}

impl std::fmt::Display for Denial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.rule, self.detail)
    }
}

/// Outcome of evaluating the whole chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Every rule allowed the candidate.
    Allowed,
    /// A rule denied the candidate.
    Denied(Denial),
}

impl Verdict {
    /// Whether the candidate was admitted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

// ---------------------------------------------------------------------------
// PermissionRuleChain
// ---------------------------------------------------------------------------

/// Ordered, all-must-allow set of permission rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionRuleChain {
    entries: Vec<RuleEntry>,
}

impl PermissionRuleChain {
    /// Build a chain from entries in evaluation order.
    pub fn new(entries: Vec<RuleEntry>) -> Self {
        Self { entries }
    }

    /// The rules in evaluation order.
    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the chain has no rules (and therefore admits everything).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evaluate every rule against `history` at `now`, stopping at the first
    /// denial.
    pub fn evaluate(
        &self,
        candidate: &CandidateAd,
        history: &dyn EventHistory,
        now: DateTime<Utc>,
    ) -> Verdict {
        let ctx = RuleContext::new(history, now);
        for entry in &self.entries {
            if let RuleDecision::Denied(detail) = entry.rule.evaluate(candidate, &ctx) {
                tracing::debug!(
                    rule = %entry.name,
                    ad_kind = %candidate.ad_kind(),
                    detail = %detail,
                    "candidate denied by permission rule"
                );
                return Verdict::Denied(Denial {
                    rule: entry.name.clone(),
                    detail,
                });
            }
        }
        tracing::debug!(
            ad_kind = %candidate.ad_kind(),
            rules = self.entries.len(),
            "candidate admitted by permission rules"
        );
        Verdict::Allowed
    }
}
