//! # Permission Rules
//!
//! Each [`PermissionRule`] is a stateless predicate over the event history
//! and "now". Rules keep no counters of their own; every decision is
//! recomputed from the log, so evaluating the same rule against the same
//! history and instant always gives the same answer.
//!
//! ## Cap Semantics
//!
//! A cap of `N` denies once the count inside the window reaches `N`
//! (`count >= N`). The window is closed on the left: an event stamped
//! exactly `now - window` is counted. With no history every rule allows.
//!
//! Caps are typed as [`NonZeroU32`], so a rule that would deny even an
//! empty history cannot be built or deserialized.
//!
//! ## Kind Scoping
//!
//! A rule with `ad_kind: Some(k)` only governs candidates of kind `k`. For
//! any other kind it allows without reading the log, so hitting the new tab
//! page cap never blocks a notification.

use std::num::NonZeroU32;

use adgate_core::temporal::seconds;
use adgate_core::{window_start, AdKind, ConfirmationKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ad::CandidateAd;
use crate::log::EventHistory;

/// Seconds in an hour.
pub const HOUR_SECS: u64 = 60 * 60;

/// Seconds in a day.
pub const DAY_SECS: u64 = 24 * HOUR_SECS;

fn default_confirmation_kind() -> ConfirmationKind {
    ConfirmationKind::Viewed
}

// ---------------------------------------------------------------------------
// RuleContext / RuleDecision
// ---------------------------------------------------------------------------

/// What a rule may observe while deciding.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    /// Read-only event history.
    pub history: &'a dyn EventHistory,
    /// The instant the decision is made at.
    pub now: DateTime<Utc>,
}

impl<'a> RuleContext<'a> {
    /// Create a context.
    pub fn new(history: &'a dyn EventHistory, now: DateTime<Utc>) -> Self {
        Self { history, now }
    }
}

/// Outcome of a single rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleDecision {
    /// The rule permits the ad.
    Allowed,
    /// The rule forbids the ad, with a human-readable explanation.
    Denied(String),
}

impl RuleDecision {
    /// Whether the decision permits the ad.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

// ---------------------------------------------------------------------------
// PermissionRule
// ---------------------------------------------------------------------------

/// A frequency or eligibility rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PermissionRule {
    /// At most `max_count` matching events within the trailing window.
    PerWindowCap {
        /// Window length in seconds.
        window_secs: u64,
        /// Count at which the rule starts denying.
        max_count: NonZeroU32,
        /// Surface this rule governs and counts; `None` governs and counts all.
        #[serde(default)]
        ad_kind: Option<AdKind>,
        /// Confirmation that counts toward the cap.
        #[serde(default = "default_confirmation_kind")]
        confirmation_kind: ConfirmationKind,
    },
    /// At least `min_gap_secs` between the latest matching event and now.
    MinimumInterval {
        /// Required gap in seconds.
        min_gap_secs: u64,
        /// Surface this rule governs and inspects; `None` covers all.
        #[serde(default)]
        ad_kind: Option<AdKind>,
        /// Confirmation the gap is measured from.
        #[serde(default = "default_confirmation_kind")]
        confirmation_kind: ConfirmationKind,
    },
    /// At most `max_count` matching events for the same ad identifier
    /// within the trailing window.
    PerAdCap {
        /// Window length in seconds.
        window_secs: u64,
        /// Count at which the rule starts denying.
        max_count: NonZeroU32,
        /// Confirmation that counts toward the cap.
        #[serde(default = "default_confirmation_kind")]
        confirmation_kind: ConfirmationKind,
    },
    /// At most `max_count` matching events for ads of the same creative set
    /// within the trailing window, so one campaign cannot crowd out others.
    PerCreativeSetCap {
        /// Window length in seconds.
        window_secs: u64,
        /// Count at which the rule starts denying.
        max_count: NonZeroU32,
        /// Confirmation that counts toward the cap.
        #[serde(default = "default_confirmation_kind")]
        confirmation_kind: ConfirmationKind,
    },
    /// Never show an ad again once it has led to a conversion.
    ConversionExclusion,
}

impl PermissionRule {
    /// Cap of `max_count` events of `ad_kind` per trailing hour.
    pub fn per_hour(ad_kind: AdKind, max_count: NonZeroU32) -> Self {
        Self::PerWindowCap {
            window_secs: HOUR_SECS,
            max_count,
            ad_kind: Some(ad_kind),
            confirmation_kind: ConfirmationKind::Viewed,
        }
    }

    /// Cap of `max_count` events of `ad_kind` per trailing day.
    pub fn per_day(ad_kind: AdKind, max_count: NonZeroU32) -> Self {
        Self::PerWindowCap {
            window_secs: DAY_SECS,
            max_count,
            ad_kind: Some(ad_kind),
            confirmation_kind: ConfirmationKind::Viewed,
        }
    }

    /// Minimum gap between two shown ads of `ad_kind`.
    pub fn minimum_interval(ad_kind: AdKind, min_gap_secs: u64) -> Self {
        Self::MinimumInterval {
            min_gap_secs,
            ad_kind: Some(ad_kind),
            confirmation_kind: ConfirmationKind::Viewed,
        }
    }

    /// The surface this rule is scoped to, if any.
    pub fn ad_kind(&self) -> Option<AdKind> {
        match self {
            Self::PerWindowCap { ad_kind, .. } | Self::MinimumInterval { ad_kind, .. } => *ad_kind,
            Self::PerAdCap { .. }
            | Self::PerCreativeSetCap { .. }
            | Self::ConversionExclusion => None,
        }
    }

    /// Whether the rule governs candidates of `kind`.
    pub fn applies_to(&self, kind: AdKind) -> bool {
        self.ad_kind().map_or(true, |scoped| scoped == kind)
    }

    /// Decide whether `candidate` may be shown at `ctx.now`.
    pub fn evaluate(&self, candidate: &CandidateAd, ctx: &RuleContext<'_>) -> RuleDecision {
        if !self.applies_to(candidate.ad_kind()) {
            return RuleDecision::Allowed;
        }

        match *self {
            Self::PerWindowCap {
                window_secs,
                max_count,
                ad_kind,
                confirmation_kind,
            } => {
                let since = window_start(ctx.now, seconds(window_secs));
                let count = ctx
                    .history
                    .count_since(ad_kind, Some(confirmation_kind), since);
                if count >= max_count.get() as usize {
                    RuleDecision::Denied(format!(
                        "{count} {confirmation_kind} events in the last {window_secs}s (cap {max_count})"
                    ))
                } else {
                    RuleDecision::Allowed
                }
            }
            Self::MinimumInterval {
                min_gap_secs,
                ad_kind,
                confirmation_kind,
            } => match ctx.history.most_recent(ad_kind, Some(confirmation_kind)) {
                Some(last) if ctx.now - last.timestamp() < seconds(min_gap_secs) => {
                    RuleDecision::Denied(format!(
                        "last {confirmation_kind} event at {} is within {min_gap_secs}s",
                        last.timestamp()
                    ))
                }
                _ => RuleDecision::Allowed,
            },
            Self::PerAdCap {
                window_secs,
                max_count,
                confirmation_kind,
            } => {
                let since = window_start(ctx.now, seconds(window_secs));
                let count = ctx.history.count_for_ad_since(
                    &candidate.ad_identifier,
                    Some(confirmation_kind),
                    since,
                );
                if count >= max_count.get() as usize {
                    RuleDecision::Denied(format!(
                        "ad {} has {count} {confirmation_kind} events in the last {window_secs}s (cap {max_count})",
                        candidate.ad_identifier
                    ))
                } else {
                    RuleDecision::Allowed
                }
            }
            Self::PerCreativeSetCap {
                window_secs,
                max_count,
                confirmation_kind,
            } => {
                let since = window_start(ctx.now, seconds(window_secs));
                let count = ctx.history.count_for_creative_set_since(
                    &candidate.creative_set_id,
                    Some(confirmation_kind),
                    since,
                );
                if count >= max_count.get() as usize {
                    RuleDecision::Denied(format!(
                        "creative set {} has {count} {confirmation_kind} events in the last {window_secs}s (cap {max_count})",
                        candidate.creative_set_id
                    ))
                } else {
                    RuleDecision::Allowed
                }
            }
            Self::ConversionExclusion => {
                let conversions = ctx.history.count_for_ad_since(
                    &candidate.ad_identifier,
                    Some(ConfirmationKind::Conversion),
                    DateTime::<Utc>::MIN_UTC,
                );
                if conversions > 0 {
                    RuleDecision::Denied(format!(
                        "ad {} already converted",
                        candidate.ad_identifier
                    ))
                } else {
                    RuleDecision::Allowed
                }
            }
        }
    }
}

/// Test shorthand for a literal cap.
#[cfg(test)]
pub(crate) fn cap(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap()
}
