//! # Ad Events
//!
//! An [`AdEvent`] records one lifecycle confirmation for one ad at one
//! instant. Events are produced only by the
//! [`AdEventFactory`](crate::factory::AdEventFactory) and are immutable once
//! built: fields are private and exposed through accessors.

use adgate_core::{AdKind, ConfirmationKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable record of a single ad confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdEvent {
    ad_kind: AdKind,
    confirmation_kind: ConfirmationKind,
    ad_identifier: String,
    creative_set_id: String,
    segment: String,
    timestamp: DateTime<Utc>,
}

impl AdEvent {
    pub(crate) fn new(
        ad_kind: AdKind,
        confirmation_kind: ConfirmationKind,
        ad_identifier: String,
        creative_set_id: String,
        segment: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            ad_kind,
            confirmation_kind,
            ad_identifier,
            creative_set_id,
            segment,
            timestamp,
        }
    }

    /// The surface the ad was shown on.
    pub fn ad_kind(&self) -> AdKind {
        self.ad_kind
    }

    /// The confirmation this event records.
    pub fn confirmation_kind(&self) -> ConfirmationKind {
        self.confirmation_kind
    }

    /// The ad's catalog identifier.
    pub fn ad_identifier(&self) -> &str {
        &self.ad_identifier
    }

    /// The campaign creative set the ad belongs to.
    pub fn creative_set_id(&self) -> &str {
        &self.creative_set_id
    }

    /// The ad's classification segment.
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// When the confirmation occurred.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Whether the event matches optional kind filters (`None` matches all).
    pub fn matches(
        &self,
        ad_kind: Option<AdKind>,
        confirmation_kind: Option<ConfirmationKind>,
    ) -> bool {
        ad_kind.map_or(true, |k| k == self.ad_kind)
            && confirmation_kind.map_or(true, |c| c == self.confirmation_kind)
    }
}
