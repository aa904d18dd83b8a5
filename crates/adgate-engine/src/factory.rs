//! # Ad Event Factory
//!
//! Maps an `(AdKind, ConfirmationKind)` pair to an event constructor. The
//! table is fixed at compile time; unsupported combinations (a surface that
//! can never emit that confirmation) yield `None`. Building an event performs
//! no I/O and never touches the event log.
//!
//! | Kind | served | viewed | clicked | dismissed | landed | conversion |
//! |---|---|---|---|---|---|---|
//! | notification | ✓ | ✓ | ✓ | ✓ | ✓ | ✓ |
//! | new_tab_page_ad | ✓ | ✓ | ✓ | | | ✓ |
//! | inline_content_ad | ✓ | ✓ | ✓ | | | ✓ |
//! | promoted_content | ✓ | ✓ | ✓ | | ✓ | ✓ |

use adgate_core::{AdKind, ConfirmationKind};
use chrono::{DateTime, Utc};

use crate::ad::CandidateAd;
use crate::event::AdEvent;

/// Constructor for one supported `(AdKind, ConfirmationKind)` pair.
type EventBuilder = fn(&CandidateAd, DateTime<Utc>) -> AdEvent;

/// Stateless factory for ad events.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdEventFactory;

impl AdEventFactory {
    /// Build an event for `candidate`, or `None` if the pair is unsupported
    /// or `ad_kind` is not the candidate's own surface.
    pub fn build(
        ad_kind: AdKind,
        confirmation_kind: ConfirmationKind,
        candidate: &CandidateAd,
        now: DateTime<Utc>,
    ) -> Option<AdEvent> {
        if candidate.ad_kind() != ad_kind {
            return None;
        }
        builder_for(ad_kind, confirmation_kind).map(|build| build(candidate, now))
    }

    /// Whether the surface can emit the given confirmation.
    pub fn is_supported(ad_kind: AdKind, confirmation_kind: ConfirmationKind) -> bool {
        builder_for(ad_kind, confirmation_kind).is_some()
    }
}

fn builder_for(ad_kind: AdKind, confirmation_kind: ConfirmationKind) -> Option<EventBuilder> {
    use ConfirmationKind::*;

    let supported = match ad_kind {
        AdKind::Notification => true,
        AdKind::NewTabPageAd | AdKind::InlineContentAd => {
            matches!(confirmation_kind, Served | Viewed | Clicked | Conversion)
        }
        AdKind::PromotedContent => {
            matches!(confirmation_kind, Served | Viewed | Clicked | Landed | Conversion)
        }
    };
    if !supported {
        return None;
    }

    let build: EventBuilder = match confirmation_kind {
        Served => |ad, now| record(ad, Served, now),
        Viewed => |ad, now| record(ad, Viewed, now),
        Clicked => |ad, now| record(ad, Clicked, now),
        Dismissed => |ad, now| record(ad, Dismissed, now),
        Landed => |ad, now| record(ad, Landed, now),
        Conversion => |ad, now| record(ad, Conversion, now),
    };
    Some(build)
}

fn record(ad: &CandidateAd, confirmation_kind: ConfirmationKind, now: DateTime<Utc>) -> AdEvent {
    AdEvent::new(
        ad.ad_kind(),
        confirmation_kind,
        ad.ad_identifier.clone(),
        ad.creative_set_id.clone(),
        ad.segment.clone(),
        now,
    )
}
