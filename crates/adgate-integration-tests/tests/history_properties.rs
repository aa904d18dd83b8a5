//! # Event History Properties
//!
//! Property tests over randomly generated event sequences:
//! - Indexed window counts equal a linear scan of the log, per kind, per ad
//!   and per creative set
//! - An appended event is counted exactly once
//! - The event factory table covers every kind pair as documented

use adgate_core::{AdKind, ConfirmationKind};
use adgate_engine::{
    AdEventFactory, CandidateAd, Creative, EventHistory, EventLog, InMemoryEventStore,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

fn candidate(kind: AdKind, id: &str) -> CandidateAd {
    let creative = match kind {
        AdKind::Notification => Creative::Notification {
            title: "t".into(),
            body: "b".into(),
            target_url: "https://example.com".into(),
        },
        AdKind::NewTabPageAd => Creative::NewTabPageAd {
            company_name: "c".into(),
            image_url: "https://example.com/i.png".into(),
            alt: "a".into(),
            target_url: "https://example.com".into(),
        },
        AdKind::InlineContentAd => Creative::InlineContentAd {
            title: "t".into(),
            description: "d".into(),
            image_url: "https://example.com/i.png".into(),
            dimensions: "1x1".into(),
            cta_text: "go".into(),
            target_url: "https://example.com".into(),
        },
        AdKind::PromotedContent => Creative::PromotedContent {
            title: "t".into(),
            description: "d".into(),
            target_url: "https://example.com".into(),
        },
    };
    let creative_set = match id.strip_prefix("ad-") {
        Some(n) if n.parse::<u8>().map_or(false, |n| n % 2 == 0) => "cs-even",
        _ => "cs-odd",
    };
    CandidateAd::new(id, creative_set, "segment", creative)
}

/// One generated append: kind, confirmation, ad number and a non-negative
/// step forward in time.
fn arb_step() -> impl Strategy<Value = (usize, usize, u8, i64)> {
    (
        0..AdKind::COUNT,
        0..ConfirmationKind::COUNT,
        0u8..4,
        0i64..7200,
    )
}

/// Build a log from generated steps, skipping unsupported pairs.
fn build_log(steps: &[(usize, usize, u8, i64)]) -> EventLog<InMemoryEventStore> {
    let mut log = EventLog::open(InMemoryEventStore::new()).unwrap();
    let mut now = epoch();
    for &(kind_idx, conf_idx, ad, step) in steps {
        now += Duration::seconds(step);
        let kind = AdKind::all()[kind_idx];
        let confirmation = ConfirmationKind::all()[conf_idx];
        let ad = candidate(kind, &format!("ad-{ad}"));
        if let Some(event) = AdEventFactory::build(kind, confirmation, &ad, now) {
            log.append(event).unwrap();
        }
    }
    log
}

fn option_of<T: Copy>(all: &[T], idx: usize) -> Option<T> {
    all.get(idx).copied()
}

proptest! {
    #[test]
    fn indexed_count_matches_linear_scan(
        steps in prop::collection::vec(arb_step(), 0..60),
        kind_idx in 0..=AdKind::COUNT,
        conf_idx in 0..=ConfirmationKind::COUNT,
        since_offset in 0i64..(60 * 7200),
    ) {
        let log = build_log(&steps);
        let kind = option_of(AdKind::all(), kind_idx);
        let confirmation = option_of(ConfirmationKind::all(), conf_idx);
        let since = epoch() + Duration::seconds(since_offset);

        let expected = log
            .events()
            .iter()
            .filter(|e| e.matches(kind, confirmation) && e.timestamp() >= since)
            .count();
        prop_assert_eq!(log.count_since(kind, confirmation, since), expected);
    }

    #[test]
    fn per_ad_count_matches_linear_scan(
        steps in prop::collection::vec(arb_step(), 0..60),
        ad in 0u8..4,
        conf_idx in 0..=ConfirmationKind::COUNT,
        since_offset in 0i64..(60 * 7200),
    ) {
        let log = build_log(&steps);
        let id = format!("ad-{ad}");
        let confirmation = option_of(ConfirmationKind::all(), conf_idx);
        let since = epoch() + Duration::seconds(since_offset);

        let expected = log
            .events()
            .iter()
            .filter(|e| {
                e.ad_identifier() == id
                    && e.matches(None, confirmation)
                    && e.timestamp() >= since
            })
            .count();
        prop_assert_eq!(log.count_for_ad_since(&id, confirmation, since), expected);
    }

    #[test]
    fn creative_set_count_matches_linear_scan(
        steps in prop::collection::vec(arb_step(), 0..60),
        even in any::<bool>(),
        conf_idx in 0..=ConfirmationKind::COUNT,
        since_offset in 0i64..(60 * 7200),
    ) {
        let log = build_log(&steps);
        let set = if even { "cs-even" } else { "cs-odd" };
        let confirmation = option_of(ConfirmationKind::all(), conf_idx);
        let since = epoch() + Duration::seconds(since_offset);

        let expected = log
            .events()
            .iter()
            .filter(|e| {
                e.creative_set_id() == set
                    && e.matches(None, confirmation)
                    && e.timestamp() >= since
            })
            .count();
        prop_assert_eq!(log.count_for_creative_set_since(set, confirmation, since), expected);
    }

    #[test]
    fn append_is_counted_exactly_once(
        steps in prop::collection::vec(arb_step(), 0..40),
        kind_idx in 0..AdKind::COUNT,
    ) {
        let mut log = build_log(&steps);
        let kind = AdKind::all()[kind_idx];
        let at = log.last_timestamp(kind).unwrap_or_else(epoch);
        let before = log.count_since(Some(kind), Some(ConfirmationKind::Viewed), at);

        let event = AdEventFactory::build(
            kind,
            ConfirmationKind::Viewed,
            &candidate(kind, "fresh"),
            at,
        )
        .unwrap();
        log.append(event).unwrap();

        prop_assert_eq!(
            log.count_since(Some(kind), Some(ConfirmationKind::Viewed), at),
            before + 1
        );
        prop_assert_eq!(log.count_for_ad_since("fresh", None, at), 1);
    }

    #[test]
    fn most_recent_is_latest_match(
        steps in prop::collection::vec(arb_step(), 1..40),
        kind_idx in 0..=AdKind::COUNT,
    ) {
        let log = build_log(&steps);
        let kind = option_of(AdKind::all(), kind_idx);
        let expected = log
            .events()
            .iter()
            .filter(|e| e.matches(kind, None))
            .map(|e| e.timestamp())
            .max();
        prop_assert_eq!(log.most_recent(kind, None).map(|e| e.timestamp()), expected);
    }
}

// ---------------------------------------------------------------------------
// Factory table
// ---------------------------------------------------------------------------

#[test]
fn factory_covers_every_pair_as_documented() {
    use ConfirmationKind::*;

    let expected = |kind: AdKind, confirmation: ConfirmationKind| match kind {
        AdKind::Notification => true,
        AdKind::NewTabPageAd | AdKind::InlineContentAd => {
            matches!(confirmation, Served | Viewed | Clicked | Conversion)
        }
        AdKind::PromotedContent => !matches!(confirmation, Dismissed),
    };

    let mut checked = 0;
    for &kind in AdKind::all() {
        let ad = candidate(kind, "ad-1");
        for &confirmation in ConfirmationKind::all() {
            let built = AdEventFactory::build(kind, confirmation, &ad, epoch());
            assert_eq!(
                built.is_some(),
                expected(kind, confirmation),
                "{kind} / {confirmation}"
            );
            if let Some(event) = built {
                assert_eq!(event.ad_kind(), kind);
                assert_eq!(event.confirmation_kind(), confirmation);
                assert_eq!(event.ad_identifier(), "ad-1");
                assert_eq!(event.timestamp(), epoch());
            }
            checked += 1;
        }
    }
    assert_eq!(checked, AdKind::COUNT * ConfirmationKind::COUNT);
}

#[test]
fn factory_refuses_mismatched_kind() {
    let ad = candidate(AdKind::Notification, "ad-1");
    for &kind in AdKind::all() {
        if kind != AdKind::Notification {
            assert!(AdEventFactory::build(kind, ConfirmationKind::Viewed, &ad, epoch()).is_none());
        }
    }
}
