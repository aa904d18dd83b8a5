//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use std::num::NonZeroU32;
use std::sync::Arc;

use adgate_core::ManualClock;
use adgate_engine::{
    AdDeliveryOrchestrator, CandidateAd, Creative, EventLog, InMemoryEventStore,
    PermissionRuleChain, RecordingDisplay, RecordingReporter,
};
use chrono::{DateTime, TimeZone, Utc};

pub type TestOrchestrator =
    AdDeliveryOrchestrator<InMemoryEventStore, ManualClock, RecordingDisplay, RecordingReporter>;

/// Route engine logs through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Literal frequency cap.
pub fn cap(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap()
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap()
}

pub fn orchestrator(chain: PermissionRuleChain) -> (TestOrchestrator, Arc<ManualClock>) {
    init_tracing();
    let clock = Arc::new(ManualClock::new(start()));
    let orchestrator = AdDeliveryOrchestrator::new(
        EventLog::open(InMemoryEventStore::new()).unwrap(),
        chain,
        Arc::clone(&clock),
        RecordingDisplay::new(),
        RecordingReporter::new(),
    );
    (orchestrator, clock)
}

pub fn notification(id: &str, segment: &str) -> CandidateAd {
    CandidateAd::new(
        id,
        "cs-notification",
        segment,
        Creative::Notification {
            title: "Weekend deals".into(),
            body: "Up to 40% off city breaks".into(),
            target_url: "https://travel.example.com/deals".into(),
        },
    )
}

pub fn new_tab_page(id: &str, segment: &str) -> CandidateAd {
    CandidateAd::new(
        id,
        "cs-ntp",
        segment,
        Creative::NewTabPageAd {
            company_name: "Example Outdoors".into(),
            image_url: "https://cdn.example.com/ntp/forest.jpg".into(),
            alt: "Forest trail".into(),
            target_url: "https://outdoors.example.com".into(),
        },
    )
}

pub fn inline(id: &str, segment: &str) -> CandidateAd {
    CandidateAd::new(
        id,
        "cs-inline",
        segment,
        Creative::InlineContentAd {
            title: "Learn Rust".into(),
            description: "A hands-on course".into(),
            image_url: "https://cdn.example.com/inline/rust.png".into(),
            dimensions: "200x100".into(),
            cta_text: "Start now".into(),
            target_url: "https://learn.example.com/rust".into(),
        },
    )
}

pub fn promoted(id: &str, segment: &str) -> CandidateAd {
    CandidateAd::new(
        id,
        "cs-promoted",
        segment,
        Creative::PromotedContent {
            title: "Ten trails to hike this fall".into(),
            description: "Sponsored guide".into(),
            target_url: "https://outdoors.example.com/guide".into(),
        },
    )
}
