#![deny(missing_docs)]

//! # adgate-engine — Ad Admission and Delivery
//!
//! Decides whether a candidate ad may be shown, records what was shown, and
//! emits anonymized impression signals.
//!
//! ## Modules
//!
//! - [`ad`]: candidate ads and their kind-specific creatives.
//! - [`event`], [`factory`]: typed ad events and the table mapping
//!   `(AdKind, ConfirmationKind)` pairs to constructors.
//! - [`store`], [`log`]: the keyed persistence contract and the append-only,
//!   time-ordered event log built on it.
//! - [`rules`], [`chain`], [`config`]: frequency-cap permission rules, their
//!   ordered all-must-allow chain, and YAML/JSON configuration.
//! - [`signal`]: privacy-preserving impression question lists.
//! - [`traits`]: display and signal reporting collaborators.
//! - [`delivery`]: the orchestrator tying it together.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use adgate_core::SystemClock;
//! use adgate_engine::{
//!     AdDeliveryOrchestrator, CandidateAd, Creative, DeliveryOutcome, EventLog,
//!     InMemoryEventStore, RecordingDisplay, RecordingReporter, RuleSetConfig,
//! };
//!
//! let orchestrator = AdDeliveryOrchestrator::new(
//!     EventLog::open(InMemoryEventStore::new()).unwrap(),
//!     RuleSetConfig::standard().into_chain().unwrap(),
//!     Arc::new(SystemClock),
//!     RecordingDisplay::new(),
//!     RecordingReporter::new(),
//! );
//!
//! let ad = CandidateAd::new(
//!     "ad-1",
//!     "creative-set-1",
//!     "technology & computing-software",
//!     Creative::Notification {
//!         title: "Fast VPN".into(),
//!         body: "Browse privately".into(),
//!         target_url: "https://example.com".into(),
//!     },
//! );
//! assert_eq!(orchestrator.maybe_deliver(&ad).unwrap(), DeliveryOutcome::Delivered);
//! ```

pub mod ad;
pub mod chain;
pub mod config;
pub mod delivery;
pub mod event;
pub mod factory;
pub mod log;
pub mod rules;
pub mod signal;
pub mod store;
pub mod traits;

pub use ad::{CandidateAd, Creative};
pub use chain::{Denial, PermissionRuleChain, RuleEntry, Verdict};
pub use config::{RuleSetConfig, MAX_WINDOW_SECS};
pub use delivery::{AdDeliveryOrchestrator, DeliveryError, DeliveryOutcome};
pub use event::AdEvent;
pub use factory::AdEventFactory;
pub use log::{EventHistory, EventLog, LogError, EVENT_KEY_PREFIX};
pub use rules::{PermissionRule, RuleContext, RuleDecision};
pub use signal::{build_signal, impression_signal, Signal};
pub use store::{EventStore, InMemoryEventStore, StoreError};
pub use traits::{AdDisplay, RecordingDisplay, RecordingReporter, ReportError, SignalReporter};
