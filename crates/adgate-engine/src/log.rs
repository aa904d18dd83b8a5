//! # Event Log
//!
//! Append-only, time-ordered history of [`AdEvent`]s, persisted through an
//! [`EventStore`] and mirrored in memory for queries.
//!
//! ## Ordering Invariant
//!
//! Within one [`AdKind`], timestamps never decrease. An append whose
//! timestamp is strictly earlier than the last event of the same kind is
//! rejected with [`LogError::OutOfOrder`] rather than silently accepted.
//! Equal timestamps are allowed.
//!
//! ## Index
//!
//! Events are kept in insertion order plus a per-kind list of positions.
//! Because each per-kind list is time-ordered, a window query binary-searches
//! its start and only walks events inside the window. Counts always equal
//! what a full linear scan would return.
//!
//! ## Persistence
//!
//! Each event is stored as JSON under `ad_event/{sequence:020}`, so the
//! store's ascending key order is the insertion order. [`EventLog::open`]
//! rebuilds the index by scanning that prefix.

use std::collections::{BTreeMap, HashMap};

use adgate_core::{AdKind, ConfirmationKind};
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::event::AdEvent;
use crate::store::{EventStore, StoreError};

/// Key prefix under which ad events are persisted.
pub const EVENT_KEY_PREFIX: &str = "ad_event/";

// ---------------------------------------------------------------------------
// LogError
// ---------------------------------------------------------------------------

/// Errors raised by the event log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogError {
    /// The event is older than the last recorded event of its kind.
    #[error("out-of-order {ad_kind} event at {timestamp} (last recorded at {last})")]
    OutOfOrder {
        /// Kind of the rejected event.
        ad_kind: AdKind,
        /// Timestamp of the rejected event.
        timestamp: DateTime<Utc>,
        /// Timestamp of the latest recorded event of that kind.
        last: DateTime<Utc>,
    },

    /// The persistence write or scan failed.
    #[error("storage failure: {0}")]
    StorageFailure(#[from] StoreError),

    /// A persisted record could not be decoded or violates ordering.
    #[error("corrupt event record at \"{key}\": {reason}")]
    Corrupt {
        /// Store key of the offending record.
        key: String,
        /// What was wrong with it.
        reason: String,
    },

    /// An event could not be encoded for storage.
    #[error("event serialization failed: {0}")]
    Serialization(String),
}

// ---------------------------------------------------------------------------
// EventHistory
// ---------------------------------------------------------------------------

/// Read access to ad event history, as seen by permission rules.
pub trait EventHistory {
    /// Count events with `timestamp >= since`, filtered by the optional
    /// kinds (`None` means no filter on that axis).
    fn count_since(
        &self,
        ad_kind: Option<AdKind>,
        confirmation_kind: Option<ConfirmationKind>,
        since: DateTime<Utc>,
    ) -> usize;

    /// Count events for one ad identifier with `timestamp >= since`.
    fn count_for_ad_since(
        &self,
        ad_identifier: &str,
        confirmation_kind: Option<ConfirmationKind>,
        since: DateTime<Utc>,
    ) -> usize;

    /// Count events for ads of one creative set with `timestamp >= since`.
    fn count_for_creative_set_since(
        &self,
        creative_set_id: &str,
        confirmation_kind: Option<ConfirmationKind>,
        since: DateTime<Utc>,
    ) -> usize;

    /// The latest event matching the optional kinds.
    fn most_recent(
        &self,
        ad_kind: Option<AdKind>,
        confirmation_kind: Option<ConfirmationKind>,
    ) -> Option<&AdEvent>;
}

// ---------------------------------------------------------------------------
// EventLog
// ---------------------------------------------------------------------------

/// Append-only ad event log over a keyed store.
pub struct EventLog<S: EventStore> {
    store: S,
    events: Vec<AdEvent>,
    by_kind: BTreeMap<AdKind, Vec<usize>>,
    by_ad: HashMap<String, Vec<usize>>,
    by_creative_set: HashMap<String, Vec<usize>>,
    next_sequence: u64,
}

impl<S: EventStore> EventLog<S> {
    /// Open a log over `store`, loading every persisted event.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::StorageFailure`] if the scan fails and
    /// [`LogError::Corrupt`] if a record does not decode, has a malformed
    /// key, or breaks the per-kind ordering invariant.
    pub fn open(store: S) -> Result<Self, LogError> {
        let mut log = Self {
            store,
            events: Vec::new(),
            by_kind: BTreeMap::new(),
            by_ad: HashMap::new(),
            by_creative_set: HashMap::new(),
            next_sequence: 0,
        };

        for (key, value) in log.store.scan(EVENT_KEY_PREFIX)? {
            let sequence = parse_sequence(&key)?;
            let event: AdEvent =
                serde_json::from_slice(&value).map_err(|e| LogError::Corrupt {
                    key: key.clone(),
                    reason: e.to_string(),
                })?;
            if let Some(last) = log.last_timestamp(event.ad_kind()) {
                if event.timestamp() < last {
                    return Err(LogError::Corrupt {
                        key,
                        reason: format!(
                            "{} event at {} precedes earlier record at {last}",
                            event.ad_kind(),
                            event.timestamp()
                        ),
                    });
                }
            }
            log.index(event);
            log.next_sequence = sequence.saturating_add(1);
        }

        tracing::debug!(events = log.events.len(), "event log opened");
        Ok(log)
    }

    /// Append an event.
    ///
    /// The store write happens first; the in-memory index is only updated
    /// once the write succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::OutOfOrder`] if the event is older than the last
    /// event of its kind, [`LogError::Serialization`] if it cannot be
    /// encoded, and [`LogError::StorageFailure`] if the store write fails.
    pub fn append(&mut self, event: AdEvent) -> Result<(), LogError> {
        if let Some(last) = self.last_timestamp(event.ad_kind()) {
            if event.timestamp() < last {
                return Err(LogError::OutOfOrder {
                    ad_kind: event.ad_kind(),
                    timestamp: event.timestamp(),
                    last,
                });
            }
        }

        let value = serde_json::to_vec(&event).map_err(|e| LogError::Serialization(e.to_string()))?;
        let key = event_key(self.next_sequence);
        self.store.put(&key, value)?;

        tracing::debug!(
            key = %key,
            ad_kind = %event.ad_kind(),
            confirmation_kind = %event.confirmation_kind(),
            "ad event appended"
        );
        self.next_sequence = self.next_sequence.saturating_add(1);
        self.index(event);
        Ok(())
    }

    /// Remove every event from the store and the index.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::StorageFailure`] if the store cannot be cleared;
    /// the in-memory history is left untouched in that case.
    pub fn reset(&mut self) -> Result<(), LogError> {
        self.store.clear(EVENT_KEY_PREFIX)?;
        let removed = self.events.len();
        self.events.clear();
        self.by_kind.clear();
        self.by_ad.clear();
        self.by_creative_set.clear();
        self.next_sequence = 0;
        tracing::warn!(removed, "ad event history reset");
        Ok(())
    }

    /// All events in insertion order.
    pub fn events(&self) -> &[AdEvent] {
        &self.events
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timestamp of the latest event of `ad_kind`.
    pub fn last_timestamp(&self, ad_kind: AdKind) -> Option<DateTime<Utc>> {
        self.by_kind
            .get(&ad_kind)
            .and_then(|positions| positions.last())
            .map(|&i| self.events[i].timestamp())
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn index(&mut self, event: AdEvent) {
        let position = self.events.len();
        self.by_kind.entry(event.ad_kind()).or_default().push(position);
        self.by_ad
            .entry(event.ad_identifier().to_string())
            .or_default()
            .push(position);
        self.by_creative_set
            .entry(event.creative_set_id().to_string())
            .or_default()
            .push(position);
        self.events.push(event);
    }

    fn count_positions_since(
        &self,
        positions: Option<&Vec<usize>>,
        confirmation_kind: Option<ConfirmationKind>,
        since: DateTime<Utc>,
    ) -> usize {
        positions.map_or(0, |positions| {
            positions
                .iter()
                .map(|&i| &self.events[i])
                .filter(|e| e.timestamp() >= since && e.matches(None, confirmation_kind))
                .count()
        })
    }

    fn positions_for(&self, ad_kind: Option<AdKind>) -> Vec<&[usize]> {
        match ad_kind {
            Some(kind) => self
                .by_kind
                .get(&kind)
                .map(|positions| vec![positions.as_slice()])
                .unwrap_or_default(),
            None => self.by_kind.values().map(Vec::as_slice).collect(),
        }
    }
}

impl<S: EventStore> EventHistory for EventLog<S> {
    fn count_since(
        &self,
        ad_kind: Option<AdKind>,
        confirmation_kind: Option<ConfirmationKind>,
        since: DateTime<Utc>,
    ) -> usize {
        self.positions_for(ad_kind)
            .into_iter()
            .map(|positions| {
                let start = positions.partition_point(|&i| self.events[i].timestamp() < since);
                positions[start..]
                    .iter()
                    .filter(|&&i| self.events[i].matches(None, confirmation_kind))
                    .count()
            })
            .sum()
    }

    fn count_for_ad_since(
        &self,
        ad_identifier: &str,
        confirmation_kind: Option<ConfirmationKind>,
        since: DateTime<Utc>,
    ) -> usize {
        self.count_positions_since(self.by_ad.get(ad_identifier), confirmation_kind, since)
    }

    fn count_for_creative_set_since(
        &self,
        creative_set_id: &str,
        confirmation_kind: Option<ConfirmationKind>,
        since: DateTime<Utc>,
    ) -> usize {
        self.count_positions_since(
            self.by_creative_set.get(creative_set_id),
            confirmation_kind,
            since,
        )
    }

    fn most_recent(
        &self,
        ad_kind: Option<AdKind>,
        confirmation_kind: Option<ConfirmationKind>,
    ) -> Option<&AdEvent> {
        self.positions_for(ad_kind)
            .into_iter()
            .filter_map(|positions| {
                positions
                    .iter()
                    .rev()
                    .map(|&i| &self.events[i])
                    .find(|e| e.matches(None, confirmation_kind))
            })
            .max_by_key(|e| e.timestamp())
    }
}

impl<S: EventStore> std::fmt::Debug for EventLog<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("events", &self.events.len())
            .field("next_sequence", &self.next_sequence)
            .finish()
    }
}

fn event_key(sequence: u64) -> String {
    format!("{EVENT_KEY_PREFIX}{sequence:020}")
}

fn parse_sequence(key: &str) -> Result<u64, LogError> {
    key.strip_prefix(EVENT_KEY_PREFIX)
        .and_then(|raw| raw.parse::<u64>().ok())
        .ok_or_else(|| LogError::Corrupt {
            key: key.to_string(),
            reason: "key does not carry a sequence number".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ad::fixtures::{new_tab_page, notification};
    use crate::factory::AdEventFactory;
    use crate::store::InMemoryEventStore;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    fn viewed(kind: AdKind, id: &str, at: DateTime<Utc>) -> AdEvent {
        let ad = match kind {
            AdKind::NewTabPageAd => new_tab_page(id, "travel"),
            _ => notification(id, "travel"),
        };
        AdEventFactory::build(ad.ad_kind(), ConfirmationKind::Viewed, &ad, at).unwrap()
    }

    fn empty_log() -> EventLog<InMemoryEventStore> {
        EventLog::open(InMemoryEventStore::new()).unwrap()
    }

    #[test]
    fn empty_log_counts_zero() {
        let log = empty_log();
        assert!(log.is_empty());
        assert_eq!(log.count_since(None, None, DateTime::<Utc>::MIN_UTC), 0);
        assert!(log.most_recent(None, None).is_none());
    }

    #[test]
    fn append_then_count() {
        let mut log = empty_log();
        log.append(viewed(AdKind::Notification, "a", t0())).unwrap();
        assert_eq!(
            log.count_since(
                Some(AdKind::Notification),
                Some(ConfirmationKind::Viewed),
                t0()
            ),
            1
        );
        assert_eq!(log.count_since(Some(AdKind::NewTabPageAd), None, t0()), 0);
        assert_eq!(log.count_since(None, Some(ConfirmationKind::Clicked), t0()), 0);
    }

    #[test]
    fn window_start_is_inclusive() {
        let mut log = empty_log();
        log.append(viewed(AdKind::Notification, "a", t0())).unwrap();
        assert_eq!(log.count_since(None, None, t0()), 1);
        assert_eq!(log.count_since(None, None, t0() + Duration::nanoseconds(1)), 0);
    }

    #[test]
    fn out_of_order_rejected_per_kind() {
        let mut log = empty_log();
        log.append(viewed(AdKind::Notification, "a", t0())).unwrap();

        let err = log
            .append(viewed(AdKind::Notification, "b", t0() - Duration::seconds(1)))
            .unwrap_err();
        assert!(matches!(err, LogError::OutOfOrder { .. }));
        assert_eq!(log.len(), 1);

        // Another kind has its own ordering.
        log.append(viewed(AdKind::NewTabPageAd, "c", t0() - Duration::seconds(1)))
            .unwrap();
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn equal_timestamps_accepted() {
        let mut log = empty_log();
        log.append(viewed(AdKind::Notification, "a", t0())).unwrap();
        log.append(viewed(AdKind::Notification, "b", t0())).unwrap();
        assert_eq!(log.count_since(None, None, t0()), 2);
    }

    #[test]
    fn count_for_ad_filters_identifier() {
        let mut log = empty_log();
        log.append(viewed(AdKind::Notification, "a", t0())).unwrap();
        log.append(viewed(AdKind::Notification, "b", t0())).unwrap();
        log.append(viewed(AdKind::Notification, "a", t0() + Duration::minutes(5)))
            .unwrap();
        assert_eq!(log.count_for_ad_since("a", None, t0()), 2);
        assert_eq!(
            log.count_for_ad_since("a", None, t0() + Duration::minutes(1)),
            1
        );
        assert_eq!(log.count_for_ad_since("missing", None, t0()), 0);
    }

    #[test]
    fn count_for_creative_set_spans_ads() {
        let mut log = empty_log();
        log.append(viewed(AdKind::Notification, "a", t0())).unwrap();
        log.append(viewed(AdKind::Notification, "b", t0())).unwrap();
        log.append(viewed(AdKind::NewTabPageAd, "c", t0())).unwrap();
        assert_eq!(log.count_for_creative_set_since("creative-set-1", None, t0()), 2);
        assert_eq!(log.count_for_creative_set_since("creative-set-2", None, t0()), 1);
        assert_eq!(
            log.count_for_creative_set_since(
                "creative-set-1",
                Some(ConfirmationKind::Clicked),
                t0()
            ),
            0
        );
    }

    #[test]
    fn most_recent_across_kinds() {
        let mut log = empty_log();
        log.append(viewed(AdKind::Notification, "a", t0())).unwrap();
        log.append(viewed(AdKind::NewTabPageAd, "b", t0() + Duration::minutes(2)))
            .unwrap();
        assert_eq!(log.most_recent(None, None).unwrap().ad_identifier(), "b");
        assert_eq!(
            log.most_recent(Some(AdKind::Notification), None)
                .unwrap()
                .ad_identifier(),
            "a"
        );
    }

    #[test]
    fn reopen_restores_history() {
        let mut log = empty_log();
        log.append(viewed(AdKind::Notification, "a", t0())).unwrap();
        log.append(viewed(AdKind::NewTabPageAd, "b", t0())).unwrap();
        let store = log.store().clone();

        let mut reopened = EventLog::open(store).unwrap();
        assert_eq!(reopened.events(), log.events());

        // Sequence continues after the last persisted key.
        reopened
            .append(viewed(AdKind::Notification, "c", t0()))
            .unwrap();
        assert_eq!(reopened.store().len(), 3);
    }

    #[test]
    fn open_rejects_corrupt_record() {
        let mut store = InMemoryEventStore::new();
        store.put(&event_key(0), b"{not json".to_vec()).unwrap();
        let err = EventLog::open(store).unwrap_err();
        assert!(matches!(err, LogError::Corrupt { .. }));
    }

    #[test]
    fn open_rejects_malformed_key() {
        let mut store = InMemoryEventStore::new();
        let value = serde_json::to_vec(&viewed(AdKind::Notification, "a", t0())).unwrap();
        store.put("ad_event/abc", value).unwrap();
        let err = EventLog::open(store).unwrap_err();
        assert!(matches!(err, LogError::Corrupt { .. }));
    }

    #[test]
    fn reset_clears_everything() {
        let mut log = empty_log();
        log.append(viewed(AdKind::Notification, "a", t0())).unwrap();
        log.reset().unwrap();
        assert!(log.is_empty());
        assert!(log.store().is_empty());
        assert!(log.last_timestamp(AdKind::Notification).is_none());

        // Ordering restarts after a reset.
        log.append(viewed(AdKind::Notification, "b", t0() - Duration::days(1)))
            .unwrap();
        assert_eq!(log.len(), 1);
    }
}
