//! # Ad Delivery Orchestrator
//!
//! Decides whether a candidate ad may be shown and, if so, records it,
//! reports an anonymized impression signal and hands it to the display.
//!
//! ## Pipeline
//!
//! 1. Validate the candidate. Invalid candidates are `Rejected` and leave
//!    no trace in the log.
//! 2. Lock the event log, read the clock and evaluate the rule chain.
//! 3. Append a `Viewed` event while still holding the lock.
//! 4. Release the lock, then report the signal and show the ad.
//!
//! Steps 2 and 3 form one critical section, so two concurrent deliveries
//! can never both pass the same cap. The append completes before the ad is
//! displayed: an ad that was shown has always been counted.
//!
//! ## Failure Policy
//!
//! - Storage failure: the delivery fails and nothing is displayed.
//! - Out-of-order timestamp (clock moved backwards): the event is dropped
//!   with a warning and delivery continues.
//! - Signal reporting failure: logged and swallowed.

use std::sync::Arc;

use adgate_core::{AdKind, Clock, ConfirmationKind, ValidationError};
use parking_lot::Mutex;
use thiserror::Error;

use crate::ad::CandidateAd;
use crate::chain::{Denial, PermissionRuleChain, Verdict};
use crate::factory::AdEventFactory;
use crate::log::{EventLog, LogError};
use crate::signal::impression_signal;
use crate::store::EventStore;
use crate::traits::{AdDisplay, SignalReporter};

// ---------------------------------------------------------------------------
// Outcomes and errors
// ---------------------------------------------------------------------------

/// Result of a delivery attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The ad was recorded, reported and shown.
    Delivered,
    /// A permission rule denied the ad.
    Suppressed(Denial),
    /// The candidate failed validation.
    Rejected(ValidationError),
}

/// Errors from the delivery orchestrator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The event log could not record the event.
    #[error("event log error: {0}")]
    Log(#[from] LogError),

    /// The candidate failed validation.
    #[error("invalid candidate: {0}")]
    Validation(#[from] ValidationError),

    /// The surface cannot emit this confirmation.
    #[error("{ad_kind} ads do not support {confirmation_kind} events")]
    UnsupportedEvent {
        /// Kind of the candidate.
        ad_kind: AdKind,
        /// Requested confirmation.
        confirmation_kind: ConfirmationKind,
    },
}

// ---------------------------------------------------------------------------
// AdDeliveryOrchestrator
// ---------------------------------------------------------------------------

/// Admission and delivery pipeline over an event log.
pub struct AdDeliveryOrchestrator<S, C, D, R>
where
    S: EventStore,
    C: Clock,
    D: AdDisplay,
    R: SignalReporter,
{
    log: Mutex<EventLog<S>>,
    chain: PermissionRuleChain,
    clock: Arc<C>,
    display: D,
    reporter: R,
}

impl<S, C, D, R> AdDeliveryOrchestrator<S, C, D, R>
where
    S: EventStore,
    C: Clock,
    D: AdDisplay,
    R: SignalReporter,
{
    /// Assemble an orchestrator from an opened log and its collaborators.
    pub fn new(
        log: EventLog<S>,
        chain: PermissionRuleChain,
        clock: Arc<C>,
        display: D,
        reporter: R,
    ) -> Self {
        Self {
            log: Mutex::new(log),
            chain,
            clock,
            display,
            reporter,
        }
    }

    /// Try to deliver `candidate`.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Log`] if the view could not be persisted.
    /// The ad is not displayed in that case.
    pub fn maybe_deliver(&self, candidate: &CandidateAd) -> Result<DeliveryOutcome, DeliveryError> {
        let segment = match candidate.validate().and_then(|()| candidate.segment()) {
            Ok(segment) => segment,
            Err(e) => {
                tracing::debug!(
                    ad_id = %candidate.ad_identifier,
                    error = %e,
                    "candidate rejected"
                );
                return Ok(DeliveryOutcome::Rejected(e));
            }
        };
        let ad_kind = candidate.ad_kind();

        {
            let mut log = self.log.lock();
            let now = self.clock.now();

            if let Verdict::Denied(denial) = self.chain.evaluate(candidate, &*log, now) {
                return Ok(DeliveryOutcome::Suppressed(denial));
            }

            let event = AdEventFactory::build(ad_kind, ConfirmationKind::Viewed, candidate, now)
                .ok_or(DeliveryError::UnsupportedEvent {
                    ad_kind,
                    confirmation_kind: ConfirmationKind::Viewed,
                })?;

            match log.append(event) {
                Ok(()) => {}
                Err(e @ LogError::OutOfOrder { .. }) => {
                    tracing::warn!(
                        ad_id = %candidate.ad_identifier,
                        error = %e,
                        "dropping out-of-order view event"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        ad_id = %candidate.ad_identifier,
                        error = %e,
                        "failed to record view; ad not delivered"
                    );
                    return Err(e.into());
                }
            }
        }

        let signal = impression_signal(ad_kind, &segment);
        if let Err(e) = self.reporter.report(&signal) {
            tracing::warn!(signal = %signal.name, error = %e, "impression signal not reported");
        }

        self.display.show(candidate);
        tracing::info!(
            ad_id = %candidate.ad_identifier,
            ad_kind = %ad_kind,
            "ad delivered"
        );
        Ok(DeliveryOutcome::Delivered)
    }

    /// Record a later lifecycle event (click, dismissal, landing, conversion)
    /// for `candidate`.
    ///
    /// # Errors
    ///
    /// - [`DeliveryError::Validation`] if the candidate is invalid.
    /// - [`DeliveryError::UnsupportedEvent`] if the surface cannot emit
    ///   `confirmation_kind`.
    /// - [`DeliveryError::Log`] if the event could not be appended,
    ///   including out-of-order timestamps.
    pub fn record_confirmation(
        &self,
        candidate: &CandidateAd,
        confirmation_kind: ConfirmationKind,
    ) -> Result<(), DeliveryError> {
        candidate.validate()?;
        let ad_kind = candidate.ad_kind();

        let mut log = self.log.lock();
        let now = self.clock.now();
        let event = AdEventFactory::build(ad_kind, confirmation_kind, candidate, now).ok_or(
            DeliveryError::UnsupportedEvent {
                ad_kind,
                confirmation_kind,
            },
        )?;
        log.append(event)?;

        tracing::info!(
            ad_id = %candidate.ad_identifier,
            ad_kind = %ad_kind,
            confirmation_kind = %confirmation_kind,
            "ad confirmation recorded"
        );
        Ok(())
    }

    /// Drop all recorded history, e.g. when the user clears browsing data.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Log`] if the store could not be cleared.
    pub fn reset_history(&self) -> Result<(), DeliveryError> {
        self.log.lock().reset()?;
        Ok(())
    }

    /// Number of events in the log.
    pub fn history_len(&self) -> usize {
        self.log.lock().len()
    }

    /// The configured rule chain.
    pub fn chain(&self) -> &PermissionRuleChain {
        &self.chain
    }

    /// The display collaborator.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// The signal reporter collaborator.
    pub fn reporter(&self) -> &R {
        &self.reporter
    }
}

impl<S, C, D, R> std::fmt::Debug for AdDeliveryOrchestrator<S, C, D, R>
where
    S: EventStore,
    C: Clock,
    D: AdDisplay,
    R: SignalReporter,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdDeliveryOrchestrator")
            .field("rules", &self.chain.len())
            .field("history_len", &self.history_len())
            .finish()
    }
}
