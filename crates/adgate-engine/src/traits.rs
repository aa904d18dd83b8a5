//! # Host Collaborators
//!
//! The engine never talks to the UI or the measurement backend directly.
//! The host supplies an [`AdDisplay`] to surface admitted ads and a
//! [`SignalReporter`] to forward anonymized impression signals.
//!
//! [`RecordingDisplay`] and [`RecordingReporter`] capture calls in memory.
//! They are used by the test suites and are available to hosts that want to
//! inspect what the engine would have shown.

use parking_lot::Mutex;
use thiserror::Error;

use crate::ad::CandidateAd;
use crate::signal::Signal;

/// Failure forwarding a signal. The orchestrator logs it and carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// The reporting backend is not accepting signals.
    #[error("signal reporter unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected the signal.
    #[error("signal rejected: {0}")]
    Rejected(String),
}

/// Presents an admitted ad to the user.
pub trait AdDisplay: Send + Sync {
    /// Show `candidate`. Called only after the view has been recorded.
    fn show(&self, candidate: &CandidateAd);
}

/// Forwards anonymized impression signals.
pub trait SignalReporter: Send + Sync {
    /// Report `signal`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if the signal could not be forwarded.
    fn report(&self, signal: &Signal) -> Result<(), ReportError>;
}

// ---------------------------------------------------------------------------
// Recording doubles
// ---------------------------------------------------------------------------

/// [`AdDisplay`] that remembers every ad it was asked to show.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    shown: Mutex<Vec<CandidateAd>>,
}

impl RecordingDisplay {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ads shown so far, in call order.
    pub fn shown(&self) -> Vec<CandidateAd> {
        self.shown.lock().clone()
    }

    /// Number of ads shown.
    pub fn count(&self) -> usize {
        self.shown.lock().len()
    }
}

impl AdDisplay for RecordingDisplay {
    fn show(&self, candidate: &CandidateAd) {
        self.shown.lock().push(candidate.clone());
    }
}

/// [`SignalReporter`] that remembers every signal, optionally failing.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    reported: Mutex<Vec<Signal>>,
    failure: Option<ReportError>,
}

impl RecordingReporter {
    /// Create a reporter that accepts every signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reporter that records then rejects every signal with `error`.
    pub fn failing(error: ReportError) -> Self {
        Self {
            reported: Mutex::new(Vec::new()),
            failure: Some(error),
        }
    }

    /// Signals received so far, in call order.
    pub fn reported(&self) -> Vec<Signal> {
        self.reported.lock().clone()
    }
}

impl SignalReporter for RecordingReporter {
    fn report(&self, signal: &Signal) -> Result<(), ReportError> {
        self.reported.lock().push(signal.clone());
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl<T: AdDisplay + ?Sized> AdDisplay for std::sync::Arc<T> {
    fn show(&self, candidate: &CandidateAd) {
        (**self).show(candidate)
    }
}

impl<T: SignalReporter + ?Sized> SignalReporter for std::sync::Arc<T> {
    fn report(&self, signal: &Signal) -> Result<(), ReportError> {
        (**self).report(signal)
    }
}
