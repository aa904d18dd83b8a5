#![deny(missing_docs)]

//! # adgate-core — Foundational Types for the Ad Admission Engine
//!
//! Types every other adgate crate depends on. No internal crate
//! dependencies; only `serde`, `thiserror`, `chrono` and `parking_lot` from
//! the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Closed kind enums.** [`AdKind`] and [`ConfirmationKind`] are the only
//!    definitions of ad surfaces and lifecycle signals; exhaustive `match`
//!    everywhere.
//!
//! 2. **Injected time.** Nothing reads the system clock except
//!    [`SystemClock`]. Rules and the delivery path take "now" from a
//!    [`Clock`], so tests drive time explicitly with [`ManualClock`].
//!
//! 3. **Structured errors.** [`ValidationError`], [`ConfigError`] and
//!    [`ParseKindError`] are built with `thiserror`; no `.unwrap()` outside
//!    tests.

pub mod domain;
pub mod error;
pub mod segment;
pub mod temporal;

// Re-export primary types at crate root for ergonomic imports.
pub use domain::{AdKind, ConfirmationKind};
pub use error::{ConfigError, ParseKindError, ValidationError};
pub use segment::Segment;
pub use temporal::{window_start, Clock, ManualClock, SystemClock};
