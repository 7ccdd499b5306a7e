//! Recurrence engine.
//!
//! # Responsibility
//! - Advance a canonical date by a recurrence period.
//! - Turn a completed recurring record into its next occurrence.
//!
//! # Invariants
//! - Everything here is pure; persistence of the transition belongs to the
//!   service layer.

pub mod period;
pub mod rollover;
