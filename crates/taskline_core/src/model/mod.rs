//! Domain model for tasks, date entries and projects.
//!
//! # Responsibility
//! - Define canonical record shapes used by services and repositories.
//! - Own the canonical date type every other layer exchanges.
//!
//! # Invariants
//! - Every record is identified by a stable `RecordId`.
//! - Dates are `CanonicalDate` values, never free-form strings.

pub mod date;
pub mod date_entry;
pub mod ids;
pub mod project;
pub mod task;
pub mod validation;
