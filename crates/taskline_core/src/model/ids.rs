//! Record identity and injectable identity generation.
//!
//! # Invariants
//! - An id handed out by a generator is never handed out again by the same
//!   generator instance.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Stable identifier for tasks, date entries and projects.
pub type RecordId = Uuid;

/// Source of fresh record identities.
///
/// Services take this as a capability so tests can hand out predictable ids.
pub trait IdGenerator {
    fn next_id(&self) -> RecordId;
}

/// Random v4 UUIDs; the default for production callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> RecordId {
        Uuid::new_v4()
    }
}

/// Monotonic ids built from a counter (`00000000-...-000000000001`, ...).
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Starts handing out ids at `first`.
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> RecordId {
        let value = self.next.fetch_add(1, Ordering::Relaxed);
        Uuid::from_u128(u128::from(value))
    }
}
