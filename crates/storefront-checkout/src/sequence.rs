//! # Request Sequencing
//!
//! Last-issued-wins ordering for overlapping lookups.
//!
//! ```text
//!  t0  geocode("12 Main")  ── ticket 1 ─────────────────────┐
//!  t1  geocode("14 Main")  ── ticket 2 ──────┐              │
//!  t2                                  result 2 (current) ──► applied
//!  t3                                                  result 1 (stale) ──► dropped
//! ```
//!
//! Each [`LookupKind`] has its own counter, so a slow promo lookup never
//! invalidates a geocode and vice versa.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Which counter a ticket belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Geocode,
    Promo,
}

/// Proof that a lookup was started, stamped with its issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    kind: LookupKind,
    seq: u64,
}

impl Ticket {
    pub fn kind(&self) -> LookupKind {
        self.kind
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Hands out monotonically increasing tickets per lookup kind.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    geocode: AtomicU64,
    promo: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, kind: LookupKind) -> &AtomicU64 {
        match kind {
            LookupKind::Geocode => &self.geocode,
            LookupKind::Promo => &self.promo,
        }
    }

    /// Issues a new ticket, superseding every earlier one of the same kind.
    pub fn issue(&self, kind: LookupKind) -> Ticket {
        let seq = self.counter(kind).fetch_add(1, Ordering::SeqCst) + 1;
        Ticket { kind, seq }
    }

    /// True while no newer ticket of the same kind has been issued.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.counter(ticket.kind).load(Ordering::SeqCst) == ticket.seq
    }
}

/// What became of a lookup's result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum LookupOutcome<T> {
    /// The result was written into the cart.
    Applied(T),

    /// A newer lookup of the same kind was issued first; nothing changed.
    Superseded,
}

impl<T> LookupOutcome<T> {
    pub fn is_superseded(&self) -> bool {
        matches!(self, LookupOutcome::Superseded)
    }

    pub fn applied(self) -> Option<T> {
        match self {
            LookupOutcome::Applied(value) => Some(value),
            LookupOutcome::Superseded => None,
        }
    }
}
