//! # Order Edit/Cancel Window
//!
//! A placed order can be changed or cancelled for a short time after it is
//! created.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   place_order ──► Editable ──── window elapses ────► Locked             │
//! │                      │                                 (terminal)       │
//! │                      │ cancel()                                         │
//! │                      ▼                                                  │
//! │                  Cancelled (terminal)                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Remaining time is always derived from the creation timestamp and the
//! wall clock, never from a local countdown, so it stays correct across
//! suspends and reloads. Once expired it never re-opens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::WindowError;

/// Ten minutes.
pub const DEFAULT_EDIT_WINDOW_SECS: i64 = 600;

// =============================================================================
// Window
// =============================================================================

/// Snapshot of the window at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EditWindowState {
    pub remaining_seconds: i64,
    pub expired: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderEditWindow {
    #[ts(as = "String")]
    pub order_created_at: DateTime<Utc>,
    pub window_seconds: i64,
}

impl OrderEditWindow {
    pub fn new(order_created_at: DateTime<Utc>, window_seconds: i64) -> Self {
        OrderEditWindow {
            order_created_at,
            window_seconds: window_seconds.max(0),
        }
    }

    /// `max(0, window - elapsed)`. A clock earlier than the creation time
    /// counts as zero elapsed.
    pub fn remaining_seconds_at(&self, now: DateTime<Utc>) -> i64 {
        let elapsed = (now - self.order_created_at).num_seconds().max(0);
        (self.window_seconds - elapsed).max(0)
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> EditWindowState {
        let remaining_seconds = self.remaining_seconds_at(now);
        EditWindowState {
            remaining_seconds,
            expired: remaining_seconds <= 0,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.order_created_at + chrono::Duration::seconds(self.window_seconds)
    }
}

/// Window state for an order created at `order_created_at`, using the
/// default window and the current time.
pub fn get_edit_window_state(order_created_at: DateTime<Utc>) -> EditWindowState {
    OrderEditWindow::new(order_created_at, DEFAULT_EDIT_WINDOW_SECS).state_at(Utc::now())
}

// =============================================================================
// Lifecycle
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Editable,
    Locked,
    Cancelled,
}

/// The window plus the explicit cancellation outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLifecycle {
    pub window: OrderEditWindow,

    #[ts(as = "Option<String>")]
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl OrderLifecycle {
    pub fn new(window: OrderEditWindow) -> Self {
        OrderLifecycle {
            window,
            cancelled_at: None,
        }
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> OrderState {
        if self.cancelled_at.is_some() {
            OrderState::Cancelled
        } else if self.window.state_at(now).expired {
            OrderState::Locked
        } else {
            OrderState::Editable
        }
    }

    /// Succeeds only while the order is editable.
    pub fn ensure_editable(&self, now: DateTime<Utc>) -> Result<EditWindowState, WindowError> {
        match self.state_at(now) {
            OrderState::Editable => Ok(self.window.state_at(now)),
            OrderState::Locked => Err(WindowError::Locked),
            OrderState::Cancelled => Err(WindowError::AlreadyCancelled),
        }
    }

    /// Moves an editable order to `Cancelled`.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), WindowError> {
        self.ensure_editable(now)?;
        self.cancelled_at = Some(now);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_fresh_order_has_full_window() {
        let window = OrderEditWindow::new(created(), 600);
        let state = window.state_at(created());
        assert_eq!(state.remaining_seconds, 600);
        assert!(!state.expired);
    }

    #[test]
    fn test_expired_one_second_after_window() {
        let window = OrderEditWindow::new(created(), 600);
        let state = window.state_at(created() + Duration::seconds(601));
        assert_eq!(state, EditWindowState { remaining_seconds: 0, expired: true });
    }

    #[test]
    fn test_exactly_at_boundary_is_expired() {
        let window = OrderEditWindow::new(created(), 600);
        assert!(window.state_at(created() + Duration::seconds(600)).expired);
        assert_eq!(window.expires_at(), created() + Duration::minutes(10));
    }

    #[test]
    fn test_remaining_is_monotonic() {
        let window = OrderEditWindow::new(created(), 60);
        let mut last = i64::MAX;
        for s in 0..120 {
            let remaining = window.remaining_seconds_at(created() + Duration::seconds(s));
            assert!(remaining <= last);
            last = remaining;
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn test_clock_before_creation_counts_as_zero_elapsed() {
        let window = OrderEditWindow::new(created(), 600);
        assert_eq!(window.remaining_seconds_at(created() - Duration::seconds(30)), 600);
    }

    #[test]
    fn test_get_edit_window_state_uses_wall_clock() {
        let state = get_edit_window_state(Utc::now());
        assert!(!state.expired);
        assert!(state.remaining_seconds >= DEFAULT_EDIT_WINDOW_SECS - 1);

        let old = Utc::now() - Duration::seconds(DEFAULT_EDIT_WINDOW_SECS + 1);
        let state = get_edit_window_state(old);
        assert!(state.expired);
        assert_eq!(state.remaining_seconds, 0);
    }

    #[test]
    fn test_cancel_while_editable() {
        let mut lifecycle = OrderLifecycle::new(OrderEditWindow::new(created(), 600));
        let now = created() + Duration::seconds(120);
        assert_eq!(lifecycle.state_at(now), OrderState::Editable);

        lifecycle.cancel(now).unwrap();
        assert_eq!(lifecycle.state_at(now), OrderState::Cancelled);
        // Cancelled stays cancelled after the window would have expired
        assert_eq!(lifecycle.state_at(created() + Duration::hours(1)), OrderState::Cancelled);
        assert_eq!(lifecycle.cancel(now), Err(WindowError::AlreadyCancelled));
    }

    #[test]
    fn test_cancel_after_expiry_is_locked() {
        let mut lifecycle = OrderLifecycle::new(OrderEditWindow::new(created(), 600));
        let late = created() + Duration::seconds(900);
        assert_eq!(lifecycle.state_at(late), OrderState::Locked);
        assert_eq!(lifecycle.cancel(late), Err(WindowError::Locked));
        assert!(lifecycle.cancelled_at.is_none());
    }
}
