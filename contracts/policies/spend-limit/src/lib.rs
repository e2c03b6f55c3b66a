//! Spend Limit Policy for OtpKit
//!
//! Caps how much a wallet may send within one spending window. The active
//! window starts at `floor(now / interval) * interval`; the spent amount
//! resets to zero whenever a transfer lands in a later window than the one
//! recorded in [`SpendLimitState`].

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendLimitError {
    #[error("Transfer of {amount} exceeds spending limit ({spent} of {limit} already spent)")]
    ExceedsLimit { spent: u128, amount: u128, limit: u128 },
}

/// Spending state tracked per wallet.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct SpendLimitState {
    /// Amount sent in the current window, in base units
    pub spent_amount: u128,
    /// Start of the window `spent_amount` belongs to, in seconds
    pub current_window_start: u64,
}

/// Policy parameters, fixed at deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpendLimitConfig {
    pub limit: u128,
    /// Window length in seconds. Zero means a single window that never rolls over.
    pub interval: u64,
}

impl SpendLimitConfig {
    pub fn window_start(&self, now: u64) -> u64 {
        if self.interval == 0 {
            0
        } else {
            now / self.interval * self.interval
        }
    }

    /// State as seen at `now`, with the window advanced if it rolled over.
    pub fn rolled(&self, state: &SpendLimitState, now: u64) -> SpendLimitState {
        let window = self.window_start(now);
        if window > state.current_window_start {
            SpendLimitState {
                spent_amount: 0,
                current_window_start: window,
            }
        } else {
            *state
        }
    }

    pub fn remaining(&self, state: &SpendLimitState, now: u64) -> u128 {
        self.limit
            .saturating_sub(self.rolled(state, now).spent_amount)
    }

    /// Checks a transfer of `amount` at `now` and returns the state to commit
    /// if it goes through. The input state is never modified.
    pub fn check_transfer(
        &self,
        state: &SpendLimitState,
        amount: u128,
        now: u64,
    ) -> Result<SpendLimitState, SpendLimitError> {
        let current = self.rolled(state, now);
        if current.current_window_start != state.current_window_start {
            debug!(
                window = current.current_window_start,
                "spending window rolled over"
            );
        }
        let total = current
            .spent_amount
            .checked_add(amount)
            .filter(|total| *total <= self.limit)
            .ok_or(SpendLimitError::ExceedsLimit {
                spent: current.spent_amount,
                amount,
                limit: self.limit,
            })?;
        Ok(SpendLimitState {
            spent_amount: total,
            current_window_start: current.current_window_start,
        })
    }
}

pub struct SpendLimitBuilder {
    limit: u128,
    interval: u64,
}

impl SpendLimitBuilder {
    pub fn new() -> Self {
        Self {
            limit: 0,
            interval: 0,
        }
    }

    pub fn limit(mut self, amount: u128) -> Self {
        self.limit = amount;
        self
    }

    pub fn interval(mut self, seconds: u64) -> Self {
        self.interval = seconds;
        self
    }

    pub fn build(self) -> SpendLimitConfig {
        SpendLimitConfig {
            limit: self.limit,
            interval: self.interval,
        }
    }

    /// Initial state for a wallet deployed at `now`.
    pub fn build_state(&self, now: u64) -> SpendLimitState {
        SpendLimitState {
            spent_amount: 0,
            current_window_start: SpendLimitConfig {
                limit: self.limit,
                interval: self.interval,
            }
            .window_start(now),
        }
    }
}

impl Default for SpendLimitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 86_400;

    fn policy() -> SpendLimitConfig {
        SpendLimitBuilder::new().limit(100).interval(DAY).build()
    }

    #[test_log::test]
    fn accumulates_within_window() {
        let p = policy();
        let s = SpendLimitState::default();
        let s = p.check_transfer(&s, 40, 10).unwrap();
        let s = p.check_transfer(&s, 60, 20).unwrap();
        assert_eq!(s.spent_amount, 100);
        assert_eq!(p.remaining(&s, 30), 0);
    }

    #[test_log::test]
    fn rejects_over_limit_without_touching_state() {
        let p = policy();
        let s = p.check_transfer(&SpendLimitState::default(), 90, 10).unwrap();
        let err = p.check_transfer(&s, 11, 20).unwrap_err();
        assert_eq!(
            err,
            SpendLimitError::ExceedsLimit {
                spent: 90,
                amount: 11,
                limit: 100
            }
        );
        assert_eq!(s.spent_amount, 90);
    }

    #[test_log::test]
    fn resets_when_window_rolls_over() {
        let p = policy();
        let s = p.check_transfer(&SpendLimitState::default(), 100, DAY - 1).unwrap();
        assert_eq!(s.current_window_start, 0);
        let s = p.check_transfer(&s, 70, DAY + 5).unwrap();
        assert_eq!(s.spent_amount, 70);
        assert_eq!(s.current_window_start, DAY);
    }

    #[test_log::test]
    fn zero_interval_never_rolls_over() {
        let p = SpendLimitBuilder::new().limit(10).build();
        let s = p.check_transfer(&SpendLimitState::default(), 10, 5).unwrap();
        assert!(p.check_transfer(&s, 1, 10 * DAY).is_err());
    }

    #[test_log::test]
    fn builder_state_aligns_to_window() {
        let b = SpendLimitBuilder::new().limit(1).interval(DAY);
        assert_eq!(b.build_state(DAY * 3 + 17).current_window_start, DAY * 3);
    }
}
