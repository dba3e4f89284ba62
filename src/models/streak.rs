// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Daily check-in streak state and its transition rule.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Persisted streak for one user.
///
/// Stored at: `streaks/{fid}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive days; 0 means the user never checked in.
    #[serde(default)]
    pub count: u32,
    /// Calendar day of the last check-in.
    #[serde(default)]
    pub last_check_in_date: Option<NaiveDate>,
}

/// What a check-in did to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum CheckInOutcome {
    /// First check-in ever.
    Started,
    /// Checked in the day after the previous check-in.
    Continued,
    /// Already checked in today; nothing changed.
    AlreadyCheckedIn,
    /// A day (or more) was missed, or the stored date is in the future.
    Reset,
}

impl StreakState {
    /// Streak to display without mutating anything. Never 0.
    pub fn peek(&self) -> u32 {
        if self.count == 0 {
            1
        } else {
            self.count
        }
    }

    /// Apply a check-in on `today` and return the next state.
    pub fn check_in(&self, today: NaiveDate) -> (StreakState, CheckInOutcome) {
        let (count, outcome) = match self.last_check_in_date {
            None => (1, CheckInOutcome::Started),
            Some(last) if last == today => (self.peek(), CheckInOutcome::AlreadyCheckedIn),
            Some(last) if last.succ_opt() == Some(today) => (
                self.peek().saturating_add(1),
                CheckInOutcome::Continued,
            ),
            Some(_) => (1, CheckInOutcome::Reset),
        };

        (
            StreakState {
                count,
                last_check_in_date: Some(today),
            },
            outcome,
        )
    }
}
