//! Reveal session state
//!
//! [`Session`] owns the four session values and only exposes mutators
//! that respect the forward-only lifecycle. Every mutator returns whether
//! it applied, so callers never have to pre-check the status themselves.

use serde::Serialize;

use crate::config::schema::Outcome;
use crate::config::validation::GLITCH_PERCENT;

/// Upper bound of the progress value.
pub const MAX_PERCENT: u8 = 100;

/// Presentation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Waiting for the start control.
    Idle,
    /// Countdown running.
    Counting,
    /// Fake analysis console, ending in the scripted glitch.
    Analyzing,
    /// Result on screen.
    Revealed,
}

impl Status {
    /// Lowercase status name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Counting => "counting",
            Self::Analyzing => "analyzing",
            Self::Revealed => "revealed",
        }
    }

    /// Position in the forward lifecycle.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Counting => 1,
            Self::Analyzing => 2,
            Self::Revealed => 3,
        }
    }

    /// Returns whether `self -> next` is a permitted transition.
    ///
    /// Only single forward steps are allowed, plus the reset back to idle.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Counting)
                | (Self::Counting, Self::Analyzing)
                | (Self::Analyzing, Self::Revealed)
                | (_, Self::Idle)
        )
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable view of a session handed to renderers and observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// Current phase.
    pub status: Status,
    /// Countdown value; meaningful while counting.
    pub count: u8,
    /// Fake analysis progress; meaningful while analyzing.
    pub loading_percent: u8,
    /// Whether the scripted glitch is showing.
    pub is_error: bool,
    /// Configured result.
    pub outcome: Outcome,
}

impl SessionSnapshot {
    /// Whether the start control should be enabled.
    #[must_use]
    pub fn can_start(&self) -> bool {
        self.status == Status::Idle
    }

    /// Whether the reset control should be enabled.
    #[must_use]
    pub fn can_reset(&self) -> bool {
        self.status == Status::Revealed
    }
}

/// Mutable reveal session.
#[derive(Debug, Clone)]
pub struct Session {
    status: Status,
    count: u8,
    loading_percent: u8,
    is_error: bool,
    outcome: Outcome,
    countdown_from: u8,
}

impl Session {
    /// Creates an idle session.
    #[must_use]
    pub const fn new(outcome: Outcome, countdown_from: u8) -> Self {
        Self {
            status: Status::Idle,
            count: countdown_from,
            loading_percent: 0,
            is_error: false,
            outcome,
            countdown_from,
        }
    }

    /// Returns the current values.
    #[must_use]
    pub const fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            count: self.count,
            loading_percent: self.loading_percent,
            is_error: self.is_error,
            outcome: self.outcome,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Idle → Counting.
    pub fn begin_countdown(&mut self) -> bool {
        if self.status != Status::Idle {
            return false;
        }
        self.status = Status::Counting;
        true
    }

    /// Decrements the countdown while it is above zero.
    pub fn decrement_count(&mut self) -> bool {
        if self.status != Status::Counting || self.count == 0 {
            return false;
        }
        self.count -= 1;
        true
    }

    /// Counting → Analyzing, once the countdown hit zero.
    pub fn begin_analysis(&mut self) -> bool {
        if self.status != Status::Counting || self.count != 0 {
            return false;
        }
        self.status = Status::Analyzing;
        true
    }

    /// Adds `step` percent, never passing the glitch threshold.
    pub fn advance_progress(&mut self, step: u8) -> bool {
        if self.status != Status::Analyzing
            || self.is_error
            || step == 0
            || self.loading_percent >= GLITCH_PERCENT
        {
            return false;
        }
        self.loading_percent = self
            .loading_percent
            .saturating_add(step)
            .min(GLITCH_PERCENT);
        true
    }

    /// Raises the scripted glitch; only at the threshold and only once.
    pub fn raise_error(&mut self) -> bool {
        if self.status != Status::Analyzing
            || self.is_error
            || self.loading_percent != GLITCH_PERCENT
        {
            return false;
        }
        self.is_error = true;
        true
    }

    /// Analyzing → Revealed, once the glitch has been shown.
    pub fn reveal(&mut self) -> bool {
        if self.status != Status::Analyzing || !self.is_error {
            return false;
        }
        self.status = Status::Revealed;
        true
    }

    /// Restores the initial values in one assignment.
    pub fn reset(&mut self) {
        *self = Self::new(self.outcome, self.countdown_from);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(Outcome::Girl, 5)
    }

    fn analyzing_session() -> Session {
        let mut s = session();
        assert!(s.begin_countdown());
        for _ in 0..5 {
            assert!(s.decrement_count());
        }
        assert!(s.begin_analysis());
        s
    }

    #[test]
    fn test_initial_snapshot() {
        let snap = session().snapshot();
        assert_eq!(snap.status, Status::Idle);
        assert_eq!(snap.count, 5);
        assert_eq!(snap.loading_percent, 0);
        assert!(!snap.is_error);
        assert!(snap.can_start());
        assert!(!snap.can_reset());
    }

    #[test]
    fn test_start_only_from_idle() {
        let mut s = session();
        assert!(s.begin_countdown());
        assert!(!s.begin_countdown());
        assert_eq!(s.status(), Status::Counting);
    }

    #[test]
    fn test_count_stops_at_zero() {
        let mut s = session();
        s.begin_countdown();
        for expected in (0..5).rev() {
            assert!(s.decrement_count());
            assert_eq!(s.snapshot().count, expected);
        }
        assert!(!s.decrement_count());
        assert_eq!(s.snapshot().count, 0);
    }

    #[test]
    fn test_count_frozen_outside_counting() {
        let mut s = session();
        assert!(!s.decrement_count());
        assert_eq!(s.snapshot().count, 5);
    }

    #[test]
    fn test_analysis_requires_zero_count() {
        let mut s = session();
        s.begin_countdown();
        assert!(!s.begin_analysis());
        assert_eq!(s.status(), Status::Counting);
    }

    #[test]
    fn test_progress_caps_at_threshold() {
        let mut s = analyzing_session();
        assert!(s.advance_progress(60));
        assert!(s.advance_progress(60));
        assert_eq!(s.snapshot().loading_percent, GLITCH_PERCENT);
        assert!(!s.advance_progress(1));
    }

    #[test]
    fn test_error_only_at_threshold() {
        let mut s = analyzing_session();
        s.advance_progress(98);
        assert!(!s.raise_error());
        s.advance_progress(1);
        assert!(s.raise_error());
        assert!(!s.raise_error(), "glitch must fire only once");
        assert!(!s.advance_progress(1), "progress frozen once glitching");
    }

    #[test]
    fn test_reveal_requires_error() {
        let mut s = analyzing_session();
        assert!(!s.reveal());
        s.advance_progress(99);
        s.raise_error();
        assert!(s.reveal());
        assert_eq!(s.status(), Status::Revealed);
        assert!(s.snapshot().can_reset());
    }

    #[test]
    fn test_reset_restores_initial_tuple() {
        let mut s = analyzing_session();
        s.advance_progress(40);
        s.reset();
        assert_eq!(s.snapshot(), session().snapshot());
    }

    #[test]
    fn test_transition_table() {
        use Status::{Analyzing, Counting, Idle, Revealed};
        assert!(Idle.can_transition_to(Counting));
        assert!(Counting.can_transition_to(Analyzing));
        assert!(Analyzing.can_transition_to(Revealed));
        assert!(Revealed.can_transition_to(Idle));
        assert!(Counting.can_transition_to(Idle));
        assert!(!Idle.can_transition_to(Analyzing));
        assert!(!Revealed.can_transition_to(Counting));
        assert!(!Analyzing.can_transition_to(Counting));
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_value(session().snapshot()).unwrap();
        assert_eq!(json["status"], "idle");
        assert_eq!(json["count"], 5);
        assert_eq!(json["outcome"], "girl");
    }
}
