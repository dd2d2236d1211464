//! Phase timing
//!
//! The whole timing protocol is the pure function [`next_step`]: given the
//! current snapshot it names the single action that is due next and how
//! long to wait for it. The engine only sleeps and applies.

use std::time::Duration;

use serde::Serialize;

use super::state::{Session, SessionSnapshot, Status};
use crate::config::schema::{Outcome, TimingConfig};
use crate::config::validation::GLITCH_PERCENT;

/// Action applied when a scheduled step fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "amount", rename_all = "snake_case")]
pub enum StepAction {
    /// Countdown minus one.
    DecrementCount,
    /// Countdown finished; switch to the analysis console.
    BeginAnalysis,
    /// Add the given percent to the progress bar.
    AdvanceProgress(u8),
    /// Show the scripted glitch.
    RaiseError,
    /// Show the result.
    Reveal,
}

impl StepAction {
    /// Applies the action; returns whether the session changed.
    pub fn apply(self, session: &mut Session) -> bool {
        match self {
            Self::DecrementCount => session.decrement_count(),
            Self::BeginAnalysis => session.begin_analysis(),
            Self::AdvanceProgress(step) => session.advance_progress(step),
            Self::RaiseError => session.raise_error(),
            Self::Reveal => session.reveal(),
        }
    }
}

/// A delayed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// How long to wait before applying.
    pub delay: Duration,
    /// What to apply.
    pub action: StepAction,
}

/// Returns the step due after `snapshot`, or `None` when the session waits
/// for user input (idle or revealed).
#[must_use]
pub fn next_step(snapshot: &SessionSnapshot, timing: &TimingConfig) -> Option<Step> {
    let step = |delay, action| Some(Step { delay, action });

    match snapshot.status {
        Status::Idle | Status::Revealed => None,
        Status::Counting if snapshot.count > 0 => {
            step(timing.countdown_tick, StepAction::DecrementCount)
        }
        Status::Counting => step(timing.countdown_hold, StepAction::BeginAnalysis),
        Status::Analyzing if snapshot.is_error => step(timing.error_hold, StepAction::Reveal),
        Status::Analyzing if snapshot.loading_percent < timing.fast_ramp_ceiling => step(
            timing.fast_ramp_interval,
            StepAction::AdvanceProgress(timing.fast_ramp_step),
        ),
        Status::Analyzing if snapshot.loading_percent < GLITCH_PERCENT => step(
            timing.slow_ramp_interval,
            StepAction::AdvanceProgress(1),
        ),
        Status::Analyzing => step(timing.glitch_hold, StepAction::RaiseError),
    }
}

/// Sum of every step delay from the start of the countdown to the reveal.
#[must_use]
pub fn total_runtime(timing: &TimingConfig) -> Duration {
    let mut session = Session::new(Outcome::default(), timing.countdown_from);
    session.begin_countdown();
    let mut total = Duration::ZERO;
    while let Some(step) = next_step(&session.snapshot(), timing) {
        if !step.action.apply(&mut session) {
            break;
        }
        total += step.delay;
    }
    total
}
