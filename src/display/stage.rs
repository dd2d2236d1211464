//! Presentation-side state that lives outside the session: the confetti
//! burst and the delayed reset control.

use std::time::{Duration, Instant};

use super::confetti::Confetti;
use super::theme::Theme;
use super::viewport::Viewport;
use super::{RESET_DELAY, Scene};
use crate::sequencer::{SessionSnapshot, Status};

/// Tracks what the renderer needs beyond the snapshot.
#[derive(Debug)]
pub struct Stage {
    theme: Theme,
    revealed_at: Option<Instant>,
    confetti: Option<Confetti>,
    last_frame: Option<Instant>,
    last_status: Status,
}

impl Stage {
    #[must_use]
    pub const fn new(theme: Theme) -> Self {
        Self {
            theme,
            revealed_at: None,
            confetti: None,
            last_frame: None,
            last_status: Status::Idle,
        }
    }

    #[must_use]
    pub const fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Feeds the latest snapshot; starts or clears the result effects when
    /// the status crosses into or out of `Revealed`.
    pub fn observe(&mut self, snapshot: &SessionSnapshot, viewport: Viewport, now: Instant) {
        let entered = snapshot.status == Status::Revealed && self.last_status != Status::Revealed;
        let left = snapshot.status != Status::Revealed && self.last_status == Status::Revealed;
        self.last_status = snapshot.status;

        if entered {
            self.revealed_at = Some(now);
            self.confetti = Some(Confetti::burst(
                viewport,
                self.theme.palette.len(),
                rand::random(),
            ));
            self.last_frame = Some(now);
        } else if left {
            self.revealed_at = None;
            self.confetti = None;
            self.last_frame = None;
        }
    }

    /// Advances animations to `now` and follows viewport changes.
    pub fn tick(&mut self, viewport: Viewport, now: Instant) {
        let Some(confetti) = self.confetti.as_mut() else {
            return;
        };
        let dt = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_frame = Some(now);
        confetti.resize(viewport);
        confetti.advance(dt);
        if confetti.is_finished() {
            tracing::trace!("confetti finished");
            self.confetti = None;
        }
    }

    /// Time spent in `Revealed`, if revealed.
    #[must_use]
    pub fn revealed_for(&self, now: Instant) -> Option<Duration> {
        self.revealed_at.map(|at| now.saturating_duration_since(at))
    }

    /// Time until the reset control appears, if it is still pending.
    #[must_use]
    pub fn reset_pending(&self, now: Instant) -> Option<Duration> {
        let elapsed = self.revealed_for(now)?;
        RESET_DELAY.checked_sub(elapsed).filter(|d| !d.is_zero())
    }

    /// Builds the scene for one frame.
    #[must_use]
    pub fn scene(
        &self,
        snapshot: SessionSnapshot,
        viewport: Viewport,
        fullscreen: bool,
        now: Instant,
    ) -> Scene<'_> {
        Scene {
            snapshot,
            theme: &self.theme,
            viewport,
            fullscreen,
            revealed_for: self.revealed_for(now),
            confetti: self.confetti.as_ref(),
        }
    }
}
