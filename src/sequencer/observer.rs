//! Change notifications
//!
//! Observers receive every committed session change in order, followed by
//! the audio cues that change triggered.

use serde::Serialize;

use super::state::{SessionSnapshot, Status};
use super::timing::StepAction;
use crate::audio::{AudioCue, Track};
use crate::error::PlaybackError;

/// What caused a session change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum ChangeCause {
    /// The start control.
    Start,
    /// The reset control.
    Reset,
    /// A timed step.
    Step(StepAction),
}

/// A committed session change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionChange {
    /// Values before the change.
    pub previous: SessionSnapshot,
    /// Values after the change.
    pub current: SessionSnapshot,
    /// What triggered it.
    pub cause: ChangeCause,
}

impl SessionChange {
    /// Whether the status differs between `previous` and `current`.
    #[must_use]
    pub fn status_changed(&self) -> bool {
        self.previous.status != self.current.status
    }

    /// Whether the glitch was raised by this change.
    #[must_use]
    pub const fn glitch_raised(&self) -> bool {
        !self.previous.is_error && self.current.is_error
    }

    /// Audio cues owed for this change, in issue order.
    ///
    /// Reset cues are issued by the reset itself and do not appear here.
    #[must_use]
    pub fn transition_cues(&self) -> Vec<AudioCue> {
        let mut cues = Vec::new();
        if self.status_changed() {
            match self.current.status {
                Status::Counting => cues.push(AudioCue::Play(Track::Drumroll)),
                Status::Analyzing => cues.push(AudioCue::PauseAndRewind(Track::Drumroll)),
                Status::Revealed => {}
                Status::Idle => return cues,
            }
        }
        if self.glitch_raised() {
            cues.push(AudioCue::Play(Track::Glitch));
        }
        if self.status_changed() && self.current.status == Status::Revealed {
            cues.push(AudioCue::PauseAndRewind(Track::Glitch));
            cues.push(AudioCue::Play(Track::Celebration));
        }
        cues
    }
}

/// Receives session changes and cue results.
///
/// Called while the sequencer lock is held: implementations must be quick
/// and must not call back into the sequencer.
pub trait SessionObserver: Send + Sync {
    /// A change was committed.
    fn on_change(&self, change: &SessionChange);

    /// A cue was issued; `error` is set when playback failed.
    fn on_cue(&self, cue: AudioCue, error: Option<&PlaybackError>) {
        let _ = (cue, error);
    }
}
