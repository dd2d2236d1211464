//! Recording collaborators for sequencer tests.

use std::sync::Mutex;

use super::observer::{SessionChange, SessionObserver};
use crate::audio::{AudioCue, AudioDriver, Track};
use crate::error::PlaybackError;

/// Audio driver that records every command it receives.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    cues: Mutex<Vec<AudioCue>>,
    fail_play: bool,
}

impl RecordingAudio {
    /// A driver whose `play` always fails with `Locked`.
    pub fn failing() -> Self {
        Self {
            fail_play: true,
            ..Self::default()
        }
    }

    pub fn cues(&self) -> Vec<AudioCue> {
        self.cues.lock().unwrap().clone()
    }

    /// Whether the last three commands stopped every track.
    pub fn ends_with_all_paused(&self) -> bool {
        let cues = self.cues();
        if cues.len() < Track::ALL.len() {
            return false;
        }
        let tail = &cues[cues.len() - Track::ALL.len()..];
        Track::ALL
            .iter()
            .all(|t| tail.contains(&AudioCue::PauseAndRewind(*t)))
    }

    fn record(&self, cue: AudioCue) {
        self.cues.lock().unwrap().push(cue);
    }
}

impl AudioDriver for RecordingAudio {
    fn unlock(&self) -> Result<(), PlaybackError> {
        self.record(AudioCue::Unlock);
        Ok(())
    }

    fn play(&self, track: Track) -> Result<(), PlaybackError> {
        self.record(AudioCue::Play(track));
        if self.fail_play {
            return Err(PlaybackError::Locked(track));
        }
        Ok(())
    }

    fn pause_and_rewind(&self, track: Track) -> Result<(), PlaybackError> {
        self.record(AudioCue::PauseAndRewind(track));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Observer that records changes and cue outcomes.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    changes: Mutex<Vec<SessionChange>>,
    cue_failures: Mutex<Vec<AudioCue>>,
}

impl RecordingObserver {
    pub fn changes(&self) -> Vec<SessionChange> {
        self.changes.lock().unwrap().clone()
    }

    pub fn cue_failures(&self) -> Vec<AudioCue> {
        self.cue_failures.lock().unwrap().clone()
    }
}

impl SessionObserver for RecordingObserver {
    fn on_change(&self, change: &SessionChange) {
        self.changes.lock().unwrap().push(*change);
    }

    fn on_cue(&self, cue: AudioCue, error: Option<&PlaybackError>) {
        if error.is_some() {
            self.cue_failures.lock().unwrap().push(cue);
        }
    }
}
