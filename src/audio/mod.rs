//! Audio driver
//!
//! The sequencer never touches playback state. It issues intents
//! (`unlock`, `play`, `pause_and_rewind`) against the three fixed tracks
//! through the [`AudioDriver`] trait; drivers own the actual players.
//!
//! - [`ProcessAudio`] plays each track through an external player command
//! - [`NullAudio`] accepts every command and plays nothing (`--mute`)

pub mod process;

use serde::Serialize;

use crate::error::PlaybackError;

pub use process::ProcessAudio;

/// One of the three cue tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    /// Countdown suspense.
    Drumroll,
    /// Scripted "fatal error".
    Glitch,
    /// Result celebration.
    Celebration,
}

impl Track {
    /// Every track, in a stable order.
    pub const ALL: [Self; 3] = [Self::Drumroll, Self::Celebration, Self::Glitch];

    /// Lowercase track name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drumroll => "drumroll",
            Self::Glitch => "glitch",
            Self::Celebration => "celebration",
        }
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Playback command issued by the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "command", content = "track", rename_all = "snake_case")]
pub enum AudioCue {
    /// Prime every track for later playback.
    Unlock,
    /// Start a track from its current position.
    Play(Track),
    /// Stop a track and return it to the beginning.
    PauseAndRewind(Track),
}

impl std::fmt::Display for AudioCue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unlock => f.write_str("unlock"),
            Self::Play(track) => write!(f, "play({track})"),
            Self::PauseAndRewind(track) => write!(f, "pause_and_rewind({track})"),
        }
    }
}

/// Playback backend driven by the sequencer.
///
/// Every method is best-effort: callers log and discard errors, so an
/// implementation must never leave the session in a state that depends on
/// whether playback worked.
pub trait AudioDriver: Send + Sync {
    /// Primes all tracks so later `play` calls are permitted.
    ///
    /// # Errors
    ///
    /// Returns an error if any track could not be primed.
    fn unlock(&self) -> Result<(), PlaybackError>;

    /// Starts `track`. A track that is already playing keeps playing.
    ///
    /// # Errors
    ///
    /// Returns an error if the track is locked or the player cannot start.
    fn play(&self, track: Track) -> Result<(), PlaybackError>;

    /// Stops `track` and rewinds it to the start.
    ///
    /// # Errors
    ///
    /// Returns an error if a running player could not be stopped.
    fn pause_and_rewind(&self, track: Track) -> Result<(), PlaybackError>;

    /// Short driver name for logging.
    fn name(&self) -> &'static str;

    /// Dispatches a cue to the matching method.
    ///
    /// # Errors
    ///
    /// Propagates the error of the dispatched method.
    fn apply(&self, cue: AudioCue) -> Result<(), PlaybackError> {
        match cue {
            AudioCue::Unlock => self.unlock(),
            AudioCue::Play(track) => self.play(track),
            AudioCue::PauseAndRewind(track) => self.pause_and_rewind(track),
        }
    }
}

/// Driver that accepts every command and plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioDriver for NullAudio {
    fn unlock(&self) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn play(&self, track: Track) -> Result<(), PlaybackError> {
        tracing::trace!(%track, "muted play");
        Ok(())
    }

    fn pause_and_rewind(&self, _track: Track) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_display() {
        assert_eq!(Track::Drumroll.to_string(), "drumroll");
        assert_eq!(Track::Glitch.to_string(), "glitch");
        assert_eq!(Track::Celebration.to_string(), "celebration");
    }

    #[test]
    fn test_all_tracks_distinct() {
        let mut names: Vec<_> = Track::ALL.iter().map(|t| t.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn test_cue_serializes_with_command_tag() {
        let json = serde_json::to_value(AudioCue::Play(Track::Glitch)).unwrap();
        assert_eq!(json["command"], "play");
        assert_eq!(json["track"], "glitch");

        let json = serde_json::to_value(AudioCue::Unlock).unwrap();
        assert_eq!(json["command"], "unlock");
    }

    #[test]
    fn test_cue_display() {
        assert_eq!(
            AudioCue::PauseAndRewind(Track::Drumroll).to_string(),
            "pause_and_rewind(drumroll)"
        );
    }

    #[test]
    fn test_null_audio_accepts_everything() {
        let audio = NullAudio;
        assert!(audio.apply(AudioCue::Play(Track::Glitch)).is_ok());
        assert!(audio.apply(AudioCue::Unlock).is_ok());
        assert!(audio.apply(AudioCue::PauseAndRewind(Track::Glitch)).is_ok());
        assert_eq!(audio.name(), "null");
    }
}
