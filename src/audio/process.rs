//! External-process audio driver.
//!
//! Each track is played by spawning the configured player command with
//! the track file appended. Pausing kills the player; since the next
//! `play` starts a fresh process, every pause is also a rewind.
//!
//! `unlock` mirrors the muted warm-up that autoplay-restricted platforms
//! need: each track is started at volume zero and stopped immediately.
//! Tracks that fail to prime stay locked and refuse to play.

use std::collections::{HashMap, HashSet};
use std::process::Stdio;
use std::sync::Mutex;

use tokio::process::{Child, Command};

use super::{AudioDriver, Track};
use crate::config::schema::AudioConfig;
use crate::error::PlaybackError;

/// Audio driver that shells out to a player per track.
///
/// Spawning requires a Tokio runtime context.
#[derive(Debug)]
pub struct ProcessAudio {
    config: AudioConfig,
    players: Mutex<Players>,
}

#[derive(Debug, Default)]
struct Players {
    running: HashMap<Track, Child>,
    unlocked: HashSet<Track>,
}

impl ProcessAudio {
    /// Creates a locked driver for the given audio settings.
    #[must_use]
    pub fn new(config: AudioConfig) -> Self {
        Self {
            config,
            players: Mutex::new(Players::default()),
        }
    }

    /// Returns whether `track` has been primed by [`unlock`](AudioDriver::unlock).
    #[must_use]
    pub fn is_unlocked(&self, track: Track) -> bool {
        self.lock_players().unlocked.contains(&track)
    }

    /// Returns whether a player process for `track` is still running.
    #[must_use]
    pub fn is_playing(&self, track: Track) -> bool {
        let mut players = self.lock_players();
        players
            .running
            .get_mut(&track)
            .is_some_and(|child| matches!(child.try_wait(), Ok(None)))
    }

    /// Builds the player invocation for `track` at `volume` (0.0-1.0).
    fn command(&self, track: Track, volume: f32) -> Result<Command, PlaybackError> {
        let (program, args) = self
            .config
            .player
            .split_first()
            .ok_or(PlaybackError::NoPlayer)?;
        let settings = self.config.tracks.get(track);

        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(flag) = &self.config.volume_flag {
            cmd.arg(flag).arg(volume_percent(volume).to_string());
        }
        cmd.arg(&settings.path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        Ok(cmd)
    }

    fn spawn(&self, track: Track, volume: f32) -> Result<Child, PlaybackError> {
        self.command(track, volume)?
            .spawn()
            .map_err(|source| PlaybackError::Spawn { track, source })
    }

    fn lock_players(&self) -> std::sync::MutexGuard<'_, Players> {
        // A poisoned map only holds child handles; keep using it.
        self.players
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl AudioDriver for ProcessAudio {
    fn unlock(&self) -> Result<(), PlaybackError> {
        let mut first_error = None;
        for track in Track::ALL {
            if self.is_unlocked(track) {
                continue;
            }
            match self.spawn(track, 0.0) {
                Ok(mut child) => {
                    let _ = child.start_kill();
                    self.lock_players().unlocked.insert(track);
                }
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn play(&self, track: Track) -> Result<(), PlaybackError> {
        if !self.is_unlocked(track) {
            return Err(PlaybackError::Locked(track));
        }
        if self.is_playing(track) {
            return Ok(());
        }
        let child = self.spawn(track, self.config.tracks.get(track).volume)?;
        tracing::debug!(%track, pid = ?child.id(), "player started");
        self.lock_players().running.insert(track, child);
        Ok(())
    }

    fn pause_and_rewind(&self, track: Track) -> Result<(), PlaybackError> {
        let Some(mut child) = self.lock_players().running.remove(&track) else {
            return Ok(());
        };
        if matches!(child.try_wait(), Ok(Some(_))) {
            return Ok(());
        }
        child
            .start_kill()
            .map_err(|source| PlaybackError::Stop { track, source })
    }

    fn name(&self) -> &'static str {
        "process"
    }
}

/// Converts a `[0, 1]` volume to a whole percent, clamping out-of-range input.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn volume_percent(volume: f32) -> u8 {
    (volume.clamp(0.0, 1.0) * 100.0).round() as u8
}
