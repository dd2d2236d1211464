//! Configuration schema types
//!
//! These types are deserialized from the optional YAML configuration file.
//! Every section has defaults that reproduce the stock presentation, so an
//! empty file (or no file at all) yields a complete configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::audio::Track;

// ============================================================================
// Top-Level Configuration
// ============================================================================

/// Root configuration for a reveal presentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealConfig {
    /// Which result the presentation reveals.
    pub outcome: Outcome,

    /// Phase timing.
    pub timing: TimingConfig,

    /// Audio player and track settings.
    pub audio: AudioConfig,

    /// Text overrides for the outcome themes.
    pub themes: ThemeOverrides,
}

// ============================================================================
// Outcome
// ============================================================================

/// The revealed result, injected through configuration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Blue theme.
    Boy,
    /// Pink theme.
    #[default]
    Girl,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boy => write!(f, "boy"),
            Self::Girl => write!(f, "girl"),
        }
    }
}

impl std::str::FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boy" => Ok(Self::Boy),
            "girl" => Ok(Self::Girl),
            other => Err(format!("unknown outcome '{other}' (expected boy or girl)")),
        }
    }
}

// ============================================================================
// Timing
// ============================================================================

/// Delays and ramp shape driving the sequencer.
///
/// Durations are written in humantime syntax (`1s`, `200ms`, `2s 500ms`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Value the countdown starts from.
    pub countdown_from: u8,

    /// Delay between countdown decrements.
    #[serde(with = "humantime_duration")]
    pub countdown_tick: Duration,

    /// Delay between reaching zero and entering analysis.
    #[serde(with = "humantime_duration")]
    pub countdown_hold: Duration,

    /// Interval of the fast part of the progress ramp.
    #[serde(with = "humantime_duration")]
    pub fast_ramp_interval: Duration,

    /// Percent added per fast-ramp step.
    pub fast_ramp_step: u8,

    /// Progress value where the ramp switches to the slow interval.
    pub fast_ramp_ceiling: u8,

    /// Interval of the slow part of the ramp (one percent per step).
    #[serde(with = "humantime_duration")]
    pub slow_ramp_interval: Duration,

    /// Hold at 99% before the scripted glitch.
    #[serde(with = "humantime_duration")]
    pub glitch_hold: Duration,

    /// How long the glitch screen stays up before the reveal.
    #[serde(with = "humantime_duration")]
    pub error_hold: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            countdown_from: 5,
            countdown_tick: Duration::from_millis(1000),
            countdown_hold: Duration::from_millis(200),
            fast_ramp_interval: Duration::from_millis(30),
            fast_ramp_step: 2,
            fast_ramp_ceiling: 90,
            slow_ramp_interval: Duration::from_millis(200),
            glitch_hold: Duration::from_millis(500),
            error_hold: Duration::from_millis(2500),
        }
    }
}

// ============================================================================
// Audio
// ============================================================================

/// External audio player and the three cue tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioConfig {
    /// Player command and leading arguments; the track path is appended.
    pub player: Vec<String>,

    /// Flag used to pass the volume (as a 0-100 percent) to the player.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_flag: Option<String>,

    /// Per-track settings.
    pub tracks: TrackSet,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            player: ["ffplay", "-nodisp", "-autoexit", "-loglevel", "quiet"]
                .into_iter()
                .map(String::from)
                .collect(),
            volume_flag: Some("-volume".to_string()),
            tracks: TrackSet::default(),
        }
    }
}

/// Settings for each of the three fixed tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackSet {
    /// Suspense loop during the countdown.
    pub drumroll: TrackConfig,
    /// Played once the result is on screen.
    pub celebration: TrackConfig,
    /// Played when the scripted error appears.
    pub glitch: TrackConfig,
}

impl TrackSet {
    /// Returns the settings for `track`.
    #[must_use]
    pub const fn get(&self, track: Track) -> &TrackConfig {
        match track {
            Track::Drumroll => &self.drumroll,
            Track::Celebration => &self.celebration,
            Track::Glitch => &self.glitch,
        }
    }

    /// Makes every relative track path relative to `base` instead.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        for track in [&mut self.drumroll, &mut self.celebration, &mut self.glitch] {
            if track.path.is_relative() {
                track.path = base.join(&track.path);
            }
        }
    }
}

impl Default for TrackSet {
    fn default() -> Self {
        Self {
            drumroll: TrackConfig::new("sounds/drumroll.mp3", 0.7),
            celebration: TrackConfig::new("sounds/celebration.mp3", 1.0),
            glitch: TrackConfig::new("sounds/glitch.mp3", 0.8),
        }
    }
}

/// A single audio file and its playback volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackConfig {
    /// Path to the sound file.
    pub path: PathBuf,
    /// Playback volume in `[0.0, 1.0]`.
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl TrackConfig {
    /// Creates a track entry.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, volume: f32) -> Self {
        Self {
            path: path.into(),
            volume,
        }
    }
}

const fn default_volume() -> f32 {
    1.0
}

// ============================================================================
// Themes
// ============================================================================

/// Optional text overrides for each outcome theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeOverrides {
    /// Overrides for the boy theme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boy: Option<ThemeText>,
    /// Overrides for the girl theme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub girl: Option<ThemeText>,
}

impl ThemeOverrides {
    /// Returns the overrides for `outcome`, if any.
    #[must_use]
    pub const fn for_outcome(&self, outcome: Outcome) -> Option<&ThemeText> {
        match outcome {
            Outcome::Boy => self.boy.as_ref(),
            Outcome::Girl => self.girl.as_ref(),
        }
    }
}

/// Replacement strings for the reveal screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeText {
    /// Headline shown on reveal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Emoji row above the headline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    /// Line under the headline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
}

// ============================================================================
// Duration (de)serialization
// ============================================================================

mod humantime_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}
