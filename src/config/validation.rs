//! Configuration validation
//!
//! Semantic checks on a deserialized [`RevealConfig`]. Validation collects
//! every issue instead of stopping at the first one.

use std::time::Duration;

use crate::audio::Track;
use crate::config::schema::{RevealConfig, TimingConfig};
use crate::error::{Severity, ValidationIssue};

/// Highest countdown start value; the countdown renders as a single digit.
pub const MAX_COUNTDOWN_FROM: u8 = 9;

/// Value at which the scripted glitch fires.
pub const GLITCH_PERCENT: u8 = 99;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns every issue found.
    pub fn validate(&mut self, config: &RevealConfig) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_timing(&config.timing);
        self.validate_audio(config);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    fn validate_timing(&mut self, timing: &TimingConfig) {
        if timing.countdown_from == 0 || timing.countdown_from > MAX_COUNTDOWN_FROM {
            self.error(
                "timing.countdown_from",
                format!(
                    "countdown must start between 1 and {MAX_COUNTDOWN_FROM}, got {}",
                    timing.countdown_from
                ),
            );
        }

        let durations: [(&str, Duration); 6] = [
            ("timing.countdown_tick", timing.countdown_tick),
            ("timing.countdown_hold", timing.countdown_hold),
            ("timing.fast_ramp_interval", timing.fast_ramp_interval),
            ("timing.slow_ramp_interval", timing.slow_ramp_interval),
            ("timing.glitch_hold", timing.glitch_hold),
            ("timing.error_hold", timing.error_hold),
        ];
        for (path, duration) in durations {
            if duration.is_zero() {
                self.error(path, "duration must be non-zero".to_string());
            }
        }

        if timing.fast_ramp_step == 0 {
            self.error("timing.fast_ramp_step", "step must be at least 1".to_string());
        }

        if timing.fast_ramp_ceiling == 0 || timing.fast_ramp_ceiling > GLITCH_PERCENT {
            self.error(
                "timing.fast_ramp_ceiling",
                format!(
                    "ceiling must be between 1 and {GLITCH_PERCENT}, got {}",
                    timing.fast_ramp_ceiling
                ),
            );
        }
    }

    fn validate_audio(&mut self, config: &RevealConfig) {
        let audio = &config.audio;
        if audio.player.first().is_none_or(|cmd| cmd.trim().is_empty()) {
            self.error("audio.player", "player command is empty".to_string());
        }

        for track in Track::ALL {
            let settings = audio.tracks.get(track);
            let path = format!("audio.tracks.{track}");
            if !(0.0..=1.0).contains(&settings.volume) {
                self.error(
                    &format!("{path}.volume"),
                    format!("volume must be within [0, 1], got {}", settings.volume),
                );
            }
            if !settings.path.exists() {
                self.warning(
                    &format!("{path}.path"),
                    format!("sound file {} does not exist", settings.path.display()),
                );
            }
        }
    }

    fn error(&mut self, path: &str, message: String) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message,
            severity: Severity::Error,
        });
    }

    fn warning(&mut self, path: &str, message: String) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message,
            severity: Severity::Warning,
        });
    }
}
