//! Error types for `reveal`
//!
//! Error hierarchy with exit-code mapping for the CLI, configuration
//! validation issues, and the two best-effort collaborator failures
//! (audio playback and fullscreen requests) that callers discard.

use std::path::PathBuf;
use thiserror::Error;

use crate::audio::Track;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `reveal` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Terminal setup or drawing failed
    pub const TERMINAL_ERROR: i32 = 4;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `reveal` operations.
#[derive(Debug, Error)]
pub enum RevealError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Terminal could not be prepared, drawn to, or restored
    #[error("terminal error: {0}")]
    Terminal(String),

    /// Invalid combination of command-line options
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RevealError {
    /// Returns the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Terminal(_) => ExitCode::TERMINAL_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}: {}", format_issues(.errors))]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Configuration file not found or unreadable
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Environment variable referenced in configuration is not set
    #[error("environment variable '{var}' not set ({message})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// Message given in the `${VAR:?message}` reference
        message: String,
    },
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Dotted path to the problematic field (e.g., `timing.glitch_hold`)
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Prevents the configuration from being used
    Error,
    /// Reported, but the configuration still loads
    Warning,
}

// ============================================================================
// Collaborator Errors (best-effort, never propagated into the session)
// ============================================================================

/// Audio playback failures.
///
/// Returned by [`AudioDriver`](crate::audio::AudioDriver) implementations.
/// The sequencer logs and discards them.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Playback was requested before the driver was unlocked
    #[error("audio is locked; {0} cannot play before unlock")]
    Locked(Track),

    /// The player process could not be spawned
    #[error("failed to spawn player for {track}: {source}")]
    Spawn {
        /// Track that failed to start
        track: Track,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// The player process could not be stopped
    #[error("failed to stop {track}: {source}")]
    Stop {
        /// Track that failed to stop
        track: Track,
        /// Underlying kill error
        #[source]
        source: std::io::Error,
    },

    /// No player command is configured
    #[error("no audio player configured")]
    NoPlayer,
}

/// Fullscreen request failures, discarded by callers.
#[derive(Debug, Error)]
pub enum FullscreenError {
    /// The display refused to switch modes
    #[error("fullscreen request failed: {0}")]
    Request(#[from] std::io::Error),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `reveal` operations.
pub type Result<T> = std::result::Result<T, RevealError>;

// ============================================================================
// Tests
// ============================================================================
