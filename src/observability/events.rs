//! Structured event stream.
//!
//! Every session change and audio cue becomes a typed [`Event`], written as
//! one JSON line with a sequence number. Headless runs stream these to
//! stdout; interactive runs can send them to a file with `--events-file`.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::audio::AudioCue;
use crate::config::schema::Outcome;
use crate::error::PlaybackError;
use crate::sequencer::{ChangeCause, SessionChange, SessionObserver, Status, StepAction};

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete presentation event, tagged with `"type"` in JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The start control was accepted.
    SessionStarted {
        timestamp: DateTime<Utc>,
        outcome: Outcome,
        countdown_from: u8,
    },

    /// The status moved forward.
    StatusChanged {
        timestamp: DateTime<Utc>,
        from: Status,
        to: Status,
    },

    /// The countdown decreased.
    CountdownTick { timestamp: DateTime<Utc>, count: u8 },

    /// The fake analysis advanced.
    ProgressChanged {
        timestamp: DateTime<Utc>,
        loading_percent: u8,
    },

    /// The scripted glitch appeared.
    GlitchRaised {
        timestamp: DateTime<Utc>,
        loading_percent: u8,
    },

    /// The session returned to idle.
    SessionReset { timestamp: DateTime<Utc>, from: Status },

    /// An audio command was issued.
    AudioCue {
        timestamp: DateTime<Utc>,
        cue: AudioCue,
        /// Playback failure, if any. Failures never affect the session.
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// The presentation ended.
    PresentationStopped {
        timestamp: DateTime<Utc>,
        reason: StopReason,
        final_status: Status,
    },
}

/// Why a presentation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Headless run reached the result.
    Completed,
    /// The quit key was pressed.
    UserQuit,
    /// SIGINT or SIGTERM.
    Signal,
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe JSONL event writer.
///
/// Serialization and I/O failures are dropped; the event stream is
/// diagnostic output and must never interrupt the presentation.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Emitter that discards everything.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Emitter that truncates and writes `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Writes `event` as one line and flushes.
    pub fn emit(&self, event: Event) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope { sequence, event };

        if let Ok(mut w) = self.writer.lock()
            && let Ok(line) = serde_json::to_string(&envelope)
        {
            let _ = writeln!(w, "{line}");
            let _ = w.flush();
        }
    }

    /// Number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Session observer
// ---------------------------------------------------------------------------

/// Translates session changes and cues into events.
#[derive(Debug, Clone)]
pub struct EventObserver {
    emitter: Arc<EventEmitter>,
}

impl EventObserver {
    #[must_use]
    pub const fn new(emitter: Arc<EventEmitter>) -> Self {
        Self { emitter }
    }
}

/// Events describing one change, in emission order.
#[must_use]
pub fn events_for(change: &SessionChange, timestamp: DateTime<Utc>) -> Vec<Event> {
    let (prev, cur) = (change.previous, change.current);
    let mut events = Vec::new();

    match change.cause {
        ChangeCause::Reset => {
            events.push(Event::SessionReset {
                timestamp,
                from: prev.status,
            });
            return events;
        }
        ChangeCause::Start => events.push(Event::SessionStarted {
            timestamp,
            outcome: cur.outcome,
            countdown_from: cur.count,
        }),
        ChangeCause::Step(StepAction::DecrementCount) => events.push(Event::CountdownTick {
            timestamp,
            count: cur.count,
        }),
        ChangeCause::Step(StepAction::AdvanceProgress(_)) => events.push(Event::ProgressChanged {
            timestamp,
            loading_percent: cur.loading_percent,
        }),
        ChangeCause::Step(StepAction::RaiseError) => events.push(Event::GlitchRaised {
            timestamp,
            loading_percent: cur.loading_percent,
        }),
        ChangeCause::Step(StepAction::BeginAnalysis | StepAction::Reveal) => {}
    }

    if change.status_changed() {
        events.push(Event::StatusChanged {
            timestamp,
            from: prev.status,
            to: cur.status,
        });
    }
    events
}

impl SessionObserver for EventObserver {
    fn on_change(&self, change: &SessionChange) {
        for event in events_for(change, Utc::now()) {
            self.emitter.emit(event);
        }
    }

    fn on_cue(&self, cue: AudioCue, error: Option<&PlaybackError>) {
        self.emitter.emit(Event::AudioCue {
            timestamp: Utc::now(),
            cue,
            error: error.map(ToString::to_string),
        });
    }
}
