//! Metrics for `reveal`.
//!
//! Recorded through the `metrics` facade; `--metrics-port` installs a
//! Prometheus exporter. Without a recorder every call is a no-op.
//! All label values come from closed enums, so cardinality is fixed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::audio::AudioCue;
use crate::error::{PlaybackError, RevealError};
use crate::sequencer::{SessionChange, SessionObserver, Status};

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

const STATUSES: [Status; 4] = [
    Status::Idle,
    Status::Counting,
    Status::Analyzing,
    Status::Revealed,
];

/// Installs the global metrics recorder.
///
/// With a port, a Prometheus listener is served on `127.0.0.1:<port>`;
/// without one the recorder is installed with no HTTP endpoint.
///
/// # Errors
///
/// Returns `RevealError::Io` if the recorder or listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), RevealError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| RevealError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    tracing::info!(port = ?port, "metrics recorder installed");
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        "reveal_status_transitions_total",
        "Status transitions by source and target status"
    );
    describe_gauge!("reveal_current_status", "Current status (1 = active)");
    describe_counter!("reveal_audio_cues_total", "Audio commands issued");
    describe_counter!(
        "reveal_playback_failures_total",
        "Audio commands that failed"
    );
    describe_counter!(
        "reveal_fullscreen_failures_total",
        "Fullscreen requests that failed"
    );
    describe_counter!("reveal_resets_total", "Session resets");
    describe_histogram!(
        "reveal_run_duration_seconds",
        "Time from start to result"
    );
}

/// Records a status transition and moves the current-status gauge.
pub fn record_status_transition(from: Status, to: Status) {
    counter!(
        "reveal_status_transitions_total",
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
    set_current_status(to);
}

/// Sets the current-status gauge, zeroing every other status.
pub fn set_current_status(current: Status) {
    for status in STATUSES {
        let value = if status == current { 1.0 } else { 0.0 };
        gauge!("reveal_current_status", "status" => status.as_str()).set(value);
    }
}

/// Records an issued audio command and whether it failed.
pub fn record_audio_cue(cue: AudioCue, failed: bool) {
    let (command, track) = cue_labels(cue);
    counter!("reveal_audio_cues_total", "command" => command, "track" => track).increment(1);
    if failed {
        counter!("reveal_playback_failures_total", "command" => command, "track" => track)
            .increment(1);
    }
}

/// Records a failed fullscreen request.
pub fn record_fullscreen_failure() {
    counter!("reveal_fullscreen_failures_total").increment(1);
}

/// Records a session reset.
pub fn record_reset(from: Status) {
    counter!("reveal_resets_total", "from" => from.as_str()).increment(1);
}

/// Records how long a run took from start to result.
pub fn record_run_duration(duration: Duration) {
    histogram!("reveal_run_duration_seconds").record(duration.as_secs_f64());
}

fn cue_labels(cue: AudioCue) -> (&'static str, &'static str) {
    match cue {
        AudioCue::Unlock => ("unlock", "all"),
        AudioCue::Play(track) => ("play", track.as_str()),
        AudioCue::PauseAndRewind(track) => ("pause_and_rewind", track.as_str()),
    }
}

/// Session observer that feeds the metrics above.
#[derive(Debug, Default)]
pub struct MetricsObserver {
    started_at: std::sync::Mutex<Option<std::time::Instant>>,
}

impl MetricsObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionObserver for MetricsObserver {
    fn on_change(&self, change: &SessionChange) {
        let (from, to) = (change.previous.status, change.current.status);
        if change.cause == crate::sequencer::ChangeCause::Reset {
            record_reset(from);
        }
        if !change.status_changed() {
            return;
        }
        record_status_transition(from, to);

        let mut started_at = self
            .started_at
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match to {
            Status::Counting => *started_at = Some(std::time::Instant::now()),
            Status::Revealed => {
                if let Some(start) = started_at.take() {
                    record_run_duration(start.elapsed());
                }
            }
            Status::Idle => *started_at = None,
            Status::Analyzing => {}
        }
    }

    fn on_cue(&self, cue: AudioCue, error: Option<&PlaybackError>) {
        record_audio_cue(cue, error.is_some());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Track;
    use crate::config::schema::Outcome;
    use crate::sequencer::{ChangeCause, SessionSnapshot, StepAction};

    #[test]
    fn cue_labels_are_fixed() {
        assert_eq!(cue_labels(AudioCue::Unlock), ("unlock", "all"));
        assert_eq!(
            cue_labels(AudioCue::PauseAndRewind(Track::Glitch)),
            ("pause_and_rewind", "glitch")
        );
    }

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        record_status_transition(Status::Idle, Status::Counting);
        set_current_status(Status::Analyzing);
        record_audio_cue(AudioCue::Play(Track::Drumroll), true);
        record_fullscreen_failure();
        record_reset(Status::Revealed);
        record_run_duration(Duration::from_secs(11));
    }

    #[test]
    fn observer_tracks_run_duration() {
        let observer = MetricsObserver::new();
        let snap = |status| SessionSnapshot {
            status,
            count: 0,
            loading_percent: 99,
            is_error: true,
            outcome: Outcome::Boy,
        };
        observer.on_change(&SessionChange {
            previous: snap(Status::Idle),
            current: snap(Status::Counting),
            cause: ChangeCause::Start,
        });
        assert!(observer.started_at.lock().unwrap().is_some());

        observer.on_change(&SessionChange {
            previous: snap(Status::Analyzing),
            current: snap(Status::Revealed),
            cause: ChangeCause::Step(StepAction::Reveal),
        });
        assert!(observer.started_at.lock().unwrap().is_none());
    }
}
