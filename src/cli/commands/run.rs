//! `run` command
//!
//! Wires configuration, audio, observers, and the sequencer together,
//! then hands off to the terminal UI or drives a headless run.

use std::io::Write;
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::app;
use crate::audio::{AudioDriver, NullAudio, ProcessAudio};
use crate::cli::args::RunArgs;
use crate::config::loader::ConfigLoader;
use crate::config::schema::RevealConfig;
use crate::display::{RESET_DELAY, Renderer, Stage, TextRenderer, Theme, Viewport};
use crate::error::RevealError;
use crate::observability::{
    Event, EventEmitter, EventObserver, MetricsObserver, StopReason, init_metrics,
};
use crate::sequencer::{RevealSequencer, SessionSnapshot, Status};

/// Viewport assumed for headless runs.
const HEADLESS_VIEWPORT: Viewport = Viewport::new(80, 24);

/// Runs one presentation.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the events file or
/// metrics endpoint cannot be opened, or the terminal fails.
pub async fn run(args: &RunArgs, cancel: CancellationToken) -> Result<(), RevealError> {
    let config = load_config(args)?;

    if let Some(port) = args.metrics_port {
        init_metrics(Some(port))?;
    }

    let audio: Arc<dyn AudioDriver> = if args.mute {
        Arc::new(NullAudio)
    } else {
        Arc::new(ProcessAudio::new(config.audio.clone()))
    };

    let emitter = Arc::new(match (&args.events_file, args.headless) {
        (Some(path), _) => EventEmitter::from_file(path)?,
        (None, true) => EventEmitter::stdout(),
        (None, false) => EventEmitter::noop(),
    });

    let sequencer = RevealSequencer::builder()
        .outcome(config.outcome)
        .timing(config.timing.clone())
        .audio(audio)
        .observer(Arc::new(EventObserver::new(Arc::clone(&emitter))))
        .observer(Arc::new(MetricsObserver::new()))
        .build();

    let theme = Theme::resolve(config.outcome, &config.themes);
    tracing::info!(
        outcome = %config.outcome,
        headless = args.headless,
        mute = args.mute,
        "starting presentation"
    );

    let reason = if args.headless {
        // The transcript shares stdout with the event stream unless events
        // were redirected to a file.
        let transcript: Option<Box<dyn Write + Send>> = args
            .events_file
            .as_ref()
            .map(|_| Box::new(std::io::stdout()) as Box<dyn Write + Send>);
        run_headless(&sequencer, theme, transcript, &cancel).await?
    } else {
        app::run(&sequencer, theme, &cancel).await?
    };

    let final_status = sequencer.snapshot().status;
    sequencer.shutdown();
    emitter.emit(Event::PresentationStopped {
        timestamp: chrono::Utc::now(),
        reason,
        final_status,
    });
    tracing::info!(?reason, final_status = final_status.as_str(), "presentation stopped");
    Ok(())
}

fn load_config(args: &RunArgs) -> Result<RevealConfig, RevealError> {
    if let Some(ref path) = args.config {
        tracing::info!(config = %path.display(), "loading configuration");
    }
    let load_result = ConfigLoader::default().load_or_default(args.config.as_deref())?;
    for warning in &load_result.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }

    let mut config = Arc::unwrap_or_clone(load_result.config);
    if let Some(outcome) = args.outcome {
        config.outcome = outcome;
    }
    Ok(config)
}

// ============================================================================
// Headless
// ============================================================================

/// Starts the session immediately and follows it until the result has
/// shown for [`RESET_DELAY`], rendering a transcript if `out` is given.
///
/// # Errors
///
/// Returns an error if the transcript cannot be written.
pub async fn run_headless(
    sequencer: &RevealSequencer,
    theme: Theme,
    out: Option<Box<dyn Write + Send>>,
    cancel: &CancellationToken,
) -> Result<StopReason, RevealError> {
    let mut updates = sequencer.subscribe();
    let mut renderer = out.map(TextRenderer::new);
    let mut stage = Stage::new(theme);

    let mut draw = |stage: &mut Stage, snapshot: SessionSnapshot| -> Result<(), RevealError> {
        let now = tokio::time::Instant::now().into_std();
        stage.observe(&snapshot, HEADLESS_VIEWPORT, now);
        if let Some(renderer) = renderer.as_mut() {
            renderer.render(&stage.scene(snapshot, HEADLESS_VIEWPORT, false, now))?;
        }
        Ok(())
    };

    draw(&mut stage, sequencer.snapshot())?;
    sequencer.start();

    loop {
        let snapshot = *updates.borrow_and_update();
        draw(&mut stage, snapshot)?;
        if snapshot.status == Status::Revealed {
            break;
        }
        if !wait_for_change(&mut updates, cancel).await {
            return Ok(StopReason::Signal);
        }
    }

    tokio::select! {
        () = cancel.cancelled() => return Ok(StopReason::Signal),
        () = tokio::time::sleep(RESET_DELAY) => {}
    }
    draw(&mut stage, sequencer.snapshot())?;
    Ok(StopReason::Completed)
}

/// Waits for the next snapshot; `false` on cancellation or a closed channel.
async fn wait_for_change(
    updates: &mut watch::Receiver<SessionSnapshot>,
    cancel: &CancellationToken,
) -> bool {
    tokio::select! {
        () = cancel.cancelled() => false,
        changed = updates.changed() => changed.is_ok(),
    }
}
