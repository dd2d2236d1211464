//! Interactive terminal presentation.
//!
//! Input is read on a blocking thread and forwarded over a channel; the
//! async loop redraws on session changes, input, and animation frames.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::backend::{Backend, CrosstermBackend};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::display::{
    AlternateScreen, FullscreenController, Renderer, Scene, Stage, TerminalRenderer, Theme,
    Viewport, ViewportObserver,
};
use crate::error::RevealError;
use crate::observability::StopReason;
use crate::observability::metrics::record_fullscreen_failure;
use crate::sequencer::RevealSequencer;

/// Redraw cadence while nothing else happens; drives the confetti.
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// How long the input thread blocks before checking for shutdown.
const INPUT_POLL: Duration = Duration::from_millis(50);

// ============================================================================
// Input
// ============================================================================

/// Source of terminal events so tests can drive the app without a tty.
pub trait EventSource: Send {
    /// Waits up to `timeout` for the next event.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn next(&mut self, timeout: Duration) -> io::Result<Option<Event>>;
}

/// Reads events from the real terminal.
#[derive(Debug, Default)]
pub struct CrosstermEventSource;

impl EventSource for CrosstermEventSource {
    fn next(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }
}

/// Forwards events from `source` until `stop` is set or the receiver closes.
fn spawn_input_reader(
    mut source: impl EventSource + 'static,
    tx: mpsc::UnboundedSender<Event>,
    stop: Arc<AtomicBool>,
) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while !stop.load(Ordering::Relaxed) {
            match source.next(INPUT_POLL) {
                Ok(Some(ev)) => {
                    if tx.send(ev).is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "terminal input failed");
                    break;
                }
            }
        }
    })
}

// ============================================================================
// App
// ============================================================================

/// What the loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    /// Repaint everything, e.g. after a screen switch.
    Redraw,
    Quit,
}

/// Interactive presentation state around a sequencer.
#[derive(Debug)]
pub struct App<F: FullscreenController> {
    sequencer: RevealSequencer,
    stage: Stage,
    viewports: ViewportObserver,
    fullscreen: F,
}

impl<F: FullscreenController> App<F> {
    pub fn new(
        sequencer: RevealSequencer,
        theme: Theme,
        viewport: Viewport,
        fullscreen: F,
    ) -> Self {
        Self {
            sequencer,
            stage: Stage::new(theme),
            viewports: ViewportObserver::new(viewport),
            fullscreen,
        }
    }

    pub const fn viewports(&self) -> &ViewportObserver {
        &self.viewports
    }

    pub const fn fullscreen(&self) -> &F {
        &self.fullscreen
    }

    /// Pulls the latest snapshot and advances animations to `now`.
    pub fn sync(&mut self, now: Instant) {
        let viewport = self.viewports.current();
        self.stage
            .observe(&self.sequencer.snapshot(), viewport, now);
        self.stage.tick(viewport, now);
    }

    /// The frame to draw at `now`.
    pub fn scene(&self, now: Instant) -> Scene<'_> {
        self.stage.scene(
            self.sequencer.snapshot(),
            self.viewports.current(),
            self.fullscreen.is_fullscreen(),
            now,
        )
    }

    /// Applies one terminal event.
    pub fn handle_event(&mut self, event: &Event, now: Instant) -> Control {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(*key, now),
            Event::Resize(width, height) => {
                self.viewports.report(Viewport::new(*width, *height));
                Control::Continue
            }
            _ => Control::Continue,
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Control {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Control::Quit,
            KeyCode::Char('q') | KeyCode::Esc => Control::Quit,
            KeyCode::Enter | KeyCode::Char(' ') => {
                if self.sequencer.start() {
                    tracing::debug!("start accepted");
                }
                Control::Continue
            }
            KeyCode::Char('r') => {
                // The reset control only exists once the result has settled.
                if self.scene(now).show_reset() {
                    self.sequencer.reset();
                }
                Control::Continue
            }
            KeyCode::Char('f') => match self.fullscreen.toggle() {
                Ok(active) => {
                    tracing::debug!(fullscreen = active, "fullscreen toggled");
                    Control::Redraw
                }
                Err(e) => {
                    tracing::debug!(error = %e, "fullscreen request ignored");
                    record_fullscreen_failure();
                    Control::Continue
                }
            },
            _ => Control::Continue,
        }
    }

    /// Best-effort return to the normal screen.
    fn leave_fullscreen(&mut self) {
        if self.fullscreen.is_fullscreen()
            && let Err(e) = self.fullscreen.exit()
        {
            tracing::debug!(error = %e, "failed to leave fullscreen");
        }
    }
}

/// Drives `app` until quit or cancellation.
///
/// # Errors
///
/// Returns an error if drawing fails.
pub async fn run_loop<B: Backend, F: FullscreenController>(
    app: &mut App<F>,
    renderer: &mut TerminalRenderer<B>,
    mut inputs: mpsc::UnboundedReceiver<Event>,
    cancel: &CancellationToken,
) -> Result<StopReason, RevealError> {
    let mut updates = app.sequencer.subscribe();
    let mut resizes = app.viewports.subscribe();
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let now = tokio::time::Instant::now().into_std();
        app.sync(now);
        renderer.render(&app.scene(now))?;

        tokio::select! {
            () = cancel.cancelled() => return Ok(StopReason::Signal),
            input = inputs.recv() => {
                let Some(input) = input else {
                    return Ok(StopReason::UserQuit);
                };
                match app.handle_event(&input, now) {
                    Control::Quit => return Ok(StopReason::UserQuit),
                    Control::Redraw => renderer.clear()?,
                    Control::Continue => {}
                }
            }
            Some(_) = resizes.changed() => renderer.clear()?,
            Ok(()) = updates.changed() => {}
            _ = frames.tick() => {}
        }
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// Restores the terminal on drop, including on early returns and panics.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self, RevealError> {
        enable_raw_mode().map_err(|e| RevealError::Terminal(e.to_string()))?;
        execute!(io::stdout(), Hide)?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        let _ = disable_raw_mode();
    }
}

/// Runs the interactive presentation on the current terminal.
///
/// # Errors
///
/// Returns [`RevealError::Terminal`] if the terminal cannot be set up or
/// drawn to.
pub async fn run(
    sequencer: &RevealSequencer,
    theme: Theme,
    cancel: &CancellationToken,
) -> Result<StopReason, RevealError> {
    let _guard = RawModeGuard::enable()?;
    let mut renderer = TerminalRenderer::new(CrosstermBackend::new(io::stdout()))?;
    renderer.clear()?;

    let mut app = App::new(
        sequencer.clone(),
        theme,
        renderer.viewport()?,
        AlternateScreen::new(io::stdout()),
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let stop = Arc::new(AtomicBool::new(false));
    let reader = spawn_input_reader(CrosstermEventSource, tx, Arc::clone(&stop));

    let result = run_loop(&mut app, &mut renderer, rx, cancel).await;

    stop.store(true, Ordering::Relaxed);
    let _ = reader.await;
    app.leave_fullscreen();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{Outcome, TimingConfig};
    use crate::error::FullscreenError;
    use crate::sequencer::Status;
    use ratatui::backend::TestBackend;

    #[derive(Debug, Default)]
    struct FakeScreen {
        active: bool,
        refuse: bool,
        requests: usize,
    }

    impl FullscreenController for FakeScreen {
        fn enter(&mut self) -> Result<(), FullscreenError> {
            self.requests += 1;
            if self.refuse {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied").into());
            }
            self.active = true;
            Ok(())
        }

        fn exit(&mut self) -> Result<(), FullscreenError> {
            self.requests += 1;
            self.active = false;
            Ok(())
        }

        fn is_fullscreen(&self) -> bool {
            self.active
        }
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn fast_timing() -> TimingConfig {
        TimingConfig {
            countdown_from: 1,
            countdown_tick: Duration::from_millis(10),
            countdown_hold: Duration::from_millis(10),
            fast_ramp_interval: Duration::from_millis(1),
            slow_ramp_interval: Duration::from_millis(1),
            glitch_hold: Duration::from_millis(5),
            error_hold: Duration::from_millis(10),
            ..TimingConfig::default()
        }
    }

    fn app(screen: FakeScreen) -> App<FakeScreen> {
        let sequencer = RevealSequencer::builder()
            .outcome(Outcome::Girl)
            .timing(fast_timing())
            .build();
        App::new(
            sequencer,
            Theme::builtin(Outcome::Girl),
            Viewport::new(80, 24),
            screen,
        )
    }

    fn now() -> Instant {
        tokio::time::Instant::now().into_std()
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_and_space_start() {
        let mut app = app(FakeScreen::default());
        assert_eq!(app.handle_event(&key(KeyCode::Enter), now()), Control::Continue);
        assert_eq!(app.sequencer.snapshot().status, Status::Counting);

        // Start is ignored once running.
        app.handle_event(&key(KeyCode::Char(' ')), now());
        assert_eq!(app.sequencer.snapshot().count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_keys() {
        let mut app = app(FakeScreen::default());
        for code in [KeyCode::Char('q'), KeyCode::Esc] {
            assert_eq!(app.handle_event(&key(code), now()), Control::Quit);
        }
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(app.handle_event(&ctrl_c, now()), Control::Quit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_waits_for_control() {
        let mut app = app(FakeScreen::default());
        app.handle_event(&key(KeyCode::Enter), now());
        while app.sequencer.snapshot().status != Status::Revealed {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        app.sync(now());

        app.handle_event(&key(KeyCode::Char('r')), now());
        assert_eq!(app.sequencer.snapshot().status, Status::Revealed);

        tokio::time::sleep(crate::display::RESET_DELAY).await;
        app.sync(now());
        app.handle_event(&key(KeyCode::Char('r')), now());
        assert_eq!(app.sequencer.snapshot().status, Status::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fullscreen_toggle() {
        let mut app = app(FakeScreen::default());
        assert_eq!(app.handle_event(&key(KeyCode::Char('f')), now()), Control::Redraw);
        assert!(app.scene(now()).fullscreen);
        app.handle_event(&key(KeyCode::Char('f')), now());
        assert!(!app.fullscreen().is_fullscreen());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fullscreen_refusal_is_ignored() {
        let mut app = app(FakeScreen {
            refuse: true,
            ..FakeScreen::default()
        });
        assert_eq!(app.handle_event(&key(KeyCode::Char('f')), now()), Control::Continue);
        assert!(!app.fullscreen().is_fullscreen());
        assert_eq!(app.fullscreen().requests, 1);

        // The session is unaffected.
        app.handle_event(&key(KeyCode::Enter), now());
        assert_eq!(app.sequencer.snapshot().status, Status::Counting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resize_reported() {
        let mut app = app(FakeScreen::default());
        app.handle_event(&Event::Resize(120, 40), now());
        assert_eq!(app.viewports().current(), Viewport::new(120, 40));
        assert_eq!(app.scene(now()).viewport, Viewport::new(120, 40));
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_events_ignored() {
        let mut app = app(FakeScreen::default());
        let mut release = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        app.handle_event(&Event::Key(release), now());
        assert_eq!(app.sequencer.snapshot().status, Status::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_runs_until_quit() {
        let mut app = app(FakeScreen::default());
        let mut renderer = TerminalRenderer::new(TestBackend::new(80, 24)).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(key(KeyCode::Enter)).unwrap();

        let sequencer = app.sequencer.clone();
        tokio::spawn(async move {
            let mut updates = sequencer.subscribe();
            while updates.borrow_and_update().status != Status::Revealed {
                if updates.changed().await.is_err() {
                    return;
                }
            }
            let _ = tx.send(key(KeyCode::Char('q')));
        });

        let reason = run_loop(&mut app, &mut renderer, rx, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(reason, StopReason::UserQuit);
        assert_eq!(app.sequencer.snapshot().status, Status::Revealed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_stops_on_cancel() {
        let mut app = app(FakeScreen::default());
        let mut renderer = TerminalRenderer::new(TestBackend::new(40, 12)).unwrap();
        let (_tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let reason = run_loop(&mut app, &mut renderer, rx, &cancel).await.unwrap();
        assert_eq!(reason, StopReason::Signal);
    }

    #[test]
    fn test_input_reader_forwards_events() {
        struct Scripted(Vec<Event>);

        impl EventSource for Scripted {
            fn next(&mut self, _timeout: Duration) -> io::Result<Option<Event>> {
                Ok(self.0.pop())
            }
        }

        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let stop = Arc::new(AtomicBool::new(false));
            let handle = spawn_input_reader(
                Scripted(vec![key(KeyCode::Char('q')), key(KeyCode::Enter)]),
                tx,
                Arc::clone(&stop),
            );
            assert_eq!(rx.recv().await, Some(key(KeyCode::Enter)));
            assert_eq!(rx.recv().await, Some(key(KeyCode::Char('q'))));
            stop.store(true, Ordering::Relaxed);
            handle.await.unwrap();
        });
    }
}
