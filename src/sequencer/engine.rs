//! Reveal sequencer orchestration
//!
//! [`RevealSequencer`] owns the session and the single pending timer that
//! advances it. Every mutation happens under one lock and, before the lock
//! is released, publishes the new snapshot, notifies observers, issues the
//! audio cues for the transition, and reschedules.
//!
//! Pending steps are spawned Tokio tasks tagged with a generation number.
//! Scheduling aborts the previous task and bumps the generation, so a step
//! that already woke up and is waiting on the lock finds itself stale and
//! does nothing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use super::observer::{ChangeCause, SessionChange, SessionObserver};
use super::state::{Session, SessionSnapshot, Status};
use super::timing::{Step, next_step};
use crate::audio::{AudioCue, AudioDriver, NullAudio, Track};
use crate::config::schema::{Outcome, TimingConfig};

/// Builder for [`RevealSequencer`].
pub struct SequencerBuilder {
    outcome: Outcome,
    timing: TimingConfig,
    audio: Arc<dyn AudioDriver>,
    observers: Vec<Arc<dyn SessionObserver>>,
}

impl SequencerBuilder {
    /// Sets the revealed outcome.
    #[must_use]
    pub const fn outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Sets the phase timing.
    #[must_use]
    pub fn timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Sets the audio driver. Defaults to [`NullAudio`].
    #[must_use]
    pub fn audio(mut self, audio: Arc<dyn AudioDriver>) -> Self {
        self.audio = audio;
        self
    }

    /// Adds an observer notified of every change and cue.
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Builds an idle sequencer.
    #[must_use]
    pub fn build(self) -> RevealSequencer {
        let session = Session::new(self.outcome, self.timing.countdown_from);
        let (tx, _rx) = watch::channel(session.snapshot());
        debug!(
            outcome = %self.outcome,
            audio = self.audio.name(),
            observers = self.observers.len(),
            "sequencer created"
        );
        RevealSequencer {
            inner: Arc::new(Inner {
                timing: self.timing,
                audio: self.audio,
                observers: self.observers,
                tx,
                core: Mutex::new(Core {
                    session,
                    pending: None,
                    generation: 0,
                    shut_down: false,
                }),
            }),
        }
    }
}

impl std::fmt::Debug for SequencerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequencerBuilder")
            .field("outcome", &self.outcome)
            .field("timing", &self.timing)
            .field("audio", &self.audio.name())
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Timer-driven owner of a reveal session.
///
/// Cloning yields another handle to the same session. When the last handle
/// is dropped the pending step is cancelled and all tracks are stopped.
///
/// Observers run while the session lock is held and must not call back
/// into the sequencer; use [`subscribe`](Self::subscribe) for consumers
/// that need to read or drive the session.
#[derive(Clone)]
pub struct RevealSequencer {
    inner: Arc<Inner>,
}

struct Inner {
    timing: TimingConfig,
    audio: Arc<dyn AudioDriver>,
    observers: Vec<Arc<dyn SessionObserver>>,
    tx: watch::Sender<SessionSnapshot>,
    core: Mutex<Core>,
}

struct Core {
    session: Session,
    pending: Option<PendingStep>,
    generation: u64,
    shut_down: bool,
}

struct PendingStep {
    generation: u64,
    step: Step,
    handle: JoinHandle<()>,
}

impl RevealSequencer {
    /// Starts a builder with default timing, the default outcome, and no audio.
    #[must_use]
    pub fn builder() -> SequencerBuilder {
        SequencerBuilder {
            outcome: Outcome::default(),
            timing: TimingConfig::default(),
            audio: Arc::new(NullAudio),
            observers: Vec::new(),
        }
    }

    /// Unlocks audio and begins the countdown.
    ///
    /// Returns `false` without side effects unless the session is idle.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime (the first step is spawned).
    pub fn start(&self) -> bool {
        let mut core = self.inner.lock_core();
        if core.shut_down || core.session.status() != Status::Idle {
            debug!(status = %core.session.status(), "start ignored");
            return false;
        }

        self.inner.cue(AudioCue::Unlock);
        let previous = core.session.snapshot();
        core.session.begin_countdown();
        info!("reveal started");
        self.inner.commit(&mut core, previous, ChangeCause::Start);
        true
    }

    /// Cancels the pending step, stops every track, and restores the
    /// initial session values in one step.
    ///
    /// Accepted from any status.
    pub fn reset(&self) {
        let mut core = self.inner.lock_core();
        Inner::cancel_pending(&mut core);
        for track in Track::ALL {
            self.inner.cue(AudioCue::PauseAndRewind(track));
        }
        let previous = core.session.snapshot();
        core.session.reset();
        info!(from = %previous.status, "session reset");
        self.inner.commit(&mut core, previous, ChangeCause::Reset);
    }

    /// Stops the sequencer for good: cancels the pending step and silences
    /// every track. Later `start` calls are ignored.
    pub fn shutdown(&self) {
        let mut core = self.inner.lock_core();
        if core.shut_down {
            return;
        }
        core.shut_down = true;
        Inner::cancel_pending(&mut core);
        for track in Track::ALL {
            self.inner.cue(AudioCue::PauseAndRewind(track));
        }
        debug!("sequencer shut down");
    }

    /// Returns the current session values.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock_core().session.snapshot()
    }

    /// Returns a receiver that always holds the latest snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.tx.subscribe()
    }

    /// Returns the step currently waiting to fire, if any.
    #[must_use]
    pub fn pending_step(&self) -> Option<Step> {
        self.inner.lock_core().pending.as_ref().map(|p| p.step)
    }

    /// Returns the configured timing.
    #[must_use]
    pub fn timing(&self) -> &TimingConfig {
        &self.inner.timing
    }
}

impl std::fmt::Debug for RevealSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.inner.lock_core();
        f.debug_struct("RevealSequencer")
            .field("session", &core.session.snapshot())
            .field("pending", &core.pending.as_ref().map(|p| p.step))
            .field("generation", &core.generation)
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn lock_core(&self) -> MutexGuard<'_, Core> {
        // Session values are plain data and stay consistent even if an
        // observer panicked mid-notification.
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes a change, issues its cues, and schedules the next step.
    fn commit(self: &Arc<Self>, core: &mut Core, previous: SessionSnapshot, cause: ChangeCause) {
        let current = core.session.snapshot();
        let change = SessionChange {
            previous,
            current,
            cause,
        };

        self.tx.send_replace(current);
        for observer in &self.observers {
            observer.on_change(&change);
        }
        for cue in change.transition_cues() {
            self.cue(cue);
        }

        self.schedule(core);
    }

    /// Replaces the pending step with the one due for the current snapshot.
    fn schedule(self: &Arc<Self>, core: &mut Core) {
        Self::cancel_pending(core);
        if core.shut_down {
            return;
        }
        let Some(step) = next_step(&core.session.snapshot(), &self.timing) else {
            return;
        };

        core.generation += 1;
        let generation = core.generation;
        let weak = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(step.delay).await;
            if let Some(inner) = Weak::upgrade(&weak) {
                inner.tick(generation);
            }
        });
        trace!(generation, delay = ?step.delay, action = ?step.action, "step scheduled");
        core.pending = Some(PendingStep {
            generation,
            step,
            handle,
        });
    }

    /// Applies the pending step if it is still the current one.
    fn tick(self: &Arc<Self>, generation: u64) {
        let mut core = self.lock_core();
        let Some(pending) = core.pending.take_if(|p| p.generation == generation) else {
            trace!(generation, "stale step ignored");
            return;
        };

        let previous = core.session.snapshot();
        if pending.step.action.apply(&mut core.session) {
            self.commit(&mut core, previous, ChangeCause::Step(pending.step.action));
        } else {
            debug!(action = ?pending.step.action, "step did not apply");
            self.schedule(&mut core);
        }
    }

    fn cancel_pending(core: &mut Core) {
        if let Some(pending) = core.pending.take() {
            pending.handle.abort();
            trace!(generation = pending.generation, "pending step cancelled");
        }
    }

    /// Issues a cue; failures are logged and dropped.
    fn cue(&self, cue: AudioCue) {
        let result = self.audio.apply(cue);
        if let Err(ref e) = result {
            debug!(%cue, error = %e, "audio cue failed");
        }
        for observer in &self.observers {
            observer.on_cue(cue, result.as_ref().err());
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let core = self.core.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = core.pending.take() {
            pending.handle.abort();
        }
        if !core.shut_down {
            for track in Track::ALL {
                let _ = self.audio.pause_and_rewind(track);
            }
        }
    }
}
