//! Reveal sequencer
//!
//! - [`state`]: session values and their guarded mutators
//! - [`timing`]: the pure step protocol
//! - [`observer`]: change notifications and transition cues
//! - [`engine`]: the timer-driven [`RevealSequencer`]

pub mod engine;
pub mod observer;
pub mod state;
pub mod timing;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{RevealSequencer, SequencerBuilder};
pub use observer::{ChangeCause, SessionChange, SessionObserver};
pub use state::{Session, SessionSnapshot, Status};
pub use timing::{Step, StepAction, next_step, total_runtime};
