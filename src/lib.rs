//! `reveal` - staged reveal presentation
//!
//! A timer-driven sequencer walks a session through a countdown, a fake
//! analysis with a scripted glitch, and the final result, issuing audio
//! cues along the way. Renderers draw the session in a terminal UI or as
//! a plain-text transcript.

pub mod app;
pub mod audio;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod observability;
pub mod sequencer;
