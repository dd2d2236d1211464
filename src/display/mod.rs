//! Presentation layer
//!
//! Renderers draw a [`Scene`]: the session snapshot plus everything the
//! display owns itself (viewport, fullscreen mode, confetti, and how long
//! the result has been showing).
//!
//! - [`terminal`]: full-screen ratatui renderer
//! - [`headless`]: plain-text renderer for non-interactive runs

pub mod confetti;
pub mod fullscreen;
pub mod headless;
pub mod stage;
pub mod terminal;
pub mod theme;
pub mod viewport;

use std::time::Duration;

pub use confetti::Confetti;
pub use fullscreen::{AlternateScreen, FullscreenController};
pub use headless::TextRenderer;
pub use stage::Stage;
pub use terminal::TerminalRenderer;
pub use theme::Theme;
pub use viewport::{Subscription, Viewport, ViewportObserver};

use crate::error::Result;
use crate::sequencer::SessionSnapshot;

/// How long the result shows before the reset control appears.
pub const RESET_DELAY: Duration = Duration::from_secs(3);

/// Everything a renderer draws for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    /// Session values.
    pub snapshot: SessionSnapshot,
    /// Styling for the configured outcome.
    pub theme: &'a Theme,
    /// Drawable area.
    pub viewport: Viewport,
    /// Whether the display is fullscreen.
    pub fullscreen: bool,
    /// Time since the result appeared.
    pub revealed_for: Option<Duration>,
    /// Active confetti burst.
    pub confetti: Option<&'a Confetti>,
}

impl Scene<'_> {
    /// Whether the start control is shown.
    #[must_use]
    pub fn show_start(&self) -> bool {
        self.snapshot.can_start()
    }

    /// Whether the reset control is shown.
    #[must_use]
    pub fn show_reset(&self) -> bool {
        self.snapshot.can_reset() && self.revealed_for.is_some_and(|d| d >= RESET_DELAY)
    }
}

/// Draws scenes.
pub trait Renderer {
    /// Draws one frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the output could not be written.
    fn render(&mut self, scene: &Scene<'_>) -> Result<()>;
}
