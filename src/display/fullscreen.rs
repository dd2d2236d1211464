//! Fullscreen control.
//!
//! On a terminal, "fullscreen" is the alternate screen: the presentation
//! takes over the whole window and the shell scrollback is restored on exit.
//! Requests are best-effort; callers log failures and keep going.

use std::io::Write;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};

use crate::error::FullscreenError;

/// Switches the display in and out of fullscreen.
pub trait FullscreenController {
    /// Requests fullscreen.
    ///
    /// # Errors
    ///
    /// Returns an error if the display refused the request.
    fn enter(&mut self) -> Result<(), FullscreenError>;

    /// Leaves fullscreen.
    ///
    /// # Errors
    ///
    /// Returns an error if the display refused the request.
    fn exit(&mut self) -> Result<(), FullscreenError>;

    /// Whether the display is currently fullscreen.
    fn is_fullscreen(&self) -> bool;

    /// Flips the mode. Returns the mode now in effect.
    ///
    /// # Errors
    ///
    /// Returns an error if the display refused the request.
    fn toggle(&mut self) -> Result<bool, FullscreenError> {
        if self.is_fullscreen() {
            self.exit()?;
        } else {
            self.enter()?;
        }
        Ok(self.is_fullscreen())
    }
}

/// Alternate-screen controller over any terminal writer.
#[derive(Debug)]
pub struct AlternateScreen<W: Write> {
    out: W,
    active: bool,
}

impl<W: Write> AlternateScreen<W> {
    /// Wraps `out`, starting in the normal screen.
    pub const fn new(out: W) -> Self {
        Self { out, active: false }
    }

    /// Consumes the controller, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FullscreenController for AlternateScreen<W> {
    fn enter(&mut self) -> Result<(), FullscreenError> {
        if !self.active {
            execute!(self.out, EnterAlternateScreen)?;
            self.active = true;
        }
        Ok(())
    }

    fn exit(&mut self) -> Result<(), FullscreenError> {
        if self.active {
            execute!(self.out, LeaveAlternateScreen)?;
            self.active = false;
        }
        Ok(())
    }

    fn is_fullscreen(&self) -> bool {
        self.active
    }
}
