//! Plain-text renderer.
//!
//! Writes one line per visible change, for runs without a terminal UI.
//! Frames that look the same as the previous one are skipped, so the
//! output reads as a transcript of the presentation.

use std::io::Write;

use super::theme::{
    CONSOLE_LINES, ERROR_DETAIL, ERROR_FOOTER, ERROR_TITLE, IDLE_TITLE, RESET_LABEL, START_LABEL,
};
use super::{Renderer, Scene};
use crate::error::Result;
use crate::sequencer::Status;

/// Line-oriented renderer over any writer.
#[derive(Debug)]
pub struct TextRenderer<W: Write> {
    out: W,
    last: Option<String>,
}

impl<W: Write> TextRenderer<W> {
    pub const fn new(out: W) -> Self {
        Self { out, last: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, scene: &Scene<'_>) -> Result<()> {
        let line = describe(scene);
        if self.last.as_deref() == Some(line.as_str()) {
            return Ok(());
        }
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        self.last = Some(line);
        Ok(())
    }
}

/// One-line description of what the scene shows.
#[must_use]
pub fn describe(scene: &Scene<'_>) -> String {
    let snap = &scene.snapshot;
    match snap.status {
        Status::Idle => format!("{IDLE_TITLE} [{START_LABEL}]"),
        Status::Counting => snap.count.to_string(),
        Status::Analyzing if snap.is_error => {
            format!("{ERROR_TITLE} | {ERROR_DETAIL} | {ERROR_FOOTER}")
        }
        Status::Analyzing => {
            // Console lines appear progressively as the ramp advances.
            let shown = console_lines_shown(snap.loading_percent);
            format!("{} [{:>3}%]", CONSOLE_LINES[shown - 1], snap.loading_percent)
        }
        Status::Revealed => {
            let theme = scene.theme;
            let mut line = format!("{} {} {}", theme.emoji, theme.message, theme.greeting);
            if scene.show_reset() {
                line.push_str(" [");
                line.push_str(RESET_LABEL);
                line.push(']');
            }
            line
        }
    }
}

/// Number of console lines visible at `percent` (1 to 3).
#[must_use]
pub const fn console_lines_shown(percent: u8) -> usize {
    match percent {
        0..=32 => 1,
        33..=65 => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::schema::Outcome;
    use crate::display::{Theme, Viewport};
    use crate::sequencer::SessionSnapshot;

    fn scene<'a>(theme: &'a Theme, snapshot: SessionSnapshot) -> Scene<'a> {
        Scene {
            snapshot,
            theme,
            viewport: Viewport::new(80, 24),
            fullscreen: false,
            revealed_for: None,
            confetti: None,
        }
    }

    fn snap(status: Status, count: u8, percent: u8, is_error: bool) -> SessionSnapshot {
        SessionSnapshot {
            status,
            count,
            loading_percent: percent,
            is_error,
            outcome: Outcome::Girl,
        }
    }

    #[test]
    fn test_describe_each_phase() {
        let theme = Theme::builtin(Outcome::Girl);
        assert_eq!(
            describe(&scene(&theme, snap(Status::Idle, 5, 0, false))),
            "¿Están listos? [Iniciar Protocolo]"
        );
        assert_eq!(describe(&scene(&theme, snap(Status::Counting, 3, 0, false))), "3");
        assert_eq!(
            describe(&scene(&theme, snap(Status::Analyzing, 0, 42, false))),
            "> ACCEDIENDO A LA BASE DE DATOS... [ 42%]"
        );
        assert!(
            describe(&scene(&theme, snap(Status::Analyzing, 0, 99, true))).starts_with(ERROR_TITLE)
        );
        assert_eq!(
            describe(&scene(&theme, snap(Status::Revealed, 0, 99, true))),
            "🌸👶🎀 ¡ES UNA NIÑA! ¡Bienvenida!"
        );
    }

    #[test]
    fn test_reset_label_after_delay() {
        let theme = Theme::builtin(Outcome::Girl);
        let mut s = scene(&theme, snap(Status::Revealed, 0, 99, true));
        s.revealed_for = Some(Duration::from_secs(3));
        assert!(describe(&s).ends_with("[Repetir emoción]"));
    }

    #[test]
    fn test_renderer_skips_duplicate_frames() {
        let theme = Theme::builtin(Outcome::Boy);
        let mut renderer = TextRenderer::new(Vec::new());
        let counting = scene(&theme, snap(Status::Counting, 5, 0, false));
        renderer.render(&counting).unwrap();
        renderer.render(&counting).unwrap();
        renderer
            .render(&scene(&theme, snap(Status::Counting, 4, 0, false)))
            .unwrap();

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(out, "5\n4\n");
    }

    #[test]
    fn test_console_lines_progress() {
        assert_eq!(console_lines_shown(0), 1);
        assert_eq!(console_lines_shown(50), 2);
        assert_eq!(console_lines_shown(99), 3);
    }
}
