//! Full-screen terminal renderer (ratatui).

use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::Frame;

use super::headless::console_lines_shown;
use super::theme::{
    CONSOLE_GREEN, CONSOLE_LINES, ERROR_DETAIL, ERROR_FOOTER, ERROR_RED, ERROR_TITLE, IDLE_TITLE,
    NEUTRAL, RESET_LABEL, Rgb, START_LABEL, fullscreen_label,
};
use super::viewport::Viewport;
use super::{Renderer, Scene};
use crate::error::{Result, RevealError};
use crate::sequencer::Status;

/// Renderer that draws scenes through a ratatui terminal.
pub struct TerminalRenderer<B: Backend> {
    terminal: Terminal<B>,
}

impl<B: Backend> TerminalRenderer<B> {
    /// Wraps `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`RevealError::Terminal`] if the backend cannot be queried.
    pub fn new(backend: B) -> Result<Self> {
        let terminal = Terminal::new(backend).map_err(terminal_error)?;
        Ok(Self { terminal })
    }

    /// Current drawable size.
    ///
    /// # Errors
    ///
    /// Returns [`RevealError::Terminal`] if the size cannot be read.
    pub fn viewport(&self) -> Result<Viewport> {
        let area = self.terminal.size().map_err(terminal_error)?;
        Ok(Viewport::new(area.width, area.height))
    }

    /// Forces a full redraw on the next frame.
    ///
    /// # Errors
    ///
    /// Returns [`RevealError::Terminal`] if the screen cannot be cleared.
    pub fn clear(&mut self) -> Result<()> {
        self.terminal.clear().map_err(terminal_error)
    }

    pub const fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.terminal.backend_mut()
    }
}

impl<B: Backend> Renderer for TerminalRenderer<B> {
    fn render(&mut self, scene: &Scene<'_>) -> Result<()> {
        self.terminal
            .draw(|frame| draw_scene(frame, scene))
            .map_err(terminal_error)?;
        Ok(())
    }
}

fn terminal_error(e: std::io::Error) -> RevealError {
    RevealError::Terminal(e.to_string())
}

const fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

// ============================================================================
// Layout
// ============================================================================

/// Draws one scene into `frame`.
pub fn draw_scene(frame: &mut Frame, scene: &Scene<'_>) {
    let area = frame.size();
    let snap = &scene.snapshot;

    let background = match snap.status {
        Status::Analyzing => Color::Black,
        _ => Color::Reset,
    };
    frame.render_widget(Block::default().style(Style::default().bg(background)), area);

    if let Some(confetti) = scene.confetti {
        let buf = frame.buffer_mut();
        for (x, y, piece) in confetti.visible() {
            if x < area.width && y < area.height {
                let fg = color(scene.theme.palette[piece.color % scene.theme.palette.len()]);
                buf.get_mut(area.x + x, area.y + y).set_char(piece.glyph).set_fg(fg);
            }
        }
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let label_color = if snap.status == Status::Analyzing {
        color(CONSOLE_GREEN)
    } else {
        Color::DarkGray
    };
    frame.render_widget(
        Paragraph::new(format!("[f] {}", fullscreen_label(scene.fullscreen)))
            .alignment(Alignment::Right)
            .style(Style::default().fg(label_color)),
        rows[0],
    );

    match snap.status {
        Status::Idle => draw_idle(frame, rows[1]),
        Status::Counting => draw_count(frame, rows[1], snap.count),
        Status::Analyzing if snap.is_error => draw_error(frame, rows[1]),
        Status::Analyzing => draw_console(frame, rows[1], snap.loading_percent),
        Status::Revealed => draw_result(frame, rows[1], scene),
    }

    frame.render_widget(
        Paragraph::new(key_hints(scene))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray)),
        rows[2],
    );
}

fn key_hints(scene: &Scene<'_>) -> String {
    let mut hints = Vec::new();
    if scene.show_start() {
        hints.push("Enter: iniciar");
    }
    if scene.show_reset() {
        hints.push("r: repetir");
    }
    hints.push("f: pantalla completa");
    hints.push("q: salir");
    hints.join("  ·  ")
}

/// Centers a `width` x `height` box inside `area`, clamped to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_idle(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::styled(
            IDLE_TITLE,
            Style::default().fg(color(NEUTRAL)).add_modifier(Modifier::BOLD),
        ),
        Line::default(),
        Line::styled(
            format!("[ {START_LABEL} ]"),
            Style::default()
                .fg(Color::White)
                .bg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        centered(area, area.width, 3),
    );
}

fn draw_count(frame: &mut Frame, area: Rect, count: u8) {
    let glyph = big_digit(count);
    let lines: Vec<Line> = glyph
        .iter()
        .map(|row| {
            let wide: String = row.chars().flat_map(|c| [c, c]).collect();
            Line::from(wide)
        })
        .collect();
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .style(Style::default().fg(color(NEUTRAL)).add_modifier(Modifier::BOLD)),
        centered(area, area.width, 5),
    );
}

fn draw_console(frame: &mut Frame, area: Rect, percent: u8) {
    let green = color(CONSOLE_GREEN);
    let panel = centered(area, 64, 10);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(green))
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(panel);
    frame.render_widget(block, panel);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(3)])
        .split(inner);

    let shown = console_lines_shown(percent);
    let lines: Vec<Line> = CONSOLE_LINES
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let mut style = Style::default().fg(green);
            if i == 0 {
                style = style.add_modifier(Modifier::SLOW_BLINK);
            }
            if i >= shown {
                style = style.add_modifier(Modifier::DIM);
            }
            Line::styled(*text, style)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), parts[0]);

    frame.render_widget(
        Gauge::default()
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(green)))
            .gauge_style(Style::default().fg(green).bg(Color::Black))
            .percent(u16::from(percent))
            .label(format!("{percent}%")),
        parts[1],
    );
}

fn draw_error(frame: &mut Frame, area: Rect) {
    let red = color(ERROR_RED);
    let lines = vec![
        Line::styled(
            ERROR_TITLE,
            Style::default()
                .fg(red)
                .add_modifier(Modifier::BOLD | Modifier::RAPID_BLINK),
        ),
        Line::default(),
        Line::styled(ERROR_DETAIL, Style::default().fg(red).add_modifier(Modifier::BOLD)),
        Line::styled(ERROR_FOOTER, Style::default().fg(red)),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        centered(area, area.width, 4),
    );
}

fn draw_result(frame: &mut Frame, area: Rect, scene: &Scene<'_>) {
    let theme = scene.theme;
    let accent = color(theme.accent);
    let mut lines = vec![
        Line::from(theme.emoji.as_str()),
        Line::default(),
        Line::from(Span::styled(
            theme.message.as_str(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
        Line::styled(
            theme.greeting.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::default(),
    ];
    if scene.show_reset() {
        lines.push(Line::styled(
            format!("[ ↺ {RESET_LABEL} ]"),
            Style::default().fg(Color::White).bg(accent),
        ));
    }
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        centered(area, area.width, 6),
    );
}

/// 3x5 block glyph for a countdown digit.
fn big_digit(digit: u8) -> [&'static str; 5] {
    match digit {
        0 => ["███", "█ █", "█ █", "█ █", "███"],
        1 => [" █ ", "██ ", " █ ", " █ ", "███"],
        2 => ["███", "  █", "███", "█  ", "███"],
        3 => ["███", "  █", "███", "  █", "███"],
        4 => ["█ █", "█ █", "███", "  █", "  █"],
        5 => ["███", "█  ", "███", "  █", "███"],
        6 => ["███", "█  ", "███", "█ █", "███"],
        7 => ["███", "  █", "  █", "  █", "  █"],
        8 => ["███", "█ █", "███", "█ █", "███"],
        _ => ["███", "█ █", "███", "  █", "███"],
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ratatui::backend::TestBackend;

    use super::*;
    use crate::config::schema::Outcome;
    use crate::display::{Confetti, Theme};
    use crate::sequencer::SessionSnapshot;

    fn snap(status: Status, count: u8, percent: u8, is_error: bool) -> SessionSnapshot {
        SessionSnapshot {
            status,
            count,
            loading_percent: percent,
            is_error,
            outcome: Outcome::Girl,
        }
    }

    fn render(scene: &Scene<'_>) -> String {
        let mut renderer = TerminalRenderer::new(TestBackend::new(80, 24)).unwrap();
        renderer.render(scene).unwrap();
        let buffer = renderer.terminal().backend().buffer();
        let width = usize::from(buffer.area.width);
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

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

    #[test]
    fn test_idle_shows_start_control() {
        let theme = Theme::builtin(Outcome::Girl);
        let text = render(&scene(&theme, snap(Status::Idle, 5, 0, false)));
        assert!(text.contains("Iniciar Protocolo"));
        assert!(text.contains("Enter: iniciar"));
        assert!(text.contains("Pantalla Completa"));
    }

    #[test]
    fn test_console_shows_progress() {
        let theme = Theme::builtin(Outcome::Girl);
        let text = render(&scene(&theme, snap(Status::Analyzing, 0, 57, false)));
        assert!(text.contains("ANALIZANDO CROMOSOMAS"));
        assert!(text.contains("57%"));
        assert!(!text.contains("Iniciar Protocolo"));
    }

    #[test]
    fn test_error_screen() {
        let theme = Theme::builtin(Outcome::Girl);
        let text = render(&scene(&theme, snap(Status::Analyzing, 0, 99, true)));
        assert!(text.contains("SOBRECARGA DE TERNURA DETECTADA"));
        assert!(!text.contains("99%"));
    }

    #[test]
    fn test_reset_control_waits() {
        let theme = Theme::builtin(Outcome::Boy);
        let mut s = scene(&theme, snap(Status::Revealed, 0, 99, true));
        s.revealed_for = Some(Duration::from_secs(1));
        let text = render(&s);
        assert!(text.contains("NIÑO"));
        assert!(!text.contains("Repetir"));

        s.revealed_for = Some(Duration::from_secs(3));
        s.fullscreen = true;
        let text = render(&s);
        assert!(text.contains("Repetir"));
        assert!(text.contains("Salir de Pantalla Completa"));
    }

    #[test]
    fn test_confetti_drawn_inside_area() {
        let theme = Theme::builtin(Outcome::Girl);
        let mut confetti = Confetti::burst(Viewport::new(80, 24), 3, 5);
        confetti.advance(Duration::from_secs(3));
        let mut s = scene(&theme, snap(Status::Revealed, 0, 99, true));
        s.confetti = Some(&confetti);
        let text = render(&s);
        assert!(text.chars().any(|c| ['▪', '●', '▴', '◆'].contains(&c)));
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let theme = Theme::builtin(Outcome::Girl);
        let mut renderer = TerminalRenderer::new(TestBackend::new(4, 2)).unwrap();
        for status in [Status::Idle, Status::Counting, Status::Analyzing, Status::Revealed] {
            renderer
                .render(&scene(&theme, snap(status, 3, 40, false)))
                .unwrap();
        }
    }

    #[test]
    fn test_big_digits_are_uniform() {
        for d in 0..=9 {
            assert!(big_digit(d).iter().all(|row| row.chars().count() == 3));
        }
    }
}
