//! Outcome themes and scripted text.

use crate::config::schema::{Outcome, ThemeOverrides};

// ============================================================================
// Scripted text
// ============================================================================

/// Idle title.
pub const IDLE_TITLE: &str = "¿Están listos?";
/// Start control label.
pub const START_LABEL: &str = "Iniciar Protocolo";
/// Console lines shown while analyzing.
pub const CONSOLE_LINES: [&str; 3] = [
    "> INICIANDO ESCANEO DE GÉNERO...",
    "> ACCEDIENDO A LA BASE DE DATOS...",
    "> ANALIZANDO CROMOSOMAS...",
];
/// Glitch headline.
pub const ERROR_TITLE: &str = "⚠️ FATAL ERROR";
/// Glitch detail line.
pub const ERROR_DETAIL: &str = "SOBRECARGA DE TERNURA DETECTADA";
/// Glitch footer line.
pub const ERROR_FOOTER: &str = "REINICIANDO SISTEMA EN MODO PRINCESA...";
/// Reset control label.
pub const RESET_LABEL: &str = "Repetir emoción";
/// Fullscreen indicator when windowed.
pub const ENTER_FULLSCREEN_LABEL: &str = "Pantalla Completa";
/// Fullscreen indicator when fullscreen.
pub const EXIT_FULLSCREEN_LABEL: &str = "Salir de Pantalla Completa";

/// Returns the fullscreen indicator label for the current mode.
#[must_use]
pub const fn fullscreen_label(fullscreen: bool) -> &'static str {
    if fullscreen {
        EXIT_FULLSCREEN_LABEL
    } else {
        ENTER_FULLSCREEN_LABEL
    }
}

// ============================================================================
// Colors
// ============================================================================

/// 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parses `#RRGGBB`.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Neutral background used while idle and counting.
pub const NEUTRAL: Rgb = Rgb(0x33, 0x41, 0x55);
/// Console foreground while analyzing.
pub const CONSOLE_GREEN: Rgb = Rgb(0x22, 0xC5, 0x5E);
/// Glitch foreground.
pub const ERROR_RED: Rgb = Rgb(0xEF, 0x44, 0x44);

const BOY_PALETTE: [Rgb; 3] = [
    Rgb(0x25, 0x63, 0xEB),
    Rgb(0x60, 0xA5, 0xFA),
    Rgb(0x93, 0xC5, 0xFD),
];
const GIRL_PALETTE: [Rgb; 3] = [
    Rgb(0xDB, 0x27, 0x77),
    Rgb(0xF4, 0x72, 0xB6),
    Rgb(0xFB, 0xCF, 0xE8),
];

// ============================================================================
// Theme
// ============================================================================

/// Result styling for one outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Outcome this theme renders.
    pub outcome: Outcome,
    /// Headline color of the result.
    pub accent: Rgb,
    /// Result headline.
    pub message: String,
    /// Emoji row above the headline.
    pub emoji: String,
    /// Line under the headline.
    pub greeting: String,
    /// Confetti colors.
    pub palette: [Rgb; 3],
}

impl Theme {
    /// Built-in theme for `outcome`.
    #[must_use]
    pub fn builtin(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Boy => Self {
                outcome,
                accent: BOY_PALETTE[0],
                message: "¡ES UN NIÑO!".into(),
                emoji: "💙👶🚙".into(),
                greeting: "¡Bienvenido!".into(),
                palette: BOY_PALETTE,
            },
            Outcome::Girl => Self {
                outcome,
                accent: GIRL_PALETTE[0],
                message: "¡ES UNA NIÑA!".into(),
                emoji: "🌸👶🎀".into(),
                greeting: "¡Bienvenida!".into(),
                palette: GIRL_PALETTE,
            },
        }
    }

    /// Built-in theme with any configured text overrides applied.
    #[must_use]
    pub fn resolve(outcome: Outcome, overrides: &ThemeOverrides) -> Self {
        let mut theme = Self::builtin(outcome);
        if let Some(text) = overrides.for_outcome(outcome) {
            if let Some(message) = &text.message {
                theme.message.clone_from(message);
            }
            if let Some(emoji) = &text.emoji {
                theme.emoji.clone_from(emoji);
            }
            if let Some(greeting) = &text.greeting {
                theme.greeting.clone_from(greeting);
            }
        }
        theme
    }
}
