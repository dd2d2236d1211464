//! Confetti for the result screen.
//!
//! A burst is sized to the viewport (capped at [`MAX_PIECES`]) and starts
//! above the top edge. Pieces fall once: anything that leaves the viewport
//! is removed, never recycled, so the burst ends on its own.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::viewport::Viewport;

/// Upper bound on pieces in one burst.
pub const MAX_PIECES: usize = 600;

/// Cells per piece when sizing a burst to the viewport.
const CELLS_PER_PIECE: usize = 4;

const GLYPHS: [char; 4] = ['▪', '●', '▴', '◆'];

/// Fall speed range, rows per second.
const FALL_SPEED: (f32, f32) = (3.0, 10.0);

/// Horizontal drift range, columns per second.
const DRIFT: f32 = 2.0;

/// A single falling piece.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    /// Column, fractional.
    pub x: f32,
    /// Row, fractional; negative while still above the viewport.
    pub y: f32,
    vx: f32,
    vy: f32,
    /// Glyph drawn for this piece.
    pub glyph: char,
    /// Index into the theme palette.
    pub color: usize,
}

/// One non-recycling confetti burst.
#[derive(Debug, Clone)]
pub struct Confetti {
    pieces: Vec<Piece>,
    viewport: Viewport,
}

impl Confetti {
    /// Number of pieces a burst gets for `viewport`.
    #[must_use]
    pub fn piece_count(viewport: Viewport) -> usize {
        let cells = usize::from(viewport.width) * usize::from(viewport.height);
        (cells / CELLS_PER_PIECE).min(MAX_PIECES)
    }

    /// Launches a burst over `viewport` using colors `0..palette_len`.
    #[must_use]
    pub fn burst(viewport: Viewport, palette_len: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let count = if palette_len == 0 { 0 } else { Self::piece_count(viewport) };
        let width = f32::from(viewport.width);
        let height = f32::from(viewport.height);

        let pieces = (0..count)
            .map(|_| Piece {
                x: rng.random_range(0.0..width),
                y: -rng.random_range(0.0..height.max(1.0)),
                vx: rng.random_range(-DRIFT..=DRIFT),
                vy: rng.random_range(FALL_SPEED.0..=FALL_SPEED.1),
                glyph: GLYPHS[rng.random_range(0..GLYPHS.len())],
                color: rng.random_range(0..palette_len),
            })
            .collect();

        Self { pieces, viewport }
    }

    /// Moves every piece forward by `dt` and drops the ones that left.
    pub fn advance(&mut self, dt: Duration) {
        let secs = dt.as_secs_f32();
        for piece in &mut self.pieces {
            piece.x += piece.vx * secs;
            piece.y += piece.vy * secs;
        }
        let viewport = self.viewport;
        self.pieces.retain(|p| in_bounds(p, viewport));
    }

    /// Adopts a new viewport; pieces outside it are dropped.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.pieces.retain(|p| in_bounds(p, viewport));
    }

    /// Pieces currently inside the viewport, as whole cells.
    pub fn visible(&self) -> impl Iterator<Item = (u16, u16, &Piece)> {
        self.pieces.iter().filter(|p| p.y >= 0.0).map(|p| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let cell = (p.x as u16, p.y as u16);
            (cell.0, cell.1, p)
        })
    }

    /// Pieces still falling, including those above the viewport.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pieces.len()
    }

    /// Whether every piece has fallen out.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.pieces.is_empty()
    }
}

fn in_bounds(piece: &Piece, viewport: Viewport) -> bool {
    piece.y < f32::from(viewport.height) && piece.x >= 0.0 && piece.x < f32::from(viewport.width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_scales_with_viewport_and_caps() {
        assert_eq!(Confetti::piece_count(Viewport::new(80, 24)), 480);
        assert_eq!(Confetti::piece_count(Viewport::new(300, 100)), MAX_PIECES);
        assert_eq!(Confetti::piece_count(Viewport::new(0, 50)), 0);
    }

    #[test]
    fn test_burst_is_deterministic_per_seed() {
        let a = Confetti::burst(Viewport::new(40, 20), 3, 7);
        let b = Confetti::burst(Viewport::new(40, 20), 3, 7);
        assert_eq!(a.pieces, b.pieces);
        assert!(a.pieces.iter().all(|p| p.color < 3 && p.y <= 0.0));
    }

    #[test]
    fn test_pieces_fall_once() {
        let mut confetti = Confetti::burst(Viewport::new(40, 20), 3, 1);
        let start = confetti.remaining();
        assert!(start > 0);

        // Slowest piece starts at most 20 rows up and needs 40 rows at 3 rows/s.
        for _ in 0..200 {
            confetti.advance(Duration::from_millis(100));
            assert!(confetti.remaining() <= start, "pieces must never respawn");
        }
        assert!(confetti.is_finished());
    }

    #[test]
    fn test_visible_stays_in_bounds() {
        let viewport = Viewport::new(30, 10);
        let mut confetti = Confetti::burst(viewport, 3, 42);
        for _ in 0..20 {
            confetti.advance(Duration::from_millis(250));
            for (x, y, _) in confetti.visible() {
                assert!(x < viewport.width && y < viewport.height);
            }
        }
    }

    #[test]
    fn test_shrinking_drops_outside_pieces() {
        let mut confetti = Confetti::burst(Viewport::new(100, 40), 3, 3);
        confetti.advance(Duration::from_secs(2));
        confetti.resize(Viewport::new(10, 5));
        for (x, y, _) in confetti.visible() {
            assert!(x < 10 && y < 5);
        }
    }

    #[test]
    fn test_empty_palette_has_no_pieces() {
        assert!(Confetti::burst(Viewport::new(80, 24), 0, 0).is_finished());
    }
}
