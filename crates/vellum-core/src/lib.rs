//! # Vellum Core
//!
//! Font-model types shared between the Vellum rendering crates and the
//! platform text backends: affine transforms, positioned glyphs, and the
//! antialiasing request that scaled fonts carry.

pub mod matrix;

pub use matrix::Matrix;

/// A single positioned glyph in user space.
///
/// `index` is the glyph index in the font face (not a Unicode codepoint);
/// `x`/`y` is the glyph origin on the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub index: u32,
    pub x: f64,
    pub y: f64,
}

impl Glyph {
    pub fn new(index: u32, x: f64, y: f64) -> Self {
        Self { index, x, y }
    }
}

/// Antialiasing mode requested for a scaled font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialias {
    /// Backend picks the platform default.
    #[default]
    Default,
    /// No antialiasing; bilevel coverage.
    None,
    /// Grayscale antialiasing.
    Gray,
    /// Subpixel antialiasing using the display's pixel geometry.
    Subpixel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_new() {
        let g = Glyph::new(42, 1.5, -2.0);
        assert_eq!(g.index, 42);
        assert_eq!(g.x, 1.5);
        assert_eq!(g.y, -2.0);
    }

    #[test]
    fn test_antialias_default() {
        assert_eq!(Antialias::default(), Antialias::Default);
    }
}
