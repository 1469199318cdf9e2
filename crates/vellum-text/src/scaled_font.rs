//! Scaled fonts.
//!
//! A [`ScaledFont`] is a font face at a specific size and transform, ready
//! for glyph measurement and rendering. It records the combined
//! logical-to-device transform and its inverse, the antialiasing request,
//! the measuring mode, and the lazily resolved [`RenderingState`] that picks
//! the rendering-params variant for its glyph runs.

use std::sync::OnceLock;

use vellum_core::{Antialias, Glyph, Matrix};

use crate::{GlyphOffset, GlyphRunBuffer, RenderingState, TextError};

/// How glyph advances are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeasuringMode {
    /// Ideal (resolution-independent) metrics.
    #[default]
    Natural,
    /// GDI-compatible metrics, aliased to the pixel grid.
    GdiClassic,
    /// GDI-compatible metrics with natural advance widths.
    GdiNatural,
}

/// How a built glyph run is positioned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphRunPlacement {
    /// Em size the run was built for, in DIPs.
    pub em_size: f32,
    /// When true, glyph positions were pulled through the inverse font
    /// transform and the forward transform must be applied natively when
    /// drawing the run.
    pub transformed: bool,
    /// Baseline origin of the run in user space.
    pub origin: (f64, f64),
}

/// A font at a specific size and transform.
pub struct ScaledFont {
    font_matrix: Matrix,
    ctm: Matrix,
    logical_to_device: Matrix,
    device_to_logical: Matrix,
    antialias: Antialias,
    measuring_mode: MeasuringMode,
    rendering_state: OnceLock<RenderingState>,
}

impl ScaledFont {
    /// Combine the font matrix with the device transform.
    ///
    /// Fails with [`TextError::InvalidMatrix`] when the product is not
    /// invertible (zero or non-finite determinant).
    pub fn new(
        font_matrix: Matrix,
        ctm: Matrix,
        antialias: Antialias,
        measuring_mode: MeasuringMode,
    ) -> Result<Self, TextError> {
        let logical_to_device = font_matrix.multiply(&ctm);
        let device_to_logical = logical_to_device
            .invert()
            .ok_or(TextError::InvalidMatrix)?;
        Ok(Self {
            font_matrix,
            ctm,
            logical_to_device,
            device_to_logical,
            antialias,
            measuring_mode,
            rendering_state: OnceLock::new(),
        })
    }

    pub fn font_matrix(&self) -> &Matrix {
        &self.font_matrix
    }

    pub fn ctm(&self) -> &Matrix {
        &self.ctm
    }

    pub fn logical_to_device(&self) -> &Matrix {
        &self.logical_to_device
    }

    pub fn device_to_logical(&self) -> &Matrix {
        &self.device_to_logical
    }

    pub fn antialias(&self) -> Antialias {
        self.antialias
    }

    pub fn measuring_mode(&self) -> MeasuringMode {
        self.measuring_mode
    }

    /// Rendering state, resolved on first use.
    ///
    /// Gray or disabled antialiasing turns ClearType off; subpixel (and the
    /// platform default) renders ClearType, GDI-classic when the font
    /// measures GDI-classic.
    pub fn rendering_state(&self) -> RenderingState {
        *self.rendering_state.get_or_init(|| {
            let state = match self.antialias {
                Antialias::None | Antialias::Gray => RenderingState::NoClearType,
                Antialias::Default | Antialias::Subpixel => {
                    if self.measuring_mode == MeasuringMode::GdiClassic {
                        RenderingState::GdiClassic
                    } else {
                        RenderingState::Normal
                    }
                }
            };
            tracing::trace!(antialias = ?self.antialias, ?state, "resolved rendering state");
            state
        })
    }

    /// Build a glyph run from positioned glyphs.
    ///
    /// When the combined transform is the font matrix's pure scale, glyphs
    /// become offsets relative to the first glyph at the font's em size and
    /// no native transform is needed. Otherwise positions are mapped back
    /// through the inverse transform at em size 1.0 and the placement is
    /// flagged `transformed`; the caller applies the forward transform when
    /// drawing. Advances are always zero since positions are explicit.
    pub fn glyph_run_from_glyphs(
        &self,
        glyphs: &[Glyph],
        run: &mut GlyphRunBuffer,
    ) -> GlyphRunPlacement {
        run.allocate(glyphs.len());

        let mat = &self.logical_to_device;
        let fast_path = mat.is_scale_only()
            && mat.xx == self.font_matrix.xx
            && mat.yy == self.font_matrix.yy;

        if fast_path {
            let origin = glyphs.first().map_or((0.0, 0.0), |g| (g.x, g.y));
            for (i, glyph) in glyphs.iter().enumerate() {
                run.indices_mut()[i] = glyph.index as u16;
                run.offsets_mut()[i] = GlyphOffset {
                    advance_offset: (glyph.x - origin.0) as f32,
                    ascender_offset: -(glyph.y - origin.1) as f32,
                };
            }
            GlyphRunPlacement {
                em_size: self.font_matrix.yy as f32,
                transformed: false,
                origin,
            }
        } else {
            for (i, glyph) in glyphs.iter().enumerate() {
                let (x, y) = self.device_to_logical.transform_point(glyph.x, glyph.y);
                run.indices_mut()[i] = glyph.index as u16;
                run.offsets_mut()[i] = GlyphOffset {
                    advance_offset: x as f32,
                    ascender_offset: -y as f32,
                };
            }
            GlyphRunPlacement {
                em_size: 1.0,
                transformed: true,
                origin: (0.0, 0.0),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaled(
        font_matrix: Matrix,
        ctm: Matrix,
        antialias: Antialias,
        measuring: MeasuringMode,
    ) -> ScaledFont {
        ScaledFont::new(font_matrix, ctm, antialias, measuring).unwrap()
    }

    #[test]
    fn test_singular_transform_is_rejected() {
        let result = ScaledFont::new(
            Matrix::scaling(16.0, 0.0),
            Matrix::identity(),
            Antialias::Default,
            MeasuringMode::Natural,
        );
        assert!(matches!(result, Err(TextError::InvalidMatrix)));
    }

    #[test]
    fn test_rendering_state_gray_disables_cleartype() {
        let font = scaled(
            Matrix::scaling(14.0, 14.0),
            Matrix::identity(),
            Antialias::Gray,
            MeasuringMode::Natural,
        );
        assert_eq!(font.rendering_state(), RenderingState::NoClearType);

        let font = scaled(
            Matrix::scaling(14.0, 14.0),
            Matrix::identity(),
            Antialias::None,
            MeasuringMode::GdiClassic,
        );
        assert_eq!(font.rendering_state(), RenderingState::NoClearType);
    }

    #[test]
    fn test_rendering_state_follows_measuring_mode() {
        let font = scaled(
            Matrix::scaling(14.0, 14.0),
            Matrix::identity(),
            Antialias::Subpixel,
            MeasuringMode::GdiClassic,
        );
        assert_eq!(font.rendering_state(), RenderingState::GdiClassic);

        let font = scaled(
            Matrix::scaling(14.0, 14.0),
            Matrix::identity(),
            Antialias::Default,
            MeasuringMode::Natural,
        );
        assert_eq!(font.rendering_state(), RenderingState::Normal);
    }

    #[test]
    fn test_rendering_state_resolves_once() {
        let font = scaled(
            Matrix::scaling(14.0, 14.0),
            Matrix::identity(),
            Antialias::Default,
            MeasuringMode::Natural,
        );
        assert_eq!(font.rendering_state(), font.rendering_state());
    }

    #[test]
    fn test_glyph_run_fast_path() {
        let font = scaled(
            Matrix::scaling(16.0, 16.0),
            Matrix::identity(),
            Antialias::Default,
            MeasuringMode::Natural,
        );
        let glyphs = [
            Glyph::new(5, 100.0, 200.0),
            Glyph::new(9, 112.0, 200.0),
            Glyph::new(2, 124.0, 196.0),
        ];
        let mut run = GlyphRunBuffer::new();
        let placement = font.glyph_run_from_glyphs(&glyphs, &mut run);

        assert!(!placement.transformed);
        assert_eq!(placement.em_size, 16.0);
        assert_eq!(placement.origin, (100.0, 200.0));
        assert_eq!(run.indices(), &[5, 9, 2]);
        assert_eq!(run.advances(), &[0.0, 0.0, 0.0]);
        assert_eq!(run.offsets()[0], GlyphOffset::default());
        assert_eq!(run.offsets()[1].advance_offset, 12.0);
        assert_eq!(run.offsets()[1].ascender_offset, 0.0);
        // y grows downward in user space, ascender offset points up
        assert_eq!(run.offsets()[2].ascender_offset, 4.0);
    }

    #[test]
    fn test_glyph_run_scaled_device_takes_transformed_path() {
        // ctm scale means device scale differs from the font matrix scale
        let font = scaled(
            Matrix::scaling(16.0, 16.0),
            Matrix::scaling(2.0, 2.0),
            Antialias::Default,
            MeasuringMode::Natural,
        );
        let glyphs = [Glyph::new(1, 64.0, 32.0)];
        let mut run = GlyphRunBuffer::new();
        let placement = font.glyph_run_from_glyphs(&glyphs, &mut run);

        assert!(placement.transformed);
        assert_eq!(placement.em_size, 1.0);
        assert_eq!(placement.origin, (0.0, 0.0));
        // positions pulled back through the inverse (1/32 scale)
        assert_eq!(run.offsets()[0].advance_offset, 2.0);
        assert_eq!(run.offsets()[0].ascender_offset, -1.0);
    }

    #[test]
    fn test_glyph_run_rotation_takes_transformed_path() {
        let font = scaled(
            Matrix::scaling(12.0, 12.0),
            Matrix::rotation(std::f64::consts::FRAC_PI_2),
            Antialias::Default,
            MeasuringMode::Natural,
        );
        let mut run = GlyphRunBuffer::new();
        let placement =
            font.glyph_run_from_glyphs(&[Glyph::new(3, 0.0, -12.0)], &mut run);
        assert!(placement.transformed);
    }

    #[test]
    fn test_glyph_run_empty() {
        let font = scaled(
            Matrix::scaling(10.0, 10.0),
            Matrix::identity(),
            Antialias::Default,
            MeasuringMode::Natural,
        );
        let mut run = GlyphRunBuffer::new();
        let placement = font.glyph_run_from_glyphs(&[], &mut run);
        assert!(run.is_empty());
        assert!(!placement.transformed);
        assert_eq!(placement.em_size, 10.0);
        assert_eq!(placement.origin, (0.0, 0.0));
    }
}
