//! # Vellum Text
//!
//! Windows text backend for Vellum, binding the library's font model
//! (scaled fonts, font faces, glyph runs) to DirectWrite.
//!
//! ## Layout
//!
//! - Platform-neutral model: [`RenderingConfig`], [`RenderingState`],
//!   [`ScaledFont`], [`GlyphRunBuffer`].
//! - DirectWrite binding in `win` (Windows only): [`DWriteContext`],
//!   [`FontFace`], glyph-run and matrix conversion.
//!
//! Non-Windows targets get stub types that return
//! [`TextError::NotSupported`], so the neutral model stays usable and
//! testable everywhere.

pub mod glyph_run;
pub mod params;
pub mod scaled_font;

pub use glyph_run::{GlyphOffset, GlyphRunBuffer, INLINE_GLYPH_CAPACITY};
pub use params::{
    ParamsVariant, PixelGeometry, RenderingConfig, RenderingMode, RenderingState,
};
pub use scaled_font::{GlyphRunPlacement, MeasuringMode, ScaledFont};

/// Errors for text-backend operations.
#[derive(thiserror::Error, Debug, Clone)]
pub enum TextError {
    #[error("Text backend not supported on this platform")]
    NotSupported,
    #[error("DirectWrite factory unavailable: {0}")]
    FactoryUnavailable(String),
    #[error("DirectWrite error: {0}")]
    DirectWrite(String),
    #[error("Font family not found: {0}")]
    FontNotFound(String),
    #[error("Font transform is not invertible")]
    InvalidMatrix,
    #[error("Invalid rendering configuration: {0}")]
    InvalidConfig(String),
}

// Platform binding
#[cfg(windows)]
pub mod win;

#[cfg(windows)]
pub use win::{
    build_glyph_run, matrix_to_dwrite, DWriteContext, FontFace, GlyphRunRef,
};

// Stubs for other platforms, keeping the public surface compilable.
#[cfg(not(windows))]
mod nowin {
    use crate::{RenderingConfig, RenderingMode, RenderingState, TextError};

    pub struct DWriteContext;

    impl DWriteContext {
        pub fn new() -> Result<Self, TextError> {
            Err(TextError::NotSupported)
        }

        pub fn shared() -> Result<&'static DWriteContext, TextError> {
            Err(TextError::NotSupported)
        }

        pub fn find_system_font_family(
            &self,
            _name: &str,
        ) -> Result<Option<()>, TextError> {
            Err(TextError::NotSupported)
        }

        pub fn rendering_params(&self, _state: RenderingState) -> Result<(), TextError> {
            Err(TextError::NotSupported)
        }

        pub fn set_rendering_params(&self, _config: RenderingConfig) -> Result<(), TextError> {
            Err(TextError::NotSupported)
        }

        pub fn cleartype_rendering_mode(&self) -> Option<RenderingMode> {
            None
        }
    }

    pub struct FontFace;

    impl FontFace {
        pub fn have_color(&self) -> bool {
            false
        }
    }
}

#[cfg(not(windows))]
pub use nowin::{DWriteContext, FontFace};
