//! Glyph-run storage.
//!
//! A glyph run is three parallel arrays: glyph indices, per-glyph advances,
//! and per-glyph offsets. Runs are almost always short, so the buffer keeps
//! up to [`INLINE_GLYPH_CAPACITY`] glyphs inline and only spills to the heap
//! for longer runs.

use smallvec::SmallVec;

/// Inline capacity of a [`GlyphRunBuffer`], in glyphs.
pub const INLINE_GLYPH_CAPACITY: usize = 256;

/// Per-glyph offset from the pen position, in DIPs.
///
/// Layout matches `DWRITE_GLYPH_OFFSET` so the Windows binding can hand the
/// offsets array to DirectWrite without copying.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphOffset {
    /// Offset along the run direction.
    pub advance_offset: f32,
    /// Offset toward the ascender (up).
    pub ascender_offset: f32,
}

/// Fixed-capacity glyph-run buffer with heap fallback.
///
/// `allocate` must be called exactly once before the slices are filled.
#[derive(Debug, Default)]
pub struct GlyphRunBuffer {
    indices: SmallVec<[u16; INLINE_GLYPH_CAPACITY]>,
    advances: SmallVec<[f32; INLINE_GLYPH_CAPACITY]>,
    offsets: SmallVec<[GlyphOffset; INLINE_GLYPH_CAPACITY]>,
    allocated: bool,
}

impl GlyphRunBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size the three arrays for `num_glyphs` glyphs, zero-filled.
    ///
    /// Panics if called more than once on the same buffer.
    pub fn allocate(&mut self, num_glyphs: usize) {
        assert!(!self.allocated, "GlyphRunBuffer::allocate called twice");
        self.allocated = true;
        self.indices.resize(num_glyphs, 0);
        self.advances.resize(num_glyphs, 0.0);
        self.offsets.resize(num_glyphs, GlyphOffset::default());
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// True while the run fits the inline storage.
    pub fn is_inline(&self) -> bool {
        !self.indices.spilled()
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn advances(&self) -> &[f32] {
        &self.advances
    }

    pub fn offsets(&self) -> &[GlyphOffset] {
        &self.offsets
    }

    pub fn indices_mut(&mut self) -> &mut [u16] {
        &mut self.indices
    }

    pub fn advances_mut(&mut self) -> &mut [f32] {
        &mut self.advances
    }

    pub fn offsets_mut(&mut self) -> &mut [GlyphOffset] {
        &mut self.offsets
    }
}
