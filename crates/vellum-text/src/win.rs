//! DirectWrite binding.
//!
//! Owns the DirectWrite factory, the lazily fetched system font collection,
//! and the cached rendering-params objects built from the global
//! [`RenderingConfig`]. COM lifetimes are the `windows` crate's owned
//! interface wrappers; nothing here calls AddRef/Release by hand.

use std::mem::ManuallyDrop;
use std::sync::{Mutex, OnceLock, PoisonError};

use vellum_core::Matrix;
use windows::core::{Interface, BOOL, PCWSTR};
use windows::Win32::Graphics::DirectWrite::*;
use windows::Win32::System::Com::{CoInitializeEx, COINIT_MULTITHREADED};

use crate::scaled_font::{GlyphRunPlacement, MeasuringMode, ScaledFont};
use crate::{
    GlyphRunBuffer, ParamsVariant, PixelGeometry, RenderingConfig, RenderingMode,
    RenderingState, TextError,
};
use vellum_core::Glyph;

fn dwrite_err(e: windows::core::Error) -> TextError {
    TextError::DirectWrite(format!("{e:?}"))
}

/// Cached rendering-params objects plus the configuration they were built
/// from. All three are built together and dropped together.
struct ParamsCache {
    config: RenderingConfig,
    default_params: Option<IDWriteRenderingParams>,
    cleartype_params: Option<IDWriteRenderingParams>,
    gdi_classic_params: Option<IDWriteRenderingParams>,
}

impl ParamsCache {
    fn new(config: RenderingConfig) -> Self {
        Self {
            config,
            default_params: None,
            cleartype_params: None,
            gdi_classic_params: None,
        }
    }

    fn is_complete(&self) -> bool {
        self.default_params.is_some()
            && self.cleartype_params.is_some()
            && self.gdi_classic_params.is_some()
    }

    fn discard(&mut self) {
        self.default_params = None;
        self.cleartype_params = None;
        self.gdi_classic_params = None;
    }
}

/// Process context for the DirectWrite backend.
///
/// Construct one explicitly with [`DWriteContext::new`], or use the
/// process-wide instance via [`DWriteContext::shared`].
pub struct DWriteContext {
    factory: IDWriteFactory,
    factory4: OnceLock<Option<IDWriteFactory4>>,
    system_collection: OnceLock<Result<IDWriteFontCollection, TextError>>,
    params: Mutex<ParamsCache>,
}

// Shared DirectWrite factories and the objects they hand out are
// free-threaded.
unsafe impl Send for DWriteContext {}
unsafe impl Sync for DWriteContext {}

impl DWriteContext {
    /// Create the DirectWrite factory.
    ///
    /// Fails with [`TextError::FactoryUnavailable`] when DirectWrite cannot
    /// be loaded.
    pub fn new() -> Result<Self, TextError> {
        // Ensure COM is initialized for this process; ignore mode mismatches.
        unsafe {
            let _ = CoInitializeEx(None, COINIT_MULTITHREADED);
        }

        let factory: IDWriteFactory =
            unsafe { DWriteCreateFactory::<IDWriteFactory>(DWRITE_FACTORY_TYPE_SHARED) }
                .map_err(|e| TextError::FactoryUnavailable(format!("{e:?}")))?;

        tracing::debug!("created DirectWrite factory");

        Ok(Self {
            factory,
            factory4: OnceLock::new(),
            system_collection: OnceLock::new(),
            params: Mutex::new(ParamsCache::new(RenderingConfig::default())),
        })
    }

    /// Process-wide context, created on first use.
    ///
    /// A failed initialization is cached and returned to every caller.
    pub fn shared() -> Result<&'static DWriteContext, TextError> {
        static SHARED: OnceLock<Result<DWriteContext, TextError>> = OnceLock::new();
        SHARED.get_or_init(DWriteContext::new).as_ref().map_err(Clone::clone)
    }

    /// The DirectWrite factory.
    pub fn factory(&self) -> &IDWriteFactory {
        &self.factory
    }

    /// `IDWriteFactory4` when the system provides it (color-glyph support),
    /// `None` on older DirectWrite versions.
    pub fn factory4(&self) -> Option<&IDWriteFactory4> {
        self.factory4
            .get_or_init(|| self.factory.cast::<IDWriteFactory4>().ok())
            .as_ref()
    }

    /// The system font collection, fetched lazily.
    pub fn system_collection(&self) -> Result<IDWriteFontCollection, TextError> {
        self.system_collection
            .get_or_init(|| {
                let mut collection: Option<IDWriteFontCollection> = None;
                unsafe {
                    self.factory
                        .GetSystemFontCollection(&mut collection, false)
                        .map_err(dwrite_err)?;
                }
                collection.ok_or_else(|| {
                    TextError::DirectWrite("GetSystemFontCollection returned None".into())
                })
            })
            .clone()
    }

    /// Look up a family by name in the system collection.
    ///
    /// Returns `Ok(None)` when no such family exists.
    pub fn find_system_font_family(
        &self,
        name: &str,
    ) -> Result<Option<IDWriteFontFamily>, TextError> {
        let collection = self.system_collection()?;
        let name_w = to_wide_null(name);
        let mut index: u32 = 0;
        let mut exists = BOOL(0);
        unsafe {
            collection
                .FindFamilyName(PCWSTR(name_w.as_ptr()), &mut index, &mut exists)
                .map_err(dwrite_err)?;
        }
        if !exists.as_bool() {
            return Ok(None);
        }
        let family = unsafe { collection.GetFontFamily(index) }.map_err(dwrite_err)?;
        Ok(Some(family))
    }

    /// Rendering-params object for the given rendering state.
    ///
    /// All three cached variants are built together when any is missing; the
    /// returned interface keeps the object alive independently of the cache.
    pub fn rendering_params(
        &self,
        state: RenderingState,
    ) -> Result<IDWriteRenderingParams, TextError> {
        let mut cache = self.params.lock().unwrap_or_else(PoisonError::into_inner);
        if !cache.is_complete() {
            self.build_params(&mut cache)?;
        }
        let params = match ParamsVariant::select(state, cache.config.mode_override) {
            ParamsVariant::Default => &cache.default_params,
            ParamsVariant::ClearType => &cache.cleartype_params,
            ParamsVariant::GdiClassic => &cache.gdi_classic_params,
        };
        params
            .clone()
            .ok_or_else(|| TextError::DirectWrite("rendering params cache incomplete".into()))
    }

    /// Replace the global rendering configuration.
    ///
    /// The cached params objects are dropped and rebuilt lazily on next use.
    pub fn set_rendering_params(&self, config: RenderingConfig) -> Result<(), TextError> {
        config.validate()?;
        let mut cache = self.params.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(?config, "replacing rendering configuration");
        cache.config = config;
        cache.discard();
        Ok(())
    }

    /// The configured rendering-mode override, if any.
    pub fn cleartype_rendering_mode(&self) -> Option<RenderingMode> {
        let cache = self.params.lock().unwrap_or_else(PoisonError::into_inner);
        cache.config.mode_override
    }

    fn build_params(&self, cache: &mut ParamsCache) -> Result<(), TextError> {
        let config = &cache.config;
        let default_params =
            unsafe { self.factory.CreateRenderingParams() }.map_err(dwrite_err)?;
        let cleartype_params = unsafe {
            self.factory.CreateCustomRenderingParams(
                config.gamma,
                config.enhanced_contrast,
                config.cleartype_level,
                pixel_geometry_to_dwrite(config.pixel_geometry),
                rendering_mode_to_dwrite(config.mode_override.unwrap_or_default()),
            )
        }
        .map_err(dwrite_err)?;
        let gdi_classic_params = unsafe {
            self.factory.CreateCustomRenderingParams(
                config.gamma,
                config.enhanced_contrast,
                config.cleartype_level,
                pixel_geometry_to_dwrite(config.pixel_geometry),
                DWRITE_RENDERING_MODE_GDI_CLASSIC,
            )
        }
        .map_err(dwrite_err)?;

        cache.default_params = Some(default_params);
        cache.cleartype_params = Some(cleartype_params);
        cache.gdi_classic_params = Some(gdi_classic_params);
        Ok(())
    }
}

/// A font face bound to its DirectWrite handle.
///
/// `have_color` is determined once at construction and never changes.
pub struct FontFace {
    face: IDWriteFontFace,
    have_color: bool,
}

impl FontFace {
    pub fn from_dwrite(face: IDWriteFontFace) -> Self {
        // IDWriteFontFace2 is where color-glyph queries live; its absence
        // means an older DirectWrite without color font support.
        let have_color = face
            .cast::<IDWriteFontFace2>()
            .map(|f2| unsafe { f2.IsColorFont() }.as_bool())
            .unwrap_or(false);
        Self { face, have_color }
    }

    pub fn dwrite_face(&self) -> &IDWriteFontFace {
        &self.face
    }

    pub fn have_color(&self) -> bool {
        self.have_color
    }
}

/// A `DWRITE_GLYPH_RUN` borrowing its arrays from a [`GlyphRunBuffer`].
pub struct GlyphRunRef<'a> {
    run: DWRITE_GLYPH_RUN,
    _borrow: std::marker::PhantomData<(&'a FontFace, &'a GlyphRunBuffer)>,
}

impl<'a> GlyphRunRef<'a> {
    pub fn new(face: &'a FontFace, buffer: &'a GlyphRunBuffer, em_size: f32) -> Self {
        let run = DWRITE_GLYPH_RUN {
            fontFace: ManuallyDrop::new(Some(face.dwrite_face().clone())),
            fontEmSize: em_size,
            glyphCount: buffer.len() as u32,
            glyphIndices: buffer.indices().as_ptr(),
            glyphAdvances: buffer.advances().as_ptr(),
            // GlyphOffset is layout-compatible with DWRITE_GLYPH_OFFSET
            glyphOffsets: buffer.offsets().as_ptr() as *const DWRITE_GLYPH_OFFSET,
            isSideways: BOOL(0),
            bidiLevel: 0,
        };
        Self {
            run,
            _borrow: std::marker::PhantomData,
        }
    }

    pub fn as_dwrite(&self) -> &DWRITE_GLYPH_RUN {
        &self.run
    }
}

impl Drop for GlyphRunRef<'_> {
    fn drop(&mut self) {
        unsafe { ManuallyDrop::drop(&mut self.run.fontFace) };
    }
}

/// Build a DirectWrite glyph run for a scaled font.
///
/// Fills `buffer` from the glyphs and wraps it; when the returned placement
/// is `transformed`, pass [`matrix_to_dwrite`] of the font's forward
/// transform to DirectWrite alongside the run.
pub fn build_glyph_run<'a>(
    scaled_font: &ScaledFont,
    face: &'a FontFace,
    glyphs: &[Glyph],
    buffer: &'a mut GlyphRunBuffer,
) -> (GlyphRunRef<'a>, GlyphRunPlacement) {
    let placement = scaled_font.glyph_run_from_glyphs(glyphs, buffer);
    let run = GlyphRunRef::new(face, &*buffer, placement.em_size);
    (run, placement)
}

/// Convert a Vellum transform to the DirectWrite matrix layout.
pub fn matrix_to_dwrite(matrix: &Matrix) -> DWRITE_MATRIX {
    DWRITE_MATRIX {
        m11: matrix.xx as f32,
        m12: matrix.yx as f32,
        m21: matrix.xy as f32,
        m22: matrix.yy as f32,
        dx: matrix.x0 as f32,
        dy: matrix.y0 as f32,
    }
}

pub fn measuring_mode_to_dwrite(mode: MeasuringMode) -> DWRITE_MEASURING_MODE {
    match mode {
        MeasuringMode::Natural => DWRITE_MEASURING_MODE_NATURAL,
        MeasuringMode::GdiClassic => DWRITE_MEASURING_MODE_GDI_CLASSIC,
        MeasuringMode::GdiNatural => DWRITE_MEASURING_MODE_GDI_NATURAL,
    }
}

fn pixel_geometry_to_dwrite(geometry: PixelGeometry) -> DWRITE_PIXEL_GEOMETRY {
    match geometry {
        PixelGeometry::Flat => DWRITE_PIXEL_GEOMETRY_FLAT,
        PixelGeometry::Rgb => DWRITE_PIXEL_GEOMETRY_RGB,
        PixelGeometry::Bgr => DWRITE_PIXEL_GEOMETRY_BGR,
    }
}

fn rendering_mode_to_dwrite(mode: RenderingMode) -> DWRITE_RENDERING_MODE {
    match mode {
        RenderingMode::Default => DWRITE_RENDERING_MODE_DEFAULT,
        RenderingMode::Aliased => DWRITE_RENDERING_MODE_ALIASED,
        RenderingMode::GdiClassic => DWRITE_RENDERING_MODE_GDI_CLASSIC,
        RenderingMode::GdiNatural => DWRITE_RENDERING_MODE_GDI_NATURAL,
        RenderingMode::Natural => DWRITE_RENDERING_MODE_NATURAL,
        RenderingMode::NaturalSymmetric => DWRITE_RENDERING_MODE_NATURAL_SYMMETRIC,
        RenderingMode::Outline => DWRITE_RENDERING_MODE_OUTLINE,
    }
}

fn to_wide_null(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}
