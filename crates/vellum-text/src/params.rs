//! Rendering parameters and their selection.
//!
//! The backend keeps one global [`RenderingConfig`] and builds three cached
//! DirectWrite rendering-params objects from it: the system defaults, a
//! custom ClearType variant, and a forced GDI-classic variant. Which one a
//! glyph run uses depends on the scaled font's [`RenderingState`] and on
//! whether the configuration pins an explicit rendering mode.

use crate::TextError;

/// Rendering state a scaled font resolves to.
///
/// Starts out `Uninitialized`; resolved once from the font's antialiasing
/// request and the global configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingState {
    #[default]
    Uninitialized,
    /// Grayscale or no antialiasing; ClearType disabled.
    NoClearType,
    /// Regular ClearType rendering.
    Normal,
    /// ClearType with GDI-classic metrics and positioning.
    GdiClassic,
}

/// Subpixel layout of the target display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelGeometry {
    Flat,
    #[default]
    Rgb,
    Bgr,
}

/// DirectWrite rendering mode, mirrored for configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingMode {
    #[default]
    Default,
    Aliased,
    GdiClassic,
    GdiNatural,
    Natural,
    NaturalSymmetric,
    Outline,
}

/// Global rendering configuration.
///
/// `mode_override` pins the custom ClearType variant to one rendering mode;
/// when unset, GDI-classic scaled fonts fall back to the forced GDI-classic
/// variant instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderingConfig {
    pub gamma: f32,
    pub enhanced_contrast: f32,
    pub cleartype_level: f32,
    pub pixel_geometry: PixelGeometry,
    pub mode_override: Option<RenderingMode>,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            gamma: 2.2,
            enhanced_contrast: 1.0,
            cleartype_level: 1.0,
            pixel_geometry: PixelGeometry::Rgb,
            mode_override: None,
        }
    }
}

impl RenderingConfig {
    /// Check value ranges before handing the config to DirectWrite.
    pub fn validate(&self) -> Result<(), TextError> {
        if !self.gamma.is_finite() || self.gamma <= 0.0 {
            return Err(TextError::InvalidConfig(format!(
                "gamma must be positive, got {}",
                self.gamma
            )));
        }
        if !self.enhanced_contrast.is_finite() || self.enhanced_contrast < 0.0 {
            return Err(TextError::InvalidConfig(format!(
                "enhanced contrast must be non-negative, got {}",
                self.enhanced_contrast
            )));
        }
        if !self.cleartype_level.is_finite()
            || !(0.0..=1.0).contains(&self.cleartype_level)
        {
            return Err(TextError::InvalidConfig(format!(
                "ClearType level must be in 0..=1, got {}",
                self.cleartype_level
            )));
        }
        Ok(())
    }
}

/// Which cached rendering-params object a glyph run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamsVariant {
    /// System default parameters.
    Default,
    /// Custom ClearType parameters built from the configuration.
    ClearType,
    /// Forced GDI-classic parameters.
    GdiClassic,
}

impl ParamsVariant {
    /// Selection rule: fonts with ClearType disabled take the defaults;
    /// GDI-classic fonts take the forced variant unless the configuration
    /// pins an explicit mode; everything else takes the custom variant.
    pub fn select(state: RenderingState, mode_override: Option<RenderingMode>) -> Self {
        match state {
            RenderingState::NoClearType => ParamsVariant::Default,
            RenderingState::GdiClassic if mode_override.is_none() => {
                ParamsVariant::GdiClassic
            }
            _ => ParamsVariant::ClearType,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RenderingConfig::default();
        assert_eq!(config.gamma, 2.2);
        assert_eq!(config.enhanced_contrast, 1.0);
        assert_eq!(config.cleartype_level, 1.0);
        assert_eq!(config.pixel_geometry, PixelGeometry::Rgb);
        assert!(config.mode_override.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_bad_gamma() {
        let config = RenderingConfig {
            gamma: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(TextError::InvalidConfig(_))));

        let config = RenderingConfig {
            gamma: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_out_of_range_cleartype_level() {
        let config = RenderingConfig {
            cleartype_level: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_select_no_cleartype_takes_defaults() {
        assert_eq!(
            ParamsVariant::select(RenderingState::NoClearType, None),
            ParamsVariant::Default
        );
        assert_eq!(
            ParamsVariant::select(
                RenderingState::NoClearType,
                Some(RenderingMode::Natural)
            ),
            ParamsVariant::Default
        );
    }

    #[test]
    fn test_select_gdi_classic_respects_override() {
        assert_eq!(
            ParamsVariant::select(RenderingState::GdiClassic, None),
            ParamsVariant::GdiClassic
        );
        // An explicit mode override wins over the forced GDI-classic variant.
        assert_eq!(
            ParamsVariant::select(
                RenderingState::GdiClassic,
                Some(RenderingMode::NaturalSymmetric)
            ),
            ParamsVariant::ClearType
        );
    }

    #[test]
    fn test_select_normal_and_uninitialized_take_cleartype() {
        assert_eq!(
            ParamsVariant::select(RenderingState::Normal, None),
            ParamsVariant::ClearType
        );
        assert_eq!(
            ParamsVariant::select(RenderingState::Uninitialized, None),
            ParamsVariant::ClearType
        );
    }
}
