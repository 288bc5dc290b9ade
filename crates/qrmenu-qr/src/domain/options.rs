//! Rendering options for QR artifacts.

use qrmenu_core::error::{DomainError, ValidationErrors};
use serde::{Deserialize, Serialize};

/// Smallest accepted edge length in pixels.
pub const MIN_SIZE_PX: u32 = 64;
/// Largest accepted edge length in pixels.
pub const MAX_SIZE_PX: u32 = 2048;
/// Edge length used when none is requested.
pub const DEFAULT_SIZE_PX: u32 = 256;

/// Output encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrFormat {
    /// Raster output. The only format that accepts a logo.
    #[default]
    Png,
    /// Vector output.
    Svg,
}

impl QrFormat {
    /// MIME type of the encoded bytes.
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
        }
    }

    /// File extension, without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }

    /// Infers the format from a stored artifact reference.
    #[must_use]
    pub fn from_reference(reference: &str) -> Self {
        if reference.to_ascii_lowercase().ends_with(".svg") {
            Self::Svg
        } else {
            Self::Png
        }
    }
}

/// The four standard error-correction levels, from least to most
/// redundancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCorrection {
    /// About 7% of codewords recoverable.
    #[serde(alias = "L")]
    Low,
    /// About 15%.
    #[default]
    #[serde(alias = "M")]
    Medium,
    /// About 25%.
    #[serde(alias = "Q")]
    Quartile,
    /// About 30%.
    #[serde(alias = "H")]
    High,
}

impl From<ErrorCorrection> for qrcode::EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::Low => Self::L,
            ErrorCorrection::Medium => Self::M,
            ErrorCorrection::Quartile => Self::Q,
            ErrorCorrection::High => Self::H,
        }
    }
}

/// What to render and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    #[serde(default)]
    pub format: QrFormat,
    /// Edge length of the square output, in pixels.
    #[serde(default = "default_size")]
    pub size_px: u32,
    #[serde(default)]
    pub error_correction: ErrorCorrection,
    /// Composite the menu's logo in the centre.
    #[serde(default)]
    pub include_logo: bool,
}

fn default_size() -> u32 {
    DEFAULT_SIZE_PX
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: QrFormat::default(),
            size_px: DEFAULT_SIZE_PX,
            error_correction: ErrorCorrection::default(),
            include_logo: false,
        }
    }
}

impl RenderOptions {
    /// Checks the options before any rendering work is done.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnsupportedCombination` for SVG with a logo, and
    /// `DomainError::Validation` for a size outside
    /// [`MIN_SIZE_PX`]..=[`MAX_SIZE_PX`].
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.format == QrFormat::Svg && self.include_logo {
            return Err(DomainError::UnsupportedCombination(
                "svg output cannot embed a logo".into(),
            ));
        }
        let mut errors = ValidationErrors::new();
        if !(MIN_SIZE_PX..=MAX_SIZE_PX).contains(&self.size_px) {
            errors.push(
                "size",
                format!("must be between {MIN_SIZE_PX} and {MAX_SIZE_PX} pixels"),
            );
        }
        errors.into_result()
    }
}
