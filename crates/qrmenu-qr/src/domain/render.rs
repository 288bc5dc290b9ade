//! Pure QR rendering.
//!
//! Encodes a public URL as a square QR code of exactly the requested edge
//! length, black modules on white, with at least one module of quiet zone.
//! PNG output can carry a logo on a white pad in the centre; when the logo
//! cannot be decoded the plain code is returned instead.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgba, RgbaImage};
use qrcode::QrCode;
use qrcode::render::svg;
use qrmenu_core::error::DomainError;
use sha2::{Digest, Sha256};
use tracing::warn;

use super::options::{QrFormat, RenderOptions};

/// Modules of white border kept around the symbol.
const QUIET_ZONE_MODULES: u32 = 1;

/// The logo pad spans one fifth of the code's edge.
const LOGO_FRACTION_DIVISOR: u32 = 5;

const DARK_HEX: &str = "#000000";
const LIGHT_HEX: &str = "#ffffff";

/// An encoded QR image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedQr {
    pub bytes: Vec<u8>,
    pub format: QrFormat,
    /// Quoted SHA-256 of `bytes`, usable as an HTTP entity tag.
    pub etag: String,
}

impl RenderedQr {
    fn new(bytes: Vec<u8>, format: QrFormat) -> Self {
        let etag = etag_for(&bytes);
        Self {
            bytes,
            format,
            etag,
        }
    }

    #[must_use]
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    #[must_use]
    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }
}

/// Renders `public_url` according to `options`.
///
/// `logo` is only used when `options.include_logo` is set; a missing or
/// undecodable logo yields the plain code.
///
/// # Errors
///
/// Returns `DomainError::UnsupportedCombination` or `DomainError::Validation`
/// when the options are rejected (before any encoding) or a PNG is too small
/// to give every module at least one pixel, and `DomainError::Infrastructure` if the URL cannot be encoded or the image
/// encoder fails.
pub fn render(
    public_url: &str,
    options: &RenderOptions,
    logo: Option<&[u8]>,
) -> Result<RenderedQr, DomainError> {
    options.validate()?;

    let code =
        QrCode::with_error_correction_level(public_url.as_bytes(), options.error_correction.into())
            .map_err(|e| DomainError::Infrastructure(format!("qr encoding failed: {e}")))?;

    match options.format {
        QrFormat::Svg => Ok(RenderedQr::new(
            render_svg(&code, options.size_px).into_bytes(),
            QrFormat::Svg,
        )),
        QrFormat::Png => {
            let plain = raster(&code, options.size_px)?;
            let image = match logo.filter(|_| options.include_logo) {
                Some(logo_bytes) => match composite_logo(&plain, logo_bytes) {
                    Ok(composited) => DynamicImage::ImageRgba8(composited),
                    Err(e) => {
                        warn!(error = %e, "logo could not be composited, rendering plain code");
                        DynamicImage::ImageLuma8(plain)
                    }
                },
                None => DynamicImage::ImageLuma8(plain),
            };
            Ok(RenderedQr::new(encode_png(&image)?, QrFormat::Png))
        }
    }
}

fn render_svg(code: &QrCode, size: u32) -> String {
    code.render::<svg::Color<'_>>()
        .quiet_zone(true)
        .min_dimensions(size, size)
        .dark_color(svg::Color(DARK_HEX))
        .light_color(svg::Color(LIGHT_HEX))
        .build()
}

/// Draws the symbol with whole-pixel modules, centred on a white square of
/// exactly `size` pixels.
fn raster(code: &QrCode, size: u32) -> Result<GrayImage, DomainError> {
    let symbol_modules = u32::try_from(code.width()).unwrap_or(u32::MAX);
    let total_modules = symbol_modules.saturating_add(2 * QUIET_ZONE_MODULES);
    if total_modules > size {
        return Err(DomainError::invalid_field(
            "size",
            format!("must be at least {total_modules} pixels for this code"),
        ));
    }
    let module_px = size / total_modules;

    let symbol = code
        .render::<Luma<u8>>()
        .quiet_zone(false)
        .module_dimensions(module_px, module_px)
        .build();

    let mut canvas = GrayImage::from_pixel(size, size, Luma([u8::MAX]));
    let offset = centre_offset(size, symbol.width());
    imageops::overlay(&mut canvas, &symbol, offset, offset);
    Ok(canvas)
}

/// Fits the logo inside a white square pad and stamps the pad over the
/// centre of the code.
fn composite_logo(code: &GrayImage, logo_bytes: &[u8]) -> Result<RgbaImage, image::ImageError> {
    let logo = image::load_from_memory(logo_bytes)?;
    let size = code.width();
    let pad_px = (size / LOGO_FRACTION_DIVISOR).max(1);

    let fitted = logo.resize(pad_px, pad_px, FilterType::Lanczos3).to_rgba8();
    let mut pad = RgbaImage::from_pixel(pad_px, pad_px, Rgba([u8::MAX; 4]));
    imageops::overlay(
        &mut pad,
        &fitted,
        centre_offset(pad_px, fitted.width()),
        centre_offset(pad_px, fitted.height()),
    );

    let mut canvas = DynamicImage::ImageLuma8(code.clone()).to_rgba8();
    let offset = centre_offset(size, pad_px);
    imageops::overlay(&mut canvas, &pad, offset, offset);
    Ok(canvas)
}

fn centre_offset(outer: u32, inner: u32) -> i64 {
    (i64::from(outer) - i64::from(inner)) / 2
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, DomainError> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| DomainError::Infrastructure(format!("png encoding failed: {e}")))?;
    Ok(bytes)
}

fn etag_for(bytes: &[u8]) -> String {
    format!("\"{}\"", hex::encode(Sha256::digest(bytes)))
}
