//! Naming of cached QR artifacts.

use chrono::{DateTime, Utc};
use qrmenu_menu::domain::token::PublicToken;

use super::options::QrFormat;

/// Directory, relative to the artifact store root, holding saved codes.
pub const QR_ARTIFACT_DIR: &str = "qr";

/// Reference for a saved code: `qr/menu-qr-{token}-{epoch millis}.{ext}`.
#[must_use]
pub fn artifact_reference(token: &PublicToken, format: QrFormat, at: DateTime<Utc>) -> String {
    format!(
        "{QR_ARTIFACT_DIR}/menu-qr-{token}-{millis}.{ext}",
        millis = at.timestamp_millis(),
        ext = format.extension()
    )
}

/// File name offered to the browser when the code is downloaded.
#[must_use]
pub fn download_filename(token: &PublicToken, format: QrFormat) -> String {
    format!("menu-qr-{token}.{}", format.extension())
}
