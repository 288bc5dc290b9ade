//! Request extractors.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// `Json` body extractor whose rejections become `validation_error`
/// responses naming the offending field.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);
