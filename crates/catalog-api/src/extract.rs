//! Request extractors that report failures in the API error envelope.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// `Json` whose rejection is answered as an [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
