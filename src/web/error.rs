//! Mapping of domain errors to themed HTTP responses.

use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use tracing::{debug, error};

use super::pages;
use crate::auth::MaybeUser;
use crate::error::BlogError;

impl IntoResponse for BlogError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(what) => {
                debug!(what, "Resource not found");
                not_found_response(None)
            }
            Self::Internal(e) => {
                error!("Request failed: {e:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(pages::render_server_error_page().into_string()),
                )
                    .into_response()
            }
        }
    }
}

/// Themed 404 page.
fn not_found_response(path: Option<&str>) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(pages::render_not_found_page(path, None).into_string()),
    )
        .into_response()
}

/// Fallback for unmatched paths.
pub async fn not_found(MaybeUser(user): MaybeUser, uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(pages::render_not_found_page(Some(uri.path()), user.as_ref()).into_string()),
    )
        .into_response()
}
