//! Web error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

pub type WebResult<T> = Result<T, WebError>;

/// Failures of the web layer itself. Tutor errors never end up here: they are shown on the page.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        error!(error = %self, "Failed to render page");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "An internal error occurred",
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_failure_is_an_internal_error() {
        let err = handlebars::Handlebars::new()
            .render("missing", &())
            .unwrap_err();
        let response = WebError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
