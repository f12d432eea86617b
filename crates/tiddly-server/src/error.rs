use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tiddly_core::TiddlyError;

/// Unified error type for JSON endpoints.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<TiddlyError>() {
            Some(TiddlyError::InvalidWikiName(_)) => StatusCode::BAD_REQUEST,
            Some(TiddlyError::WikiExists(_)) => StatusCode::CONFLICT,
            Some(TiddlyError::TemplateNotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("{:#}", self.0);
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
