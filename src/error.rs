use crate::cloud::CloudApiError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("invalid template values")]
    Unprocessable { errors: Vec<String> },
    #[error("upstream failure: {0}")]
    Upstream(#[from] CloudApiError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Upstream(CloudApiError::MissingCredential(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Unprocessable { errors } => {
                json!({"ok": false, "message": self.to_string(), "errors": errors})
            }
            ApiError::Upstream(err) => {
                error!("upstream error: {err}");
                json!({"ok": false, "message": self.to_string()})
            }
            ApiError::BadRequest(_) => json!({"ok": false, "message": self.to_string()}),
        };
        (status, Json(body)).into_response()
    }
}
