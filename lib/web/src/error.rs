use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use urdf_runtime::events::now_millis;
use urdf_runtime::RuntimeError;

/// The façade's error surface. Every error answers a JSON body carrying
/// `ok: false`, the timestamp, the message, and a stable error kind.
#[derive(Debug, thiserror::Error)]
pub enum UrdfServerError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl UrdfServerError {
    fn status(&self) -> StatusCode {
        match self {
            UrdfServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            UrdfServerError::Runtime(error) => match error.kind() {
                "SchemaViolation" | "ContractViolation" => StatusCode::BAD_REQUEST,
                "NotFound" => StatusCode::NOT_FOUND,
                "Conflict" => StatusCode::CONFLICT,
                "NotImplemented" => StatusCode::NOT_IMPLEMENTED,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            UrdfServerError::BadRequest(_) => "ContractViolation",
            UrdfServerError::Runtime(error) => error.kind(),
        }
    }
}

impl IntoResponse for UrdfServerError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "ok": false,
            "ts": now_millis(),
            "error": self.to_string(),
            "kind": self.kind(),
        });
        (self.status(), Json(body)).into_response()
    }
}
