/**
 * Error Conversion
 *
 * Renders a `BackendError` as a JSON response:
 *
 * ```json
 * {
 *   "success": false,
 *   "error": "Position 7 is out of range (expected 0..=3)",
 *   "status": 400
 * }
 * ```
 *
 * Validation failures also carry `"field"`. Errors after which the client's
 * view of a container may be stale carry `"resync": true`.
 */
use axum::{
    response::{IntoResponse, Response},
    Json,
};

use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!("[Error] {} ({})", self, status);
        } else {
            tracing::debug!("[Error] {} ({})", message, status);
        }

        let mut body = serde_json::json!({
            "success": false,
            "error": message,
            "status": status.as_u16(),
        });
        if let BackendError::Payload(err) = &self {
            if let Some(field) = err.field() {
                body["field"] = serde_json::Value::String(field.to_string());
            }
        }
        if self.needs_resync() {
            body["resync"] = serde_json::Value::Bool(true);
        }

        (status, Json(body)).into_response()
    }
}
