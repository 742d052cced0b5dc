pub mod recommendations;
pub mod trends;

use lambda_http::{Body, Request, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::{ApiError, ValidationError};

/// Decode a JSON request body
pub fn parse_json_body<T: DeserializeOwned>(
    event: &Request,
    request_id: &str,
) -> Result<T, ApiError> {
    let body_bytes = match event.body() {
        Body::Text(text) => text.as_bytes(),
        Body::Binary(bytes) => bytes.as_slice(),
        Body::Empty => {
            return Err(ValidationError::MissingField("request body".to_string()).into());
        }
    };

    serde_json::from_slice(body_bytes).map_err(|e| {
        warn!(request_id = %request_id, error = %e, "Failed to parse request body");
        ApiError::Validation(ValidationError::InvalidBody(format!("Invalid JSON: {}", e)))
    })
}

/// 200 response with a JSON body
pub fn json_response<T: Serialize>(payload: &T) -> Result<Response<Body>, ApiError> {
    let body = serde_json::to_string(payload)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize response: {}", e)))?;

    Response::builder()
        .status(200)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
