use serde::{Deserialize, Serialize};

/// Standard error response payload
/// Contains stable machine-readable error code, human-readable message, and request ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable error code (e.g., "INVALID_SENSOR_DATA")
    pub error: String,

    pub message: String,

    /// Individual problems behind a validation failure
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,

    pub request_id: String,
}

impl ErrorResponse {
    pub fn new(
        error: impl Into<String>,
        message: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Vec::new(),
            request_id: request_id.into(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Common error codes used across the API
pub mod error_codes {
    // Validation errors
    pub const INVALID_FORMAT: &str = "INVALID_FORMAT";
    pub const INVALID_SENSOR_DATA: &str = "INVALID_SENSOR_DATA";
    pub const INVALID_SENSOR_ID: &str = "INVALID_SENSOR_ID";
    pub const INVALID_QUERY: &str = "INVALID_QUERY";

    // Availability errors
    pub const DATASET_UNAVAILABLE: &str = "DATASET_UNAVAILABLE";

    pub const NOT_FOUND: &str = "NOT_FOUND";

    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";

    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}
