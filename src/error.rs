use lambda_http::{Body, Response};
use thiserror::Error;

use reforest_engine::shared::error::{error_codes, ErrorResponse};
use reforest_engine::EngineError;

/// Main error type for the recommendation API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Request-level validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required field missing: {0}")]
    MissingField(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Invalid sensor ID: {0}")]
    InvalidSensorId(String),

    #[error("Invalid query parameter: {0}")]
    InvalidQuery(String),
}

/// Database-specific errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("DynamoDB error: {0}")]
    DynamoDb(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid species record: {0}")]
    InvalidSpecies(String),
}

impl ApiError {
    /// Convert error to HTTP response with appropriate status code and error payload
    pub fn to_http_response(&self, request_id: &str) -> Response<Body> {
        let mut details = Vec::new();

        let (status, error_code, message): (u16, &str, String) = match self {
            ApiError::Validation(ValidationError::MissingField(field)) => (
                400,
                error_codes::INVALID_FORMAT,
                format!("Required field missing: {}", field),
            ),
            ApiError::Validation(ValidationError::InvalidBody(msg)) => {
                (400, error_codes::INVALID_FORMAT, msg.clone())
            }
            ApiError::Validation(ValidationError::InvalidSensorId(msg)) => {
                (400, error_codes::INVALID_SENSOR_ID, msg.clone())
            }
            ApiError::Validation(ValidationError::InvalidQuery(msg)) => {
                (400, error_codes::INVALID_QUERY, msg.clone())
            }
            ApiError::Engine(EngineError::Validation { errors }) => {
                details = errors.clone();
                (
                    400,
                    error_codes::INVALID_SENSOR_DATA,
                    "Sensor data failed validation".to_string(),
                )
            }
            ApiError::Engine(EngineError::DatasetUnavailable) => (
                503,
                error_codes::DATASET_UNAVAILABLE,
                "Species dataset is currently unavailable".to_string(),
            ),
            ApiError::Database(_) => (
                500,
                error_codes::DATABASE_ERROR,
                "Internal database error occurred".to_string(),
            ),
            ApiError::Internal(_) => (
                500,
                error_codes::INTERNAL_ERROR,
                "Internal server error occurred".to_string(),
            ),
        };

        let error_response = ErrorResponse::new(error_code, message, request_id).with_details(details);

        let body = error_response
            .to_json()
            .unwrap_or_else(|_| r#"{"error":"INTERNAL_ERROR","message":"Failed to serialize error response","request_id":""}"#.to_string());

        Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap_or_else(|_| {
                let mut fallback = Response::new(Body::from(
                    r#"{"error":"INTERNAL_ERROR","message":"Failed to build response"}"#,
                ));
                *fallback.status_mut() = lambda_http::http::StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}

impl<E> From<aws_sdk_dynamodb::error::SdkError<E>> for DatabaseError
where
    E: std::fmt::Debug,
{
    fn from(err: aws_sdk_dynamodb::error::SdkError<E>) -> Self {
        DatabaseError::DynamoDb(format!("{:?}", err))
    }
}

impl From<serde_dynamo::Error> for DatabaseError {
    fn from(err: serde_dynamo::Error) -> Self {
        DatabaseError::Serialization(err.to_string())
    }
}
