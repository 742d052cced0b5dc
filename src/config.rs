use aws_sdk_dynamodb::Client as DynamoDbClient;
use std::time::Duration;

/// Configuration for the recommendation API
#[derive(Debug, Clone)]
pub struct Config {
    pub dynamodb_client: DynamoDbClient,
    /// Species reference table name
    pub species_table: String,
    /// Stored recommendations table name
    pub recommendations_table: String,
    /// Sensor readings history table name
    pub sensor_readings_table: String,
}

impl Config {
    /// Create a new Config instance from environment variables
    pub async fn from_env() -> Result<Self, ConfigError> {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;

        let dynamodb_config = aws_sdk_dynamodb::config::Builder::from(&aws_config)
            .timeout_config(
                aws_sdk_dynamodb::config::timeout::TimeoutConfig::builder()
                    .operation_timeout(Duration::from_secs(25)) // Leave 5s buffer for Lambda timeout
                    .operation_attempt_timeout(Duration::from_secs(10))
                    .build(),
            )
            .build();

        let dynamodb_client = DynamoDbClient::from_conf(dynamodb_config);

        Ok(Config {
            dynamodb_client,
            species_table: required_var("SPECIES_TABLE")?,
            recommendations_table: required_var("RECOMMENDATIONS_TABLE")?,
            sensor_readings_table: required_var("SENSOR_READINGS_TABLE")?,
        })
    }
}

fn required_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}
