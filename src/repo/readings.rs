use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use chrono::DateTime;
use serde::Deserialize;
use serde_dynamo::aws_sdk_dynamodb_1::from_item;
use tracing::{info, warn};

use super::ReadingHistory;
use crate::error::DatabaseError;
use reforest_engine::{validate_epoch_millis, HistoricalReading, Measurement};

/// Item layout of the sensor readings table.
///
/// Values are written by the ingestion side and may be numbers, numeric
/// strings or something else entirely.
#[derive(Debug, Deserialize)]
pub struct ReadingItem {
    pub timestamp_ms: i64,
    #[serde(default)]
    pub ph: Option<Measurement>,
    #[serde(default)]
    pub soil_moisture: Option<Measurement>,
    #[serde(default)]
    pub temperature: Option<Measurement>,
}

impl ReadingItem {
    /// `None` when the timestamp falls outside 2000-2100
    pub fn into_historical(self) -> Option<HistoricalReading> {
        validate_epoch_millis(self.timestamp_ms).ok()?;
        Some(HistoricalReading {
            timestamp: DateTime::from_timestamp_millis(self.timestamp_ms)?,
            ph: self.ph,
            soil_moisture: self.soil_moisture,
            temperature: self.temperature,
        })
    }
}

/// Decode raw items, skipping any that cannot be read as a reading
pub fn decode_items(
    sensor_id: &str,
    items: Vec<HashMap<String, AttributeValue>>,
) -> Vec<HistoricalReading> {
    items
        .into_iter()
        .filter_map(|item| {
            let decoded: Result<ReadingItem, _> = from_item(item);
            match decoded {
                Ok(reading) => reading.into_historical(),
                Err(e) => {
                    warn!(sensor_id = %sensor_id, error = %e, "Skipping undecodable reading");
                    None
                }
            }
        })
        .collect()
}

/// Reading history backed by a DynamoDB table keyed by
/// `sensor_id` (partition) and `timestamp_ms` (sort)
#[derive(Debug, Clone)]
pub struct DynamoReadingHistory {
    client: DynamoDbClient,
    table_name: String,
}

impl DynamoReadingHistory {
    pub fn new(client: DynamoDbClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

impl ReadingHistory for DynamoReadingHistory {
    async fn readings_between(
        &self,
        sensor_id: &str,
        from_ms: i64,
        to_ms: i64,
    ) -> Result<Vec<HistoricalReading>, DatabaseError> {
        let mut readings = Vec::new();
        let mut start_key = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression(
                    "sensor_id = :sensor_id AND timestamp_ms BETWEEN :from_ms AND :to_ms",
                )
                .expression_attribute_values(":sensor_id", AttributeValue::S(sensor_id.to_string()))
                .expression_attribute_values(":from_ms", AttributeValue::N(from_ms.to_string()))
                .expression_attribute_values(":to_ms", AttributeValue::N(to_ms.to_string()))
                .scan_index_forward(true) // Oldest first
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| DatabaseError::DynamoDb(format!("{:?}", e)))?;

            readings.extend(decode_items(sensor_id, output.items.unwrap_or_default()));

            start_key = output.last_evaluated_key;
            if start_key.is_none() {
                break;
            }
        }

        info!(
            sensor_id = %sensor_id,
            from_ms,
            to_ms,
            count = readings.len(),
            "Loaded reading history"
        );

        Ok(readings)
    }
}
