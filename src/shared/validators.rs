use regex::Regex;
use std::sync::OnceLock;

pub const MAX_SENSOR_ID_LENGTH: usize = 128;
pub const DEFAULT_HISTORY_DAYS: u32 = 7;
pub const MAX_HISTORY_DAYS: u32 = 90;

/// Validation error type
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Validation error for field '{}': {}",
            self.field, self.message
        )
    }
}

impl std::error::Error for ValidationError {}

/// Validate a sensor identifier.
/// Non-empty, at most 128 characters of `[A-Za-z0-9_.:-]`.
pub fn validate_sensor_id(sensor_id: &str) -> Result<(), ValidationError> {
    static SENSOR_ID_REGEX: OnceLock<Regex> = OnceLock::new();

    if sensor_id.is_empty() {
        return Err(ValidationError::new("sensorId", "Sensor ID cannot be empty"));
    }

    if sensor_id.len() > MAX_SENSOR_ID_LENGTH {
        return Err(ValidationError::new(
            "sensorId",
            format!(
                "Sensor ID length {} exceeds maximum of {} characters",
                sensor_id.len(),
                MAX_SENSOR_ID_LENGTH
            ),
        ));
    }

    let regex = SENSOR_ID_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_.:\-]+$").unwrap_or_else(|_| unreachable!("static pattern"))
    });

    if !regex.is_match(sensor_id) {
        return Err(ValidationError::new(
            "sensorId",
            "Sensor ID may only contain letters, digits, '_', '.', ':' and '-'",
        ));
    }

    Ok(())
}

/// Validate epoch milliseconds timestamp for readings
/// Ensures non-negative and within reasonable range (year 2000 to 2100)
pub fn validate_epoch_millis(timestamp_ms: i64) -> Result<(), ValidationError> {
    // 2000-01-01 00:00:00 UTC
    const MIN_TIMESTAMP_MS: i64 = 946_684_800_000;
    // 2100-01-01 00:00:00 UTC
    const MAX_TIMESTAMP_MS: i64 = 4_102_444_800_000;

    if timestamp_ms < 0 {
        return Err(ValidationError::new(
            "timestamp_ms",
            "Timestamp must be non-negative",
        ));
    }

    if timestamp_ms < MIN_TIMESTAMP_MS {
        return Err(ValidationError::new(
            "timestamp_ms",
            format!("Timestamp {} is before year 2000", timestamp_ms),
        ));
    }

    if timestamp_ms > MAX_TIMESTAMP_MS {
        return Err(ValidationError::new(
            "timestamp_ms",
            format!("Timestamp {} is after year 2100", timestamp_ms),
        ));
    }

    Ok(())
}

/// Parse the `days` query parameter for trend history.
/// Absent means the default window; otherwise an integer in 1..=90.
pub fn validate_history_days(days: Option<&str>) -> Result<u32, ValidationError> {
    let Some(raw) = days else {
        return Ok(DEFAULT_HISTORY_DAYS);
    };

    let parsed: u32 = raw.trim().parse().map_err(|_| {
        ValidationError::new("days", format!("'{}' is not a whole number of days", raw))
    })?;

    if !(1..=MAX_HISTORY_DAYS).contains(&parsed) {
        return Err(ValidationError::new(
            "days",
            format!("days must be between 1 and {}", MAX_HISTORY_DAYS),
        ));
    }

    Ok(parsed)
}
