use chrono::{DateTime, Utc};

/// Clock trait for abstracting time operations.
///
/// The engine reads the current instant once per request: it stamps the
/// reading, decides the season and sets `generated_at` from the same value.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current time as RFC3339 string, e.g. "2024-01-15T10:30:00+00:00"
    fn now_rfc3339(&self) -> String {
        self.now().to_rfc3339()
    }

    /// Milliseconds since Unix epoch (sort key for stored readings)
    fn now_epoch_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Production implementation of Clock using system time
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant, for deterministic tests
#[derive(Debug, Clone)]
pub struct FixedClock {
    timestamp: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self { timestamp }
    }

    pub fn from_rfc3339(timestamp_str: &str) -> Result<Self, chrono::ParseError> {
        let timestamp = DateTime::parse_from_rfc3339(timestamp_str)?.with_timezone(&Utc);
        Ok(Self { timestamp })
    }

    /// Returns None when `millis` is outside the representable range
    pub fn from_epoch_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self::new)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
