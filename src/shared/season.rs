use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Season label used to pick seasonal factors
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Dry,
    Wet,
    Moderate,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Dry => "dry",
            Season::Wet => "wet",
            Season::Moderate => "moderate",
        }
    }

    /// Season for a calendar month (1-12).
    ///
    /// June through October is wet, every other month is dry. No month maps
    /// to `Moderate`; its factor set is only reachable through
    /// [`SeasonalFactorTable::factors`].
    pub fn for_month(month: u32) -> Season {
        match month {
            6..=10 => Season::Wet,
            _ => Season::Dry,
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Season in effect at the given instant (UTC calendar month)
pub fn current_season(date: DateTime<Utc>) -> Season {
    Season::for_month(date.month())
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeasonalFactorsError {
    #[error("Seasonal factor '{name}' must be a positive finite number, got {value}")]
    NonPositive { name: &'static str, value: f64 },
}

/// Per-attribute tolerance multipliers. Values above 1 widen the tolerance.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct SeasonalFactors {
    moisture: f64,
    temperature: f64,
    ph: f64,
}

impl SeasonalFactors {
    pub fn new(moisture: f64, temperature: f64, ph: f64) -> Result<Self, SeasonalFactorsError> {
        for (name, value) in [("moisture", moisture), ("temperature", temperature), ("ph", ph)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SeasonalFactorsError::NonPositive { name, value });
            }
        }
        Ok(Self {
            moisture,
            temperature,
            ph,
        })
    }

    /// Factors that leave every tolerance unchanged
    pub const fn neutral() -> Self {
        Self {
            moisture: 1.0,
            temperature: 1.0,
            ph: 1.0,
        }
    }

    pub fn moisture(&self) -> f64 {
        self.moisture
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn ph(&self) -> f64 {
        self.ph
    }
}

/// Immutable table holding exactly one factor set per season
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalFactorTable {
    dry: SeasonalFactors,
    wet: SeasonalFactors,
    moderate: SeasonalFactors,
}

impl SeasonalFactorTable {
    pub fn new(dry: SeasonalFactors, wet: SeasonalFactors, moderate: SeasonalFactors) -> Self {
        Self { dry, wet, moderate }
    }

    pub fn factors(&self, season: Season) -> SeasonalFactors {
        match season {
            Season::Dry => self.dry,
            Season::Wet => self.wet,
            Season::Moderate => self.moderate,
        }
    }
}

impl Default for SeasonalFactorTable {
    fn default() -> Self {
        Self {
            dry: SeasonalFactors {
                moisture: 0.8,
                temperature: 1.1,
                ph: 1.0,
            },
            wet: SeasonalFactors {
                moisture: 1.2,
                temperature: 0.9,
                ph: 1.0,
            },
            moderate: SeasonalFactors::neutral(),
        }
    }
}
