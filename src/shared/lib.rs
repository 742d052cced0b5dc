// Declare modules at the root level
pub mod dataset;
pub mod domain;
pub mod engine;
pub mod error;
pub mod id_generator;
pub mod ranking;
pub mod scoring;
pub mod season;
pub mod sensor_validation;
pub mod time;
pub mod trend;
pub mod validators;

// Test utilities module (available in test and integration test builds)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export everything under a shared namespace for external access
pub mod shared {
    pub use super::dataset;
    pub use super::domain;
    pub use super::engine;
    pub use super::error;
    pub use super::id_generator;
    pub use super::ranking;
    pub use super::scoring;
    pub use super::season;
    pub use super::sensor_validation;
    pub use super::time;
    pub use super::trend;
    pub use super::validators;
}

// Also re-export at root for convenience
pub use dataset::*;
pub use domain::*;
pub use engine::*;
pub use error::*;
pub use id_generator::*;
pub use ranking::*;
pub use scoring::*;
pub use season::*;
pub use sensor_validation::*;
pub use time::*;
pub use trend::*;
pub use validators::*;
