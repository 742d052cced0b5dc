use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use uuid::Uuid;

/// Source of identifiers for stored recommendations
pub trait IdGenerator: Send + Sync {
    /// Hyphenated lowercase UUID v4
    fn recommendation_id(&self) -> String;
}

/// Production implementation using random UUIDs
#[derive(Debug, Clone, Default)]
pub struct RandomIdGenerator;

impl RandomIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for RandomIdGenerator {
    fn recommendation_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Test implementation returning a fixed sequence of ids.
/// Wraps around to the beginning when the list is exhausted.
#[derive(Debug, Clone)]
pub struct FixedIdGenerator {
    ids: Vec<String>,
    index: Arc<AtomicUsize>,
}

impl FixedIdGenerator {
    pub fn new(ids: Vec<String>) -> Self {
        Self {
            ids,
            index: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn single(id: impl Into<String>) -> Self {
        Self::new(vec![id.into()])
    }
}

impl IdGenerator for FixedIdGenerator {
    fn recommendation_id(&self) -> String {
        if self.ids.is_empty() {
            return String::new();
        }
        let index = self.index.fetch_add(1, Ordering::SeqCst);
        self.ids[index % self.ids.len()].clone()
    }
}
