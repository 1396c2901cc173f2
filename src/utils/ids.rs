//! Identifier generation strategies

use uuid::Uuid;

/// Produces identifiers for log records, traces and spans
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random RFC 4122 version 4 identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Used when `generateLogId` is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyIdGenerator;

impl IdGenerator for EmptyIdGenerator {
    fn generate(&self) -> String {
        String::new()
    }
}

/// Returns the same identifier every time
#[derive(Debug, Clone)]
pub struct FixedIdGenerator(pub String);

impl IdGenerator for FixedIdGenerator {
    fn generate(&self) -> String {
        self.0.clone()
    }
}
