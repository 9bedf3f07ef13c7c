//! Completion identifier generation.

use std::fmt;

use uuid::Uuid;

/// Prefix OpenAI uses for chat completion ids.
pub const COMPLETION_ID_PREFIX: &str = "chatcmpl-";

/// Source of completion ids.
///
/// Every sync reply gets a fresh id; every stream allocates one id up front
/// and stamps it on all of its chunks.
pub trait IdGenerator: Send + Sync + fmt::Debug {
    fn next_id(&self) -> String;
}

/// Random v4 UUID ids, e.g. `chatcmpl-0b6f...`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        format!("{COMPLETION_ID_PREFIX}{}", Uuid::new_v4())
    }
}
