//! Name generation for pods and containers that are not given one.
//!
//! Validation takes its generator as an explicit argument so that callers
//! (and tests) control exactly which names get injected.

use crate::constants::GENERATED_NAME_LEN;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of names for unnamed pods and containers.
pub trait NameGenerator: Send + Sync {
    /// Returns a fresh name.
    fn generate(&self) -> String;
}

/// Generates random 32-character hex names from UUIDv4s.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNameGenerator;

impl NameGenerator for RandomNameGenerator {
    fn generate(&self) -> String {
        let mut name = uuid::Uuid::new_v4().simple().to_string();
        name.truncate(GENERATED_NAME_LEN);
        name
    }
}

/// Generates `<prefix>-0`, `<prefix>-1`, ... in call order.
#[derive(Debug, Default)]
pub struct SequentialNameGenerator {
    prefix: String,
    next: AtomicUsize,
}

impl SequentialNameGenerator {
    /// Creates a generator whose names start with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicUsize::new(0),
        }
    }
}

impl NameGenerator for SequentialNameGenerator {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}
