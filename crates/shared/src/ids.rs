//! Instance id generation.
//!
//! Ids must never collide within a process because every instance writes its
//! record to the same store. A single generator is registered process-wide;
//! tests and embedders can hand a widget its own generator instead.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

pub trait IdGenerator: Send + Sync {
    /// Produce an id never returned before by this generator.
    fn next_id(&self) -> String;
}

/// Monotonic counter, starting at 1. Never decremented.
#[derive(Debug, Default)]
pub struct CounterIds {
    last: AtomicU64,
}

impl CounterIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume counting after `last`.
    pub fn starting_after(last: u64) -> Self {
        Self {
            last: AtomicU64::new(last),
        }
    }
}

impl IdGenerator for CounterIds {
    fn next_id(&self) -> String {
        (self.last.fetch_add(1, Ordering::Relaxed) + 1).to_string()
    }
}

#[cfg(feature = "uuid-support")]
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

#[cfg(feature = "uuid-support")]
impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdRegistryError {
    #[error("the id generator was already initialized")]
    AlreadyInitialized,
}

static REGISTRY: OnceLock<Arc<dyn IdGenerator>> = OnceLock::new();

/// Install the process-wide generator. Must run before the first widget asks
/// for an id; afterwards the choice is fixed for the process lifetime.
pub fn init_id_generator(generator: Arc<dyn IdGenerator>) -> Result<(), IdRegistryError> {
    REGISTRY
        .set(generator)
        .map_err(|_| IdRegistryError::AlreadyInitialized)
}

/// The process-wide generator, falling back to a `CounterIds` when nothing
/// was installed.
pub fn global_id_generator() -> Arc<dyn IdGenerator> {
    REGISTRY
        .get_or_init(|| Arc::new(CounterIds::new()))
        .clone()
}
