//! Serial allocation for membership identifiers.
//!
//! Every identifier embeds a per-tier serial. The counter lives in the
//! store, not in process memory, and is advanced with a single atomic
//! increment-and-return. Read-then-write would hand out duplicates under
//! concurrent registrations, so no implementation of [`CounterStore`] may
//! split the operation.
//!
//! Gaps are fine: a serial consumed by a registration that fails later in
//! the pipeline is never reused. Duplicates are not.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use registry::MembershipTier;
use thiserror::Error;

use crate::database::SERIALS_KEY;

/// Transient storage failure during allocation.
///
/// The counter is unchanged when this is returned, so the caller may retry
/// the whole registration; nothing in this module retries on its own.
#[derive(Error, Debug)]
#[error("{reason}")]
pub struct AllocationFailed {
    reason: String,
}

impl AllocationFailed {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically advance the counter and return the new value.
    ///
    /// A counter that has never been touched starts at 0, so the first
    /// call returns 1.
    async fn increment_and_get(&self, counter: &str) -> Result<u64, AllocationFailed>;
}

pub struct RedisCounterStore {
    connection: ConnectionManager,
}

impl RedisCounterStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment_and_get(&self, counter: &str) -> Result<u64, AllocationFailed> {
        let mut connection = self.connection.clone();

        let serial: u64 = connection
            .hincr(SERIALS_KEY, counter, 1)
            .await
            .map_err(|e| AllocationFailed::new(e.to_string()))?;

        Ok(serial)
    }
}

/// In-memory counter with the same contract as the Redis store. Used in
/// tests and as the reference for the allocation properties.
#[derive(Default)]
pub struct MemoryCounterStore {
    counters: Mutex<HashMap<String, u64>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment_and_get(&self, counter: &str) -> Result<u64, AllocationFailed> {
        let mut counters = self.counters.lock().expect("counter lock poisoned");

        let serial = counters.entry(counter.to_string()).or_insert(0);
        *serial += 1;

        Ok(*serial)
    }
}

pub struct SerialAllocator {
    store: Arc<dyn CounterStore>,
}

impl SerialAllocator {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Next serial for the tier: positive, unique for the tier's lifetime,
    /// strictly greater than every serial handed out before it.
    pub async fn allocate(&self, tier: MembershipTier) -> Result<u64, AllocationFailed> {
        self.store.increment_and_get(tier.code()).await
    }
}
