//! # Redis
//!
//! Shared store, same instance the membership server uses.
//!
//! ## Keys
//!
//! - `gnacops:appointment_rules`: hash, rule id to recurrence rule JSON.
//!   Written by the coordinator dashboards; this job only reads.
//! - `gnacops:appointments`: hash, `{rule_id}:{date}` to appointment JSON.
//!   Written with `HSETNX`, which is what makes re-running the expansion
//!   over an already-covered window a no-op.
use std::{collections::HashMap, sync::Mutex, time::Duration};

use async_trait::async_trait;
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use thiserror::Error;

use crate::rules::RecurrenceRule;

pub const RULES_KEY: &str = "gnacops:appointment_rules";
pub const APPOINTMENTS_KEY: &str = "gnacops:appointments";

#[derive(Error, Debug)]
#[error("Store error: {0}")]
pub struct StoreError(pub String);

pub async fn init_redis(redis_url: &str) -> ConnectionManager {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100))
        .set_response_timeout(Duration::from_millis(500));

    let client = Client::open(redis_url).unwrap();
    let connection_manager = client
        .get_connection_manager_with_config(config)
        .await
        .unwrap();

    connection_manager
}

pub async fn load_rules(connection: &ConnectionManager) -> Result<Vec<RecurrenceRule>, StoreError> {
    let mut connection = connection.clone();

    let raw: HashMap<String, String> = connection
        .hgetall(RULES_KEY)
        .await
        .map_err(|e| StoreError(e.to_string()))?;

    raw.into_values()
        .map(|data| serde_json::from_str(&data).map_err(|e| StoreError(e.to_string())))
        .collect()
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Store the appointment under `key` unless one already exists.
    /// Returns true when a new appointment was created. Must be a single
    /// atomic operation so concurrent or repeated runs never duplicate.
    async fn create_if_absent(&self, key: &str, appointment: &str) -> Result<bool, StoreError>;
}

pub struct RedisAppointmentStore {
    connection: ConnectionManager,
}

impl RedisAppointmentStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl AppointmentStore for RedisAppointmentStore {
    async fn create_if_absent(&self, key: &str, appointment: &str) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();

        let created: bool = connection
            .hset_nx(APPOINTMENTS_KEY, key, appointment)
            .await
            .map_err(|e| StoreError(e.to_string()))?;

        Ok(created)
    }
}

/// In-memory store with the same create-if-absent contract. Test double.
#[derive(Default)]
pub struct MemoryAppointmentStore {
    appointments: Mutex<HashMap<String, String>>,
}

impl MemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.appointments
            .lock()
            .expect("appointment lock poisoned")
            .len()
    }
}

#[async_trait]
impl AppointmentStore for MemoryAppointmentStore {
    async fn create_if_absent(&self, key: &str, appointment: &str) -> Result<bool, StoreError> {
        let mut appointments = self.appointments.lock().expect("appointment lock poisoned");

        if appointments.contains_key(key) {
            return Ok(false);
        }

        appointments.insert(key.to_string(), appointment.to_string());
        Ok(true)
    }
}
