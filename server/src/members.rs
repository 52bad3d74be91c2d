use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, aio::ConnectionManager};
use serde::{Deserialize, Serialize};

use crate::{database::MEMBERS_KEY, error::AppError};

/// A persisted registration. The identifier and serial are permanent for
/// the life of the membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRecord {
    pub membership_id: String,
    pub full_name: String,
    pub email: String,
    pub category: String,
    pub region: String,
    pub serial: u64,
    pub registered_at: DateTime<Utc>,
}

#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Persist a record under its membership identifier. Returns false if
    /// the identifier is already taken; existing records are never
    /// overwritten.
    async fn insert(&self, record: &MemberRecord) -> Result<bool, AppError>;

    async fn fetch(&self, membership_id: &str) -> Result<Option<MemberRecord>, AppError>;
}

pub struct RedisMemberStore {
    connection: ConnectionManager,
}

impl RedisMemberStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl MemberStore for RedisMemberStore {
    async fn insert(&self, record: &MemberRecord) -> Result<bool, AppError> {
        let payload =
            serde_json::to_string(record).map_err(|e| AppError::InternalError(e.into()))?;

        let mut connection = self.connection.clone();
        let created: bool = connection
            .hset_nx(MEMBERS_KEY, &record.membership_id, payload)
            .await
            .map_err(|e| AppError::InternalError(e.into()))?;

        Ok(created)
    }

    async fn fetch(&self, membership_id: &str) -> Result<Option<MemberRecord>, AppError> {
        let mut connection = self.connection.clone();

        let payload: Option<String> = connection
            .hget(MEMBERS_KEY, membership_id)
            .await
            .map_err(|e| AppError::InternalError(e.into()))?;

        match payload {
            Some(data) => {
                let record =
                    serde_json::from_str(&data).map_err(|e| AppError::InternalError(e.into()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }
}

/// In-memory store with the same never-overwrite contract. Test double.
#[derive(Default)]
pub struct MemoryMemberStore {
    records: Mutex<HashMap<String, MemberRecord>>,
}

impl MemoryMemberStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("member lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MemberStore for MemoryMemberStore {
    async fn insert(&self, record: &MemberRecord) -> Result<bool, AppError> {
        let mut records = self.records.lock().expect("member lock poisoned");

        if records.contains_key(&record.membership_id) {
            return Ok(false);
        }

        records.insert(record.membership_id.clone(), record.clone());
        Ok(true)
    }

    async fn fetch(&self, membership_id: &str) -> Result<Option<MemberRecord>, AppError> {
        let records = self.records.lock().expect("member lock poisoned");

        Ok(records.get(membership_id).cloned())
    }
}
