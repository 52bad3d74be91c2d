//! # Redis
//!
//! Durable store behind the membership core.
//!
//! ## Keys
//!
//! - `gnacops:serials`: hash, one field per membership tier code holding that
//!   tier's serial counter. Advanced only through `HINCRBY`, which is the
//!   atomic increment-and-return the allocator is built on. A missing field
//!   counts as 0, so the first allocation of a tier returns 1.
//! - `gnacops:members`: hash, membership identifier to member record JSON.
//!   Written with `HSETNX`; a record is never overwritten once issued.
//!
//! ## Requirements
//!
//! - Atomic increments under concurrent registrations
//! - O(1) record lookups by identifier
//! - Small dataset, low thousands of members per tier
//!
//! Timeouts are set on the connection manager so a dead Redis surfaces as an
//! allocation failure instead of a hung registration.
use std::time::Duration;

use redis::{
    Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};

pub const SERIALS_KEY: &str = "gnacops:serials";
pub const MEMBERS_KEY: &str = "gnacops:members";

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
