//! # Appointment Expansion
//!
//! Periodic job that turns recurrence rules into concrete appointments over
//! a short forward-looking window (today through today + 7 days by
//! default). Meant to run from cron, as often as desired.
//!
//! Materialization is idempotent: every occurrence is written with an
//! atomic create-if-absent keyed by rule id and date, so re-running the job
//! over the same window never duplicates an appointment. Rules that drift
//! out of the window simply stop producing occurrences.
use std::env;

use chrono::{Duration, Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod database;
pub mod rules;

use database::{AppointmentStore, RedisAppointmentStore, StoreError, init_redis, load_rules};
use rules::{RecurrenceRule, occurrences_in_window};

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// A materialized occurrence of a recurrence rule.
#[derive(Debug, Serialize, Deserialize)]
pub struct Appointment {
    pub rule_id: String,
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

pub fn appointment_key(rule_id: &str, date: NaiveDate) -> String {
    format!("{rule_id}:{date}")
}

/// Expand every rule over the window and store what is not already there.
/// Returns (created, already present).
pub async fn materialize(
    store: &dyn AppointmentStore,
    rules: &[RecurrenceRule],
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Result<(usize, usize), StoreError> {
    let mut created = 0;
    let mut skipped = 0;

    for rule in rules {
        for date in occurrences_in_window(rule, window_start, window_end) {
            let appointment = Appointment {
                rule_id: rule.id.clone(),
                title: rule.title.clone(),
                date,
                time: rule.time,
            };
            let payload =
                serde_json::to_string(&appointment).map_err(|e| StoreError(e.to_string()))?;

            if store
                .create_if_absent(&appointment_key(&rule.id, date), &payload)
                .await?
            {
                created += 1;
            } else {
                skipped += 1;
            }
        }
    }

    Ok((created, skipped))
}

pub async fn run(window_days: u32) {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string());
    let connection = init_redis(&redis_url).await;

    let rules = load_rules(&connection).await.expect("Failed to load rules!");
    info!("Loaded {} rules", rules.len());

    let store = RedisAppointmentStore::new(connection);

    let today = Local::now().date_naive();
    let (created, skipped) = materialize(
        &store,
        &rules,
        today,
        today + Duration::days(window_days as i64),
    )
    .await
    .expect("Failed to materialize appointments!");

    info!("Created {created} appointments, {skipped} already existed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryAppointmentStore;
    use crate::rules::Frequency;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily_rule(id: &str) -> RecurrenceRule {
        RecurrenceRule {
            id: id.to_string(),
            title: "Regional check-in".to_string(),
            frequency: Frequency::Daily,
            interval: 1,
            weekdays: None,
            start_date: date(2026, 8, 1),
            end_date: None,
            time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_materialize_creates_each_occurrence_once() {
        let store = MemoryAppointmentStore::new();
        let rules = vec![daily_rule("r1")];

        let (created, skipped) =
            materialize(&store, &rules, date(2026, 8, 3), date(2026, 8, 9)).await.unwrap();

        assert_eq!(created, 7);
        assert_eq!(skipped, 0);
        assert_eq!(store.len(), 7);
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let store = MemoryAppointmentStore::new();
        let rules = vec![daily_rule("r1")];

        materialize(&store, &rules, date(2026, 8, 3), date(2026, 8, 9)).await.unwrap();
        let (created, skipped) =
            materialize(&store, &rules, date(2026, 8, 3), date(2026, 8, 9)).await.unwrap();

        assert_eq!(created, 0);
        assert_eq!(skipped, 7);
        assert_eq!(store.len(), 7);
    }

    #[tokio::test]
    async fn test_sliding_window_only_adds_new_dates() {
        let store = MemoryAppointmentStore::new();
        let rules = vec![daily_rule("r1")];

        materialize(&store, &rules, date(2026, 8, 3), date(2026, 8, 9)).await.unwrap();

        // A day later the window slides forward by one.
        let (created, skipped) =
            materialize(&store, &rules, date(2026, 8, 4), date(2026, 8, 10)).await.unwrap();

        assert_eq!(created, 1);
        assert_eq!(skipped, 6);
        assert_eq!(store.len(), 8);
    }

    #[tokio::test]
    async fn test_rules_do_not_collide() {
        let store = MemoryAppointmentStore::new();
        let rules = vec![daily_rule("r1"), daily_rule("r2")];

        let (created, _) =
            materialize(&store, &rules, date(2026, 8, 3), date(2026, 8, 3)).await.unwrap();

        assert_eq!(created, 2);
    }

    #[test]
    fn test_appointment_key_embeds_date() {
        assert_eq!(appointment_key("r1", date(2026, 8, 3)), "r1:2026-08-03");
    }
}
