//! Recurrence rules and their expansion into concrete dates.
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub id: String,
    pub title: String,
    pub frequency: Frequency,
    pub interval: u32,
    /// Weekday numbers, 0 = Sunday through 6 = Saturday.
    pub weekdays: Option<Vec<u8>>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub time: NaiveTime,
}

/// Concrete dates of `rule` inside the window, intersected with the rule's
/// own `[start_date, end_date]` range.
pub fn occurrences_in_window(
    rule: &RecurrenceRule,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Vec<NaiveDate> {
    let start = window_start.max(rule.start_date);
    let end = match rule.end_date {
        Some(end_date) => window_end.min(end_date),
        None => window_end,
    };

    let mut dates = Vec::new();
    let mut date = start;
    while date <= end {
        if matches(rule, date) {
            dates.push(date);
        }
        date += Duration::days(1);
    }

    dates
}

fn matches(rule: &RecurrenceRule, date: NaiveDate) -> bool {
    let interval = rule.interval.max(1);

    match rule.frequency {
        Frequency::Daily => {
            let days = (date - rule.start_date).num_days();
            days % interval as i64 == 0
        }
        // TODO: weekly rules ignore the interval (every matching weekday
        // fires, even with interval > 1). Confirm intended cadence before
        // changing.
        Frequency::Weekly => match &rule.weekdays {
            Some(weekdays) if !weekdays.is_empty() => {
                weekdays.contains(&(date.weekday().num_days_from_sunday() as u8))
            }
            _ => date.weekday() == rule.start_date.weekday(),
        },
        Frequency::Monthly => {
            if date.day() != rule.start_date.day() {
                return false;
            }

            let months = (date.year() - rule.start_date.year()) * 12
                + (date.month() as i32 - rule.start_date.month() as i32);
            months % interval as i32 == 0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rule(frequency: Frequency, interval: u32, start: NaiveDate) -> RecurrenceRule {
        RecurrenceRule {
            id: "r1".to_string(),
            title: "District coordinators".to_string(),
            frequency,
            interval,
            weekdays: None,
            start_date: start,
            end_date: None,
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_daily_every_day() {
        let r = rule(Frequency::Daily, 1, date(2026, 8, 1));

        let dates = occurrences_in_window(&r, date(2026, 8, 3), date(2026, 8, 6));

        assert_eq!(
            dates,
            vec![date(2026, 8, 3), date(2026, 8, 4), date(2026, 8, 5), date(2026, 8, 6)]
        );
    }

    #[test]
    fn test_daily_interval_counts_from_rule_start() {
        let r = rule(Frequency::Daily, 3, date(2026, 8, 1));

        let dates = occurrences_in_window(&r, date(2026, 8, 2), date(2026, 8, 11));

        // Aug 1 + 3n: 4th, 7th, 10th fall inside the window.
        assert_eq!(dates, vec![date(2026, 8, 4), date(2026, 8, 7), date(2026, 8, 10)]);
    }

    #[test]
    fn test_window_clamped_to_rule_range() {
        let mut r = rule(Frequency::Daily, 1, date(2026, 8, 4));
        r.end_date = Some(date(2026, 8, 5));

        let dates = occurrences_in_window(&r, date(2026, 8, 1), date(2026, 8, 8));

        assert_eq!(dates, vec![date(2026, 8, 4), date(2026, 8, 5)]);
    }

    #[test]
    fn test_rule_entirely_outside_window() {
        let mut r = rule(Frequency::Daily, 1, date(2026, 7, 1));
        r.end_date = Some(date(2026, 7, 31));

        let dates = occurrences_in_window(&r, date(2026, 8, 1), date(2026, 8, 8));

        assert!(dates.is_empty());
    }

    #[test]
    fn test_weekly_filters_by_weekday_set() {
        // 2026-08-03 is a Monday.
        let mut r = rule(Frequency::Weekly, 1, date(2026, 8, 3));
        r.weekdays = Some(vec![1, 3]); // Monday, Wednesday

        let dates = occurrences_in_window(&r, date(2026, 8, 3), date(2026, 8, 9));

        assert_eq!(dates, vec![date(2026, 8, 3), date(2026, 8, 5)]);
    }

    #[test]
    fn test_weekly_without_weekdays_uses_start_weekday() {
        // Starts on a Tuesday, so only Tuesdays fire.
        let r = rule(Frequency::Weekly, 1, date(2026, 8, 4));

        let dates = occurrences_in_window(&r, date(2026, 8, 4), date(2026, 8, 17));

        assert_eq!(dates, vec![date(2026, 8, 4), date(2026, 8, 11)]);
    }

    #[test]
    fn test_weekly_interval_has_no_effect() {
        // Pins the current behavior: interval 2 still fires every week.
        let mut every_week = rule(Frequency::Weekly, 1, date(2026, 8, 3));
        every_week.weekdays = Some(vec![1]);
        let mut every_other = rule(Frequency::Weekly, 2, date(2026, 8, 3));
        every_other.weekdays = Some(vec![1]);

        let window = (date(2026, 8, 3), date(2026, 8, 17));

        assert_eq!(
            occurrences_in_window(&every_week, window.0, window.1),
            occurrences_in_window(&every_other, window.0, window.1)
        );
    }

    #[test]
    fn test_monthly_same_day_of_month() {
        let r = rule(Frequency::Monthly, 1, date(2026, 5, 10));

        let dates = occurrences_in_window(&r, date(2026, 8, 6), date(2026, 8, 13));

        assert_eq!(dates, vec![date(2026, 8, 10)]);
    }

    #[test]
    fn test_monthly_respects_interval() {
        let r = rule(Frequency::Monthly, 2, date(2026, 5, 10));

        // Cadence from May is July, September; June is off it.
        assert!(occurrences_in_window(&r, date(2026, 6, 8), date(2026, 6, 12)).is_empty());
        assert_eq!(
            occurrences_in_window(&r, date(2026, 7, 8), date(2026, 7, 12)),
            vec![date(2026, 7, 10)]
        );
    }

    #[test]
    fn test_monthly_skips_months_without_the_day() {
        let r = rule(Frequency::Monthly, 1, date(2026, 1, 31));

        // February has no 31st; no occurrence that month.
        assert!(occurrences_in_window(&r, date(2026, 2, 1), date(2026, 2, 28)).is_empty());
        assert_eq!(
            occurrences_in_window(&r, date(2026, 3, 25), date(2026, 3, 31)),
            vec![date(2026, 3, 31)]
        );
    }

    #[test]
    fn test_zero_interval_treated_as_one() {
        let r = rule(Frequency::Daily, 0, date(2026, 8, 1));

        let dates = occurrences_in_window(&r, date(2026, 8, 1), date(2026, 8, 3));

        assert_eq!(dates.len(), 3);
    }

    #[test]
    fn test_rule_round_trips_through_json() {
        let mut r = rule(Frequency::Weekly, 1, date(2026, 8, 3));
        r.weekdays = Some(vec![0, 6]);
        r.end_date = Some(date(2026, 12, 31));

        let json = serde_json::to_string(&r).unwrap();
        let back: RecurrenceRule = serde_json::from_str(&json).unwrap();

        assert_eq!(back.frequency, Frequency::Weekly);
        assert_eq!(back.weekdays, Some(vec![0, 6]));
        assert_eq!(back.start_date, r.start_date);
    }
}
