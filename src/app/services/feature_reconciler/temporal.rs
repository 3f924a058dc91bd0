//! Temporal field derivation
//!
//! Day-of-week uses the Sunday=0 convention throughout: 0 is Sunday, 6 is
//! Saturday, and those two are the weekend. Caller-supplied values are kept
//! as given, even when out of range; only values derived here are wrapped
//! into range.

use super::raw_request::RawRequest;
use crate::Result;
use crate::constants::{
    DAYS_PER_WEEK, DEFAULT_HOUR_OF_WEEK, DEFAULT_MONTH, HOURS_PER_DAY, WEEKEND_DAYS, fields,
};
use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Whichever temporal fields a request supplied
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TemporalInput {
    pub day_of_week: Option<i64>,
    pub hour: Option<i64>,
    pub month: Option<i64>,
    pub weekend: Option<bool>,
    pub hour_of_week: Option<i64>,
    pub timestamp: Option<NaiveDateTime>,
}

impl TemporalInput {
    /// Read the temporal fields of a request, honouring aliases
    pub fn from_request(request: &RawRequest) -> Result<Self> {
        Ok(Self {
            day_of_week: request.integer(fields::DAY_OF_WEEK)?,
            hour: request.integer(fields::HOUR)?,
            month: request.integer(fields::MONTH)?,
            weekend: request.flag(fields::WEEKEND)?,
            hour_of_week: request.integer(fields::HOUR_OF_WEEK)?,
            timestamp: request.timestamp(fields::TIMESTAMP)?,
        })
    }
}

/// Fully populated temporal features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalFeatures {
    pub day_of_week: i64,
    pub hour: i64,
    pub month: i64,
    pub weekend: bool,
    pub hour_of_week: i64,
}

impl TemporalFeatures {
    /// Hour following `hour`, wrapped into 0..24
    pub fn next_hour(&self) -> i64 {
        self.hour.rem_euclid(HOURS_PER_DAY).saturating_add(1) % HOURS_PER_DAY
    }

    /// Hour-of-week following `hour_of_week`, not wrapped
    pub fn next_hour_of_week(&self) -> i64 {
        self.hour_of_week.saturating_add(1)
    }

    /// The supplied-field view of these features; reconciling it is a no-op
    pub fn as_input(&self) -> TemporalInput {
        TemporalInput {
            day_of_week: Some(self.day_of_week),
            hour: Some(self.hour),
            month: Some(self.month),
            weekend: Some(self.weekend),
            hour_of_week: Some(self.hour_of_week),
            timestamp: None,
        }
    }
}

/// Day-of-week and hour encoded by an hour-of-week, wrapped into range
pub fn split_hour_of_week(hour_of_week: i64) -> (i64, i64) {
    (
        hour_of_week.div_euclid(HOURS_PER_DAY).rem_euclid(DAYS_PER_WEEK),
        hour_of_week.rem_euclid(HOURS_PER_DAY),
    )
}

/// Weekend under the Sunday=0 convention
pub fn is_weekend_day(day_of_week: i64) -> bool {
    WEEKEND_DAYS.contains(&day_of_week)
}

/// Sunday=0 day index of a timestamp
fn sunday_based_weekday(timestamp: &NaiveDateTime) -> i64 {
    i64::from(timestamp.weekday().num_days_from_sunday())
}

/// Fill every absent temporal field
///
/// Rules apply in order, each only filling fields still absent:
///
/// 0. a timestamp fills absent day-of-week, hour and month
/// 1. hour-of-week is kept, else computed from day-of-week and hour, else 0
/// 2. absent day-of-week or hour is derived from hour-of-week
/// 3. absent weekend flag is derived from day-of-week
/// 4. absent month defaults to 6
pub fn reconcile_temporal(input: &TemporalInput) -> TemporalFeatures {
    let mut day_of_week = input.day_of_week;
    let mut hour = input.hour;
    let mut month = input.month;

    if let Some(timestamp) = &input.timestamp {
        day_of_week = day_of_week.or(Some(sunday_based_weekday(timestamp)));
        hour = hour.or(Some(i64::from(timestamp.hour())));
        month = month.or(Some(i64::from(timestamp.month())));
    }

    let hour_of_week = match (input.hour_of_week, day_of_week, hour) {
        (Some(how), _, _) => how,
        (None, Some(dow), Some(h)) => dow.saturating_mul(HOURS_PER_DAY).saturating_add(h),
        _ => DEFAULT_HOUR_OF_WEEK,
    };

    let (derived_dow, derived_hour) = split_hour_of_week(hour_of_week);
    let day_of_week = day_of_week.unwrap_or(derived_dow);
    let hour = hour.unwrap_or(derived_hour);

    TemporalFeatures {
        day_of_week,
        hour,
        month: month.unwrap_or(DEFAULT_MONTH),
        weekend: input.weekend.unwrap_or_else(|| is_weekend_day(day_of_week)),
        hour_of_week,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn input() -> TemporalInput {
        TemporalInput::default()
    }

    #[test]
    fn test_hour_of_week_only() {
        let features = reconcile_temporal(&TemporalInput {
            hour_of_week: Some(46),
            ..input()
        });

        assert_eq!(features.day_of_week, 1);
        assert_eq!(features.hour, 22);
        assert!(!features.weekend);
        assert_eq!(features.month, 6);
        assert_eq!(features.hour_of_week, 46);
    }

    #[test]
    fn test_sunday_early_morning_is_weekend() {
        let features = reconcile_temporal(&TemporalInput {
            day_of_week: Some(0),
            hour: Some(3),
            ..input()
        });

        assert_eq!(features.hour_of_week, 3);
        assert!(features.weekend);
    }

    #[test]
    fn test_saturday_is_weekend_and_monday_is_not() {
        assert!(is_weekend_day(6));
        assert!(!is_weekend_day(1));
        assert!(!is_weekend_day(5));
    }

    #[test]
    fn test_empty_input_uses_defaults() {
        let features = reconcile_temporal(&input());
        assert_eq!(
            features,
            TemporalFeatures {
                day_of_week: 0,
                hour: 0,
                month: 6,
                weekend: true,
                hour_of_week: 0,
            }
        );
    }

    #[test]
    fn test_partial_pair_derives_missing_half() {
        // Hour alone cannot form an hour-of-week, so it defaults and only
        // day-of-week is derived from it
        let features = reconcile_temporal(&TemporalInput {
            hour: Some(9),
            ..input()
        });
        assert_eq!(features.hour_of_week, 0);
        assert_eq!(features.day_of_week, 0);
        assert_eq!(features.hour, 9);
    }

    #[test]
    fn test_supplied_weekend_flag_is_kept() {
        let features = reconcile_temporal(&TemporalInput {
            day_of_week: Some(3),
            weekend: Some(true),
            ..input()
        });
        assert!(features.weekend);
    }

    #[test]
    fn test_out_of_range_hour_of_week_wraps_derived_fields() {
        let features = reconcile_temporal(&TemporalInput {
            hour_of_week: Some(170),
            ..input()
        });
        assert_eq!(features.hour_of_week, 170);
        assert_eq!(features.day_of_week, 0);
        assert_eq!(features.hour, 2);

        let features = reconcile_temporal(&TemporalInput {
            hour_of_week: Some(-1),
            ..input()
        });
        assert_eq!(features.day_of_week, 6);
        assert_eq!(features.hour, 23);
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        let features = reconcile_temporal(&TemporalInput {
            day_of_week: Some(i64::MAX),
            hour: Some(i64::MAX),
            ..input()
        });
        assert_eq!(features.hour_of_week, i64::MAX);
        assert_eq!(features.next_hour_of_week(), i64::MAX);
        assert_eq!(features.next_hour(), (i64::MAX % 24 + 1) % 24);

        let features = reconcile_temporal(&TemporalInput {
            hour: Some(-1),
            hour_of_week: Some(0),
            ..input()
        });
        assert_eq!(features.next_hour(), 0);
    }

    #[test]
    fn test_round_trip_modulo_week() {
        for hour_of_week in -200..400 {
            let (dow, hour) = split_hour_of_week(hour_of_week);
            assert!((0..7).contains(&dow));
            assert!((0..24).contains(&hour));
            assert_eq!(
                (dow * 24 + hour).rem_euclid(168),
                hour_of_week.rem_euclid(168)
            );
        }
    }

    #[test]
    fn test_fully_populated_input_is_unchanged() {
        let supplied = TemporalInput {
            day_of_week: Some(9),
            hour: Some(30),
            month: Some(13),
            weekend: Some(false),
            hour_of_week: Some(5),
            timestamp: None,
        };
        let features = reconcile_temporal(&supplied);
        assert_eq!(features.as_input(), supplied);
        assert_eq!(reconcile_temporal(&features.as_input()), features);
    }

    #[test]
    fn test_timestamp_fills_only_absent_fields() {
        // 2024-03-10 was a Sunday
        let timestamp = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(17, 30, 0)
            .unwrap();

        let features = reconcile_temporal(&TemporalInput {
            timestamp: Some(timestamp),
            ..input()
        });
        assert_eq!(features.day_of_week, 0);
        assert_eq!(features.hour, 17);
        assert_eq!(features.month, 3);
        assert_eq!(features.hour_of_week, 17);
        assert!(features.weekend);

        let features = reconcile_temporal(&TemporalInput {
            timestamp: Some(timestamp),
            hour: Some(8),
            ..input()
        });
        assert_eq!(features.hour, 8);
        assert_eq!(features.hour_of_week, 8);
    }

    #[test]
    fn test_next_hour_wraps() {
        let features = reconcile_temporal(&TemporalInput {
            hour_of_week: Some(23),
            ..input()
        });
        assert_eq!(features.next_hour(), 0);
        assert_eq!(features.next_hour_of_week(), 24);
    }
}
