use chrono::{DateTime, NaiveDate, Utc};

use crate::constants::EVENT_DATE_FORMAT;
use crate::errors::ValidationError;

/// Converts a millisecond epoch into a UTC instant, keeping millisecond precision.
///
/// Used for change-log ordering, where sub-second differences still decide
/// which change is the latest.
pub fn instant_from_epoch_millis(epoch_ms: i64) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::from_timestamp_millis(epoch_ms).ok_or(ValidationError::TimestampOutOfRange(epoch_ms))
}

/// Converts a millisecond epoch into a whole-second UTC instant.
///
/// Sub-second remainders are floored, so negative epochs round towards the
/// earlier second.
pub fn event_time_from_epoch_millis(epoch_ms: i64) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::from_timestamp(epoch_ms.div_euclid(1000), 0)
        .ok_or(ValidationError::TimestampOutOfRange(epoch_ms))
}

/// Calendar date (UTC) of an instant.
pub fn event_date_from_utc(instant: DateTime<Utc>) -> NaiveDate {
    instant.date_naive()
}

/// Renders a date as the `YYYY-MM-DD` partition value.
pub fn format_event_date(date: NaiveDate) -> String {
    date.format(EVENT_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_event_time_truncates_to_seconds() {
        let instant = event_time_from_epoch_millis(1_433_221_332_117).unwrap();
        assert_eq!(instant, Utc.timestamp_opt(1_433_221_332, 0).unwrap());
        assert_eq!(instant.nanosecond(), 0);
    }

    #[test]
    fn test_event_time_floors_negative_epochs() {
        let instant = event_time_from_epoch_millis(-1).unwrap();
        assert_eq!(instant, Utc.timestamp_opt(-1, 0).unwrap());
    }

    #[test]
    fn test_instant_keeps_millis() {
        let instant = instant_from_epoch_millis(1_435_460_400_250).unwrap();
        assert_eq!(instant.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_out_of_range_epoch() {
        assert_eq!(
            event_time_from_epoch_millis(i64::MAX),
            Err(ValidationError::TimestampOutOfRange(i64::MAX))
        );
    }

    #[test]
    fn test_format_event_date() {
        let instant = event_time_from_epoch_millis(1_433_221_332_117).unwrap();
        assert_eq!(format_event_date(event_date_from_utc(instant)), "2015-06-02");
    }
}
