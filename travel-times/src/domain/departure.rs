//! Departure time resolution.
//!
//! A trip row names a departure as an optional weekday plus an optional
//! clock time. The routing service wants an absolute instant, so the pair
//! is resolved against the current time:
//!
//! - no clock time: no departure instant at all
//! - clock time, no weekday (or an unknown weekday name): today at that time
//! - clock time and a weekday: the *next* occurrence of that weekday at that
//!   time, which is always 1 to 7 days ahead and never today

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Weekday};

use super::clock::{ClockError, ClockTime};
use super::weekday::parse_weekday;

/// Error resolving a departure instant for one trip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DepartureError {
    /// The clock value could not be parsed.
    #[error(transparent)]
    Clock(#[from] ClockError),

    /// The local time does not exist on the target date (DST gap).
    #[error("l'heure {time} n'existe pas le {date} dans le fuseau local")]
    NonexistentLocalTime { date: NaiveDate, time: ClockTime },

    /// Date arithmetic left the representable range.
    #[error("date de départ hors limites")]
    OutOfRange,
}

/// Days from `today` until the next `target`, in `1..=7`.
///
/// A target equal to today yields 7: a named weekday always means the
/// next occurrence.
///
/// # Examples
///
/// ```
/// use chrono::Weekday;
/// use travel_times::domain::days_until;
///
/// assert_eq!(days_until(Weekday::Wed, Weekday::Mon), 5);
/// assert_eq!(days_until(Weekday::Wed, Weekday::Thu), 1);
/// assert_eq!(days_until(Weekday::Wed, Weekday::Wed), 7);
/// ```
pub fn days_until(today: Weekday, target: Weekday) -> u64 {
    let ahead = (7 + target.num_days_from_monday() - today.num_days_from_monday()) % 7;
    if ahead == 0 { 7 } else { u64::from(ahead) }
}

/// The calendar date a trip departs on.
///
/// Blank or unrecognized weekday names resolve to today's date.
pub fn target_date(today: NaiveDate, weekday: Option<&str>) -> Result<NaiveDate, DepartureError> {
    match weekday.and_then(parse_weekday) {
        Some(target) => today
            .checked_add_days(Days::new(days_until(today.weekday(), target)))
            .ok_or(DepartureError::OutOfRange),
        None => Ok(today),
    }
}

/// Resolve the departure instant for a trip.
///
/// Returns `Ok(None)` when `clock` is absent or blank. The result is
/// expressed in the same time zone as `now`; seconds are always zero.
pub fn resolve_departure<Tz: TimeZone>(
    now: &DateTime<Tz>,
    weekday: Option<&str>,
    clock: Option<&str>,
) -> Result<Option<DateTime<Tz>>, DepartureError> {
    let Some(clock) = clock.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };

    let time = ClockTime::parse_hhmm(clock)?;
    let date = target_date(now.date_naive(), weekday)?;
    let naive = date.and_time(time.to_naive_time());

    now.timezone()
        .from_local_datetime(&naive)
        .earliest()
        .map(Some)
        .ok_or(DepartureError::NonexistentLocalTime { date, time })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};

    /// Wednesday 2025-01-15 10:42:17 at UTC+1.
    fn wednesday_morning() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 15, 10, 42, 17)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn no_clock_means_no_departure() {
        let now = wednesday_morning();
        assert_eq!(resolve_departure(&now, None, None).unwrap(), None);
        assert_eq!(resolve_departure(&now, Some("Lundi"), None).unwrap(), None);
        assert_eq!(resolve_departure(&now, Some("Lundi"), Some("   ")).unwrap(), None);
    }

    #[test]
    fn clock_without_weekday_is_today() {
        let now = wednesday_morning();
        let dep = resolve_departure(&now, None, Some("08:00")).unwrap().unwrap();
        assert_eq!(dep.date_naive(), date(2025, 1, 15));
        assert_eq!((dep.hour(), dep.minute(), dep.second()), (8, 0, 0));
        assert_eq!(dep.nanosecond(), 0);
        assert_eq!(dep.offset(), now.offset());
    }

    #[test]
    fn blank_weekday_is_today() {
        let now = wednesday_morning();
        let dep = resolve_departure(&now, Some("  "), Some("18:30")).unwrap().unwrap();
        assert_eq!(dep.date_naive(), date(2025, 1, 15));
    }

    #[test]
    fn unknown_weekday_is_today() {
        let now = wednesday_morning();
        let unknown = resolve_departure(&now, Some("Funday"), Some("18:30")).unwrap();
        let absent = resolve_departure(&now, None, Some("18:30")).unwrap();
        assert_eq!(unknown, absent);
    }

    #[test]
    fn same_weekday_is_next_week() {
        let now = wednesday_morning();
        for name in ["Mercredi", "mercredi", "WEDNESDAY", "wednesday"] {
            let dep = resolve_departure(&now, Some(name), Some("11:00")).unwrap().unwrap();
            assert_eq!(dep.date_naive(), date(2025, 1, 22), "weekday {name}");
        }
    }

    #[test]
    fn same_weekday_is_next_week_even_if_time_is_still_ahead() {
        // 23:00 today is still in the future, but a named weekday never means today.
        let now = wednesday_morning();
        let dep = resolve_departure(&now, Some("mercredi"), Some("23:00")).unwrap().unwrap();
        assert_eq!(dep.date_naive(), date(2025, 1, 22));
    }

    #[test]
    fn monday_from_wednesday() {
        let now = wednesday_morning();
        let dep = resolve_departure(&now, Some("Lundi"), Some("08:00")).unwrap().unwrap();
        assert_eq!(dep.date_naive(), date(2025, 1, 20));
        assert_eq!(dep.date_naive().weekday(), Weekday::Mon);
        assert_eq!((dep.hour(), dep.minute()), (8, 0));
    }

    #[test]
    fn thursday_from_wednesday() {
        let now = wednesday_morning();
        let dep = resolve_departure(&now, Some("thursday"), Some("07:05")).unwrap().unwrap();
        assert_eq!(dep.date_naive(), date(2025, 1, 16));
    }

    #[test]
    fn weekday_crosses_month_end() {
        let now = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 30, 12, 0, 0)
            .unwrap(); // Thursday
        let dep = resolve_departure(&now, Some("mardi"), Some("09:00")).unwrap().unwrap();
        assert_eq!(dep.date_naive(), date(2025, 2, 4));
    }

    #[test]
    fn malformed_clock_is_an_error() {
        let now = wednesday_morning();
        let err = resolve_departure(&now, None, Some("8h00")).unwrap_err();
        assert!(matches!(err, DepartureError::Clock(_)));
        assert!(err.to_string().contains("8h00"));

        assert!(resolve_departure(&now, Some("Lundi"), Some("25:00")).is_err());
    }

    #[test]
    fn days_until_table() {
        assert_eq!(days_until(Weekday::Mon, Weekday::Mon), 7);
        assert_eq!(days_until(Weekday::Mon, Weekday::Sun), 6);
        assert_eq!(days_until(Weekday::Sun, Weekday::Mon), 1);
        assert_eq!(days_until(Weekday::Sat, Weekday::Fri), 6);
    }

    #[test]
    fn target_date_ignores_unknown_weekday() {
        let today = date(2025, 1, 15);
        assert_eq!(target_date(today, Some("xyz")).unwrap(), today);
        assert_eq!(target_date(today, None).unwrap(), today);
        assert_eq!(target_date(today, Some("Vendredi")).unwrap(), date(2025, 1, 17));
    }
}
