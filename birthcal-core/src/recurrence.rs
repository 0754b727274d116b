//! RRULE expansion for birthday events.

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use rrule::RRuleSet;

use crate::error::{BirthcalError, BirthcalResult};

/// First occurrence of an all-day recurring event on or after `from`.
///
/// Invalid dates are skipped as RFC 5545 requires, so a yearly Feb 29
/// anchor only occurs in leap years.
pub fn next_occurrence(
    start: NaiveDate,
    rrule: &str,
    from: NaiveDate,
) -> BirthcalResult<Option<NaiveDate>> {
    // The rrule crate needs a datetime, so all-day dates become midnight UTC
    let rrule_str = format!("DTSTART:{}T000000Z\nRRULE:{}", start.format("%Y%m%d"), rrule);

    let rrule_set: RRuleSet = rrule_str.parse().map_err(|e| {
        BirthcalError::Recurrence(format!("Failed to parse RRULE '{}': {}", rrule, e))
    })?;

    // The lower bound sits one second before `from` so an occurrence on
    // `from` itself is always returned
    let tz: rrule::Tz = Utc.into();
    let after = (from.and_time(NaiveTime::MIN).and_utc() - Duration::seconds(1)).with_timezone(&tz);

    let result = rrule_set.after(after).all(1);

    Ok(result.dates.first().map(|dt| dt.date_naive()))
}
