//! Birthday date resolution.
//!
//! Source records only carry a (month, day) pair. An all-day recurring event
//! still needs a concrete anchor date, so the pair is placed in the reference
//! year, or the closest earlier year where it exists (Feb 29 only exists in
//! leap years).

use chrono::NaiveDate;
use thiserror::Error;

/// How many years before the reference year are tried.
pub const FALLBACK_YEARS: i32 = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateResolveError {
    #[error(
        "No valid date for month {month}, day {day} between {first} and {reference_year}",
        first = .reference_year - FALLBACK_YEARS
    )]
    NoValidYear {
        month: u32,
        day: u32,
        reference_year: i32,
    },
}

/// Place `(month, day)` in `reference_year`, or in one of the
/// `FALLBACK_YEARS` years before it, whichever comes first.
pub fn resolve_birthday(
    month: u32,
    day: u32,
    reference_year: i32,
) -> Result<NaiveDate, DateResolveError> {
    (0..=FALLBACK_YEARS)
        .map(|back| reference_year - back)
        .find_map(|year| NaiveDate::from_ymd_opt(year, month, day))
        .ok_or(DateResolveError::NoValidYear {
            month,
            day,
            reference_year,
        })
}
