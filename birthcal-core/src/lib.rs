//! Core of birthcal.
//!
//! Turns the character list of a game-data API into a calendar of yearly,
//! all-day birthday events:
//! - `source` adapts the upstream API to [`character::Character`] records
//! - `fetch` does the HTTP work with an explicit retry policy
//! - `date` anchors a (month, day) birthday in a real year
//! - `event`, `calendar` and `ics` build and serialize the calendar
//! - `pipeline` runs the whole thing for one configuration

pub mod calendar;
pub mod character;
pub mod config;
pub mod date;
pub mod error;
pub mod event;
pub mod fetch;
pub mod ics;
pub mod language;
pub mod pipeline;
pub mod recurrence;
pub mod source;

pub use error::{BirthcalError, BirthcalResult};
