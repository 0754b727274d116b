//! ICS file generation and parsing.
//!
//! This module handles reading and writing .ics files according to RFC 5545.

mod generate;
mod parse;

pub use generate::{format_duration, generate_calendar};
pub use parse::{ParsedCalendar, ParsedEvent, parse_calendar};
