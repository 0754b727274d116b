use std::path::PathBuf;

use anyhow::{Context, Result};
use birthcal_core::config::{FileConfig, Overrides, Settings};
use birthcal_core::ics::{ParsedEvent, parse_calendar};
use birthcal_core::recurrence::next_occurrence;
use chrono::{Local, NaiveDate};
use owo_colors::OwoColorize;

use crate::render::{Render, Upcoming};

pub fn run(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => Settings::resolve(FileConfig::load(None)?, Overrides::default())?.output,
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    let calendar =
        parse_calendar(&content).with_context(|| format!("Invalid calendar {}", path.display()))?;

    let name = calendar.name.as_deref().unwrap_or("Untitled calendar");
    match &calendar.timezone {
        Some(tz) => println!("📅 {} {}", name, format!("({tz})").dimmed()),
        None => println!("📅 {}", name),
    }

    if calendar.events.is_empty() {
        println!("   {}", "No events".dimmed());
        return Ok(());
    }

    let today = Local::now().date_naive();
    let mut upcoming = calendar
        .events
        .iter()
        .map(|event| Ok(Upcoming { event, next: next_date(event, today)? }))
        .collect::<Result<Vec<_>>>()?;

    // Soonest first; events that never recur again go last
    upcoming.sort_by_key(|u| (u.next.is_none(), u.next));

    for entry in &upcoming {
        println!("   {}", entry.render());
    }

    println!("\n{} events", calendar.events.len());

    Ok(())
}

fn next_date(event: &ParsedEvent, today: NaiveDate) -> Result<Option<NaiveDate>> {
    match &event.rrule {
        Some(rrule) => next_occurrence(event.start, rrule, today)
            .with_context(|| format!("Event '{}'", event.summary)),
        None => Ok(Some(event.start).filter(|start| *start >= today)),
    }
}
