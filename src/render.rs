//! Colored terminal rendering for birthcal-core types.

use birthcal_core::event::EventStatus;
use birthcal_core::ics::ParsedEvent;
use birthcal_core::pipeline::{Progress, Skipped};
use chrono::NaiveDate;
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Progress {
    fn render(&self) -> String {
        match self {
            Progress::Added {
                name,
                start,
                has_description,
            } => {
                let note = if *has_description {
                    String::new()
                } else {
                    format!(" {}", "(no description)".dimmed())
                };
                format!("{} {} {}{}", "+".green(), name.green(), start.dimmed(), note)
            }
            Progress::Skipped(skipped) => skipped.render(),
        }
    }
}

impl Render for Skipped {
    fn render(&self) -> String {
        format!(
            "{} {} {}",
            "!".yellow(),
            self.name.yellow(),
            format!("({}: {})", self.id, self.reason).dimmed()
        )
    }
}

/// An event with the next date it falls on, if any.
pub struct Upcoming<'a> {
    pub event: &'a ParsedEvent,
    pub next: Option<NaiveDate>,
}

impl Render for Upcoming<'_> {
    fn render(&self) -> String {
        let next = match self.next {
            Some(date) => date.format("%Y-%m-%d").to_string().cyan().to_string(),
            None => "never".red().to_string(),
        };
        let start = format!("since {}", self.event.start);
        let summary = match self.event.status {
            Some(EventStatus::Cancelled) => self.event.summary.strikethrough().to_string(),
            _ => self.event.summary.clone(),
        };

        format!("{} {} {}", next, summary, start.dimmed())
    }
}
