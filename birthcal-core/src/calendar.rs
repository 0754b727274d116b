//! The birthday calendar container and its file output.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::error::BirthcalResult;
use crate::event::BirthdayEvent;
use crate::ics;
use crate::language::Language;

/// Calendar-level properties.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarMeta {
    pub name: String,
    pub description: String,
    pub timezone: Tz,
    /// How often subscribed clients should refetch
    pub refresh_interval: Duration,
    pub language: Language,
}

impl CalendarMeta {
    /// Product identifier written as PRODID.
    pub fn product_id(&self) -> String {
        format!(
            "-//birthcal//Birthday Calendar {}//{}",
            env!("CARGO_PKG_VERSION"),
            self.language.code().to_uppercase()
        )
    }
}

/// Events in the order they were added, plus calendar metadata.
#[derive(Debug, Clone)]
pub struct BirthdayCalendar {
    pub meta: CalendarMeta,
    /// Used as DTSTAMP on every event
    pub generated_at: DateTime<Utc>,
    events: Vec<BirthdayEvent>,
}

impl BirthdayCalendar {
    pub fn new(meta: CalendarMeta, generated_at: DateTime<Utc>) -> Self {
        BirthdayCalendar {
            meta,
            generated_at,
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, event: BirthdayEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BirthdayEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn to_ics(&self) -> String {
        ics::generate_calendar(self)
    }

    /// Serialize to `path`, replacing whatever is there.
    pub fn write_to(&self, path: &Path) -> BirthcalResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_ics())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Character, CharacterId};
    use crate::event::EventTemplate;
    use chrono::{NaiveDate, TimeZone};

    fn calendar() -> BirthdayCalendar {
        let meta = CalendarMeta {
            name: "Test".to_string(),
            description: "Test calendar".to_string(),
            timezone: chrono_tz::Asia::Shanghai,
            refresh_interval: Duration::from_secs(3600),
            language: Language::En,
        };
        BirthdayCalendar::new(meta, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
    }

    fn event(id: u64, name: &str) -> BirthdayEvent {
        let character = Character {
            id: CharacterId::from(id),
            name: name.to_string(),
            birthday: Some((1, 1)),
            beta: false,
        };
        BirthdayEvent::build(
            &character,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            None,
            &EventTemplate::new(Language::En),
        )
    }

    #[test]
    fn test_push_keeps_order() {
        let mut cal = calendar();
        assert!(cal.is_empty());
        cal.push(event(2, "Kaeya"));
        cal.push(event(1, "Amber"));

        let summaries: Vec<_> = cal.events().iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(summaries, ["Kaeya's birthday", "Amber's birthday"]);
        assert_eq!(cal.len(), 2);
    }

    #[test]
    fn test_product_id() {
        assert_eq!(
            calendar().meta.product_id(),
            format!("-//birthcal//Birthday Calendar {}//EN", env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn test_write_to_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("calendar.ics");

        let mut cal = calendar();
        cal.push(event(1, "Amber"));
        cal.write_to(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("Amber's birthday"));

        let mut cal = calendar();
        cal.push(event(2, "Kaeya"));
        cal.write_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Kaeya's birthday"));
        assert!(!content.contains("Amber's birthday"));
    }

    #[test]
    fn test_write_to_unwritable_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        // A directory can't be overwritten with a file.
        let err = calendar().write_to(dir.path()).unwrap_err();
        assert!(matches!(err, crate::error::BirthcalError::Io(_)));
    }
}
