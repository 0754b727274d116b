//! ICS file parsing using the icalendar crate's parser.

use chrono::NaiveDate;
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, read_calendar, unfold},
};

use crate::error::{BirthcalError, BirthcalResult};
use crate::event::{EventStatus, Transparency};

/// A calendar read back from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCalendar {
    pub name: Option<String>,
    pub timezone: Option<String>,
    pub events: Vec<ParsedEvent>,
}

/// The parts of a VEVENT a birthday calendar cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEvent {
    pub uid: Option<String>,
    pub summary: String,
    pub start: NaiveDate,
    pub rrule: Option<String>,
    /// Unknown values read as `None`
    pub status: Option<EventStatus>,
    pub transparency: Option<Transparency>,
    pub url: Option<String>,
    pub description: Option<String>,
}

/// Parse ICS content into its events, in file order.
pub fn parse_calendar(content: &str) -> BirthcalResult<ParsedCalendar> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(|e| BirthcalError::IcsParse(e.to_string()))?;

    let find_cal_prop = |name: &str| {
        calendar
            .properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| unescape_ics_value(p.val.as_ref()))
    };
    let name = find_cal_prop("X-WR-CALNAME").or_else(|| find_cal_prop("NAME"));
    let timezone = find_cal_prop("X-WR-TIMEZONE");

    let events = calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .map(parse_event)
        .collect::<BirthcalResult<Vec<_>>>()?;

    Ok(ParsedCalendar {
        name,
        timezone,
        events,
    })
}

fn parse_event(vevent: &Component) -> BirthcalResult<ParsedEvent> {
    let uid = vevent.find_prop("UID").map(|p| p.val.to_string());
    let summary = vevent
        .find_prop("SUMMARY")
        .map(|p| unescape_ics_value(p.val.as_ref()))
        .unwrap_or_else(|| "(No title)".to_string());

    let dtstart = vevent
        .find_prop("DTSTART")
        .ok_or_else(|| BirthcalError::IcsParse(format!("Event '{}' has no DTSTART", summary)))?;
    let start = DatePerhapsTime::try_from(dtstart)
        .map(to_date)
        .map_err(|_| {
            BirthcalError::IcsParse(format!(
                "Event '{}' has an invalid DTSTART '{}'",
                summary,
                dtstart.val.as_ref()
            ))
        })?;

    let rrule = vevent.find_prop("RRULE").map(|p| p.val.to_string());
    let status = vevent
        .find_prop("STATUS")
        .and_then(|p| EventStatus::from_ics_str(p.val.as_ref()));
    let transparency = vevent
        .find_prop("TRANSP")
        .and_then(|p| Transparency::from_ics_str(p.val.as_ref()));
    let url = vevent.find_prop("URL").map(|p| p.val.to_string());
    let description = vevent
        .find_prop("DESCRIPTION")
        .map(|p| unescape_ics_value(p.val.as_ref()));

    Ok(ParsedEvent {
        uid,
        summary,
        start,
        rrule,
        status,
        transparency,
        url,
        description,
    })
}

/// Calendar date of a DTSTART, whatever its value type
fn to_date(dpt: DatePerhapsTime) -> NaiveDate {
    match dpt {
        DatePerhapsTime::Date(d) => d,
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Utc(dt) => dt.date_naive(),
            CalendarDateTime::Floating(naive) => naive.date(),
            CalendarDateTime::WithTimezone { date_time, .. } => date_time.date(),
        },
    }
}

/// Unescape ICS property values per RFC 5545
/// Reverses: \, → , and \; → ; and \\ → \ and \n → newline
fn unescape_ics_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.peek() {
            Some(&(next @ (',' | ';' | '\\'))) => {
                result.push(next);
                chars.next();
            }
            Some('n') | Some('N') => {
                result.push('\n');
                chars.next();
            }
            _ => result.push(c),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::calendar::{BirthdayCalendar, CalendarMeta};
    use crate::character::{Character, CharacterDetail, CharacterId};
    use crate::event::{BirthdayEvent, EventTemplate};
    use crate::language::Language;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_generate_and_parse_roundtrip() {
        let meta = CalendarMeta {
            name: "Genshin Impact Birthday Calendar".to_string(),
            description: "Birthdays".to_string(),
            timezone: chrono_tz::Asia::Shanghai,
            refresh_interval: Duration::from_secs(3600),
            language: Language::En,
        };
        let mut cal = BirthdayCalendar::new(meta, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let template = EventTemplate::new(Language::En);

        let records = [
            (1, "Amber", date(2025, 8, 10), None),
            (2, "Kaeya", date(2024, 2, 29), Some("Cavalry Captain\nof the Knights")),
            (3, "Lisa", date(2025, 6, 9), Some("Librarian; witch, and more")),
        ];
        for (id, name, start, text) in records {
            let character = Character {
                id: CharacterId::from(id),
                name: name.to_string(),
                birthday: None,
                beta: false,
            };
            let detail = CharacterDetail {
                flavor_text: text.map(str::to_string),
            };
            cal.push(BirthdayEvent::build(&character, start, Some(&detail), &template));
        }

        let parsed = parse_calendar(&cal.to_ics()).unwrap();

        assert_eq!(parsed.name.as_deref(), Some("Genshin Impact Birthday Calendar"));
        assert_eq!(parsed.timezone.as_deref(), Some("Asia/Shanghai"));
        assert_eq!(parsed.events.len(), cal.len());

        for (parsed, original) in parsed.events.iter().zip(cal.events()) {
            assert_eq!(parsed.summary, original.summary);
            assert_eq!(parsed.start, original.start);
            assert_eq!(parsed.uid.as_deref(), Some(original.uid.as_str()));
            assert_eq!(parsed.rrule.as_deref(), Some("FREQ=YEARLY"));
            assert_eq!(parsed.status, Some(EventStatus::Confirmed));
            assert_eq!(parsed.transparency, Some(Transparency::Transparent));
            assert_eq!(parsed.description, original.description);
        }
    }

    #[test]
    fn test_parse_handwritten_calendar() {
        let ics = "BEGIN:VCALENDAR\r\n\
                   VERSION:2.0\r\n\
                   PRODID:-//test//EN\r\n\
                   BEGIN:VEVENT\r\n\
                   UID:a@test\r\n\
                   SUMMARY:Diluc's birthday\r\n\
                   DTSTART;VALUE=DATE:20240430\r\n\
                   RRULE:FREQ=YEARLY\r\n\
                   END:VEVENT\r\n\
                   BEGIN:VEVENT\r\n\
                   UID:b@test\r\n\
                   SUMMARY:Meeting\r\n\
                   DTSTART:20240501T100000Z\r\n\
                   STATUS:TENTATIVE\r\n\
                   TRANSP:OPAQUE\r\n\
                   END:VEVENT\r\n\
                   END:VCALENDAR\r\n";

        let parsed = parse_calendar(ics).unwrap();
        assert_eq!(parsed.name, None);
        assert_eq!(parsed.events.len(), 2);
        assert_eq!(parsed.events[0].start, date(2024, 4, 30));
        assert_eq!(parsed.events[1].start, date(2024, 5, 1));
        assert_eq!(parsed.events[1].rrule, None);
        assert_eq!(parsed.events[0].status, None);
        assert_eq!(parsed.events[0].transparency, None);
        assert_eq!(parsed.events[1].status, Some(EventStatus::Tentative));
        assert_eq!(parsed.events[1].transparency, Some(Transparency::Opaque));
    }

    #[test]
    fn test_event_without_dtstart_is_an_error() {
        let ics = "BEGIN:VCALENDAR\r\n\
                   VERSION:2.0\r\n\
                   BEGIN:VEVENT\r\n\
                   UID:a@test\r\n\
                   SUMMARY:Nobody\r\n\
                   END:VEVENT\r\n\
                   END:VCALENDAR\r\n";

        let err = parse_calendar(ics).unwrap_err();
        assert!(err.to_string().contains("no DTSTART"), "{}", err);
    }

    #[test]
    fn test_unescape_ics_value() {
        assert_eq!(unescape_ics_value("a\\nb"), "a\nb");
        assert_eq!(unescape_ics_value("a\\, b\\; c\\\\"), "a, b; c\\");
        assert_eq!(unescape_ics_value("trailing\\"), "trailing\\");
    }
}
