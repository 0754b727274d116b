//! The birthday calendar build: list, filter, resolve, build, accumulate.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use thiserror::Error;

use crate::calendar::{BirthdayCalendar, CalendarMeta};
use crate::character::{Character, CharacterId};
use crate::date::{DateResolveError, resolve_birthday};
use crate::error::BirthcalResult;
use crate::event::{BirthdayEvent, EventTemplate};
use crate::source::CharacterSource;

/// Everything the build needs besides the source and the clock.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub meta: CalendarMeta,
    pub template: EventTemplate,
    /// Records with these names are never emitted
    pub excluded_names: Vec<String>,
    pub include_beta: bool,
}

/// Per-record progress, reported as the build goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Added {
        name: String,
        start: NaiveDate,
        has_description: bool,
    },
    Skipped(Skipped),
}

/// A record that made it past filtering but produced no event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub id: CharacterId,
    pub name: String,
    pub reason: SkipReason,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("no birthday listed")]
    NoBirthday,

    #[error(transparent)]
    InvalidDate(#[from] DateResolveError),
}

#[derive(Debug)]
pub struct BuildOutcome {
    pub calendar: BirthdayCalendar,
    /// Placeholder and beta records that were filtered out
    pub excluded: usize,
    pub skipped: Vec<Skipped>,
}

/// The year birthdays are anchored in: the current year in `timezone`.
pub fn reference_year(now: DateTime<Utc>, timezone: Tz) -> i32 {
    now.with_timezone(&timezone).year()
}

/// Build the calendar from `source`.
///
/// Fails only if the character list can't be fetched. A failed detail lookup
/// leaves the event without description; a birthday that can't be placed in
/// the fallback window skips the record.
pub async fn build_calendar<S: CharacterSource>(
    source: &S,
    settings: &BuildSettings,
    now: DateTime<Utc>,
    mut on_progress: impl FnMut(&Progress),
) -> BirthcalResult<BuildOutcome> {
    let characters = source.characters().await?;
    let year = reference_year(now, settings.meta.timezone);

    let total = characters.len();
    let characters: Vec<Character> = characters
        .into_iter()
        .filter(|c| !c.is_placeholder(&settings.excluded_names, settings.include_beta))
        .collect();
    let excluded = total - characters.len();

    tracing::debug!(total, excluded, year, "building birthday calendar");

    let mut calendar = BirthdayCalendar::new(settings.meta.clone(), now);
    let mut skipped = Vec::new();

    for character in &characters {
        let start = match character.birthday {
            Some((month, day)) => resolve_birthday(month, day, year).map_err(SkipReason::from),
            None => Err(SkipReason::NoBirthday),
        };

        let start = match start {
            Ok(start) => start,
            Err(reason) => {
                tracing::warn!(id = %character.id, name = %character.name, %reason, "skipping");
                let skip = Skipped {
                    id: character.id.clone(),
                    name: character.name.clone(),
                    reason,
                };
                on_progress(&Progress::Skipped(skip.clone()));
                skipped.push(skip);
                continue;
            }
        };

        let detail = match source.detail(&character.id).await {
            Ok(detail) => Some(detail),
            Err(e) => {
                tracing::warn!(id = %character.id, error = %e, "no detail, building without description");
                None
            }
        };

        let event = BirthdayEvent::build(character, start, detail.as_ref(), &settings.template);
        on_progress(&Progress::Added {
            name: character.name.clone(),
            start,
            has_description: event.description.is_some(),
        });
        calendar.push(event);
    }

    Ok(BuildOutcome {
        calendar,
        excluded,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use chrono::TimeZone;
    use url::Url;

    use crate::character::CharacterDetail;
    use crate::error::BirthcalError;
    use crate::event::{EventStatus, Transparency};
    use crate::fetch::FetchError;
    use crate::language::Language;

    /// In-memory source; ids missing from `details` fail their lookup.
    struct FakeSource {
        characters: Option<Vec<Character>>,
        details: HashMap<String, String>,
    }

    impl CharacterSource for FakeSource {
        async fn characters(&self) -> BirthcalResult<Vec<Character>> {
            self.characters.clone().ok_or_else(|| {
                BirthcalError::Fetch(FetchError::Status {
                    url: Url::parse("http://fake/avatar").unwrap(),
                    status: reqwest::StatusCode::NOT_FOUND,
                })
            })
        }

        async fn detail(&self, id: &CharacterId) -> BirthcalResult<CharacterDetail> {
            match self.details.get(&id.0) {
                Some(text) => Ok(CharacterDetail {
                    flavor_text: Some(text.clone()),
                }),
                None => Err(BirthcalError::Fetch(FetchError::Status {
                    url: Url::parse("http://fake/avatarFetter").unwrap(),
                    status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                })),
            }
        }
    }

    fn character(id: u64, name: &str, birthday: Option<(u32, u32)>, beta: bool) -> Character {
        Character {
            id: CharacterId::from(id),
            name: name.to_string(),
            birthday,
            beta,
        }
    }

    fn settings() -> BuildSettings {
        let language = Language::En;
        BuildSettings {
            meta: CalendarMeta {
                name: language.calendar_name().to_string(),
                description: language.calendar_description().to_string(),
                timezone: chrono_tz::Asia::Shanghai,
                refresh_interval: Duration::from_secs(3600),
                language,
            },
            template: EventTemplate {
                language,
                wiki_url: None,
            },
            excluded_names: vec![language.traveler_name().to_string()],
            include_beta: false,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_amber_scenario() {
        let source = FakeSource {
            characters: Some(vec![character(1, "Amber", Some((6, 21)), false)]),
            details: HashMap::new(),
        };
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let outcome = build_calendar(&source, &settings(), now, |_| {}).await.unwrap();
        let events = outcome.calendar.events();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start, date(2024, 6, 21));
        assert_eq!(events[0].summary, "Amber's birthday");
        assert_eq!(events[0].rrule, "FREQ=YEARLY");
        assert_eq!(events[0].duration, chrono::Duration::days(1));
        assert_eq!(events[0].status, EventStatus::Confirmed);
        assert_eq!(events[0].transparency, Transparency::Transparent);
        // Detail lookup failed, the event is still built.
        assert_eq!(events[0].description, None);
    }

    #[tokio::test]
    async fn test_kaeya_leap_day_scenario() {
        let source = FakeSource {
            characters: Some(vec![character(2, "Kaeya", Some((2, 29)), false)]),
            details: HashMap::new(),
        };
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

        let outcome = build_calendar(&source, &settings(), now, |_| {}).await.unwrap();
        assert_eq!(outcome.calendar.events()[0].start, date(2024, 2, 29));
    }

    #[tokio::test]
    async fn test_reference_year_follows_calendar_timezone() {
        let source = FakeSource {
            characters: Some(vec![character(1, "Amber", Some((6, 21)), false)]),
            details: HashMap::new(),
        };
        // Still 2024 in UTC, already 2025 in Shanghai.
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 20, 0, 0).unwrap();

        let outcome = build_calendar(&source, &settings(), now, |_| {}).await.unwrap();
        assert_eq!(outcome.calendar.events()[0].start, date(2025, 6, 21));
    }

    #[tokio::test]
    async fn test_filters_skips_and_keeps_order() {
        let source = FakeSource {
            characters: Some(vec![
                character(3, "Lisa", Some((6, 9)), false),
                character(4, "Traveler", Some((1, 1)), false),
                character(5, "Unreleased", Some((5, 5)), true),
                character(6, "Mystery", None, false),
                character(7, "Glitch", Some((4, 31)), false),
                character(1, "Amber", Some((8, 10)), false),
            ]),
            details: HashMap::from([("3".to_string(), "Librarian".to_string())]),
        };
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let mut progress = Vec::new();
        let outcome = build_calendar(&source, &settings(), now, |p| progress.push(p.clone()))
            .await
            .unwrap();

        let summaries: Vec<_> = outcome
            .calendar
            .events()
            .iter()
            .map(|e| e.summary.as_str())
            .collect();
        assert_eq!(summaries, ["Lisa's birthday", "Amber's birthday"]);
        assert_eq!(
            outcome.calendar.events()[0].description.as_deref(),
            Some("Librarian")
        );

        assert_eq!(outcome.excluded, 2);
        let skipped: Vec<_> = outcome
            .skipped
            .iter()
            .map(|s| (s.name.as_str(), s.reason.clone()))
            .collect();
        assert_eq!(
            skipped,
            [
                ("Mystery", SkipReason::NoBirthday),
                (
                    "Glitch",
                    SkipReason::InvalidDate(DateResolveError::NoValidYear {
                        month: 4,
                        day: 31,
                        reference_year: 2024,
                    })
                ),
            ]
        );

        assert_eq!(progress.len(), 4);
        assert_eq!(
            progress[0],
            Progress::Added {
                name: "Lisa".to_string(),
                start: date(2024, 6, 9),
                has_description: true,
            }
        );
        assert!(matches!(progress[1], Progress::Skipped(_)));
    }

    #[tokio::test]
    async fn test_include_beta() {
        let source = FakeSource {
            characters: Some(vec![character(5, "Unreleased", Some((5, 5)), true)]),
            details: HashMap::new(),
        };
        let mut settings = settings();
        settings.include_beta = true;
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let outcome = build_calendar(&source, &settings, now, |_| {}).await.unwrap();
        assert_eq!(outcome.calendar.len(), 1);
    }

    #[tokio::test]
    async fn test_list_failure_aborts() {
        let source = FakeSource {
            characters: None,
            details: HashMap::new(),
        };
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let err = build_calendar(&source, &settings(), now, |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, BirthcalError::Fetch(_)));
    }
}
