//! Birthday events.

use chrono::{Duration, NaiveDate};
use url::Url;

use crate::character::{Character, CharacterDetail};
use crate::language::Language;

/// Yearly, no interval, no end.
pub const YEARLY_RRULE: &str = "FREQ=YEARLY";

const UID_DOMAIN: &str = "birthcal";

/// Event status. Built birthdays are always confirmed; other values only
/// come from parsing a calendar file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

impl EventStatus {
    pub fn as_ics_str(&self) -> &'static str {
        match self {
            EventStatus::Confirmed => "CONFIRMED",
            EventStatus::Tentative => "TENTATIVE",
            EventStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_ics_str(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "CONFIRMED" => Some(EventStatus::Confirmed),
            "TENTATIVE" => Some(EventStatus::Tentative),
            "CANCELLED" => Some(EventStatus::Cancelled),
            _ => None,
        }
    }
}

/// Event transparency (busy/free status)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transparency {
    /// Event blocks time on calendar
    Opaque,
    /// Event does not block time (shows as free)
    Transparent,
}

impl Transparency {
    pub fn as_ics_str(&self) -> &'static str {
        match self {
            Transparency::Opaque => "OPAQUE",
            Transparency::Transparent => "TRANSPARENT",
        }
    }

    pub fn from_ics_str(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "OPAQUE" => Some(Transparency::Opaque),
            "TRANSPARENT" => Some(Transparency::Transparent),
            _ => None,
        }
    }
}

/// How events are worded and linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTemplate {
    pub language: Language,
    /// Reference link with a `{name}` placeholder
    pub wiki_url: Option<String>,
}

impl EventTemplate {
    pub fn new(language: Language) -> Self {
        EventTemplate {
            language,
            wiki_url: language.default_wiki_url().map(str::to_string),
        }
    }

    fn link_for(&self, name: &str) -> Option<Url> {
        let template = self.wiki_url.as_ref()?;
        let url = template.replace("{name}", &name.replace(' ', "_"));
        match Url::parse(&url) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(%url, error = %e, "invalid wiki link, omitting URL");
                None
            }
        }
    }
}

/// A yearly recurring, all-day birthday event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthdayEvent {
    pub uid: String,
    pub summary: String,
    pub start: NaiveDate,
    pub duration: Duration,
    pub rrule: String,
    pub status: EventStatus,
    pub transparency: Transparency,
    pub url: Option<Url>,
    pub description: Option<String>,
}

impl BirthdayEvent {
    /// Build the event for `character`, anchored on an already resolved `start`.
    ///
    /// The description is only set when the detail lookup produced text.
    pub fn build(
        character: &Character,
        start: NaiveDate,
        detail: Option<&CharacterDetail>,
        template: &EventTemplate,
    ) -> Self {
        BirthdayEvent {
            uid: format!("birthday-{}@{}", character.id, UID_DOMAIN),
            summary: template.language.summary(&character.name),
            start,
            duration: Duration::days(1),
            rrule: YEARLY_RRULE.to_string(),
            status: EventStatus::Confirmed,
            transparency: Transparency::Transparent,
            url: template.link_for(&character.name),
            description: detail.and_then(|d| d.flavor_text.clone()),
        }
    }

    /// Exclusive end date of the single-day occurrence.
    pub fn end(&self) -> NaiveDate {
        self.start + self.duration
    }
}
