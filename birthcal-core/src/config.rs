//! Run configuration.
//!
//! Values come from three layers: built-in defaults, an optional TOML file
//! (`~/.config/birthcal/config.toml` or an explicit path) and command-line
//! overrides. Later layers win.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;
use url::Url;

use crate::calendar::CalendarMeta;
use crate::error::{BirthcalError, BirthcalResult};
use crate::event::EventTemplate;
use crate::fetch::{Backoff, RetryPolicy};
use crate::language::Language;
use crate::pipeline::BuildSettings;
use crate::source::DEFAULT_BASE_URL;

pub const DEFAULT_OUTPUT: &str = "calendar.ics";
pub const DEFAULT_TIMEZONE: &str = "Asia/Shanghai";
const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(3600);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Contents of config.toml. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub language: Option<Language>,
    pub base_url: Option<String>,
    pub output: Option<PathBuf>,
    pub timezone: Option<String>,
    /// e.g. "1h"
    pub refresh_interval: Option<String>,
    pub calendar_name: Option<String>,
    pub calendar_description: Option<String>,
    /// Link template with `{name}`; an empty string disables links
    pub wiki_url: Option<String>,
    /// Names excluded in addition to the player avatar
    pub exclude: Vec<String>,
    pub include_beta: Option<bool>,
    /// e.g. "30s"
    pub request_timeout: Option<String>,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub max_attempts: Option<u32>,
    pub backoff: Option<BackoffKind>,
    /// Fixed delay, or the first delay for exponential backoff
    pub delay: Option<String>,
    /// Cap for exponential backoff
    pub max_delay: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    Fixed,
    Exponential,
}

/// Command-line overrides.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub language: Option<Language>,
    pub base_url: Option<String>,
    pub output: Option<PathBuf>,
    pub timezone: Option<String>,
    pub include_beta: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: Url,
    pub output: PathBuf,
    pub retry: RetryPolicy,
    pub request_timeout: Option<Duration>,
    pub build: BuildSettings,
}

impl FileConfig {
    /// ~/.config/birthcal/config.toml
    pub fn default_path() -> BirthcalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| BirthcalError::Config("Could not determine config directory".into()))?
            .join("birthcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load an explicitly given file (must exist), or the default file if present.
    pub fn load(explicit: Option<&Path>) -> BirthcalResult<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::default_path()?;
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            BirthcalError::Config(format!("Could not read {}: {e}", path.display()))
        })?;

        Self::parse(&content)
            .map_err(|e| BirthcalError::Config(format!("{}: {e}", path.display())))
    }

    pub fn parse(content: &str) -> BirthcalResult<Self> {
        toml::from_str(content).map_err(|e| BirthcalError::Config(e.to_string()))
    }
}

impl Settings {
    pub fn resolve(file: FileConfig, overrides: Overrides) -> BirthcalResult<Self> {
        let language = overrides.language.or(file.language).unwrap_or_default();

        let base_url = overrides
            .base_url
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base_url)
            .map_err(|e| BirthcalError::Config(format!("Invalid base URL '{base_url}': {e}")))?;

        let timezone = overrides
            .timezone
            .or(file.timezone)
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone: Tz = timezone
            .parse()
            .map_err(|_| BirthcalError::Config(format!("Unknown timezone '{timezone}'")))?;

        let refresh_interval = parse_duration_opt("refresh_interval", file.refresh_interval)?
            .unwrap_or(DEFAULT_REFRESH_INTERVAL);
        let request_timeout = parse_duration_opt("request_timeout", file.request_timeout)?;

        let wiki_url = match file.wiki_url {
            Some(url) if url.is_empty() => None,
            Some(url) => Some(url),
            None => language.default_wiki_url().map(str::to_string),
        };

        let mut excluded_names = vec![language.traveler_name().to_string()];
        excluded_names.extend(file.exclude);

        let meta = CalendarMeta {
            name: file
                .calendar_name
                .unwrap_or_else(|| language.calendar_name().to_string()),
            description: file
                .calendar_description
                .unwrap_or_else(|| language.calendar_description().to_string()),
            timezone,
            refresh_interval,
            language,
        };

        Ok(Settings {
            base_url,
            output: overrides
                .output
                .or(file.output)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            retry: file.retry.into_policy()?,
            request_timeout,
            build: BuildSettings {
                meta,
                template: EventTemplate { language, wiki_url },
                excluded_names,
                include_beta: overrides.include_beta || file.include_beta.unwrap_or(false),
            },
        })
    }

    pub fn language(&self) -> Language {
        self.build.meta.language
    }
}

impl RetryConfig {
    fn into_policy(self) -> BirthcalResult<RetryPolicy> {
        let default = RetryPolicy::default();

        let max_attempts = self.max_attempts.unwrap_or(default.max_attempts);
        if max_attempts == 0 {
            return Err(BirthcalError::Config(
                "retry.max_attempts must be at least 1".into(),
            ));
        }

        let delay = parse_duration_opt("retry.delay", self.delay)?;
        let backoff = match self.backoff.unwrap_or(BackoffKind::Fixed) {
            BackoffKind::Fixed => match delay {
                Some(delay) => Backoff::Fixed(delay),
                None => default.backoff,
            },
            BackoffKind::Exponential => {
                let initial = delay.unwrap_or(Duration::from_secs(1));
                let max = parse_duration_opt("retry.max_delay", self.max_delay)?
                    .unwrap_or(DEFAULT_MAX_DELAY);
                Backoff::Exponential { initial, max }
            }
        };

        Ok(RetryPolicy {
            max_attempts,
            backoff,
        })
    }
}

fn parse_duration_opt(field: &str, value: Option<String>) -> BirthcalResult<Option<Duration>> {
    value
        .map(|v| {
            humantime::parse_duration(&v)
                .map_err(|e| BirthcalError::Config(format!("Invalid {field} '{v}': {e}")))
        })
        .transpose()
}
