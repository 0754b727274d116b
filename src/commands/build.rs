use std::path::Path;

use anyhow::{Context, Result};
use birthcal_core::config::{FileConfig, Overrides, Settings};
use birthcal_core::fetch::Fetcher;
use birthcal_core::pipeline::build_calendar;
use birthcal_core::source::YattaSource;
use chrono::Utc;
use owo_colors::OwoColorize;

use super::create_spinner;
use crate::render::Render;

pub async fn run(config: Option<&Path>, overrides: Overrides) -> Result<()> {
    let file = FileConfig::load(config)?;
    let settings = Settings::resolve(file, overrides)?;
    tracing::debug!(
        base_url = %settings.base_url,
        language = %settings.language(),
        output = %settings.output.display(),
        retry = ?settings.retry,
        "resolved settings"
    );

    let fetcher = Fetcher::build(settings.retry.clone(), settings.request_timeout)?;
    let source = YattaSource::new(fetcher, settings.base_url.clone(), settings.language())?;

    println!(
        "📅 {} {}",
        settings.build.meta.name,
        format!("({})", settings.language()).dimmed()
    );

    let spinner = create_spinner(format!("Fetching characters from {}", settings.base_url));
    let result = build_calendar(&source, &settings.build, Utc::now(), |progress| {
        spinner.suspend(|| println!("   {}", progress.render()));
    })
    .await;
    spinner.finish_and_clear();

    let outcome = result.context("Could not build the birthday calendar")?;

    outcome
        .calendar
        .write_to(&settings.output)
        .with_context(|| format!("Could not write {}", settings.output.display()))?;

    println!(
        "\nWrote {} events to {}",
        outcome.calendar.len().green(),
        settings.output.display()
    );

    if outcome.excluded > 0 || !outcome.skipped.is_empty() {
        println!(
            "{}",
            format!(
                "{} excluded, {} skipped",
                outcome.excluded,
                outcome.skipped.len()
            )
            .dimmed()
        );
    }

    Ok(())
}
