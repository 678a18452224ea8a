use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::{
    cli::create_progress_bar,
    config::Config,
    download::{Fetch, OgimetClient},
    export::{self, OutputFormat},
    range::{harvest, DateOutcome, DateRange, Harvest},
    reading::Normalizer,
};

use super::make_output_file_name;

pub async fn summary(
    from: NaiveDate,
    to: Option<NaiveDate>,
    format: OutputFormat,
    output_dir: Option<PathBuf>,
    config: &Config,
) -> Result<String> {
    let client = OgimetClient::new(config)?;
    let normalizer = Normalizer::from_config(config);
    let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());

    let file_path = run_summary(&client, from, to, &normalizer, format, &output_dir).await?;

    Ok(file_path.to_string_lossy().to_string())
}

/// Validates the range, harvests every date and exports the records.
pub async fn run_summary<F: Fetch>(
    fetcher: &F,
    from: NaiveDate,
    to: Option<NaiveDate>,
    normalizer: &Normalizer,
    format: OutputFormat,
    output_dir: &Path,
) -> Result<PathBuf> {
    let range = DateRange::new(from, to)?;
    info!("Fetching weather data for {}", range);

    let pb = create_progress_bar(range.days(), "Fetching weather data".to_string());
    let harvest = harvest(fetcher, &range, normalizer, &pb).await;
    pb.finish_with_message("Weather data fetched");

    report_warnings(&harvest);
    let records = harvest.into_records()?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory '{}'", output_dir.display()))?;
    let file_path = make_output_file_name(&range, format, output_dir);
    export::save(&records, &file_path, format)?;

    info!("{} observations written to {}", records.len(), file_path.display());

    Ok(file_path)
}

fn report_warnings(harvest: &Harvest) {
    let fetched = harvest
        .outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            DateOutcome::Fetched { date, records } => Some((date, records)),
            DateOutcome::Skipped { .. } => None,
        });
    for (date, records) in fetched {
        debug!("{}: {} records", date, records);
    }

    if harvest.warnings.is_empty() {
        return;
    }

    let skipped: Vec<String> = harvest.skipped().map(|(date, _)| date.to_string()).collect();
    warn!(
        "Finished with {} warnings, {} of {} dates skipped",
        harvest.warnings.len(),
        skipped.len(),
        harvest.range.days()
    );
    if !skipped.is_empty() {
        warn!("Skipped dates: {}", skipped.join(", "));
    }
}

// -- Tests -------------------------------------------------------------------
