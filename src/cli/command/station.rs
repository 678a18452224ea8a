//! Look up the details page of one station.

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::{
    cli::create_spinner,
    config::Config,
    download::{Fetch, OgimetClient},
    reading::StationDetails,
};

pub async fn station(station_id: &str, config: &Config) -> Result<StationDetails> {
    let client = OgimetClient::new(config)?;

    fetch_station_details(&client, station_id).await
}

pub async fn fetch_station_details<F: Fetch>(
    fetcher: &F,
    station_id: &str,
) -> Result<StationDetails> {
    if station_id.len() != 5 || !station_id.chars().all(|c| c.is_ascii_digit()) {
        bail!("Station id must be a five digit WMO index, got '{}'", station_id);
    }

    let spinner = create_spinner(format!("Fetching station {}", station_id));
    let html = fetcher.fetch_station(station_id).await;
    spinner.finish_and_clear();

    let details = StationDetails::from_html(&html?)
        .with_context(|| format!("Failed to read details of station {}", station_id))?;
    info!("Found station {}", details);

    Ok(details)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use crate::{range::tests::FixtureFetcher, reading::error::StationError};

    use super::*;

    const JAKARTA: &str = include_str!("../../../fixtures/station_96749.html");

    #[tokio::test]
    async fn should_fetch_station_details() {
        let fetcher = FixtureFetcher::default().with_station("96749", JAKARTA);

        let details = fetch_station_details(&fetcher, "96749").await.unwrap();

        assert_eq!(details.station_id, "96749");
        assert_eq!(details.name, "Jakarta / Soekarno-Hatta");
        assert_eq!(details.altitude, 8.0);
    }

    #[tokio::test]
    async fn should_reject_malformed_station_id() {
        let fetcher = FixtureFetcher::default();

        assert!(fetch_station_details(&fetcher, "9674").await.is_err());
        assert!(fetch_station_details(&fetcher, "jakarta").await.is_err());
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn should_report_page_without_details() {
        let fetcher = FixtureFetcher::default()
            .with_station("97014", include_str!("../../../fixtures/no_table.html"));

        let error = fetch_station_details(&fetcher, "97014").await.unwrap_err();

        assert!(matches!(
            error.downcast_ref::<StationError>(),
            Some(StationError::NoTable)
        ));
    }
}
