//! Fetches summary and station pages from OGIMET.

use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL},
    Client, StatusCode,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned {status}")]
    Status { url: String, status: StatusCode },

    #[error("Request to {url} timed out after {attempts} attempts")]
    Timeout { url: String, attempts: u32 },
}

/// Source of raw HTML pages.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    /// The daily summary table for every station on `date`.
    async fn fetch_summary(&self, date: NaiveDate) -> Result<String, FetchError>;

    /// The details page of one station.
    async fn fetch_station(&self, station_id: &str) -> Result<String, FetchError>;
}

pub struct OgimetClient {
    client: Client,
    base_url: String,
    state: String,
    hour: u32,
    retries: u32,
    retry_delay: Duration,
}

impl OgimetClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            state: config.state.clone(),
            hour: config.hour,
            retries: config.retries,
            retry_delay: Duration::from_secs(config.retry_delay_secs),
        })
    }

    pub fn summary_url(&self, date: NaiveDate) -> String {
        summary_url(&self.base_url, &self.state, self.hour, date)
    }

    pub fn station_url(&self, station_id: &str) -> String {
        format!("{}?lang=en&ind={}", self.base_url, station_id)
    }

    /// GETs `url`, retrying timeouts after a fixed delay.
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let attempts = self.retries + 1;

        for attempt in 1..=attempts {
            debug!("Fetching {} (attempt {}/{})", url, attempt, attempts);

            let response = match self.client.get(url).send().await {
                Ok(response) => response,
                Err(e) if e.is_timeout() && attempt < attempts => {
                    warn!("Request timed out, retrying in {:?}", self.retry_delay);
                    tokio::time::sleep(self.retry_delay).await;
                    continue;
                }
                Err(e) if e.is_timeout() => break,
                Err(source) => {
                    return Err(FetchError::Request {
                        url: url.to_string(),
                        source,
                    })
                }
            };

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                });
            }

            return response.text().await.map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            });
        }

        Err(FetchError::Timeout {
            url: url.to_string(),
            attempts,
        })
    }
}

impl Fetch for OgimetClient {
    async fn fetch_summary(&self, date: NaiveDate) -> Result<String, FetchError> {
        self.get_text(&self.summary_url(date)).await
    }

    async fn fetch_station(&self, station_id: &str) -> Result<String, FetchError> {
        self.get_text(&self.station_url(station_id)).await
    }
}

fn summary_url(base_url: &str, state: &str, hour: u32, date: NaiveDate) -> String {
    format!(
        "{}?lang=en&osum=no&state={}&fmt=html&ano={}&mes={:02}&day={:02}&hora={:02}&ord=REV",
        base_url,
        state,
        date.year(),
        date.month(),
        date.day(),
        hour
    )
}

// -- Tests -------------------------------------------------------------------
