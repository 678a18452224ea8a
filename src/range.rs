//! Walks a date range, fetching and parsing one day at a time.

use std::fmt;

use chrono::NaiveDate;
use indicatif::ProgressBar;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    deserialise::{deserialise, ExtractError, PageHarvest},
    download::{Fetch, FetchError},
    reading::{Normalizer, WeatherObservation},
};

#[derive(Debug, Error)]
pub enum DateRangeError {
    #[error("End date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("No data for requested range {0}")]
    NoData(DateRange),

    #[error("Every request for {0} failed")]
    AllFetchesFailed(DateRange),
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// `end` defaults to `start`.
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Result<Self, DateRangeError> {
        let end = end.unwrap_or(start);
        if end < start {
            return Err(DateRangeError::EndBeforeStart { start, end });
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    pub fn days(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |date| *date <= end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_day() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{} to {}", self.start, self.end)
        }
    }
}

#[derive(Debug, Error)]
pub enum SkipReason {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// What happened for one date of the range.
#[derive(Debug)]
pub enum DateOutcome {
    Fetched { date: NaiveDate, records: usize },
    Skipped { date: NaiveDate, reason: SkipReason },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub date: NaiveDate,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.date, self.message)
    }
}

/// Everything collected over a range, in ascending date order.
#[derive(Debug)]
pub struct Harvest {
    pub range: DateRange,
    pub records: Vec<WeatherObservation>,
    pub outcomes: Vec<DateOutcome>,
    pub warnings: Vec<Warning>,
}

impl Harvest {
    pub fn skipped(&self) -> impl Iterator<Item = (&NaiveDate, &SkipReason)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            DateOutcome::Skipped { date, reason } => Some((date, reason)),
            DateOutcome::Fetched { .. } => None,
        })
    }

    /// Records of a usable harvest, or why there are none.
    pub fn into_records(self) -> Result<Vec<WeatherObservation>, SummaryError> {
        let all_fetches_failed = !self.outcomes.is_empty()
            && self.outcomes.iter().all(|outcome| {
                matches!(
                    outcome,
                    DateOutcome::Skipped {
                        reason: SkipReason::Fetch(_),
                        ..
                    }
                )
            });

        if all_fetches_failed {
            return Err(SummaryError::AllFetchesFailed(self.range));
        }
        if self.records.is_empty() {
            return Err(SummaryError::NoData(self.range));
        }

        Ok(self.records)
    }
}

/// Fetches and parses every date of `range` in order.
///
/// A failure for one date is recorded and the walk continues.
pub async fn harvest<F: Fetch>(
    fetcher: &F,
    range: &DateRange,
    normalizer: &Normalizer,
    progress: &ProgressBar,
) -> Harvest {
    let mut harvest = Harvest {
        range: *range,
        records: Vec::new(),
        outcomes: Vec::new(),
        warnings: Vec::new(),
    };

    for date in range.iter() {
        progress.set_message(format!("Fetching {}", date));

        let outcome = match harvest_date(fetcher, date, normalizer).await {
            Ok(page) => {
                info!("{}: {} observations", date, page.records.len());
                harvest.warnings.extend(
                    page.warnings
                        .into_iter()
                        .map(|message| Warning { date, message }),
                );
                let records = page.records.len();
                harvest.records.extend(page.records);
                DateOutcome::Fetched { date, records }
            }
            Err(reason) => {
                warn!("{}: skipped, {}", date, reason);
                harvest.warnings.push(Warning {
                    date,
                    message: format!("skipped: {}", reason),
                });
                DateOutcome::Skipped { date, reason }
            }
        };

        harvest.outcomes.push(outcome);
        progress.inc(1);
    }

    harvest
}

async fn harvest_date<F: Fetch>(
    fetcher: &F,
    date: NaiveDate,
    normalizer: &Normalizer,
) -> Result<PageHarvest, SkipReason> {
    let html = fetcher.fetch_summary(date).await?;
    Ok(deserialise(&html, date, normalizer)?)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use std::{cell::Cell, collections::HashMap};

    use reqwest::StatusCode;

    use super::*;

    /// Serves fixture pages by date or station; anything else fails like a 404.
    #[derive(Default)]
    pub(crate) struct FixtureFetcher {
        pages: HashMap<NaiveDate, &'static str>,
        stations: HashMap<&'static str, &'static str>,
        calls: Cell<usize>,
    }

    impl FixtureFetcher {
        pub(crate) fn with(mut self, date: NaiveDate, html: &'static str) -> Self {
            self.pages.insert(date, html);
            self
        }

        pub(crate) fn with_station(mut self, station_id: &'static str, html: &'static str) -> Self {
            self.stations.insert(station_id, html);
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.get()
        }
    }

    impl Fetch for FixtureFetcher {
        async fn fetch_summary(&self, date: NaiveDate) -> Result<String, FetchError> {
            self.calls.set(self.calls.get() + 1);
            self.pages
                .get(&date)
                .map(|html| html.to_string())
                .ok_or_else(|| FetchError::Status {
                    url: format!("fixture://{}", date),
                    status: StatusCode::NOT_FOUND,
                })
        }

        async fn fetch_station(&self, station_id: &str) -> Result<String, FetchError> {
            self.calls.set(self.calls.get() + 1);
            self.stations
                .get(station_id)
                .map(|html| html.to_string())
                .ok_or_else(|| FetchError::Status {
                    url: format!("fixture://station/{}", station_id),
                    status: StatusCode::NOT_FOUND,
                })
        }
    }

    pub(crate) fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn should_default_end_to_start() {
        let implicit = DateRange::new(ymd(2024, 3, 20), None).unwrap();
        let explicit = DateRange::new(ymd(2024, 3, 20), Some(ymd(2024, 3, 20))).unwrap();

        assert_eq!(implicit, explicit);
        assert_eq!(implicit.iter().collect::<Vec<_>>(), vec![ymd(2024, 3, 20)]);
        assert!(implicit.is_single_day());
    }

    #[test]
    fn should_reject_end_before_start() {
        let result = DateRange::new(ymd(2024, 3, 2), Some(ymd(2024, 3, 1)));
        assert!(matches!(result, Err(DateRangeError::EndBeforeStart { .. })));
    }

    #[test]
    fn should_iterate_inclusive_range_across_month_end() {
        let range = DateRange::new(ymd(2024, 2, 28), Some(ymd(2024, 3, 1))).unwrap();

        assert_eq!(range.days(), 3);
        assert_eq!(
            range.iter().collect::<Vec<_>>(),
            vec![ymd(2024, 2, 28), ymd(2024, 2, 29), ymd(2024, 3, 1)]
        );
    }

    #[tokio::test]
    async fn should_skip_gaps_and_keep_going() {
        let fetcher = FixtureFetcher::default()
            .with(ymd(2024, 3, 1), include_str!("../fixtures/summary_2024-03-01.html"))
            .with(ymd(2024, 3, 2), include_str!("../fixtures/no_table.html"))
            .with(ymd(2024, 3, 3), include_str!("../fixtures/summary_2024-03-03.html"));
        let range = DateRange::new(ymd(2024, 3, 1), Some(ymd(2024, 3, 3))).unwrap();

        let harvest = harvest(&fetcher, &range, &Normalizer::default(), &ProgressBar::hidden()).await;

        assert_eq!(fetcher.calls(), 3);
        assert_eq!(harvest.outcomes.len(), 3);

        let skipped: Vec<_> = harvest.skipped().collect();
        assert_eq!(skipped.len(), 1);
        assert_eq!(*skipped[0].0, ymd(2024, 3, 2));
        assert!(matches!(skipped[0].1, SkipReason::Extract(ExtractError::NoTable)));

        let dates: Vec<NaiveDate> = harvest.records.iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![ymd(2024, 3, 1), ymd(2024, 3, 1), ymd(2024, 3, 3), ymd(2024, 3, 3)]
        );
        assert!(harvest
            .warnings
            .iter()
            .any(|w| w.date == ymd(2024, 3, 2) && w.message.contains("no summary table")));
    }

    #[tokio::test]
    async fn should_report_all_fetches_failed() {
        let fetcher = FixtureFetcher::default();
        let range = DateRange::new(ymd(2024, 3, 1), Some(ymd(2024, 3, 2))).unwrap();

        let harvest = harvest(&fetcher, &range, &Normalizer::default(), &ProgressBar::hidden()).await;

        assert!(matches!(
            harvest.into_records(),
            Err(SummaryError::AllFetchesFailed(_))
        ));
    }

    #[tokio::test]
    async fn should_keep_records_when_some_fetches_fail() {
        let fetcher = FixtureFetcher::default()
            .with(ymd(2024, 3, 3), include_str!("../fixtures/summary_2024-03-03.html"));
        let range = DateRange::new(ymd(2024, 3, 2), Some(ymd(2024, 3, 3))).unwrap();

        let harvest = harvest(&fetcher, &range, &Normalizer::default(), &ProgressBar::hidden()).await;

        let skipped: Vec<_> = harvest.skipped().collect();
        assert_eq!(skipped.len(), 1);
        assert!(matches!(skipped[0].1, SkipReason::Fetch(FetchError::Status { .. })));

        let records = harvest.into_records().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.date == ymd(2024, 3, 3)));
    }

    #[tokio::test]
    async fn should_report_no_data_for_range() {
        let fetcher =
            FixtureFetcher::default().with(ymd(2024, 3, 2), include_str!("../fixtures/no_table.html"));
        let range = DateRange::new(ymd(2024, 3, 2), None).unwrap();

        let harvest = harvest(&fetcher, &range, &Normalizer::default(), &ProgressBar::hidden()).await;

        assert!(matches!(harvest.into_records(), Err(SummaryError::NoData(_))));
    }
}
