//! Deserialises an OGIMET daily summary page into observations.

use std::sync::LazyLock;

use chrono::NaiveDate;
use scraper::{element_ref::Select, ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, warn};

use crate::reading::{
    resolve_headers, ColumnLayout, LayoutError, Normalizer, RowOutcome, WeatherObservation,
};

static SUMMARY_TABLE: LazyLock<Selector> = LazyLock::new(|| selector(r##"table[bgcolor="#d0d0d0"][cellspacing="1"]"##));
static ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static HEADER_CELL: LazyLock<Selector> = LazyLock::new(|| selector("th"));
static DATA_CELL: LazyLock<Selector> = LazyLock::new(|| selector("td"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The page has no summary for this date.
    #[error("no summary table in page")]
    NoTable,

    #[error("summary table has an unusable layout")]
    Layout(#[from] LayoutError),
}

/// A parsed document, kept alive while its table rows are read.
pub struct SummaryPage {
    document: Html,
}

impl SummaryPage {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Locates the summary table and resolves its column layout.
    pub fn table(&self) -> Result<SummaryTable<'_>, ExtractError> {
        let table = self
            .document
            .select(&SUMMARY_TABLE)
            .next()
            .ok_or(ExtractError::NoTable)?;

        let header_rows: Vec<Vec<String>> = table
            .select(&ROW)
            .filter(|row| row.select(&DATA_CELL).next().is_none())
            .map(|row| row.select(&HEADER_CELL).map(header_text).collect())
            .collect();

        let title_index = header_rows
            .iter()
            .position(|cells| cells.iter().any(|c| c.eq_ignore_ascii_case("station")))
            .ok_or(ExtractError::NoTable)?;
        let titles = &header_rows[title_index];
        let subtitles = header_rows
            .get(title_index + 1)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let layout = ColumnLayout::new(resolve_headers(titles, subtitles))?;
        if layout.mapped() < 2 {
            return Err(ExtractError::NoTable);
        }
        debug!("Summary table has {} columns", layout.width());

        Ok(SummaryTable {
            layout,
            rows: table.select(&ROW),
        })
    }
}

/// Data rows of the summary table, header and region separator rows skipped.
///
/// Each item is the row's cell text in column order.
pub struct SummaryTable<'a> {
    layout: ColumnLayout,
    rows: Select<'a, 'static>,
}

impl SummaryTable<'_> {
    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }
}

impl Iterator for SummaryTable<'_> {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        for row in self.rows.by_ref() {
            let mut cells = row.select(&DATA_CELL).peekable();
            let Some(station) = cells.next() else {
                continue;
            };
            if cells.peek().is_none() && station.value().attr("colspan").is_some() {
                debug!("Skipping section row '{}'", cell_text(station));
                continue;
            }

            let mut values = vec![station_text(station)];
            values.extend(cells.map(cell_text));
            return Some(values);
        }

        None
    }
}

/// Header text with line breaks closed up: `Temperature<br>(C)` is `Temperature(C)`.
fn header_text(cell: ElementRef) -> String {
    cell.text().map(str::trim).collect()
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// The station anchor carries the full identity in its tooltip caption.
fn station_text(cell: ElementRef) -> String {
    let Some(anchor) = cell.select(&ANCHOR).next() else {
        return cell_text(cell);
    };

    anchor
        .value()
        .attr("onmouseover")
        .and_then(caption)
        .unwrap_or_else(|| cell_text(anchor))
}

fn caption(mouseover: &str) -> Option<String> {
    let (_, after) = mouseover.split_once("CAPTION,")?;
    after
        .split('\'')
        .nth(1)
        .map(|caption| caption.trim().to_string())
        .filter(|caption| !caption.is_empty())
}

/// Observations read from one page.
#[derive(Debug, Default)]
pub struct PageHarvest {
    pub records: Vec<WeatherObservation>,
    /// Dropped rows and unreadable fields.
    pub warnings: Vec<String>,
}

/// Extracts and parses every data row of a summary page for `date`.
pub fn deserialise(
    html: &str,
    date: NaiveDate,
    normalizer: &Normalizer,
) -> Result<PageHarvest, ExtractError> {
    let page = SummaryPage::parse(html);
    let table = page.table()?;
    let layout = table.layout().clone();
    let mut harvest = PageHarvest::default();

    for cells in table {
        match layout.parse_row(date, &cells, normalizer) {
            RowOutcome::Parsed(parsed) => {
                for warning in parsed.warnings {
                    let message = format!("station {}: {}", parsed.observation.station_id, warning);
                    warn!("{}: {}", date, message);
                    harvest.warnings.push(message);
                }
                harvest.records.push(parsed.observation);
            }
            RowOutcome::NotData => {}
            RowOutcome::Dropped(error) => {
                let label = cells.first().map(String::as_str).unwrap_or_default();
                let message = format!("dropped row '{}': {}", label, error);
                warn!("{}: {}", date, message);
                harvest.warnings.push(message);
            }
        }
    }

    Ok(harvest)
}

// -- Tests -------------------------------------------------------------------
