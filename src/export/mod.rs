//! Writes observations to disk as a spreadsheet or a parquet file.

pub mod parquet_file;
pub mod xlsx;

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use thiserror::Error;

use crate::reading::{Precipitation, WeatherObservation};

pub use parquet_file::save_parquet;
pub use xlsx::save_xlsx;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write spreadsheet '{}'", .0.display())]
    Xlsx(PathBuf, #[source] rust_xlsxwriter::XlsxError),

    #[error("Failed to create '{}'", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to build record batch for '{}'", .0.display())]
    Arrow(PathBuf, #[source] arrow::error::ArrowError),

    #[error("Failed to write parquet file '{}'", .0.display())]
    Parquet(PathBuf, #[source] ::parquet::errors::ParquetError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Xlsx,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Parquet => "parquet",
        }
    }
}

/// Column labels, in output order.
pub const COLUMNS: [&str; 19] = [
    "date",
    "station_id",
    "station_name",
    "temperature_max",
    "temperature_min",
    "temperature_mean",
    "dew_point",
    "humidity",
    "wind_direction",
    "wind_speed",
    "wind_gust",
    "pressure",
    "precipitation",
    "cloud_cover",
    "low_cloud",
    "sun_duration",
    "visibility",
    "snow_depth",
    "weather_summary",
];

/// Text written for a trace amount of precipitation.
pub const TRACE_MARKER: &str = "TRACE";

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl From<Option<f64>> for CellValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(CellValue::Empty, CellValue::Number)
    }
}

/// One observation as spreadsheet cells, matching [`COLUMNS`].
pub fn row_values(observation: &WeatherObservation) -> [CellValue; 19] {
    let o = observation;

    [
        CellValue::Text(o.date.format("%Y-%m-%d").to_string()),
        CellValue::Text(o.station_id.clone()),
        CellValue::Text(o.station_name.clone()),
        o.temperature_max.into(),
        o.temperature_min.into(),
        o.temperature_mean.into(),
        o.dew_point.into(),
        o.humidity.into(),
        o.wind_direction
            .map_or(CellValue::Empty, |d| CellValue::Text(d.to_string())),
        o.wind_speed.into(),
        o.wind_gust.into(),
        o.pressure.into(),
        match o.precipitation {
            Some(Precipitation::Amount(mm)) => CellValue::Number(mm),
            Some(Precipitation::Trace) => CellValue::Text(TRACE_MARKER.to_string()),
            None => CellValue::Empty,
        },
        o.cloud_cover.into(),
        o.low_cloud.into(),
        o.sun_duration.into(),
        o.visibility.into(),
        o.snow_depth.into(),
        o.weather_summary
            .clone()
            .map_or(CellValue::Empty, CellValue::Text),
    ]
}

pub fn save(
    records: &[WeatherObservation],
    path: &Path,
    format: OutputFormat,
) -> Result<(), ExportError> {
    match format {
        OutputFormat::Xlsx => save_xlsx(records, path),
        OutputFormat::Parquet => save_parquet(records, path),
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveDate;

    use crate::reading::field::{CompassPoint, WindDirection};

    use super::*;

    pub(crate) fn observations_fixture() -> Vec<WeatherObservation> {
        let date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();

        let mut jakarta = WeatherObservation::new(date, "96749".to_string(), "Jakarta".to_string());
        jakarta.temperature_max = Some(30.5);
        jakarta.temperature_min = Some(24.0);
        jakarta.wind_direction = Some(WindDirection::Compass(CompassPoint::N));
        jakarta.wind_speed = Some(12.0);
        jakarta.precipitation = Some(Precipitation::Trace);

        let mut manado = WeatherObservation::new(date, "97014".to_string(), "Manado".to_string());
        manado.precipitation = Some(Precipitation::Amount(0.0));
        manado.weather_summary = Some("Clear".to_string());

        vec![jakarta, manado]
    }

    #[test]
    fn should_lay_out_cells_in_column_order() {
        let records = observations_fixture();
        let row = row_values(&records[0]);

        assert_eq!(row.len(), COLUMNS.len());
        assert_eq!(row[0], CellValue::Text("2024-03-20".to_string()));
        assert_eq!(row[1], CellValue::Text("96749".to_string()));
        assert_eq!(row[3], CellValue::Number(30.5));
        assert_eq!(row[4], CellValue::Number(24.0));
        assert_eq!(row[5], CellValue::Empty);
        assert_eq!(row[8], CellValue::Text("N".to_string()));
        assert_eq!(row[9], CellValue::Number(12.0));
    }

    #[test]
    fn should_keep_trace_distinct_from_zero() {
        let records = observations_fixture();
        let precipitation = COLUMNS.iter().position(|c| *c == "precipitation").unwrap();

        assert_eq!(
            row_values(&records[0])[precipitation],
            CellValue::Text(TRACE_MARKER.to_string())
        );
        assert_eq!(row_values(&records[1])[precipitation], CellValue::Number(0.0));
    }

    #[test]
    fn should_name_extensions() {
        assert_eq!(OutputFormat::Xlsx.extension(), "xlsx");
        assert_eq!(OutputFormat::Parquet.extension(), "parquet");
    }
}
