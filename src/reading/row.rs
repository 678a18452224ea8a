//! Maps table rows onto observations through an explicit column layout.

use std::fmt;

use chrono::NaiveDate;

use super::{
    error::{FieldError, LayoutError, RowError},
    field::{FieldKind, FieldValue, Normalizer},
    observation::{StationIdentity, WeatherObservation},
};

/// Observation field fed by a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Station,
    TemperatureMax,
    TemperatureMin,
    TemperatureMean,
    DewPoint,
    Humidity,
    /// Combined direction and speed.
    Wind,
    WindDirection,
    WindSpeed,
    WindGust,
    Pressure,
    Precipitation,
    CloudCover,
    LowCloud,
    SunDuration,
    Visibility,
    SnowDepth,
    WeatherSummary,
    /// Column with an unrecognised header, kept for alignment only.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub field: Field,
    pub kind: FieldKind,
}

impl Column {
    pub const fn new(field: Field, kind: FieldKind) -> Self {
        Self { field, kind }
    }
}

enum Header {
    Single(Column),
    /// Sub-columns keyed by subtitle, or one column when no subtitle matches.
    Grouped(&'static [(&'static str, Column)], Column),
}

const TEMPERATURE: &[(&str, Column)] = &[
    ("max", Column::new(Field::TemperatureMax, FieldKind::Numeric)),
    ("min", Column::new(Field::TemperatureMin, FieldKind::Numeric)),
    ("med", Column::new(Field::TemperatureMean, FieldKind::Numeric)),
];

const WIND: &[(&str, Column)] = &[
    ("dir.", Column::new(Field::WindDirection, FieldKind::WindDirection)),
    ("int.", Column::new(Field::WindSpeed, FieldKind::Numeric)),
    ("gust", Column::new(Field::WindGust, FieldKind::Numeric)),
];

// Keys are header text with whitespace removed, lowercased.
const HEADERS: &[(&str, Header)] = &[
    ("station", Header::Single(Column::new(Field::Station, FieldKind::Text))),
    (
        "temperature(c)",
        Header::Grouped(TEMPERATURE, Column::new(Field::Ignored, FieldKind::Text)),
    ),
    ("td.med(c)", Header::Single(Column::new(Field::DewPoint, FieldKind::Numeric))),
    ("hr.med(%)", Header::Single(Column::new(Field::Humidity, FieldKind::Numeric))),
    (
        "wind(km/h)",
        Header::Grouped(WIND, Column::new(Field::Wind, FieldKind::Wind)),
    ),
    ("pres.s.lev(hp)", Header::Single(Column::new(Field::Pressure, FieldKind::Numeric))),
    (
        "prec.(mm)",
        Header::Single(Column::new(Field::Precipitation, FieldKind::Precipitation)),
    ),
    ("totcloct", Header::Single(Column::new(Field::CloudCover, FieldKind::Numeric))),
    ("lowcloct", Header::Single(Column::new(Field::LowCloud, FieldKind::Numeric))),
    ("sund-1(h)", Header::Single(Column::new(Field::SunDuration, FieldKind::Numeric))),
    ("viskm", Header::Single(Column::new(Field::Visibility, FieldKind::Numeric))),
    ("snowdep.(cm)", Header::Single(Column::new(Field::SnowDepth, FieldKind::Numeric))),
    (
        "dailyweathersummary",
        Header::Single(Column::new(Field::WeatherSummary, FieldKind::Text)),
    ),
];

fn header_key(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Resolves the two header rows of the summary table into columns.
///
/// Unknown titles become a single [`Field::Ignored`] column.
pub fn resolve_headers(titles: &[String], subtitles: &[String]) -> Vec<Column> {
    let subtitles: Vec<String> = subtitles.iter().map(|s| header_key(s)).collect();
    let mut columns = Vec::new();

    for title in titles {
        let key = header_key(title);
        match HEADERS.iter().find(|(k, _)| *k == key).map(|(_, h)| h) {
            Some(Header::Single(column)) => columns.push(*column),
            Some(Header::Grouped(group, fallback)) => {
                let present: Vec<Column> = group
                    .iter()
                    .filter(|(sub, _)| subtitles.iter().any(|s| s == sub))
                    .map(|(_, column)| *column)
                    .collect();

                if present.is_empty() {
                    columns.push(*fallback);
                } else {
                    columns.extend(present);
                }
            }
            None => {
                tracing::debug!("Unknown column header '{}'", title);
                columns.push(Column::new(Field::Ignored, FieldKind::Text));
            }
        }
    }

    columns
}

/// Ordered, validated mapping from column index to field and kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    columns: Vec<Column>,
}

impl ColumnLayout {
    pub fn new(columns: Vec<Column>) -> Result<Self, LayoutError> {
        match columns.first() {
            Some(column) if column.field == Field::Station => {}
            other => return Err(LayoutError::StationNotFirst(other.map(|c| c.field))),
        }

        for (i, column) in columns.iter().enumerate() {
            if column.field == Field::Ignored {
                continue;
            }
            if columns[..i].iter().any(|c| c.field == column.field) {
                return Err(LayoutError::Duplicate(column.field));
            }
        }

        let has = |field: Field| columns.iter().any(|c| c.field == field);
        if has(Field::Wind) && (has(Field::WindDirection) || has(Field::WindSpeed)) {
            return Err(LayoutError::Duplicate(Field::Wind));
        }

        Ok(Self { columns })
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of columns that feed an observation field.
    pub fn mapped(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| c.field != Field::Ignored)
            .count()
    }

    pub fn parse_row(&self, date: NaiveDate, cells: &[String], normalizer: &Normalizer) -> RowOutcome {
        let first = cells.first().map(|c| c.trim()).unwrap_or_default();
        if cells.iter().all(|c| c.trim().is_empty()) || first.eq_ignore_ascii_case("summary") {
            return RowOutcome::NotData;
        }

        if cells.len() != self.width() {
            return RowOutcome::Dropped(RowError::CellCount {
                expected: self.width(),
                found: cells.len(),
            });
        }

        let identity = match StationIdentity::parse(first) {
            Some(identity) => identity,
            None => return RowOutcome::Dropped(RowError::StationIdentity(first.to_string())),
        };

        let mut observation = WeatherObservation::new(date, identity.id, identity.name);
        let mut warnings = Vec::new();

        for (column, cell) in self.columns.iter().zip(cells).skip(1) {
            if column.field == Field::Ignored {
                continue;
            }
            match normalizer.normalize(cell, column.kind) {
                Ok(value) => apply(&mut observation, column.field, value),
                Err(error) => warnings.push(FieldWarning {
                    field: column.field,
                    error,
                }),
            }
        }

        RowOutcome::Parsed(ParsedRow {
            observation,
            warnings,
        })
    }
}

fn apply(observation: &mut WeatherObservation, field: Field, value: FieldValue) {
    match (field, value) {
        (_, FieldValue::Missing) => {}
        (Field::Wind, FieldValue::Wind { direction, speed }) => {
            observation.wind_direction = direction;
            observation.wind_speed = speed;
        }
        (Field::WindDirection, FieldValue::Direction(direction)) => {
            observation.wind_direction = Some(direction);
        }
        (Field::Precipitation, FieldValue::Precipitation(precipitation)) => {
            observation.precipitation = Some(precipitation);
        }
        (Field::WeatherSummary, FieldValue::Text(text)) => {
            observation.weather_summary = Some(text);
        }
        (field, FieldValue::Number(value)) => {
            if let Some(slot) = number_slot(observation, field) {
                *slot = Some(value);
            }
        }
        (field, value) => tracing::debug!("Ignoring {:?} for {:?}", value, field),
    }
}

fn number_slot(observation: &mut WeatherObservation, field: Field) -> Option<&mut Option<f64>> {
    match field {
        Field::TemperatureMax => Some(&mut observation.temperature_max),
        Field::TemperatureMin => Some(&mut observation.temperature_min),
        Field::TemperatureMean => Some(&mut observation.temperature_mean),
        Field::DewPoint => Some(&mut observation.dew_point),
        Field::Humidity => Some(&mut observation.humidity),
        Field::WindSpeed => Some(&mut observation.wind_speed),
        Field::WindGust => Some(&mut observation.wind_gust),
        Field::Pressure => Some(&mut observation.pressure),
        Field::CloudCover => Some(&mut observation.cloud_cover),
        Field::LowCloud => Some(&mut observation.low_cloud),
        Field::SunDuration => Some(&mut observation.sun_duration),
        Field::Visibility => Some(&mut observation.visibility),
        Field::SnowDepth => Some(&mut observation.snow_depth),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldWarning {
    pub field: Field,
    pub error: FieldError,
}

impl fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.field, self.error)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub observation: WeatherObservation,
    /// Fields set to missing because their cell could not be read.
    pub warnings: Vec<FieldWarning>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Parsed(ParsedRow),
    /// Footer or blank row.
    NotData,
    Dropped(RowError),
}

// -- Tests -------------------------------------------------------------------
