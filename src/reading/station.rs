//! Station details page: name, position and altitude of one WMO station.

use std::{fmt, sync::LazyLock};

use scraper::{Html, Selector};

use super::error::StationError;

static DETAILS_TABLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"table[border="2"][align="center"]"#).expect("valid selector")
});

#[derive(Debug, Clone, PartialEq)]
pub struct StationDetails {
    pub station_id: String,
    pub name: String,
    /// Decimal degrees, south negative.
    pub latitude: f64,
    /// Decimal degrees, west negative.
    pub longitude: f64,
    /// Metres.
    pub altitude: f64,
}

impl StationDetails {
    pub fn from_html(html: &str) -> Result<Self, StationError> {
        let document = Html::parse_document(html);
        let table = document
            .select(&DETAILS_TABLE)
            .next()
            .ok_or(StationError::NoTable)?;
        let text = table.text().collect::<Vec<_>>().join(" ");

        Self::from_text(&text)
    }

    fn from_text(text: &str) -> Result<Self, StationError> {
        let (head, rest) = text
            .split_once(':')
            .ok_or(StationError::MissingItem("station index"))?;
        let station_id = head
            .split_whitespace()
            .last()
            .filter(|id| id.chars().all(|c| c.is_ascii_digit()))
            .ok_or(StationError::MissingItem("station index"))?
            .to_string();

        let name_end = [rest.find('('), rest.find("Latitude")]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(rest.len());
        let name = rest[..name_end].trim().to_string();

        let tokens: Vec<&str> = text.split_whitespace().collect();
        let latitude = parse_coordinate(value_after(&tokens, "Latitude:")?)
            .ok_or_else(|| unparseable("latitude", &tokens, "Latitude:"))?;
        let longitude = parse_coordinate(value_after(&tokens, "Longitude:")?)
            .ok_or_else(|| unparseable("longitude", &tokens, "Longitude:"))?;
        let altitude = leading_number(value_after(&tokens, "Altitude:")?)
            .ok_or_else(|| unparseable("altitude", &tokens, "Altitude:"))?;

        Ok(StationDetails {
            station_id,
            name,
            latitude,
            longitude,
            altitude,
        })
    }
}

impl fmt::Display for StationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (lat {:.4}, lon {:.4}, alt {} m)",
            self.station_id, self.name, self.latitude, self.longitude, self.altitude
        )
    }
}

fn value_after<'a>(tokens: &[&'a str], label: &'static str) -> Result<&'a str, StationError> {
    tokens
        .iter()
        .position(|t| *t == label)
        .and_then(|i| tokens.get(i + 1))
        .copied()
        .ok_or(StationError::MissingItem(label))
}

fn unparseable(item: &'static str, tokens: &[&str], label: &str) -> StationError {
    let text = tokens
        .iter()
        .skip_while(|t| **t != label)
        .nth(1)
        .unwrap_or(&"")
        .to_string();
    StationError::Unparseable { item, text }
}

/// `06-07S`, `106-39-30E` or `06 07 S` style degrees-minutes-seconds.
fn parse_coordinate(text: &str) -> Option<f64> {
    let negative = text.contains(['S', 'W']);
    let digits: String = text
        .chars()
        .filter(|c| !matches!(c, 'N' | 'S' | 'E' | 'W'))
        .map(|c| if c == '-' { ' ' } else { c })
        .collect();

    let parts: Vec<f64> = digits
        .split_whitespace()
        .map(|p| p.parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;

    let decimal = match parts.as_slice() {
        [degrees, minutes] => degrees + minutes / 60.0,
        [degrees, minutes, seconds] => degrees + minutes / 60.0 + seconds / 3600.0,
        _ => return None,
    };

    Some(if negative { -decimal } else { decimal })
}

fn leading_number(text: &str) -> Option<f64> {
    let end = text
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(text.len());
    text[..end].parse().ok()
}

// -- Tests -------------------------------------------------------------------
