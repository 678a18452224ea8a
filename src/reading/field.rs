//! Converts raw cell text into typed values.

use std::{collections::HashSet, fmt};

use crate::config::Config;

use super::error::FieldError;

/// How a cell's text is to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    /// Combined `direction/speed` cell.
    Wind,
    WindDirection,
    Precipitation,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Missing,
    Number(f64),
    Wind {
        direction: Option<WindDirection>,
        speed: Option<f64>,
    },
    Direction(WindDirection),
    Precipitation(Precipitation),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Precipitation {
    Amount(f64),
    /// Below the measurable threshold; not the same as zero.
    Trace,
}

impl fmt::Display for Precipitation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precipitation::Amount(mm) => write!(f, "{}", mm),
            Precipitation::Trace => write!(f, "TRACE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindDirection {
    Compass(CompassPoint),
    Degrees(u16),
    Calm,
    Variable,
}

impl WindDirection {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "C" | "CAL" | "CALM" => Some(WindDirection::Calm),
            "V" | "VRB" => Some(WindDirection::Variable),
            upper => match upper.parse::<u16>() {
                Ok(degrees) if degrees <= 360 => Some(WindDirection::Degrees(degrees)),
                Ok(_) => None,
                Err(_) => CompassPoint::from_code(upper).map(WindDirection::Compass),
            },
        }
    }
}

impl fmt::Display for WindDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindDirection::Compass(point) => write!(f, "{}", point.code()),
            WindDirection::Degrees(degrees) => write!(f, "{}", degrees),
            WindDirection::Calm => write!(f, "CALM"),
            WindDirection::Variable => write!(f, "VRB"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompassPoint {
    N,
    Nne,
    Ne,
    Ene,
    E,
    Ese,
    Se,
    Sse,
    S,
    Ssw,
    Sw,
    Wsw,
    W,
    Wnw,
    Nw,
    Nnw,
}

const COMPASS: [(CompassPoint, &str); 16] = [
    (CompassPoint::N, "N"),
    (CompassPoint::Nne, "NNE"),
    (CompassPoint::Ne, "NE"),
    (CompassPoint::Ene, "ENE"),
    (CompassPoint::E, "E"),
    (CompassPoint::Ese, "ESE"),
    (CompassPoint::Se, "SE"),
    (CompassPoint::Sse, "SSE"),
    (CompassPoint::S, "S"),
    (CompassPoint::Ssw, "SSW"),
    (CompassPoint::Sw, "SW"),
    (CompassPoint::Wsw, "WSW"),
    (CompassPoint::W, "W"),
    (CompassPoint::Wnw, "WNW"),
    (CompassPoint::Nw, "NW"),
    (CompassPoint::Nnw, "NNW"),
];

impl CompassPoint {
    pub fn from_code(code: &str) -> Option<Self> {
        COMPASS
            .iter()
            .find(|(_, c)| c.eq_ignore_ascii_case(code))
            .map(|(point, _)| *point)
    }

    pub fn code(&self) -> &'static str {
        COMPASS
            .iter()
            .find(|(point, _)| point == self)
            .map(|(_, code)| *code)
            .unwrap_or("?")
    }
}

/// Applies the sentinel tables to raw cells.
#[derive(Debug, Clone)]
pub struct Normalizer {
    missing: HashSet<String>,
    trace: HashSet<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Normalizer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            missing: config
                .missing_sentinels
                .iter()
                .map(|s| s.trim().to_string())
                .collect(),
            trace: config
                .trace_sentinels
                .iter()
                .map(|s| s.trim().to_string())
                .collect(),
        }
    }

    pub fn is_missing(&self, raw: &str) -> bool {
        let raw = raw.trim();
        raw.is_empty() || self.missing.contains(raw)
    }

    pub fn normalize(&self, raw: &str, kind: FieldKind) -> Result<FieldValue, FieldError> {
        let raw = raw.trim();

        match kind {
            FieldKind::Numeric => Ok(self
                .number(raw)?
                .map_or(FieldValue::Missing, FieldValue::Number)),
            FieldKind::Wind => self.wind(raw),
            FieldKind::WindDirection => Ok(self
                .direction(raw)?
                .map_or(FieldValue::Missing, FieldValue::Direction)),
            FieldKind::Precipitation => self.precipitation(raw),
            FieldKind::Text if self.is_missing(raw) => Ok(FieldValue::Missing),
            FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
        }
    }

    fn number(&self, raw: &str) -> Result<Option<f64>, FieldError> {
        if self.is_missing(raw) {
            return Ok(None);
        }

        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Some(value)),
            _ => Err(FieldError::NotANumber(raw.to_string())),
        }
    }

    fn direction(&self, raw: &str) -> Result<Option<WindDirection>, FieldError> {
        if self.is_missing(raw) {
            return Ok(None);
        }

        WindDirection::from_code(raw)
            .map(Some)
            .ok_or_else(|| FieldError::UnknownDirection(raw.to_string()))
    }

    fn wind(&self, raw: &str) -> Result<FieldValue, FieldError> {
        if self.is_missing(raw) {
            return Ok(FieldValue::Missing);
        }

        let (direction, speed) = raw
            .split_once('/')
            .ok_or_else(|| FieldError::MalformedWind(raw.to_string()))?;

        let direction = self.direction(direction.trim())?;
        let speed = self.number(speed.trim())?;

        match (direction, speed) {
            (None, None) => Ok(FieldValue::Missing),
            (direction, speed) => Ok(FieldValue::Wind { direction, speed }),
        }
    }

    fn precipitation(&self, raw: &str) -> Result<FieldValue, FieldError> {
        if self.trace.contains(raw) {
            return Ok(FieldValue::Precipitation(Precipitation::Trace));
        }

        Ok(self.number(raw)?.map_or(FieldValue::Missing, |mm| {
            FieldValue::Precipitation(Precipitation::Amount(mm))
        }))
    }
}

// -- Tests -------------------------------------------------------------------
