//! One station's daily summary.

use chrono::NaiveDate;

use super::field::{Precipitation, WindDirection};

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    pub date: NaiveDate,
    pub station_id: String,
    pub station_name: String,
    pub temperature_max: Option<f64>,
    pub temperature_min: Option<f64>,
    pub temperature_mean: Option<f64>,
    pub dew_point: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_direction: Option<WindDirection>,
    pub wind_speed: Option<f64>,
    pub wind_gust: Option<f64>,
    pub pressure: Option<f64>,
    pub precipitation: Option<Precipitation>,
    /// Total cloud, octas.
    pub cloud_cover: Option<f64>,
    pub low_cloud: Option<f64>,
    pub sun_duration: Option<f64>,
    pub visibility: Option<f64>,
    pub snow_depth: Option<f64>,
    pub weather_summary: Option<String>,
}

impl WeatherObservation {
    /// An observation with identity only; every measurement missing.
    pub fn new(date: NaiveDate, station_id: String, station_name: String) -> Self {
        Self {
            date,
            station_id,
            station_name,
            temperature_max: None,
            temperature_min: None,
            temperature_mean: None,
            dew_point: None,
            humidity: None,
            wind_direction: None,
            wind_speed: None,
            wind_gust: None,
            pressure: None,
            precipitation: None,
            cloud_cover: None,
            low_cloud: None,
            sun_duration: None,
            visibility: None,
            snow_depth: None,
            weather_summary: None,
        }
    }
}

/// `"96749 - Jakarta / Soekarno-Hatta"` split into WMO index and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationIdentity {
    pub id: String,
    pub name: String,
}

impl StationIdentity {
    pub fn parse(text: &str) -> Option<Self> {
        let (id, name) = match text.split_once('-') {
            Some((id, name)) => (id.trim(), name.trim()),
            None => (text.trim(), ""),
        };

        if id.len() == 5 && id.chars().all(|c| c.is_ascii_digit()) {
            Some(StationIdentity {
                id: id.to_string(),
                name: name.to_string(),
            })
        } else {
            None
        }
    }
}

// -- Tests -------------------------------------------------------------------
