use thiserror::Error;

use super::row::Field;

/// A single cell that could not be interpreted; the field becomes missing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("'{0}' is not a wind direction")]
    UnknownDirection(String),

    #[error("'{0}' is not a direction/speed pair")]
    MalformedWind(String),
}

/// A row that could not become an observation; the row is dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("expected {expected} cells, found {found}")]
    CellCount { expected: usize, found: usize },

    #[error("station cell '{0}' is not '<index> - <name>'")]
    StationIdentity(String),
}

/// Header rows that cannot be turned into a column layout.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("first column must be the station, found {0:?}")]
    StationNotFirst(Option<Field>),

    #[error("field {0:?} is mapped to more than one column")]
    Duplicate(Field),
}

#[derive(Debug, Error)]
pub enum StationError {
    #[error("station details table not found")]
    NoTable,

    #[error("could not find {0} in station details")]
    MissingItem(&'static str),

    #[error("could not parse {item} from '{text}'")]
    Unparseable { item: &'static str, text: String },
}
