pub mod error;
pub mod field;
pub mod observation;
pub mod row;
pub mod station;

pub use error::LayoutError;
pub use field::{Normalizer, Precipitation};
pub use observation::WeatherObservation;
pub use row::{resolve_headers, ColumnLayout, RowOutcome};
pub use station::StationDetails;
