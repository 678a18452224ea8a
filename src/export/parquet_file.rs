//! Save observations to a parquet file.

use std::{fs::File, path::Path, sync::Arc};

use arrow::{
    array::{ArrayRef, BooleanArray, Date32Array, Float64Array, StringArray},
    record_batch::RecordBatch,
};
use chrono::Datelike;
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};

use crate::reading::{Precipitation, WeatherObservation};

use super::ExportError;

// 1970-01-01 counted from 0001-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub fn save_parquet(records: &[WeatherObservation], file_path: &Path) -> Result<(), ExportError> {
    let batch = record_batch(records).map_err(|e| ExportError::Arrow(file_path.to_path_buf(), e))?;

    let file = File::create(file_path).map_err(|e| ExportError::Io(file_path.to_path_buf(), e))?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let parquet_error = |e| ExportError::Parquet(file_path.to_path_buf(), e);
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props)).map_err(parquet_error)?;
    writer.write(&batch).map_err(parquet_error)?;
    writer.close().map_err(parquet_error)?;

    Ok(())
}

fn record_batch(records: &[WeatherObservation]) -> Result<RecordBatch, arrow::error::ArrowError> {
    let floats = |get: fn(&WeatherObservation) -> Option<f64>| -> ArrayRef {
        Arc::new(Float64Array::from(records.iter().map(get).collect::<Vec<_>>()))
    };

    let dates: Vec<i32> = records
        .iter()
        .map(|r| r.date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
        .collect();
    let station_ids: Vec<String> = records.iter().map(|r| r.station_id.clone()).collect();
    let station_names: Vec<String> = records.iter().map(|r| r.station_name.clone()).collect();
    let wind_directions: Vec<Option<String>> = records
        .iter()
        .map(|r| r.wind_direction.map(|d| d.to_string()))
        .collect();
    let precipitation: Vec<Option<f64>> = records
        .iter()
        .map(|r| match r.precipitation {
            Some(Precipitation::Amount(mm)) => Some(mm),
            _ => None,
        })
        .collect();
    let trace: Vec<bool> = records
        .iter()
        .map(|r| r.precipitation == Some(Precipitation::Trace))
        .collect();
    let summaries: Vec<Option<String>> = records.iter().map(|r| r.weather_summary.clone()).collect();

    let columns: Vec<(&str, ArrayRef)> = vec![
        ("date", Arc::new(Date32Array::from(dates))),
        ("station_id", Arc::new(StringArray::from(station_ids))),
        ("station_name", Arc::new(StringArray::from(station_names))),
        ("temperature_max", floats(|r| r.temperature_max)),
        ("temperature_min", floats(|r| r.temperature_min)),
        ("temperature_mean", floats(|r| r.temperature_mean)),
        ("dew_point", floats(|r| r.dew_point)),
        ("humidity", floats(|r| r.humidity)),
        ("wind_direction", Arc::new(StringArray::from(wind_directions))),
        ("wind_speed", floats(|r| r.wind_speed)),
        ("wind_gust", floats(|r| r.wind_gust)),
        ("pressure", floats(|r| r.pressure)),
        ("precipitation", Arc::new(Float64Array::from(precipitation))),
        ("precipitation_trace", Arc::new(BooleanArray::from(trace))),
        ("cloud_cover", floats(|r| r.cloud_cover)),
        ("low_cloud", floats(|r| r.low_cloud)),
        ("sun_duration", floats(|r| r.sun_duration)),
        ("visibility", floats(|r| r.visibility)),
        ("snow_depth", floats(|r| r.snow_depth)),
        ("weather_summary", Arc::new(StringArray::from(summaries))),
    ];

    RecordBatch::try_from_iter(columns)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use std::fs;

    use arrow::array::{Array, AsArray};
    use arrow::datatypes::{DataType, Float64Type};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::NamedTempFile;

    use crate::export::tests::observations_fixture;

    use super::*;

    #[test]
    fn should_round_trip_trace_and_zero() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        save_parquet(&observations_fixture(), &path).unwrap();

        let file = fs::File::open(&path).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        let batches: Vec<RecordBatch> = reader.map(|b| b.unwrap()).collect();
        assert_eq!(batches.len(), 1);

        let batch = &batches[0];
        let schema = batch.schema();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(schema.fields().len(), 20);
        assert_eq!(schema.field(0).data_type(), &DataType::Date32);

        let precipitation = batch
            .column(schema.index_of("precipitation").unwrap())
            .as_primitive::<Float64Type>();
        let trace = batch
            .column(schema.index_of("precipitation_trace").unwrap())
            .as_boolean();

        assert!(precipitation.is_null(0));
        assert!(trace.value(0));
        assert_eq!(precipitation.value(1), 0.0);
        assert!(!trace.value(1));
    }

    #[test]
    fn should_store_date_as_days_since_epoch() {
        let records = observations_fixture();
        let batch = record_batch(&records).unwrap();
        let dates = batch.column(0).as_primitive::<arrow::datatypes::Date32Type>();

        // 2024-03-20
        assert_eq!(dates.value(0), 19_802);
    }
}
