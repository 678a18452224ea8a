//! Save observations to a single-sheet Excel workbook.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::reading::WeatherObservation;

use super::{row_values, CellValue, ExportError, COLUMNS};

pub const SHEET_NAME: &str = "summary";

pub fn save_xlsx(records: &[WeatherObservation], file_path: &Path) -> Result<(), ExportError> {
    let mut workbook = build_workbook(records)
        .map_err(|e| ExportError::Xlsx(file_path.to_path_buf(), e))?;

    workbook
        .save(file_path)
        .map_err(|e| ExportError::Xlsx(file_path.to_path_buf(), e))
}

fn build_workbook(records: &[WeatherObservation]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;
    worksheet.set_freeze_panes(1, 0)?;

    for (col, label) in COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *label, &header)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = i as u32 + 1;

        for (col, value) in row_values(record).into_iter().enumerate() {
            let col = col as u16;
            match value {
                CellValue::Text(text) => {
                    worksheet.write_string(row, col, text)?;
                }
                CellValue::Number(number) => {
                    worksheet.write_number(row, col, number)?;
                }
                CellValue::Empty => {}
            }
        }
    }

    Ok(workbook)
}

// -- Tests -------------------------------------------------------------------
