use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use chrono::{Duration, NaiveDate};
use tracing::{debug, instrument};

use crate::error::{Result, ToolError};
use crate::model::{CellValue, RowTable};

/// Loads a single worksheet into a [`RowTable`]. The first row of the sheet's
/// used range provides the headers. Rows without any non-empty cell are
/// skipped and short rows are padded with [`CellValue::Empty`].
#[instrument(level = "debug", skip_all, fields(path = %path.display(), sheet = sheet_name))]
pub fn read_sheet(path: &Path, sheet_name: &str) -> Result<RowTable> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = read_required_sheet(&mut workbook, sheet_name)?;
    let table = range_to_table(&range);
    debug!(
        columns = table.columns.len(),
        rows = table.rows.len(),
        "sheet loaded"
    );
    Ok(table)
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::MissingSheet(name.to_string()))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

fn range_to_table(range: &Range<DataType>) -> RowTable {
    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell_value(cell).to_field())
            .collect(),
        None => return RowTable::default(),
    };

    let width = columns.len();
    let body = rows
        .filter(|row| row.iter().any(|cell| !matches!(cell, DataType::Empty)))
        .map(|row| {
            let mut values: Vec<CellValue> = row.iter().map(cell_value).collect();
            values.resize(width, CellValue::Empty);
            values
        })
        .collect();

    RowTable::new(columns, body)
}

fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::String(value) => CellValue::Text(value.clone()),
        DataType::Float(value) => CellValue::Number(*value),
        DataType::Int(value) => CellValue::Integer(*value),
        DataType::Bool(value) => CellValue::Boolean(*value),
        DataType::DateTime(serial) => serial_to_datetime(*serial)
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Number(*serial)),
        DataType::Empty => CellValue::Empty,
        other => CellValue::Text(other.to_string()),
    }
}

// Serial day numbers count from 1899-12-30 in the 1900 date system.
fn serial_to_datetime(serial: f64) -> Option<String> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    let datetime = epoch.checked_add_signed(Duration::try_milliseconds(millis)?)?;
    Some(datetime.format("%Y-%m-%d %H:%M:%S").to_string())
}
