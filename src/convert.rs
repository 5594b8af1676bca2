use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::catalog::ConversionSpec;
use crate::error::{Result, ToolError};
use crate::io::{csv_write, excel_read};
use crate::model::RowTable;

/// Summary of one converted sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    pub sheet_name: String,
    pub path: PathBuf,
    pub rows_written: usize,
    pub duplicates_removed: usize,
}

/// Converts one worksheet into a CSV file inside `output_dir`.
///
/// Headers are trimmed, every mapped source column must exist, the mapped
/// columns are selected and renamed in map order, text values are trimmed and
/// repeated rows dropped before anything touches the file system.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %excel_path.display(), sheet = sheet_name)
)]
pub fn convert_sheet(
    excel_path: &Path,
    sheet_name: &str,
    output_dir: &Path,
    column_map: &[(String, String)],
    output_name: &str,
) -> Result<ConversionOutcome> {
    ensure_input(excel_path)?;
    let table = excel_read::read_sheet(excel_path, sheet_name)?;
    let (table, duplicates_removed) = reshape(table, sheet_name, column_map)?;

    let path = output_dir.join(output_name);
    csv_write::write_table(&path, &table)?;

    println!("{sheet_name}: removed {duplicates_removed} duplicate row(s)");
    info!(
        rows = table.rows.len(),
        duplicates_removed,
        path = %path.display(),
        "sheet converted"
    );

    Ok(ConversionOutcome {
        sheet_name: sheet_name.to_string(),
        path,
        rows_written: table.rows.len(),
        duplicates_removed,
    })
}

/// Applies the in-memory part of the conversion: header normalisation, column
/// check, selection with renaming, trimming and de-duplication.
pub fn reshape(
    mut table: RowTable,
    sheet_name: &str,
    column_map: &[(String, String)],
) -> Result<(RowTable, usize)> {
    table.normalize_headers();

    let mut selected = table
        .select_renamed(column_map)
        .map_err(|missing| ToolError::MissingColumns {
            sheet: sheet_name.to_string(),
            missing,
        })?;
    selected.trim_text();
    let removed = selected.dedup_rows();
    Ok((selected, removed))
}

fn ensure_input(excel_path: &Path) -> Result<()> {
    if excel_path.exists() {
        Ok(())
    } else {
        Err(ToolError::MissingInput(excel_path.to_path_buf()))
    }
}

/// Runs every catalog entry in order against the same workbook. The first
/// failing sheet aborts the run.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %excel_path.display(), output = %output_dir.display(), sheets = catalog.len())
)]
pub fn convert_catalog(
    excel_path: &Path,
    output_dir: &Path,
    catalog: &[ConversionSpec],
) -> Result<Vec<ConversionOutcome>> {
    ensure_input(excel_path)?;

    catalog
        .iter()
        .map(|spec| {
            convert_sheet(
                excel_path,
                &spec.sheet_name,
                output_dir,
                &spec.column_map,
                &spec.output_filename,
            )
        })
        .collect()
}
