use std::fs;
use std::path::Path;

use csv::{Terminator, WriterBuilder};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::model::{CellValue, RowTable};

/// Writes the table as comma separated values with a header row.
///
/// Parent directories are created on demand. The data is written to a
/// temporary file next to `path` and renamed over it once complete, so an
/// existing file is either fully replaced or left untouched.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn write_table(path: &Path, table: &RowTable) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let staging = NamedTempFile::new_in(parent)?;
    {
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(staging.as_file());
        writer.write_record(&table.columns)?;
        for row in &table.rows {
            writer.write_record(row.iter().map(CellValue::to_field))?;
        }
        writer.flush()?;
    }
    staging.as_file().sync_all()?;
    staging.persist(path)?;

    debug!(rows = table.rows.len(), "CSV written");
    Ok(())
}
