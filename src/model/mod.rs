use std::collections::HashSet;

/// A single cell loaded from a worksheet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Text literal. The only variant affected by whitespace trimming.
    Text(String),
    /// Floating point number literal.
    Number(f64),
    /// Integer literal.
    Integer(i64),
    /// Boolean literal.
    Boolean(bool),
    /// Date/time already rendered as `YYYY-MM-DD HH:MM:SS`.
    DateTime(String),
    /// Blank cell.
    Empty,
}

impl CellValue {
    /// Renders the cell as it appears in a CSV field.
    pub fn to_field(&self) -> String {
        match self {
            CellValue::Text(value) => value.clone(),
            CellValue::Number(value) => format_number(*value),
            CellValue::Integer(value) => value.to_string(),
            CellValue::Boolean(true) => "True".to_string(),
            CellValue::Boolean(false) => "False".to_string(),
            CellValue::DateTime(value) => value.clone(),
            CellValue::Empty => String::new(),
        }
    }

    /// Returns the cell with surrounding whitespace removed from text values.
    pub fn trimmed(self) -> Self {
        match self {
            CellValue::Text(value) => {
                let trimmed = value.trim();
                if trimmed.len() == value.len() {
                    CellValue::Text(value)
                } else {
                    CellValue::Text(trimmed.to_string())
                }
            }
            other => other,
        }
    }
}

// Whole values print as integers. Magnitudes below 1e-4 or from 1e16 up use
// exponent notation.
fn format_number(value: f64) -> String {
    let magnitude = value.abs();
    if !value.is_finite() {
        value.to_string()
    } else if value.fract() == 0.0 && magnitude < 1e15 {
        format!("{}", value as i64)
    } else if magnitude < 1e-4 || magnitude >= 1e16 {
        format!("{value:e}")
    } else {
        value.to_string()
    }
}

/// In-memory table with named columns, loaded from one sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RowTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { columns, rows }
    }

    /// Trims surrounding whitespace from every header.
    pub fn normalize_headers(&mut self) {
        for column in &mut self.columns {
            let trimmed = column.trim();
            if trimmed.len() != column.len() {
                *column = trimmed.to_string();
            }
        }
    }

    /// Position of the first column carrying `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Returns the source headers of `column_map` absent from this table, in
    /// map order.
    pub fn missing_columns(&self, column_map: &[(String, String)]) -> Vec<String> {
        column_map
            .iter()
            .filter(|(source, _)| self.column_index(source).is_none())
            .map(|(source, _)| source.clone())
            .collect()
    }

    /// Projects the table onto the mapped columns, in map order, renaming each
    /// to its target. Fails with every absent source header, in map order.
    pub fn select_renamed(
        &self,
        column_map: &[(String, String)],
    ) -> std::result::Result<RowTable, Vec<String>> {
        let indices = column_map
            .iter()
            .map(|(source, _)| self.column_index(source))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| self.missing_columns(column_map))?;

        let columns = column_map.iter().map(|(_, target)| target.clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|&idx| row.get(idx).cloned().unwrap_or(CellValue::Empty))
                    .collect()
            })
            .collect();

        Ok(RowTable::new(columns, rows))
    }

    /// Trims whitespace around every text value.
    pub fn trim_text(&mut self) {
        for row in &mut self.rows {
            for cell in row.iter_mut() {
                *cell = std::mem::replace(cell, CellValue::Empty).trimmed();
            }
        }
    }

    /// Drops rows that repeat an earlier row across all columns, keeping the
    /// first occurrence. Returns the number of rows removed.
    pub fn dedup_rows(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(before);
        self.rows
            .retain(|row| seen.insert(row.iter().map(CellValue::to_field).collect()));
        before - self.rows.len()
    }
}
