//! XLSX output: header row plus one row per record, no styling.

use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use serde_json::Value;

use super::error::ExportError;
use crate::normalize::{FlatTable, cell_text};

/// Worksheet row limit, header row included.
pub const MAX_SHEET_ROWS: usize = 1_048_576;

/// Worksheet column limit.
pub const MAX_SHEET_COLUMNS: usize = 16_384;

/// Writes `table` to `path`, replacing any existing file.
pub(crate) fn write_xlsx(table: &FlatTable, path: &Path) -> Result<(), ExportError> {
    let rows = table.row_count();
    let columns = table.columns().len();
    if rows + 1 > MAX_SHEET_ROWS || columns > MAX_SHEET_COLUMNS {
        return Err(ExportError::SheetLimit { rows, columns });
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    fill_sheet(worksheet, table).map_err(|e| ExportError::xlsx(path, e))?;
    workbook.save(path).map_err(|e| ExportError::xlsx(path, e))?;
    Ok(())
}

// Bounds were checked by the caller, so the index conversions cannot fail.
#[allow(clippy::cast_possible_truncation)]
fn fill_sheet(worksheet: &mut Worksheet, table: &FlatTable) -> Result<(), XlsxError> {
    for (col, name) in table.columns().iter().enumerate() {
        worksheet.write_string(0, col as u16, name)?;
    }
    for (index, row) in table.rows().iter().enumerate() {
        let sheet_row = (index + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            write_cell(worksheet, sheet_row, col as u16, cell)?;
        }
    }
    Ok(())
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &Value) -> Result<(), XlsxError> {
    match cell {
        Value::Null => {}
        Value::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Value::Number(n) => match n.as_f64() {
            Some(number) => {
                worksheet.write_number(row, col, number)?;
            }
            None => {
                worksheet.write_string(row, col, n.to_string())?;
            }
        },
        other => {
            worksheet.write_string(row, col, cell_text(other))?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::normalize::normalize;

    #[test]
    fn test_xlsx_written_as_zip_container() {
        let records = vec![
            json!({"id": 1, "active": true, "employer": {"name": "Acme"}})
                .as_object()
                .unwrap()
                .clone(),
            json!({"id": 2, "tags": ["a", "b"]}).as_object().unwrap().clone(),
        ];
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.xlsx");
        write_xlsx(&normalize(&records), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"), "xlsx must be a zip container");
    }

    #[test]
    fn test_xlsx_header_only_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.xlsx");
        write_xlsx(&FlatTable::default(), &path).unwrap();
        assert!(path.exists());
    }
}
