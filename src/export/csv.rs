//! CSV output: UTF-8 with BOM so spreadsheet apps detect the encoding.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::error::ExportError;
use crate::normalize::{FlatTable, cell_text};

/// UTF-8 byte-order mark.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes `table` to `path`, replacing any existing file.
pub(crate) fn write_csv(table: &FlatTable, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|e| ExportError::io(path, e))?;
    let mut out = BufWriter::new(file);
    out.write_all(UTF8_BOM)
        .map_err(|e| ExportError::io(path, e))?;

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::CRLF)
        .from_writer(out);

    writer
        .write_record(table.columns())
        .map_err(|e| ExportError::csv(path, e))?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(cell_text))
            .map_err(|e| ExportError::csv(path, e))?;
    }
    writer.flush().map_err(|e| ExportError::io(path, e))?;
    Ok(())
}
