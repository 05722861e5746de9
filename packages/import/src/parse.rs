//! Spreadsheet parsing into header-keyed rows.
//!
//! The first row of the file (or of the first worksheet) is the header row.
//! Every following non-blank row becomes a [`RawRow`] of `(header, cell)`
//! pairs. Cell text is kept as-is apart from CSV field trimming.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader as _, open_workbook_auto_from_rs};
use safecity_fir_models::RawRow;

use crate::ImportError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Accepted upload formats, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Xlsx,
    Xls,
    Csv,
}

impl FileFormat {
    /// Picks the format from the file name's extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::UnsupportedFormat`] for any other extension.
    pub fn from_file_name(file_name: &str) -> Result<Self, ImportError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("xlsx") => Ok(Self::Xlsx),
            Some("xls") => Ok(Self::Xls),
            Some("csv") => Ok(Self::Csv),
            _ => Err(ImportError::UnsupportedFormat {
                file_name: file_name.to_string(),
            }),
        }
    }
}

/// An uploaded file: its original name and raw contents.
#[derive(Debug, Clone)]
pub struct ImportFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImportFile {
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Reads a file from disk, keeping only its file name.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Io`] if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self { name, bytes })
    }

    /// Returns the format implied by the file name.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::UnsupportedFormat`] for unknown extensions.
    pub fn format(&self) -> Result<FileFormat, ImportError> {
        FileFormat::from_file_name(&self.name)
    }
}

/// Parses an uploaded file into rows.
///
/// # Errors
///
/// * [`ImportError::UnsupportedFormat`] if the extension is not accepted
/// * [`ImportError::Csv`] or [`ImportError::Spreadsheet`] if the contents
///   cannot be read
/// * [`ImportError::NoData`] if the file has no data rows
pub fn parse_file(file: &ImportFile) -> Result<Vec<RawRow>, ImportError> {
    let format = file.format()?;
    log::debug!(
        "Parsing {} ({} bytes) as {format:?}",
        file.name,
        file.bytes.len()
    );

    let rows = match format {
        FileFormat::Csv => parse_csv(&file.bytes)?,
        FileFormat::Xlsx | FileFormat::Xls => parse_workbook(file.bytes.clone())?,
    };

    if rows.is_empty() {
        return Err(ImportError::NoData);
    }

    log::info!("Parsed {} rows from {}", rows.len(), file.name);
    Ok(rows)
}

/// Parses CSV text. Fields are trimmed and short rows are padded with
/// empty cells. When a header repeats, the rightmost column's value is
/// kept.
///
/// # Errors
///
/// Returns [`ImportError::Csv`] if the input is not valid CSV.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<RawRow>, ImportError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        let row: RawRow = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .map(|(i, header)| (header, record.get(i).unwrap_or("")))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Parses the first worksheet of an `.xlsx` or `.xls` workbook.
///
/// Only the first sheet is read and its first row is the header. Empty
/// cells are left out of the row; rows with no cells at all are skipped.
///
/// # Errors
///
/// Returns [`ImportError::Spreadsheet`] if the workbook cannot be opened.
pub fn parse_workbook(bytes: Vec<u8>) -> Result<Vec<RawRow>, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let Some(range) = workbook.worksheet_range_at(0) else {
        return Ok(Vec::new());
    };
    let range = range?;

    let mut sheet_rows = range.rows();
    let Some(header_row) = sheet_rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(cell_text).collect();

    let mut rows = Vec::new();
    for cells in sheet_rows {
        let row: RawRow = headers
            .iter()
            .zip(cells)
            .filter(|(header, cell)| !header.is_empty() && !matches!(cell, Data::Empty))
            .map(|(header, cell)| (header.clone(), cell_text(cell)))
            .collect();
        if !row.is_empty() {
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Renders a worksheet cell as text.
///
/// Dates become `YYYY-MM-DD`, times of day `HH:MM:SS`, and full date-times
/// `YYYY-MM-DD HH:MM:SS`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) if dt.as_f64() < 1.0 => value.format("%H:%M:%S").to_string(),
            Some(value) if value.time() == chrono::NaiveTime::MIN => {
                value.format("%Y-%m-%d").to_string()
            }
            Some(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        },
        other => other.to_string(),
    }
}
