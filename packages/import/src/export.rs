//! CSV and Excel export of FIR records.
//!
//! Headers are the field labels, all of which are accepted import
//! synonyms, so an exported file can be fed straight back into an import.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Color, Format, Workbook};
use safecity_fir_models::{FirField, FirRecord};

use crate::ImportError;

/// Header of the report ID column. Not an import synonym.
pub const REPORT_ID_HEADER: &str = "FIR ID";

/// Name of the worksheet in an Excel export.
pub const SHEET_NAME: &str = "FIRs";

/// Excel column widths, in export column order.
const COLUMN_WIDTHS: [f64; 12] = [
    15.0, 12.0, 10.0, 15.0, 20.0, 20.0, 12.0, 12.0, 15.0, 30.0, 30.0, 30.0,
];

const HEADER_FILL: u32 = 0x1F_29_37;
const STRIPE_FILL: u32 = 0xF3_F4_F6;

/// Export file formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// Parses a format name such as `csv` or `xlsx` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::UnsupportedExportFormat`] for anything else.
    pub fn from_name(name: &str) -> Result<Self, ImportError> {
        match name.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            _ => Err(ImportError::UnsupportedExportFormat(name.to_string())),
        }
    }

    /// Picks the format from an output path's extension.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::UnsupportedExportFormat`] if the extension is
    /// missing or not `.csv`/`.xlsx`.
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        Self::from_name(extension)
            .map_err(|_| ImportError::UnsupportedExportFormat(path.display().to_string()))
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }

    /// HTTP `Content-Type` of a download in this format.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

fn header() -> Vec<&'static str> {
    let mut header = vec![REPORT_ID_HEADER];
    header.extend(FirField::all().iter().map(|f| f.label()));
    header
}

fn columns(record: &FirRecord) -> [&str; 12] {
    [
        record.report_id.as_str(),
        record.date.as_str(),
        record.time.as_str(),
        record.fir_type.as_ref(),
        record.location.as_str(),
        record.complainant.as_str(),
        record.status.as_ref(),
        record.priority.as_ref(),
        record.officer.as_str(),
        record.description.as_str(),
        record.evidence.as_str(),
        record.notes.as_str(),
    ]
}

/// Writes `records` as CSV with every field quoted.
///
/// # Errors
///
/// Returns [`ImportError::Csv`] if writing fails.
pub fn write_csv<W: Write>(writer: W, records: &[FirRecord]) -> Result<(), ImportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    writer.write_record(header())?;
    for record in records {
        writer.write_record(columns(record))?;
    }

    writer.flush()?;
    log::debug!("Wrote {} records as CSV", records.len());
    Ok(())
}

/// Renders `records` as CSV bytes.
///
/// # Errors
///
/// Returns [`ImportError::Csv`] if serialization fails.
pub fn to_csv_bytes(records: &[FirRecord]) -> Result<Vec<u8>, ImportError> {
    let mut bytes = Vec::new();
    write_csv(&mut bytes, records)?;
    Ok(bytes)
}

/// Renders `records` as an `.xlsx` workbook with a single `FIRs` sheet.
///
/// The header row is bold white on dark gray and every other data row is
/// shaded.
///
/// # Errors
///
/// Returns [`ImportError::Xlsx`] if the workbook cannot be built.
pub fn to_xlsx_bytes(records: &[FirRecord]) -> Result<Vec<u8>, ImportError> {
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL));
    let stripe_format = Format::new().set_background_color(Color::RGB(STRIPE_FILL));

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, (label, width)) in (0_u16..).zip(header().into_iter().zip(COLUMN_WIDTHS)) {
        sheet.set_column_width(col, width)?;
        sheet.write_string_with_format(0, col, label, &header_format)?;
    }

    for (row, record) in (1_u32..).zip(records) {
        let striped = row % 2 == 1;
        for (col, value) in (0_u16..).zip(columns(record)) {
            if striped {
                sheet.write_string_with_format(row, col, value, &stripe_format)?;
            } else {
                sheet.write_string(row, col, value)?;
            }
        }
    }

    let bytes = workbook.save_to_buffer()?;
    log::debug!("Wrote {} records as XLSX", records.len());
    Ok(bytes)
}

/// Renders `records` in `format`.
///
/// # Errors
///
/// Returns [`ImportError::Csv`] or [`ImportError::Xlsx`] if serialization
/// fails.
pub fn to_bytes(format: ExportFormat, records: &[FirRecord]) -> Result<Vec<u8>, ImportError> {
    match format {
        ExportFormat::Csv => to_csv_bytes(records),
        ExportFormat::Xlsx => to_xlsx_bytes(records),
    }
}

/// Download name for an export made at `now`.
#[must_use]
pub fn export_file_name(now: DateTime<Utc>, format: ExportFormat) -> String {
    format!(
        "FIR-Records-{}.{}",
        now.format("%Y-%m-%d"),
        format.extension()
    )
}
