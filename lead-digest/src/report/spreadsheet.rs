//! `.xlsx` export

use chrono::{DateTime, Local};
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};

use super::{PosterActivity, ReportError};
use crate::db::{JobPosting, LeadShortfall};

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// One spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a> {
    /// Text, empty when the value is missing
    Text(&'a str),
    /// Numeric value
    Number(f64),
}

/// A record that can be written as one worksheet row
pub trait SpreadsheetRow {
    /// Column headers, in cell order
    const HEADERS: &'static [&'static str];

    /// Cell values, one per header
    fn cells(&self) -> Vec<Cell<'_>>;
}

fn text(value: Option<&String>) -> Cell<'_> {
    Cell::Text(value.map_or("", String::as_str))
}

#[allow(clippy::cast_precision_loss)]
fn number(value: i64) -> Cell<'static> {
    Cell::Number(value as f64)
}

impl SpreadsheetRow for JobPosting {
    const HEADERS: &'static [&'static str] = &[
        "Company",
        "Title",
        "URL",
        "Company URL",
        "Posted By",
        "Poster Profile",
        "Source",
    ];

    fn cells(&self) -> Vec<Cell<'_>> {
        vec![
            text(self.company.as_ref()),
            text(self.title.as_ref()),
            text(self.url.as_ref()),
            text(self.company_url.as_ref()),
            text(self.poster_full_name.as_ref()),
            text(self.posted_by_profile.as_ref()),
            text(self.source.as_ref()),
        ]
    }
}

impl SpreadsheetRow for LeadShortfall {
    const HEADERS: &'static [&'static str] = &[
        "Lead",
        "Email",
        "External ID",
        "Jobs Today",
        "Threshold",
        "Shortfall",
    ];

    fn cells(&self) -> Vec<Cell<'_>> {
        vec![
            text(self.lead_name.as_ref()),
            text(self.lead_email.as_ref()),
            text(self.external_id.as_ref()),
            number(self.jobs_today),
            number(self.threshold),
            number(self.shortfall),
        ]
    }
}

/// Flatten grouped posters back into posting rows for export
#[must_use]
pub fn poster_rows(posters: &[PosterActivity]) -> Vec<&JobPosting> {
    posters.iter().flat_map(|p| p.postings.iter()).collect()
}

impl<T: SpreadsheetRow> SpreadsheetRow for &T {
    const HEADERS: &'static [&'static str] = T::HEADERS;

    fn cells(&self) -> Vec<Cell<'_>> {
        (**self).cells()
    }
}

/// MIME type for `.xlsx` attachments
#[must_use]
pub fn xlsx_mime() -> mime::Mime {
    XLSX_MIME
        .parse()
        .unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

/// Write `rows` to `<dir>/<prefix>_<YYYYMMDD_HHMMSS>.xlsx`
///
/// The directory is created if missing. The header row is bold and columns
/// are sized to their content.
///
/// # Errors
///
/// Returns [`ReportError::Io`] if the directory cannot be created, or
/// [`ReportError::Spreadsheet`] if the workbook cannot be written.
pub fn write_spreadsheet<R: SpreadsheetRow>(
    rows: &[R],
    dir: &Path,
    prefix: &str,
    now: DateTime<Local>,
) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{prefix}_{}.xlsx", now.format("%Y%m%d_%H%M%S")));

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    for (col, header) in (0u16..).zip(R::HEADERS) {
        sheet.write_string_with_format(0, col, *header, &bold)?;
    }

    for (row_num, row) in (1u32..).zip(rows) {
        for (col, cell) in (0u16..).zip(row.cells()) {
            match cell {
                Cell::Text(value) => sheet.write_string(row_num, col, value)?,
                Cell::Number(value) => sheet.write_number(row_num, col, value)?,
            };
        }
    }

    sheet.autofit();
    workbook.save(&path)?;

    tracing::info!(file = %path.display(), rows = rows.len(), "Spreadsheet written");
    Ok(path)
}
