//! Report assembly and the on-disk report store.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDateTime};
use rust_xlsxwriter::{ExcelDateTime, Format, FormatAlign, Workbook};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ReportError;
use crate::models::ticket::TicketRecord;

/// Title of the single worksheet.
pub const SHEET_TITLE: &str = "Suez Glossop Tickets";

/// Report columns, in order.
pub const HEADERS: [&str; 11] = [
    "Week",
    "Type",
    "Date",
    "Day",
    "IN",
    "OUT",
    "Nett",
    "Street/Litter",
    "Flytip Monthly",
    "Compost",
    "Ticket No",
];

const FILENAME_PREFIX: &str = "suez-glossop-tickets";
const MAX_NAME_ATTEMPTS: u32 = 1000;

const COL_TYPE: u16 = 1;
const COL_DATE: u16 = 2;
const COL_DAY: u16 = 3;
const COL_IN: u16 = 4;
const COL_OUT: u16 = 5;
const COL_NETT: u16 = 6;
const COL_TICKET_NO: u16 = 10;

/// Report file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Excel workbook.
    #[default]
    Xlsx,
    /// Comma-separated values with the same columns.
    Csv,
}

impl ReportFormat {
    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    /// MIME type for downloads.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv",
        }
    }

    /// Guess the format from a stored report's file name.
    pub fn from_filename(filename: &str) -> Option<Self> {
        match Path::new(filename).extension()?.to_str()? {
            "xlsx" => Some(Self::Xlsx),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Lays sorted tickets out in the fixed report schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportBuilder {
    format: ReportFormat,
}

impl ReportBuilder {
    /// Create a builder producing the given format.
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format this builder produces.
    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Encode the report fully in memory.
    pub fn render(&self, records: &[TicketRecord]) -> Result<Vec<u8>, ReportError> {
        match self.format {
            ReportFormat::Xlsx => render_xlsx(records),
            ReportFormat::Csv => render_csv(records),
        }
    }

    /// Render the report and persist it, returning the stored filename.
    pub fn write(
        &self,
        records: &[TicketRecord],
        store: &ReportStore,
        generated_at: NaiveDateTime,
    ) -> Result<String, ReportError> {
        let bytes = self.render(records)?;
        let stem = report_stem(generated_at);
        let filename = store.persist(&stem, self.format.extension(), &bytes)?;

        info!("Wrote report {} with {} rows", filename, records.len());
        Ok(filename)
    }
}

/// Filename stem carrying the generation timestamp.
pub fn report_stem(generated_at: NaiveDateTime) -> String {
    format!("{}-{}", FILENAME_PREFIX, generated_at.format("%Y%m%d-%H%M%S"))
}

/// Years a native spreadsheet date cell can hold.
const EXCEL_YEARS: std::ops::RangeInclusive<i32> = 1900..=9999;

/// Style of native date cells.
fn date_cell_format() -> Format {
    Format::new()
        .set_num_format("dd/mm/yyyy")
        .set_align(FormatAlign::Right)
}

/// Style of ticket numbers and of dates written as text.
fn right_aligned_format() -> Format {
    Format::new().set_align(FormatAlign::Right)
}

fn render_xlsx(records: &[TicketRecord]) -> Result<Vec<u8>, ReportError> {
    let mut workbook = Workbook::new();
    let date_format = date_cell_format();
    let right = right_aligned_format();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_TITLE)?;

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }
    worksheet.set_column_width(COL_DATE, 12)?;
    worksheet.set_column_width(COL_TICKET_NO, 14)?;

    for (i, record) in records.iter().enumerate() {
        let row = i as u32 + 1;
        let date = record.date();

        worksheet.write_string(row, COL_TYPE, record.category().as_str())?;
        if EXCEL_YEARS.contains(&date.year()) {
            let excel_date =
                ExcelDateTime::from_ymd(date.year() as u16, date.month() as u8, date.day() as u8)?;
            worksheet.write_datetime_with_format(row, COL_DATE, &excel_date, &date_format)?;
        } else {
            warn!(
                "Ticket {} dated {} is outside the spreadsheet date range",
                record.ticket_no(),
                date
            );
            let text = date.format("%d/%m/%Y").to_string();
            worksheet.write_string_with_format(row, COL_DATE, text, &right)?;
        }
        worksheet.write_string(row, COL_DAY, record.day_name())?;
        worksheet.write_number(row, COL_IN, f64::from(record.gross()))?;
        worksheet.write_number(row, COL_OUT, f64::from(record.tare()))?;
        worksheet.write_number(row, COL_NETT, f64::from(record.net()))?;
        worksheet.write_string_with_format(row, COL_TICKET_NO, record.ticket_no(), &right)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn render_csv(records: &[TicketRecord]) -> Result<Vec<u8>, ReportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(HEADERS)?;

    for record in records {
        wtr.write_record([
            String::new(),
            record.category().to_string(),
            record.date().format("%d/%m/%Y").to_string(),
            record.day_name(),
            record.gross().to_string(),
            record.tare().to_string(),
            record.net().to_string(),
            String::new(),
            String::new(),
            String::new(),
            record.ticket_no().to_string(),
        ])?;
    }

    wtr.into_inner().map_err(|e| ReportError::Io(e.into_error()))
}

/// Directory of generated reports, addressed by bare filename.
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ReportError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Root directory of the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Atomically store `bytes` as `<stem>.<extension>`.
    ///
    /// An existing file is never overwritten: on collision `-2`, `-3`, ...
    /// is appended to the stem. Returns the filename actually used.
    pub fn persist(&self, stem: &str, extension: &str, bytes: &[u8]) -> Result<String, ReportError> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;

        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let filename = if attempt == 1 {
                format!("{}.{}", stem, extension)
            } else {
                format!("{}-{}.{}", stem, attempt, extension)
            };

            match tmp.persist_noclobber(self.dir.join(&filename)) {
                Ok(_) => {
                    debug!("Persisted {} ({} bytes)", filename, bytes.len());
                    return Ok(filename);
                }
                Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                    warn!("Report {} already exists, trying another name", filename);
                    tmp = e.file;
                }
                Err(e) => return Err(ReportError::Io(e.error)),
            }
        }

        Err(ReportError::InvalidFilename(format!(
            "no free name for {}.{}",
            stem, extension
        )))
    }

    /// Path of a stored report, if the name is valid and the file exists.
    pub fn locate(&self, filename: &str) -> Option<PathBuf> {
        if !is_plain_filename(filename) {
            return None;
        }
        let path = self.dir.join(filename);
        path.is_file().then_some(path)
    }
}

/// A bare, visible file name: no separators, no parent references.
fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ticket::WasteCategory;
    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn sample_records() -> Vec<TicketRecord> {
        vec![
            TicketRecord::new(
                "P123456789",
                NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
                1000,
                200,
                800,
                WasteCategory::StreetLitter,
            )
            .unwrap(),
            TicketRecord::new(
                "P987654321",
                NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
                5400,
                2100,
                3300,
                WasteCategory::Compost,
            )
            .unwrap(),
        ]
    }

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 7)
            .unwrap()
            .and_hms_opt(9, 30, 5)
            .unwrap()
    }

    #[test]
    fn test_xlsx_layout() {
        let bytes = ReportBuilder::new(ReportFormat::Xlsx)
            .render(&sample_records())
            .unwrap();

        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.sheet_names(), vec![SHEET_TITLE.to_string()]);

        let range = workbook.worksheet_range(SHEET_TITLE).unwrap();
        let header: Vec<String> = range
            .rows()
            .next()
            .unwrap()
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(header, HEADERS.to_vec());

        assert_eq!(range.get_value((1, 1)), Some(&Data::String("Street/Litter".to_string())));
        assert_eq!(range.get_value((1, 3)), Some(&Data::String("Sunday".to_string())));
        assert_eq!(range.get_value((1, 4)), Some(&Data::Float(1000.0)));
        assert_eq!(range.get_value((1, 5)), Some(&Data::Float(200.0)));
        assert_eq!(range.get_value((1, 6)), Some(&Data::Float(800.0)));
        assert_eq!(range.get_value((1, 10)), Some(&Data::String("P123456789".to_string())));
        assert_eq!(range.get_value((2, 1)), Some(&Data::String("Compost".to_string())));
        assert!(matches!(range.get_value((1, 0)), None | Some(Data::Empty)));
        assert!(matches!(range.get_value((1, 8)), None | Some(Data::Empty)));

        let serial = match range.get_value((1, 2)) {
            Some(Data::DateTime(date)) => date.as_f64(),
            Some(Data::Float(value)) => *value,
            other => panic!("unexpected date cell {:?}", other),
        };
        assert_eq!(serial, 45662.0);
    }

    #[test]
    fn test_cell_formats() {
        assert_eq!(
            date_cell_format(),
            Format::new()
                .set_num_format("dd/mm/yyyy")
                .set_align(FormatAlign::Right)
        );
        assert_ne!(date_cell_format(), Format::new().set_num_format("dd/mm/yyyy"));
        assert_eq!(right_aligned_format(), Format::new().set_align(FormatAlign::Right));
        assert_ne!(right_aligned_format(), Format::new());
    }

    #[test]
    fn test_xlsx_date_outside_excel_range() {
        let mut records = sample_records();
        records.push(
            TicketRecord::new(
                "P555555555",
                NaiveDate::from_ymd_opt(1025, 1, 5).unwrap(),
                700,
                100,
                600,
                WasteCategory::Flytip,
            )
            .unwrap(),
        );

        let bytes = ReportBuilder::new(ReportFormat::Xlsx).render(&records).unwrap();

        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range(SHEET_TITLE).unwrap();
        assert_eq!(range.get_value((3, 2)), Some(&Data::String("05/01/1025".to_string())));
        assert_eq!(range.get_value((3, 10)), Some(&Data::String("P555555555".to_string())));
        assert_eq!(range.get_value((1, 10)), Some(&Data::String("P123456789".to_string())));
    }

    #[test]
    fn test_csv_layout() {
        let bytes = ReportBuilder::new(ReportFormat::Csv)
            .render(&sample_records())
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Week,Type,Date,Day,IN,OUT,Nett,Street/Litter,Flytip Monthly,Compost,Ticket No"
        );
        assert_eq!(lines[1], ",Street/Litter,05/01/2025,Sunday,1000,200,800,,,,P123456789");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_report_stem() {
        assert_eq!(report_stem(timestamp()), "suez-glossop-tickets-20250107-093005");
    }

    #[test]
    fn test_write_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::open(dir.path()).unwrap();
        let builder = ReportBuilder::new(ReportFormat::Csv);

        let first = builder.write(&sample_records(), &store, timestamp()).unwrap();
        let second = builder.write(&sample_records(), &store, timestamp()).unwrap();

        assert_eq!(first, "suez-glossop-tickets-20250107-093005.csv");
        assert_eq!(second, "suez-glossop-tickets-20250107-093005-2.csv");
        assert!(store.locate(&first).is_some());
        assert!(store.locate(&second).is_some());

        // Only the two reports remain; no temporary files are left behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_locate_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::open(dir.path().join("reports")).unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"x").unwrap();

        assert!(store.locate("../secret.txt").is_none());
        assert!(store.locate("..").is_none());
        assert!(store.locate("").is_none());
        assert!(store.locate(".hidden").is_none());
        assert!(store.locate("missing.xlsx").is_none());
    }

    #[test]
    fn test_format_from_filename() {
        assert_eq!(ReportFormat::from_filename("a.xlsx"), Some(ReportFormat::Xlsx));
        assert_eq!(ReportFormat::from_filename("a.csv"), Some(ReportFormat::Csv));
        assert_eq!(ReportFormat::from_filename("a"), None);
    }
}
