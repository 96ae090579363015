//! CSV ingestion for SpendSmart.
//!
//! Reads an uploaded transaction file into [`RawRecord`]s for the cleaning
//! pipeline. Column names are normalized at the boundary; individual cell
//! failures become nulls rather than aborting the load.

use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use spend_core::error::{Result, SpendError};

// ── Columns ───────────────────────────────────────────────────────────────────

/// The eight columns the dashboard understands, in display order.
pub const EXPECTED_COLUMNS: &[&str] = &[
    "Date",
    "Amount",
    "Category",
    "Subcategory",
    "Mode",
    "Income/Expense",
    "Currency",
    "Note",
];

/// Positions of the recognized columns within the header row.
///
/// `Amount`, `Category`, `Mode`, `Income/Expense` and `Currency` must be
/// present for the load to succeed. `Date` is optional and degrades the
/// calendar-derived aggregates when absent; `Subcategory` and `Note` are
/// optional and defaulted during cleaning.
#[derive(Debug, Clone, Default)]
struct ColumnIndex {
    date: Option<usize>,
    amount: Option<usize>,
    category: Option<usize>,
    subcategory: Option<usize>,
    mode: Option<usize>,
    income_expense: Option<usize>,
    currency: Option<usize>,
    note: Option<usize>,
}

impl ColumnIndex {
    /// Map a header row onto column positions.
    ///
    /// Header names are trimmed and matched case-insensitively; the first
    /// occurrence of a name wins.
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut index = Self::default();
        for (pos, name) in headers.iter().enumerate() {
            let slot = match name.trim().to_ascii_lowercase().as_str() {
                "date" => &mut index.date,
                "amount" => &mut index.amount,
                "category" => &mut index.category,
                "subcategory" => &mut index.subcategory,
                "mode" => &mut index.mode,
                "income/expense" => &mut index.income_expense,
                "currency" => &mut index.currency,
                "note" => &mut index.note,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(pos);
            }
        }
        index
    }

    /// Fail with the first missing required column.
    fn require(&self) -> Result<()> {
        if self.amount.is_none() {
            return Err(SpendError::MissingColumn("Amount"));
        }
        if self.category.is_none() {
            return Err(SpendError::MissingColumn("Category"));
        }
        if self.mode.is_none() {
            return Err(SpendError::MissingColumn("Mode"));
        }
        if self.income_expense.is_none() {
            return Err(SpendError::MissingColumn("Income/Expense"));
        }
        if self.currency.is_none() {
            return Err(SpendError::MissingColumn("Currency"));
        }
        Ok(())
    }

    /// Display names of the recognized columns present, in display order.
    fn present_columns(&self) -> Vec<&'static str> {
        let slots = [
            (self.date, "Date"),
            (self.amount, "Amount"),
            (self.category, "Category"),
            (self.subcategory, "Subcategory"),
            (self.mode, "Mode"),
            (self.income_expense, "Income/Expense"),
            (self.currency, "Currency"),
            (self.note, "Note"),
        ];
        slots
            .into_iter()
            .filter(|(slot, _)| slot.is_some())
            .map(|(_, name)| name)
            .collect()
    }
}

// ── RawRecord / RawTable ──────────────────────────────────────────────────────

/// One row as loaded, before cleaning.
///
/// `None` marks an empty cell (or, for `amount`, a value that failed
/// numeric coercion). The date cell is carried as raw text so the
/// strict-completeness drop sees the pre-parse value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub date: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub mode: Option<String>,
    pub flow: Option<String>,
    pub currency: Option<String>,
    pub note: Option<String>,
}

/// The parsed but not-yet-cleaned table.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Rows in file order.
    pub records: Vec<RawRecord>,
    /// Whether the file carried a `Date` column at all.
    pub has_date_column: bool,
    /// Recognized columns present in the file, in display order.
    pub columns: Vec<&'static str>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Open and read a transaction CSV from disk.
pub fn read_csv_file(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).map_err(|source| SpendError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(std::io::BufReader::new(file))
}

/// Read a transaction CSV from any byte stream.
///
/// Malformed individual records are skipped with a warning; only a missing
/// required column or an unreadable header row fails the whole load.
pub fn read_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let index = ColumnIndex::from_headers(&headers);
    index.require()?;

    if index.date.is_none() {
        warn!("The 'Date' column does not exist in the dataset; calendar fields are unavailable");
    }

    let mut records: Vec<RawRecord> = Vec::new();
    for row_result in csv_reader.records() {
        let row = match row_result {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping malformed CSV record: {}", e);
                continue;
            }
        };
        records.push(parse_record(&row, &index));
    }

    debug!("Loaded {} rows from CSV", records.len());

    Ok(RawTable {
        records,
        has_date_column: index.date.is_some(),
        columns: index.present_columns(),
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Fetch a cell by optional column position; empty cells (and cells beyond
/// a short row's end) become `None`.
fn cell<'a>(row: &'a csv::StringRecord, slot: Option<usize>) -> Option<&'a str> {
    let value = row.get(slot?)?;
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(|s| s.to_string())
}

fn parse_record(row: &csv::StringRecord, index: &ColumnIndex) -> RawRecord {
    let amount = cell(row, index.amount).and_then(|s| {
        let parsed = s.trim().parse::<f64>().ok();
        if parsed.is_none() {
            debug!("Amount cell \"{}\" failed numeric coercion", s);
        }
        parsed
    });

    RawRecord {
        date: owned(cell(row, index.date)),
        amount,
        category: owned(cell(row, index.category)),
        subcategory: owned(cell(row, index.subcategory)),
        mode: owned(cell(row, index.mode)),
        flow: owned(cell(row, index.income_expense)),
        currency: owned(cell(row, index.currency)),
        note: owned(cell(row, index.note)),
    }
}

// ── Timestamp parsing ─────────────────────────────────────────────────────────

/// Parse a raw date cell using a series of common patterns.
///
/// Returns `None` when no pattern matches; callers treat that as a
/// row-level null rather than a failure.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
        "%m/%d/%Y %H:%M:%S",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    // Date-only patterns land at midnight.
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    warn!("Could not parse date string \"{}\"", s);
    None
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    const HEADER: &str = "Date,Amount,Category,Subcategory,Mode,Income/Expense,Currency,Note";

    fn write_csv(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn load(lines: &[&str]) -> RawTable {
        let content = lines.join("\n");
        read_csv(Cursor::new(content)).unwrap()
    }

    // ── read_csv ──────────────────────────────────────────────────────────────

    #[test]
    fn test_read_csv_basic_row() {
        let table = load(&[
            HEADER,
            "2023-01-15 10:30:00,250.5,Food,Lunch,Cash,Expense,INR,team lunch",
        ]);

        assert_eq!(table.len(), 1);
        assert!(table.has_date_column);
        let record = &table.records[0];
        assert_eq!(record.date.as_deref(), Some("2023-01-15 10:30:00"));
        assert_eq!(record.amount, Some(250.5));
        assert_eq!(record.category.as_deref(), Some("Food"));
        assert_eq!(record.subcategory.as_deref(), Some("Lunch"));
        assert_eq!(record.mode.as_deref(), Some("Cash"));
        assert_eq!(record.flow.as_deref(), Some("Expense"));
        assert_eq!(record.currency.as_deref(), Some("INR"));
        assert_eq!(record.note.as_deref(), Some("team lunch"));
    }

    #[test]
    fn test_read_csv_normalizes_header_case_and_whitespace() {
        let table = load(&[
            " DATE , amount ,CATEGORY,Subcategory,mode,income/expense,Currency,note",
            "2023-01-15,100,Food,,UPI,Expense,INR,",
        ]);
        assert!(table.has_date_column);
        assert_eq!(table.records[0].amount, Some(100.0));
        assert_eq!(table.records[0].category.as_deref(), Some("Food"));
    }

    #[test]
    fn test_read_csv_empty_cells_become_null() {
        let table = load(&[HEADER, "2023-01-15,100,Food,,UPI,Expense,INR,"]);
        let record = &table.records[0];
        assert_eq!(record.subcategory, None);
        assert_eq!(record.note, None);
    }

    #[test]
    fn test_read_csv_amount_coercion_failure_is_null() {
        let table = load(&[HEADER, "2023-01-15,not-a-number,Food,,UPI,Expense,INR,"]);
        assert_eq!(table.records[0].amount, None);
    }

    #[test]
    fn test_read_csv_short_rows_are_padded() {
        let table = load(&[HEADER, "2023-01-15,100,Food"]);
        let record = &table.records[0];
        assert_eq!(record.amount, Some(100.0));
        assert_eq!(record.mode, None);
        assert_eq!(record.currency, None);
    }

    #[test]
    fn test_read_csv_missing_required_column_fails() {
        let result = read_csv(Cursor::new(
            "Date,Category,Subcategory,Mode,Income/Expense,Currency,Note\n2023-01-15,Food,,UPI,Expense,INR,",
        ));
        match result {
            Err(SpendError::MissingColumn(column)) => assert_eq!(column, "Amount"),
            Err(other) => panic!("expected MissingColumn error, got {:?}", other),
            Ok(_) => panic!("expected MissingColumn error, load succeeded"),
        }
    }

    #[test]
    fn test_read_csv_missing_date_column_degrades() {
        let table = load(&[
            "Amount,Category,Subcategory,Mode,Income/Expense,Currency,Note",
            "100,Food,,UPI,Expense,INR,",
        ]);
        assert!(!table.has_date_column);
        assert_eq!(table.len(), 1);
        assert!(!table.columns.contains(&"Date"));
    }

    #[test]
    fn test_read_csv_columns_in_display_order() {
        let table = load(&[
            "Note,Currency,Income/Expense,Mode,Subcategory,Category,Amount,Date",
            "n,INR,Expense,UPI,s,Food,10,2023-01-15",
        ]);
        assert_eq!(table.columns, EXPECTED_COLUMNS);
        // Values still land in the right fields despite the shuffled order.
        assert_eq!(table.records[0].amount, Some(10.0));
        assert_eq!(table.records[0].date.as_deref(), Some("2023-01-15"));
    }

    // ── read_csv_file ─────────────────────────────────────────────────────────

    #[test]
    fn test_read_csv_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "transactions.csv",
            &[HEADER, "2023-01-15,100,Food,,UPI,Expense,INR,"],
        );

        let table = read_csv_file(&path).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_read_csv_file_missing_file_reports_path() {
        let err = read_csv_file(Path::new("/tmp/does-not-exist-spendsmart.csv")).unwrap_err();
        assert!(err.to_string().contains("does-not-exist-spendsmart.csv"));
    }

    // ── parse_timestamp ───────────────────────────────────────────────────────

    #[test]
    fn test_parse_timestamp_datetime_formats() {
        for raw in [
            "2023-01-15 10:30:00",
            "2023-01-15T10:30:00",
            "15/01/2023 10:30",
        ] {
            let dt = parse_timestamp(raw).unwrap();
            assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2023-01-15 10:30");
        }
    }

    #[test]
    fn test_parse_timestamp_date_only_lands_at_midnight() {
        let dt = parse_timestamp("2023-01-15").unwrap();
        assert_eq!(dt.format("%H:%M:%S").to_string(), "00:00:00");
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
    }
}
