pub(crate) mod column;


use std::fs;
use std::path::Path;
use calamine::{open_workbook_auto, Data, Reader};
use encoding_rs::WINDOWS_1252;
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use thiserror::Error;
use crate::value::{Row, Value};

/// Extensions accepted for import
const SUPPORTED_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "csv"];

/// Extra workbook formats calamine can open
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Header given to columns with a blank title
const EMPTY_HEADER: &str = "__EMPTY";

lazy_static! {
    static ref PLAIN_NUMBER: Regex = Regex::new(r"^-?\d+(\.\d+)?$").unwrap();
}

#[derive(Error, Debug)]
pub(crate) enum SheetError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Unsupported file {0}. Please select a .xlsx, .xls or .csv file")]
    UnsupportedFile(String),
    #[error("Sheet {0} not found")]
    SheetNotFound(usize),
    #[error("Unable to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("Unable to read csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rows of one sheet, keyed by the header row
#[derive(Debug, Default)]
pub(crate) struct Sheet {
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Row>,
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Whether a file looks like a spreadsheet export we can import
pub(crate) fn is_valid_sheet_file(path: &Path) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension_of(path).as_str())
}

/// Read a sheet with its first row as header. Cell values are kept raw:
/// numbers (and date serials) stay numbers, blank cells become null.
pub(crate) fn read_sheet(path: &Path, sheet_index: usize) -> Result<Sheet, SheetError> {
    if !path.exists() {
        return Err(SheetError::FileNotFound(path.display().to_string()));
    }

    let extension = extension_of(path);
    info!("Reading {} as {}", path.display(), extension);
    if extension == "csv" {
        read_csv(path)
    } else if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        read_workbook(path, sheet_index)
    } else {
        Err(SheetError::UnsupportedFile(path.display().to_string()))
    }
}

fn read_workbook(path: &Path, sheet_index: usize) -> Result<Sheet, SheetError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range_at(sheet_index)
        .ok_or(SheetError::SheetNotFound(sheet_index))??;

    let mut rows_iter = range.rows();
    let columns = match rows_iter.next() {
        Some(header_row) => unique_headers(header_row.iter().map(|c| c.to_string())),
        None => return Ok(Sheet::default()),
    };

    let mut rows = vec![];
    for cells in rows_iter {
        let values: Vec<Value> = (0..columns.len())
            .map(|i| cells.get(i).map(workbook_cell_value).unwrap_or(Value::Null))
            .collect();
        if let Some(row) = build_row(&columns, values) {
            rows.push(row);
        }
    }

    debug!("Workbook {} has {} data rows", path.display(), rows.len());
    Ok(Sheet { columns, rows })
}

fn workbook_cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) if s.trim().is_empty() => Value::Null,
        Data::String(s) => Value::Text(s.clone()),
        Data::Float(f) => Value::Number(*f),
        Data::Int(i) => Value::Number(*i as f64),
        Data::Bool(b) => Value::Bool(*b),
        // date cells keep their serial number
        Data::DateTime(dt) => Value::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Text(s.clone()),
    }
}

fn read_csv(path: &Path) -> Result<Sheet, SheetError> {
    let content = decode_text(fs::read(path)?);
    let delimiter = detect_delimiter(&content);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let columns = unique_headers(rdr.headers()?.iter().map(|h| h.to_string()));

    let mut rows = vec![];
    for record in rdr.records() {
        let record = record?;
        let values: Vec<Value> = (0..columns.len())
            .map(|i| record.get(i).map(csv_cell_value).unwrap_or(Value::Null))
            .collect();
        if let Some(row) = build_row(&columns, values) {
            rows.push(row);
        }
    }

    debug!("CSV {} has {} data rows", path.display(), rows.len());
    Ok(Sheet { columns, rows })
}

/// UTF-8 when the bytes are valid, Windows-1252 otherwise (older ERP exports)
fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            debug!("CSV is not UTF-8, decoding as Windows-1252");
            let (text, _, _) = WINDOWS_1252.decode(err.as_bytes());
            text.into_owned()
        }
    }
}

/// Brazilian exports are usually `;` separated since `,` is the decimal separator
fn detect_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or_default();
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    if semicolons > commas { b';' } else { b',' }
}

/// Plain numbers (`42`, `3000.50`) become numbers, anything else stays text for the
/// column profile to type
fn csv_cell_value(s: &str) -> Value {
    let s = s.trim();
    if s.is_empty() {
        Value::Null
    } else if PLAIN_NUMBER.is_match(s) {
        s.parse::<f64>().map(Value::Number).unwrap_or_else(|_| Value::Text(s.to_string()))
    } else {
        Value::Text(s.to_string())
    }
}

/// Blank headers are named `__EMPTY`, `__EMPTY_1`, ... and repeated headers get a `_n` suffix
fn unique_headers<I: Iterator<Item = String>>(headers: I) -> Vec<String> {
    let mut result: Vec<String> = vec![];
    for header in headers {
        let base = if header.trim().is_empty() { EMPTY_HEADER.to_string() } else { header };
        let mut candidate = base.clone();
        let mut n = 1;
        while result.contains(&candidate) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        result.push(candidate);
    }
    result
}

/// Skip rows where every cell is blank
fn build_row(columns: &[String], values: Vec<Value>) -> Option<Row> {
    if values.iter().all(Value::is_null) {
        return None;
    }
    Some(columns.iter().cloned().zip(values).collect())
}

/// Column names of a parsed data set, taken from its first row
pub(crate) fn column_names(rows: &[Row]) -> Vec<String> {
    match rows.first() {
        Some(row) => row.columns().map(str::to_string).collect(),
        None => vec![],
    }
}
