//! Brazilian locale helpers: parsing numbers and dates as they appear in exported
//! spreadsheets, and formatting values back for display (`R$ 1.234,56`, `dd/mm/yyyy`).

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use crate::value::Value;

lazy_static! {
    static ref LEADING_FLOAT: Regex = Regex::new(r"^\s*[-+]?(\d+\.?\d*|\.\d+)([eE][-+]?\d+)?").unwrap();
    static ref LEADING_INT: Regex = Regex::new(r"^\s*[-+]?\d+").unwrap();
}

const MONTH_ABBREV: [&str; 12] = ["Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez"];

const MONTH_NAMES: [&str; 12] = [
    "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho",
    "Julho", "Agosto", "Setembro", "Outubro", "Novembro", "Dezembro",
];

/// Largest serial Excel accepts (31/12/9999)
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Parse the longest leading float of a string, e.g. "12.5abc" gives 12.5
fn parse_float_prefix(s: &str) -> Option<f64> {
    LEADING_FLOAT.find(s).and_then(|m| m.as_str().trim().parse::<f64>().ok())
}

fn parse_int_prefix(s: &str) -> Option<i64> {
    LEADING_INT.find(s).and_then(|m| m.as_str().trim().parse::<i64>().ok())
}

/// Convert a Brazilian formatted number, e.g. "1.234,56", to 1234.56.
/// Anything unparsable is 0.
pub(crate) fn parse_number(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }
    let cleaned = s.replace('.', "").replacen(',', ".", 1);
    parse_float_prefix(&cleaned).unwrap_or(0.0)
}

/// Convert a Brazilian currency string, e.g. "R$ 1.234,56", to 1234.56
pub(crate) fn parse_currency(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }
    let stripped: String = s.chars().filter(|c| *c != 'R' && *c != '$' && !c.is_whitespace()).collect();
    parse_number(&stripped)
}

/// Lenient numeric extraction used by the aggregations. Numbers pass through,
/// text keeps only digits and separators, everything else counts as 0.
pub(crate) fn extract_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) if n.is_finite() => *n,
        Value::Text(s) => {
            let cleaned: String = s.chars().filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.' || *c == '-').collect();
            parse_float_prefix(&cleaned.replacen(',', ".", 1)).unwrap_or(0.0)
        }
        _ => 0.0,
    }
}

/// Parse `dd/mm/yyyy`. Needs exactly three parts forming a real calendar date.
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.trim().split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let day = parse_int_prefix(parts[0])?;
    let month = parse_int_prefix(parts[1])?;
    let year = parse_int_prefix(parts[2])?;
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
}

/// Parse `mm/yyyy` into the first day of that month
pub(crate) fn parse_month_year(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.trim().split('/').collect();
    if parts.len() != 2 {
        return None;
    }
    let month = parse_int_prefix(parts[0])?;
    let year = parse_int_prefix(parts[1])?;
    if !(1..=12).contains(&month) {
        return None;
    }
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month as u32, 1)
}

/// Parse ISO style `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` (with or without zone suffix)
pub(crate) fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.len() >= 19 {
        let head = s.get(0..19)?;
        if let Ok(dt) = NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M:%S") {
            return Some(dt);
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(head, "%Y-%m-%d %H:%M:%S") {
            return Some(dt);
        }
    }
    let head = s.get(0..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Convert an Excel 1900-system serial into a date time.
///
/// Excel counts 1900-01-01 as serial 1 and wrongly treats 1900 as a leap year, so
/// serial 60 is a phantom 29/02/1900. Serials before it count from 31/12/1899,
/// later ones from 30/12/1899. The fraction is the time of day.
pub(crate) fn excel_serial_to_date(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let days = serial.floor();
    let seconds = ((serial - days) * 86_400.0).round() as i64;
    let epoch = if days < 60.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    let midnight = epoch.and_hms_opt(0, 0, 0)?;
    midnight.checked_add_signed(Duration::days(days as i64))?
        .checked_add_signed(Duration::seconds(seconds))
}

/// Format with `.` as thousands and `,` as decimal separator, e.g. 1.234,56
pub(crate) fn format_number(value: f64, decimals: usize) -> String {
    let rounded = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match rounded.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (rounded.clone(), None),
    };

    let mut grouped = String::new();
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let is_zero = rounded.chars().all(|c| c == '0' || c == '.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    match fraction {
        Some(f) => format!("{sign}{grouped},{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Format a Brazilian real amount, e.g. R$ 1.234,56
pub(crate) fn format_currency(value: f64) -> String {
    let body = format_number(value.abs(), 2);
    if value < 0.0 && body != "0,00" {
        format!("-R$ {body}")
    } else {
        format!("R$ {body}")
    }
}

pub(crate) fn format_date<D: Datelike>(date: &D) -> String {
    format!("{:02}/{:02}/{}", date.day(), date.month(), date.year())
}

/// Print a number the way a spreadsheet shows a raw cell: integers without a fraction
pub(crate) fn plain_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// `Jan` .. `Dez`, empty for an invalid month
pub(crate) fn month_abbrev(month: u32) -> &'static str {
    match month {
        1..=12 => MONTH_ABBREV[month as usize - 1],
        _ => "",
    }
}

/// `Janeiro` .. `Dezembro`, empty for an invalid month
pub(crate) fn month_name(month: u32) -> &'static str {
    match month {
        1..=12 => MONTH_NAMES[month as usize - 1],
        _ => "",
    }
}

/// Sortable month key, e.g. 2024-03
pub(crate) fn month_key<D: Datelike>(date: &D) -> String {
    format!("{}-{:02}", date.year(), date.month())
}

/// Turn a month key `2024-03` into its label `Mar/2024`
pub(crate) fn month_key_label(key: &str) -> String {
    match key.split_once('-') {
        Some((year, month)) => {
            let month = month.parse::<u32>().unwrap_or(0);
            format!("{}/{}", month_abbrev(month), year)
        }
        None => key.to_string(),
    }
}
