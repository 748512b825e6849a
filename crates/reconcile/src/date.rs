//! Date normalization to `YYYY-MM-DD`.
//!
//! Total over its input: blank and zero values become `""`, anything that
//! cannot be read as a date is returned as its raw text.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

use crate::model::CellValue;

const OUTPUT_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Slash dates with the year last are month-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y年%m月%d日",
    "%m/%d/%Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Largest serial Excel can display (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Normalize a date-like cell to `YYYY-MM-DD`.
pub fn normalize_date(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Number(n) if *n == 0.0 || n.is_nan() => String::new(),
        CellValue::Int(0) => String::new(),
        CellValue::Number(n) => from_serial(*n).unwrap_or_else(|| value.to_string()),
        CellValue::Int(n) => from_serial(*n as f64).unwrap_or_else(|| value.to_string()),
        CellValue::DateTime(dt) => dt.format(OUTPUT_FORMAT).to_string(),
        CellValue::Bool(_) => value.to_string(),
        CellValue::Text(s) => normalize_text(s),
    }
}

fn normalize_text(raw: &str) -> String {
    let text = raw.trim();
    if text.is_empty() || text == "0" {
        return String::new();
    }
    match parse_text_date(text) {
        Some(date) => date.format(OUTPUT_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

fn parse_text_date(text: &str) -> Option<NaiveDate> {
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    // Offset timestamps keep the wall-clock date as written.
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local().date());
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return Some(d);
        }
    }
    if text.len() == 8 && text.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(text, "%Y%m%d").ok();
    }
    // Year and month only: first of the month.
    if let Some((year, month)) = text.split_once('-') {
        if year.len() == 4
            && year.bytes().all(|b| b.is_ascii_digit())
            && (1..=2).contains(&month.len())
            && month.bytes().all(|b| b.is_ascii_digit())
        {
            return NaiveDate::parse_from_str(&format!("{year}-{month}-01"), "%Y-%m-%d").ok();
        }
    }
    None
}

/// Excel 1900-system serial (day 60 is the phantom 1900-02-29, so the epoch
/// is 1899-12-30 for every serial after it).
fn from_serial(serial: f64) -> Option<String> {
    if !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_signed(Duration::days(serial.floor() as i64))?;
    Some(date.format(OUTPUT_FORMAT).to_string())
}
