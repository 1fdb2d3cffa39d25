//! # Photo Import
//!
//! Parses photo records for `dupegroup import`. Two layouts are accepted:
//!
//! - a JSON array of records
//! - JSON Lines, one record per non-blank line
//!
//! A record is `{"identifier": "...", "hash": "...", "quality": 0.8}`;
//! `hash` and `quality` may be omitted or null. Hashes are stored as given
//! and only parsed when detection runs.

use crate::error::AppError;
use dupegroup_core::PhotoInput;

/// Parse import text in either layout.
pub fn parse_records(text: &str) -> Result<Vec<PhotoInput>, AppError> {
    if text.trim_start().starts_with('[') {
        parse_array(text)
    } else {
        parse_lines(text)
    }
}

fn parse_array(text: &str) -> Result<Vec<PhotoInput>, AppError> {
    let records: Vec<PhotoInput> = serde_json::from_str(text).map_err(|e| AppError::Input {
        location: format!("line {}", e.line()),
        message: e.to_string(),
    })?;
    for (index, record) in records.iter().enumerate() {
        check_record(record, || format!("record {}", index + 1))?;
    }
    Ok(records)
}

fn parse_lines(text: &str) -> Result<Vec<PhotoInput>, AppError> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let location = || format!("line {}", index + 1);
        let record: PhotoInput = serde_json::from_str(line).map_err(|e| AppError::Input {
            location: location(),
            message: e.to_string(),
        })?;
        check_record(&record, location)?;
        records.push(record);
    }
    Ok(records)
}

fn check_record(record: &PhotoInput, location: impl Fn() -> String) -> Result<(), AppError> {
    if record.identifier.as_str().trim().is_empty() {
        return Err(AppError::Input {
            location: location(),
            message: "identifier must not be empty".to_string(),
        });
    }
    Ok(())
}
