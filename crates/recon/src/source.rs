//! CSV transaction sources.
//!
//! Both files share one layout, columns addressed by header name:
//!
//! ```text
//! ProfileName,TransactionDate,TransactionAmount,TransactionNarrative,
//! TransactionDescription,TransactionID,TransactionType,WalletReference
//! ```
//!
//! Dates are `yyyy-MM-dd HH:mm:ss` in local time. Exports often end every line
//! with a stray comma; one trailing comma per line is dropped before parsing.

use std::io::ErrorKind as IoErrorKind;
use std::path::Path;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;

use crate::config::ReconConfig;
use crate::engine::reconcile;
use crate::error::ReconError;
use crate::model::{ReconResult, TransactionRecord};
use crate::retry::RetryPolicy;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const COL_PROFILE: &str = "ProfileName";
const COL_DATE: &str = "TransactionDate";
const COL_AMOUNT: &str = "TransactionAmount";
const COL_NARRATIVE: &str = "TransactionNarrative";
const COL_DESCRIPTION: &str = "TransactionDescription";
const COL_ID: &str = "TransactionID";
const COL_TYPE: &str = "TransactionType";
const COL_WALLET: &str = "WalletReference";

/// Parse CSV text into records, in file order.
///
/// Missing columns read as blank. Blank dates, amounts and types are absent;
/// non-blank values that do not parse fail the whole source.
pub fn load_csv_records(source_name: &str, csv_data: &str) -> Result<Vec<TransactionRecord>, ReconError> {
    let cleaned = strip_trailing_commas(csv_data);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(cleaned.as_bytes());

    let csv_err = |message: String| ReconError::CsvProcessing {
        source: source_name.into(),
        message,
    };

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_err(format!("cannot read header: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let idx = |name: &str| headers.iter().position(|h| h == name);
    let profile_idx = idx(COL_PROFILE);
    let date_idx = idx(COL_DATE);
    let amount_idx = idx(COL_AMOUNT);
    let narrative_idx = idx(COL_NARRATIVE);
    let description_idx = idx(COL_DESCRIPTION);
    let id_idx = idx(COL_ID);
    let type_idx = idx(COL_TYPE);
    let wallet_idx = idx(COL_WALLET);

    let mut records = Vec::new();

    for (i, row) in reader.records().enumerate() {
        // Header is line 1.
        let line = i + 2;
        let row = row.map_err(|e| csv_err(format!("row {line}: {e}")))?;
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).unwrap_or("").trim_start();

        let transaction_date = parse_opt(cell(date_idx), |s| NaiveDateTime::parse_from_str(s.trim_end(), DATE_FORMAT))
            .map_err(|v| csv_err(format!("row {line}: invalid {COL_DATE} '{v}', expected yyyy-MM-dd HH:mm:ss")))?;
        let transaction_amount = parse_opt(cell(amount_idx), |s| BigDecimal::from_str(s.trim_end()))
            .map_err(|v| csv_err(format!("row {line}: invalid {COL_AMOUNT} '{v}'")))?;
        let transaction_type = parse_opt(cell(type_idx), |s| s.trim_end().parse::<i32>())
            .map_err(|v| csv_err(format!("row {line}: invalid {COL_TYPE} '{v}'")))?;

        records.push(TransactionRecord {
            profile_name: cell(profile_idx).to_string(),
            transaction_date,
            transaction_amount,
            transaction_narrative: cell(narrative_idx).to_string(),
            transaction_description: cell(description_idx).to_string(),
            transaction_id: non_blank(cell(id_idx)),
            transaction_type,
            wallet_reference: non_blank(cell(wallet_idx)),
        });
    }

    log::info!("Loaded {} record(s) from {source_name}", records.len());
    Ok(records)
}

/// Read a source file. Absent and zero-byte files are rejected up front.
///
/// Text is decoded as UTF-8; invalid sequences become U+FFFD.
pub fn read_source(path: &Path, name: &str) -> Result<String, ReconError> {
    let empty = || ReconError::InvalidInput(format!("{name} is required and must not be empty"));

    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == IoErrorKind::NotFound => return Err(empty()),
        Err(e) => return Err(ReconError::Io(format!("cannot read {}: {e}", path.display()))),
    };
    if !meta.is_file() || meta.len() == 0 {
        return Err(empty());
    }

    let bytes = std::fs::read(path).map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            log::warn!("{name} ({}) is not valid UTF-8; undecodable bytes replaced", path.display());
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

/// Validate the config, load both files and reconcile, retrying IO failures.
pub fn reconcile_files(left_path: &Path, right_path: &Path, config: &ReconConfig) -> Result<ReconResult, ReconError> {
    config.validate()?;
    let policy = RetryPolicy::from(&config.retry);

    policy.run("reconcile", || {
        let left_data = read_source(left_path, "file1")?;
        let right_data = read_source(right_path, "file2")?;
        let left = load_csv_records(&left_path.display().to_string(), &left_data)?;
        let right = load_csv_records(&right_path.display().to_string(), &right_data)?;
        reconcile(&left, &right, &config.matching)
    })
}

fn strip_trailing_commas(data: &str) -> String {
    let mut out = String::with_capacity(data.len());
    for line in data.lines() {
        out.push_str(line.strip_suffix(',').unwrap_or(line));
        out.push('\n');
    }
    out
}

/// Blank means absent. On failure returns the offending text.
fn parse_opt<T, E>(value: &str, parse: impl FnOnce(&str) -> Result<T, E>) -> Result<Option<T>, String> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse(value).map(Some).map_err(|_| value.to_string())
}

fn non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
