//! Grouping key derivation.
//!
//! A non-blank transaction ID always wins (`ID:<id>`). Otherwise records fall
//! back to a composite key `K|<amount>|<bucket>|<profile>|<type>` built from
//! the canonical amount, the date bucket, the normalized profile name and the
//! raw type. The two prefixes keep the families from colliding.

use bigdecimal::BigDecimal;
use chrono::{Duration, Local, LocalResult, NaiveDateTime, Offset, TimeZone};

use crate::config::MatchConfig;
use crate::error::ReconError;
use crate::model::{GroupKey, TransactionRecord};
use crate::normalize::normalize_str;

const ID_PREFIX: &str = "ID:";
const COMPOSITE_PREFIX: &str = "K";
const DELIMITER: &str = "|";
const NULL: &str = "null";

/// Derive the grouping key for one record.
pub fn derive_key(record: &TransactionRecord, config: &MatchConfig) -> Result<GroupKey, ReconError> {
    if let Some(id) = record.usable_id() {
        return Ok(GroupKey::new(format!("{ID_PREFIX}{id}")));
    }

    let amount = match record.transaction_amount {
        Some(ref amount) => canonical_amount(amount),
        None if config.reject_null_amount => {
            return Err(ReconError::MalformedRecord {
                record: describe(record),
                message: "amount is required to derive a composite key".into(),
            });
        }
        None => NULL.to_string(),
    };
    let bucket = match record.transaction_date {
        Some(ref date) => date_bucket(date, config.window_seconds()).to_string(),
        None => NULL.to_string(),
    };
    let profile = normalize_str(&record.profile_name, &config.normalize_options());
    let kind = record
        .transaction_type
        .map(|t| t.to_string())
        .unwrap_or_else(|| NULL.to_string());

    Ok(GroupKey::new(
        [COMPOSITE_PREFIX, &amount, &bucket, &profile, &kind].join(DELIMITER),
    ))
}

/// Plain decimal text without trailing zeros: `100.50` -> `100.5`, `100.00` -> `100`.
pub fn canonical_amount(amount: &BigDecimal) -> String {
    amount.normalized().to_plain_string()
}

/// Local-zone epoch seconds divided by the window (truncating).
pub fn date_bucket(date: &NaiveDateTime, window_seconds: i64) -> i64 {
    local_epoch_seconds(date) / window_seconds.max(1)
}

/// Interpret a naive date-time in the system zone.
///
/// Ambiguous times (clocks going back) take the earlier instant. Times inside
/// a gap (clocks going forward) are read with the offset in force before the
/// gap, which moves them later by the gap length. At the very start of the
/// representable range that offset is taken as zero.
fn local_epoch_seconds(date: &NaiveDateTime) -> i64 {
    match Local.from_local_datetime(date) {
        LocalResult::Single(t) => t.timestamp(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp(),
        LocalResult::None => {
            let offset = date
                .checked_sub_signed(Duration::hours(3))
                .and_then(|before| Local.from_local_datetime(&before).earliest())
                .map(|t| t.offset().fix().local_minus_utc())
                .unwrap_or(0);
            date.and_utc().timestamp() - i64::from(offset)
        }
    }
}

fn describe(record: &TransactionRecord) -> String {
    let date = record
        .transaction_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| NULL.to_string());
    format!("(profile '{}', date {date})", record.profile_name)
}
