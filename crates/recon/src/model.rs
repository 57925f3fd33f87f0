use std::fmt;

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One transaction as read from either source.
///
/// Equality is structural. `BigDecimal` compares by numeric value, so `100.50`
/// and `100.5` are equal amounts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TransactionRecord {
    pub profile_name: String,
    pub transaction_date: Option<NaiveDateTime>,
    pub transaction_amount: Option<BigDecimal>,
    pub transaction_narrative: String,
    pub transaction_description: String,
    pub transaction_id: Option<String>,
    pub transaction_type: Option<i32>,
    pub wallet_reference: Option<String>,
}

impl TransactionRecord {
    /// The transaction ID if present and not blank.
    pub fn usable_id(&self) -> Option<&str> {
        self.transaction_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Grouping key shared by records that are candidates for pairing.
///
/// Either `ID:<id>` or `K|<amount>|<bucket>|<profile>|<type>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupKey(String);

impl GroupKey {
    pub(crate) fn new(key: String) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_id_key(&self) -> bool {
        self.0.starts_with("ID:")
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnmatchedReason {
    /// Exactly one side has the record.
    MissingInOtherFile,
    /// Same amount, but narrative or wallet reference differ after normalization.
    DetailsMismatch,
    /// Any other material difference.
    NotIdentical,
}

impl fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInOtherFile => write!(f, "MISSING_IN_OTHER_FILE"),
            Self::DetailsMismatch => write!(f, "DETAILS_MISMATCH"),
            Self::NotIdentical => write!(f, "NOT_IDENTICAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedTransaction {
    pub transaction_id: Option<String>,
    pub left: Option<TransactionRecord>,
    pub right: Option<TransactionRecord>,
    pub reason: UnmatchedReason,
}

impl UnmatchedTransaction {
    pub fn pair(left: &TransactionRecord, right: &TransactionRecord, reason: UnmatchedReason) -> Self {
        Self {
            transaction_id: coalesce_id(Some(left), Some(right)),
            left: Some(left.clone()),
            right: Some(right.clone()),
            reason,
        }
    }

    pub fn left_only(left: &TransactionRecord) -> Self {
        Self {
            transaction_id: coalesce_id(Some(left), None),
            left: Some(left.clone()),
            right: None,
            reason: UnmatchedReason::MissingInOtherFile,
        }
    }

    pub fn right_only(right: &TransactionRecord) -> Self {
        Self {
            transaction_id: coalesce_id(None, Some(right)),
            left: None,
            right: Some(right.clone()),
            reason: UnmatchedReason::MissingInOtherFile,
        }
    }
}

/// First non-blank transaction ID, left side preferred.
fn coalesce_id(left: Option<&TransactionRecord>, right: Option<&TransactionRecord>) -> Option<String> {
    left.and_then(TransactionRecord::usable_id)
        .or_else(|| right.and_then(TransactionRecord::usable_id))
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReasonCounts {
    pub details_mismatch: usize,
    pub not_identical: usize,
    pub missing_left_only: usize,
    pub missing_right_only: usize,
}

impl ReasonCounts {
    pub fn missing(&self) -> usize {
        self.missing_left_only + self.missing_right_only
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconResult {
    pub matched_count: usize,
    pub unmatched_count: usize,
    pub unmatched: Vec<UnmatchedTransaction>,
}

impl ReconResult {
    pub fn new(matched_count: usize, unmatched: Vec<UnmatchedTransaction>) -> Self {
        Self {
            matched_count,
            unmatched_count: unmatched.len(),
            unmatched,
        }
    }

    pub fn breakdown(&self) -> ReasonCounts {
        crate::summary::compute_breakdown(&self.unmatched)
    }

    pub fn is_reconciled(&self) -> bool {
        self.unmatched.is_empty()
    }
}
