use crate::config::MatchConfig;
use crate::model::{TransactionRecord, UnmatchedReason};
use crate::normalize::normalize;

/// Outcome of comparing one left record against one right record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairVerdict {
    Identical,
    Unmatched(UnmatchedReason),
}

/// Classify a pair with fixed precedence: identical, details mismatch, not identical.
pub fn classify_pair(left: &TransactionRecord, right: &TransactionRecord, config: &MatchConfig) -> PairVerdict {
    if are_identical(left, right, config) {
        PairVerdict::Identical
    } else if amounts_equal(left, right) && details_differ(left, right, config) {
        PairVerdict::Unmatched(UnmatchedReason::DetailsMismatch)
    } else {
        PairVerdict::Unmatched(UnmatchedReason::NotIdentical)
    }
}

/// Field-by-field equality on the raw values.
///
/// Amounts compare by numeric value; everything else exactly. Type and wallet
/// reference are skipped when the config takes them out of identity.
pub fn are_identical(a: &TransactionRecord, b: &TransactionRecord, config: &MatchConfig) -> bool {
    a.profile_name == b.profile_name
        && a.transaction_date == b.transaction_date
        && amounts_equal(a, b)
        && a.transaction_narrative == b.transaction_narrative
        && a.transaction_description == b.transaction_description
        && a.transaction_id == b.transaction_id
        && (!config.consider_transaction_type || a.transaction_type == b.transaction_type)
        && (!config.compare_wallet_reference || a.wallet_reference == b.wallet_reference)
}

fn amounts_equal(a: &TransactionRecord, b: &TransactionRecord) -> bool {
    a.transaction_amount == b.transaction_amount
}

fn details_differ(a: &TransactionRecord, b: &TransactionRecord, config: &MatchConfig) -> bool {
    let opts = config.normalize_options();
    let narrative_differs = normalize(Some(a.transaction_narrative.as_str()), &opts)
        != normalize(Some(b.transaction_narrative.as_str()), &opts);
    let wallet_differs = config.compare_wallet_reference
        && normalize(a.wallet_reference.as_deref(), &opts)
            != normalize(b.wallet_reference.as_deref(), &opts);
    narrative_differs || wallet_differs
}
