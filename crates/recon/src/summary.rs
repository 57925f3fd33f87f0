use crate::model::{ReasonCounts, UnmatchedReason, UnmatchedTransaction};

/// Count unmatched outcomes per reason.
pub fn compute_breakdown(unmatched: &[UnmatchedTransaction]) -> ReasonCounts {
    let mut counts = ReasonCounts::default();

    for u in unmatched {
        match u.reason {
            UnmatchedReason::DetailsMismatch => counts.details_mismatch += 1,
            UnmatchedReason::NotIdentical => counts.not_identical += 1,
            UnmatchedReason::MissingInOtherFile => {
                if u.left.is_some() {
                    counts.missing_left_only += 1;
                } else {
                    counts.missing_right_only += 1;
                }
            }
        }
    }

    counts
}
