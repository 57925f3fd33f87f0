use std::collections::BTreeSet;
use std::time::Instant;

use crate::config::MatchConfig;
use crate::error::ReconError;
use crate::group::{group_records, GroupedRecords};
use crate::matcher::match_group;
use crate::model::{ReconResult, TransactionRecord};

/// Reconcile two record lists. Returns the matched count and every unmatched outcome.
///
/// Either side may be empty. Any record that cannot be keyed aborts the run;
/// there are no partial results.
pub fn reconcile(
    left: &[TransactionRecord],
    right: &[TransactionRecord],
    config: &MatchConfig,
) -> Result<ReconResult, ReconError> {
    let started = Instant::now();
    log::info!(
        "Starting reconciliation: {} left record(s), {} right record(s)",
        left.len(),
        right.len()
    );

    let (left_groups, right_groups) = group_both(left, right, config)?;

    let keys: BTreeSet<_> = left_groups.keys().chain(right_groups.keys()).collect();

    let mut matched = 0usize;
    let mut unmatched = Vec::new();
    for key in keys {
        let l = left_groups.get(key).map(Vec::as_slice).unwrap_or(&[]);
        let r = right_groups.get(key).map(Vec::as_slice).unwrap_or(&[]);
        log::debug!("key {key}: {} left, {} right", l.len(), r.len());

        let outcome = match_group(l, r, config);
        matched += outcome.identical;
        unmatched.extend(outcome.unmatched);
    }

    let result = ReconResult::new(matched, unmatched);
    let counts = result.breakdown();
    log::info!(
        "Reconciliation completed in {}ms. Results: {} matched, {} unmatched (details mismatch: {}, not identical: {}, missing: {})",
        started.elapsed().as_millis(),
        result.matched_count,
        result.unmatched_count,
        counts.details_mismatch,
        counts.not_identical,
        counts.missing()
    );

    Ok(result)
}

/// Group both sides concurrently. Each thread owns its map until the join.
fn group_both<'a>(
    left: &'a [TransactionRecord],
    right: &'a [TransactionRecord],
    config: &MatchConfig,
) -> Result<(GroupedRecords<'a>, GroupedRecords<'a>), ReconError> {
    let (left_groups, right_groups) = std::thread::scope(|s| {
        let l = s.spawn(|| group_records(left, config));
        let r = s.spawn(|| group_records(right, config));
        let left_groups = l.join().unwrap_or_else(|e| std::panic::resume_unwind(e));
        let right_groups = r.join().unwrap_or_else(|e| std::panic::resume_unwind(e));
        (left_groups, right_groups)
    });
    Ok((left_groups?, right_groups?))
}
