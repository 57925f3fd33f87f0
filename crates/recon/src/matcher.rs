use crate::classify::{classify_pair, PairVerdict};
use crate::config::MatchConfig;
use crate::model::{TransactionRecord, UnmatchedTransaction};

/// Result of matching the two record lists that share one grouping key.
#[derive(Debug, Default)]
pub struct GroupOutcome {
    pub identical: usize,
    pub unmatched: Vec<UnmatchedTransaction>,
}

/// Greedy LIFO pairing within one key.
///
/// Walks both lists from the tail, pairing the last unconsumed record of each
/// side, until one side runs out. There is no search for a closest candidate:
/// ties resolve purely by position. Whatever is left on either side is
/// reported as missing, in input order.
pub fn match_group(
    left: &[&TransactionRecord],
    right: &[&TransactionRecord],
    config: &MatchConfig,
) -> GroupOutcome {
    let mut outcome = GroupOutcome::default();
    let mut li = left.len();
    let mut ri = right.len();

    while li > 0 && ri > 0 {
        li -= 1;
        ri -= 1;
        let (l, r) = (left[li], right[ri]);

        match classify_pair(l, r, config) {
            PairVerdict::Identical => outcome.identical += 1,
            PairVerdict::Unmatched(reason) => {
                outcome.unmatched.push(UnmatchedTransaction::pair(l, r, reason));
            }
        }
    }

    outcome
        .unmatched
        .extend(left[..li].iter().map(|l| UnmatchedTransaction::left_only(l)));
    outcome
        .unmatched
        .extend(right[..ri].iter().map(|r| UnmatchedTransaction::right_only(r)));

    outcome
}
