use std::collections::BTreeMap;

use crate::config::MatchConfig;
use crate::error::ReconError;
use crate::key::derive_key;
use crate::model::{GroupKey, TransactionRecord};

/// Records bucketed by grouping key, each bucket in input order.
pub type GroupedRecords<'a> = BTreeMap<GroupKey, Vec<&'a TransactionRecord>>;

/// Bucket records by grouping key. Append-only: no dedup, no reordering.
pub fn group_records<'a>(
    records: &'a [TransactionRecord],
    config: &MatchConfig,
) -> Result<GroupedRecords<'a>, ReconError> {
    let mut groups: GroupedRecords<'a> = BTreeMap::new();

    for record in records {
        let key = derive_key(record, config)?;
        groups.entry(key).or_default().push(record);
    }

    Ok(groups)
}
