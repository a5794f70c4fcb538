use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::record::Record;

pub type DateBuckets = BTreeMap<NaiveDate, Vec<Record>>;

/// Group records by the calendar date of their cast time, keeping discovery order.
pub fn bucket_by_date<I>(records: I) -> DateBuckets
where
    I: IntoIterator<Item = Record>,
{
    let mut out = DateBuckets::new();
    for r in records {
        out.entry(r.timestamp.date()).or_default().push(r);
    }
    out
}
