use tracing::warn;

use crate::error::DashboardError;
use crate::models::EnrollmentRecord;
use crate::source::{RecordField, RecordOrder, RecordSource};

pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// "Most recent" slice. The store has no timestamp column, so recency is
/// approximated by last name, descending. Ties keep their input order.
pub fn select_recent(records: &[EnrollmentRecord], n: usize) -> Vec<EnrollmentRecord> {
    let mut recent = records.to_vec();
    recent.sort_by(|a, b| b.last_name.cmp(&a.last_name));
    recent.truncate(n);
    recent
}

pub async fn fetch_recent<S: RecordSource>(
    source: &S,
    n: usize,
) -> Result<Vec<EnrollmentRecord>, DashboardError> {
    let order = RecordOrder::descending(RecordField::LastName);
    let rows = source.fetch_ordered(order, n).await.map_err(|err| {
        warn!("recent records fetch failed: {err}");
        err
    })?;
    Ok(select_recent(&rows, n))
}
