use tracing::debug;

use crate::models::{CategoryTally, EnrollmentRecord};

/// Counts records per track and per status. Unrecognized values are skipped
/// for the affected counter only.
pub fn aggregate(records: &[EnrollmentRecord]) -> CategoryTally {
    let mut tally = CategoryTally::default();

    for record in records {
        match record.checked_track() {
            Ok(track) => *tally.by_track.entry(track).or_insert(0) += 1,
            Err(err) => debug!(name = %record.display_name(), "skipping track count: {err}"),
        }

        match record.checked_status() {
            Ok(status) => *tally.by_status.entry(status).or_insert(0) += 1,
            Err(err) => debug!(name = %record.display_name(), "skipping status count: {err}"),
        }
    }

    tally
}
