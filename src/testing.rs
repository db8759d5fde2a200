use crate::models::EnrollmentRecord;

pub fn record(
    last: &str,
    first: &str,
    track: &str,
    level: i32,
    term: &str,
    status: &str,
) -> EnrollmentRecord {
    EnrollmentRecord {
        last_name: last.to_string(),
        first_name: first.to_string(),
        track: track.to_string(),
        level,
        term: term.to_string(),
        status: status.to_string(),
    }
}

/// Jane Doe (STEM, 11, 1st, Pending) then Ana Cruz (ABM, 12, 2nd, Enrolled).
pub fn doe_and_cruz() -> Vec<EnrollmentRecord> {
    vec![
        record("Doe", "Jane", "STEM", 11, "1st", "Pending"),
        record("Cruz", "Ana", "ABM", 12, "2nd", "Enrolled"),
    ]
}
