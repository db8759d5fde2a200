use std::cmp::Ordering;
use std::path::PathBuf;

use crate::error::DashboardError;
use crate::models::EnrollmentRecord;

/// Columns a source can be asked to order by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    LastName,
}

impl RecordField {
    pub fn column(self) -> &'static str {
        match self {
            RecordField::LastName => "last_name",
        }
    }

    fn compare(self, a: &EnrollmentRecord, b: &EnrollmentRecord) -> Ordering {
        match self {
            RecordField::LastName => a.last_name.cmp(&b.last_name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOrder {
    pub field: RecordField,
    pub descending: bool,
}

impl RecordOrder {
    pub fn descending(field: RecordField) -> Self {
        Self {
            field,
            descending: true,
        }
    }

    /// ORDER BY clause matching `order_rows`: byte-wise comparison through the
    /// "C" collation, ties broken by insertion order.
    pub fn sql(&self) -> String {
        let direction = if self.descending { "DESC" } else { "ASC" };
        format!(
            "{} COLLATE \"C\" {}, created_at, id",
            self.field.column(),
            direction
        )
    }
}

/// Read-only query capability over the enrollment store.
pub trait RecordSource {
    async fn fetch_all(&self) -> Result<Vec<EnrollmentRecord>, DashboardError>;

    async fn fetch_ordered(
        &self,
        order: RecordOrder,
        limit: usize,
    ) -> Result<Vec<EnrollmentRecord>, DashboardError>;
}

/// Stable in-process ordering used by the non-SQL sources.
pub fn order_rows(
    mut rows: Vec<EnrollmentRecord>,
    order: RecordOrder,
    limit: usize,
) -> Vec<EnrollmentRecord> {
    rows.sort_by(|a, b| {
        let ordering = order.field.compare(a, b);
        if order.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
    rows.truncate(limit);
    rows
}

/// Reads the record set from a CSV file on every query, so a missing or
/// broken file surfaces as `DataUnavailable` per section.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<Vec<EnrollmentRecord>, DashboardError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|err| {
            DashboardError::unavailable(format!("failed to read '{}': {err}", self.path.display()))
        })?;
        parse_csv(&bytes)
    }
}

pub fn parse_csv(bytes: &[u8]) -> Result<Vec<EnrollmentRecord>, DashboardError> {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut records = Vec::new();
    for row in reader.deserialize::<EnrollmentRecord>() {
        records.push(row?);
    }
    Ok(records)
}

impl RecordSource for CsvSource {
    async fn fetch_all(&self) -> Result<Vec<EnrollmentRecord>, DashboardError> {
        self.load().await
    }

    async fn fetch_ordered(
        &self,
        order: RecordOrder,
        limit: usize,
    ) -> Result<Vec<EnrollmentRecord>, DashboardError> {
        Ok(order_rows(self.load().await?, order, limit))
    }
}

#[cfg(test)]
pub struct MemorySource {
    records: Vec<EnrollmentRecord>,
    all_failure: Option<String>,
    ordered_failure: Option<String>,
}

#[cfg(test)]
impl MemorySource {
    pub fn new(records: Vec<EnrollmentRecord>) -> Self {
        Self {
            records,
            all_failure: None,
            ordered_failure: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            records: Vec::new(),
            all_failure: Some(message.to_string()),
            ordered_failure: Some(message.to_string()),
        }
    }

    /// Full-set queries fail, ordered queries still answer.
    pub fn failing_full_set(mut self, message: &str) -> Self {
        self.all_failure = Some(message.to_string());
        self
    }

    /// Ordered queries fail, full-set queries still answer.
    pub fn failing_ordered(mut self, message: &str) -> Self {
        self.ordered_failure = Some(message.to_string());
        self
    }
}

#[cfg(test)]
fn check(failure: &Option<String>) -> Result<(), DashboardError> {
    match failure {
        Some(message) => Err(DashboardError::unavailable(message.clone())),
        None => Ok(()),
    }
}

#[cfg(test)]
impl RecordSource for MemorySource {
    async fn fetch_all(&self) -> Result<Vec<EnrollmentRecord>, DashboardError> {
        check(&self.all_failure)?;
        Ok(self.records.clone())
    }

    async fn fetch_ordered(
        &self,
        order: RecordOrder,
        limit: usize,
    ) -> Result<Vec<EnrollmentRecord>, DashboardError> {
        check(&self.ordered_failure)?;
        Ok(order_rows(self.records.clone(), order, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "last_name,first_name,track,level,term,status\n\
                          Doe,Jane,STEM,11,1st,Pending\n\
                          Cruz,Ana,ABM,12,2nd,Enrolled\n\
                          Reyes,Lia,,11,1st,\n";

    #[test]
    fn parses_csv_rows_including_blank_categories() {
        let records = parse_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].display_name(), "Ana Cruz");
        assert_eq!(records[2].track, "");
        assert_eq!(records[2].status, "");
    }

    #[test]
    fn bad_level_is_unavailable() {
        let bytes = b"last_name,first_name,track,level,term,status\n\
                      Doe,Jane,STEM,eleven,1st,Pending\n";
        let err = parse_csv(bytes).unwrap_err();
        assert!(matches!(err, DashboardError::DataUnavailable(_)));
    }

    #[test]
    fn order_rows_respects_direction_and_limit() {
        let records = parse_csv(SAMPLE.as_bytes()).unwrap();
        let ascending = order_rows(
            records.clone(),
            RecordOrder {
                field: RecordField::LastName,
                descending: false,
            },
            2,
        );
        let names: Vec<&str> = ascending.iter().map(|r| r.last_name.as_str()).collect();
        assert_eq!(names, vec!["Cruz", "Doe"]);

        let by_name = order_rows(records, RecordOrder::descending(RecordField::LastName), 10);
        let names: Vec<&str> = by_name.iter().map(|r| r.last_name.as_str()).collect();
        assert_eq!(names, vec!["Reyes", "Doe", "Cruz"]);
    }

    #[test]
    fn lowercase_names_sort_above_uppercase_bytewise() {
        let bytes = b"last_name,first_name,track,level,term,status\n\
                      Zamora,Luz,STEM,11,1st,Pending\n\
                      de Castro,Nico,ABM,12,1st,Pending\n";
        let records = parse_csv(bytes).unwrap();
        let top = order_rows(records, RecordOrder::descending(RecordField::LastName), 1);
        assert_eq!(top[0].last_name, "de Castro");
    }

    #[test]
    fn order_clause_is_bytewise_with_insertion_tiebreak() {
        assert_eq!(
            RecordOrder::descending(RecordField::LastName).sql(),
            "last_name COLLATE \"C\" DESC, created_at, id"
        );
    }

    #[tokio::test]
    async fn csv_source_reads_file_per_query() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let source = CsvSource::new(file.path());

        assert_eq!(source.fetch_all().await.unwrap().len(), 3);
        let top = source
            .fetch_ordered(RecordOrder::descending(RecordField::LastName), 1)
            .await
            .unwrap();
        assert_eq!(top[0].last_name, "Reyes");
    }

    #[tokio::test]
    async fn missing_csv_is_unavailable() {
        let source = CsvSource::new("/nonexistent/enrollments.csv");
        let err = source.fetch_all().await.unwrap_err();
        assert!(matches!(err, DashboardError::DataUnavailable(_)));
    }
}
