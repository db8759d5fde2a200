use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    #[error("data unavailable: {0}")]
    DataUnavailable(String),
    #[error("malformed record: unrecognized {field} '{value}'")]
    MalformedRecord { field: &'static str, value: String },
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
    #[error("no record at index {0}")]
    RecordNotFound(usize),
}

impl DashboardError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::DataUnavailable(msg.into())
    }

    pub fn malformed(field: &'static str, value: impl Into<String>) -> Self {
        Self::MalformedRecord {
            field,
            value: value.into(),
        }
    }
}

impl From<sqlx::Error> for DashboardError {
    fn from(err: sqlx::Error) -> Self {
        Self::DataUnavailable(err.to_string())
    }
}

impl From<csv::Error> for DashboardError {
    fn from(err: csv::Error) -> Self {
        Self::DataUnavailable(err.to_string())
    }
}
