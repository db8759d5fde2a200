use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Track {
    #[serde(rename = "STEM")]
    Stem,
    #[serde(rename = "ABM")]
    Abm,
    #[serde(rename = "TVL-ICT")]
    TvlIct,
    #[serde(rename = "HUMSS")]
    Humss,
}

impl Track {
    pub const ALL: [Track; 4] = [Track::Stem, Track::Abm, Track::TvlIct, Track::Humss];

    pub fn label(self) -> &'static str {
        match self {
            Track::Stem => "STEM",
            Track::Abm => "ABM",
            Track::TvlIct => "TVL-ICT",
            Track::Humss => "HUMSS",
        }
    }

    /// Exact, case-sensitive match against the stored labels.
    pub fn parse(value: &str) -> Option<Track> {
        Track::ALL.into_iter().find(|track| track.label() == value)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    Pending,
    Enrolled,
    Rejected,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::Enrolled, Status::Rejected];

    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Enrolled => "Enrolled",
            Status::Rejected => "Rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Status> {
        Status::ALL.into_iter().find(|status| status.label() == value)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the enrollment store. Track and status keep the stored text so
/// unrecognized values still show up in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub last_name: String,
    pub first_name: String,
    #[serde(default)]
    pub track: String,
    pub level: i32,
    pub term: String,
    #[serde(default)]
    pub status: String,
}

impl EnrollmentRecord {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn checked_track(&self) -> Result<Track, DashboardError> {
        Track::parse(&self.track).ok_or_else(|| DashboardError::malformed("track", &self.track))
    }

    pub fn checked_status(&self) -> Result<Status, DashboardError> {
        Status::parse(&self.status)
            .ok_or_else(|| DashboardError::malformed("status", &self.status))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTally {
    pub by_track: BTreeMap<Track, usize>,
    pub by_status: BTreeMap<Status, usize>,
}

impl Default for CategoryTally {
    fn default() -> Self {
        Self {
            by_track: Track::ALL.into_iter().map(|track| (track, 0)).collect(),
            by_status: Status::ALL.into_iter().map(|status| (status, 0)).collect(),
        }
    }
}

impl CategoryTally {
    pub fn track(&self, track: Track) -> usize {
        self.by_track.get(&track).copied().unwrap_or(0)
    }

    pub fn status(&self, status: Status) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    pub fn track_total(&self) -> usize {
        self.by_track.values().sum()
    }

    pub fn status_total(&self) -> usize {
        self.by_status.values().sum()
    }
}

/// Everything the detail popup shows, already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailView {
    pub display_name: String,
    pub track: String,
    pub level: String,
    pub term: String,
    pub status: String,
}

/// Load state of one independently rendered section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionState<T> {
    Pending,
    Ready(T),
    Unavailable(String),
}

impl<T> SectionState<T> {
    pub fn from_result(result: Result<T, DashboardError>) -> Self {
        match result {
            Ok(value) => SectionState::Ready(value),
            Err(err) => SectionState::Unavailable(err.to_string()),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            SectionState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, SectionState::Unavailable(_))
    }
}
