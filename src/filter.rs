use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::DashboardError;
use crate::models::{EnrollmentRecord, Track};

/// A filter control value: either unconstrained or one exact choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Selection<T> {
    Any,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::Any
    }
}

impl<T: PartialEq> Selection<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Selection::Any => true,
            Selection::Only(expected) => expected == value,
        }
    }
}

fn is_any(raw: &str) -> bool {
    raw.is_empty() || raw.eq_ignore_ascii_case("any")
}

impl Selection<String> {
    pub fn parse(raw: &str) -> Self {
        if is_any(raw) {
            Selection::Any
        } else {
            Selection::Only(raw.to_string())
        }
    }
}

impl Selection<Track> {
    pub fn parse(raw: &str) -> Result<Self, DashboardError> {
        if is_any(raw) {
            return Ok(Selection::Any);
        }
        Track::parse(raw)
            .map(Selection::Only)
            .ok_or_else(|| DashboardError::InvalidFilter(format!("unknown track '{raw}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterState {
    pub query: String,
    pub track: Selection<Track>,
    pub level: Selection<String>,
    pub term: Selection<String>,
}

/// Partial update; `None` leaves the current value alone.
#[derive(Debug, Clone, Default)]
pub struct FilterPatch {
    pub query: Option<String>,
    pub track: Option<String>,
    pub level: Option<String>,
    pub term: Option<String>,
}

impl FilterState {
    /// Merges a patch. Nothing changes if any field fails to parse.
    pub fn apply(&mut self, patch: FilterPatch) -> Result<(), DashboardError> {
        let track = patch
            .track
            .as_deref()
            .map(Selection::<Track>::parse)
            .transpose()?;

        if let Some(query) = patch.query {
            self.query = query;
        }
        if let Some(track) = track {
            self.track = track;
        }
        if let Some(level) = patch.level {
            self.level = Selection::<String>::parse(&level);
        }
        if let Some(term) = patch.term {
            self.term = Selection::<String>::parse(&term);
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == FilterState::default()
    }

    pub fn matches(&self, record: &EnrollmentRecord) -> bool {
        self.matches_query(record)
            && self.matches_track(record)
            && self.level.admits(&record.level.to_string())
            && self.term.admits(&record.term)
    }

    // The query is matched verbatim; whitespace is not trimmed.
    fn matches_query(&self, record: &EnrollmentRecord) -> bool {
        self.query.is_empty()
            || record
                .display_name()
                .to_lowercase()
                .contains(&self.query.to_lowercase())
    }

    fn matches_track(&self, record: &EnrollmentRecord) -> bool {
        match &self.track {
            Selection::Any => true,
            Selection::Only(track) => record.checked_track().ok() == Some(*track),
        }
    }
}

pub fn compute_visibility(records: &[EnrollmentRecord], state: &FilterState) -> Vec<bool> {
    records.iter().map(|record| state.matches(record)).collect()
}

pub fn filter_records<'a>(
    records: &'a [EnrollmentRecord],
    state: &FilterState,
) -> Vec<&'a EnrollmentRecord> {
    records.iter().filter(|record| state.matches(record)).collect()
}

/// Distinct level and term values present in the working set, for the
/// selectable options of the filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub levels: Vec<String>,
    pub terms: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[EnrollmentRecord]) -> Self {
        let levels: BTreeSet<i32> = records.iter().map(|r| r.level).collect();
        let terms: BTreeSet<&str> = records.iter().map(|r| r.term.as_str()).collect();
        Self {
            levels: levels.into_iter().map(|level| level.to_string()).collect(),
            terms: terms.into_iter().map(str::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(last: &str, first: &str, track: &str, level: i32, term: &str) -> EnrollmentRecord {
        EnrollmentRecord {
            last_name: last.to_string(),
            first_name: first.to_string(),
            track: track.to_string(),
            level,
            term: term.to_string(),
            status: "Pending".to_string(),
        }
    }

    fn sample() -> Vec<EnrollmentRecord> {
        vec![
            record("Doe", "Jane", "STEM", 11, "1st"),
            record("Cruz", "Ana", "ABM", 12, "2nd"),
        ]
    }

    fn patch() -> FilterPatch {
        FilterPatch::default()
    }

    #[test]
    fn empty_state_shows_everything() {
        let state = FilterState::default();
        assert!(state.is_empty());
        assert_eq!(compute_visibility(&sample(), &state), vec![true, true]);
    }

    #[test]
    fn track_filter_scenario() {
        let mut state = FilterState::default();
        state
            .apply(FilterPatch {
                track: Some("STEM".to_string()),
                ..patch()
            })
            .unwrap();
        assert_eq!(compute_visibility(&sample(), &state), vec![true, false]);
    }

    #[test]
    fn query_is_case_insensitive_substring_of_display_name() {
        let mut state = FilterState::default();
        state
            .apply(FilterPatch {
                query: Some("NA CR".to_string()),
                ..patch()
            })
            .unwrap();
        assert_eq!(compute_visibility(&sample(), &state), vec![false, true]);

        state
            .apply(FilterPatch {
                query: Some("a".to_string()),
                ..patch()
            })
            .unwrap();
        assert_eq!(compute_visibility(&sample(), &state), vec![true, true]);
    }

    #[test]
    fn whitespace_query_is_not_trimmed() {
        let mut state = FilterState::default();
        state
            .apply(FilterPatch {
                query: Some("  ".to_string()),
                ..patch()
            })
            .unwrap();
        assert_eq!(compute_visibility(&sample(), &state), vec![false, false]);

        state.query = " ".to_string();
        assert_eq!(compute_visibility(&sample(), &state), vec![true, true]);
    }

    #[test]
    fn level_matches_exact_string_form() {
        let mut state = FilterState::default();
        state
            .apply(FilterPatch {
                level: Some("12".to_string()),
                ..patch()
            })
            .unwrap();
        assert_eq!(compute_visibility(&sample(), &state), vec![false, true]);

        state
            .apply(FilterPatch {
                level: Some("012".to_string()),
                ..patch()
            })
            .unwrap();
        assert_eq!(compute_visibility(&sample(), &state), vec![false, false]);
    }

    #[test]
    fn term_is_case_sensitive() {
        let mut state = FilterState::default();
        state
            .apply(FilterPatch {
                term: Some("1st".to_string()),
                ..patch()
            })
            .unwrap();
        assert_eq!(compute_visibility(&sample(), &state), vec![true, false]);

        state
            .apply(FilterPatch {
                term: Some("1ST".to_string()),
                ..patch()
            })
            .unwrap();
        assert_eq!(compute_visibility(&sample(), &state), vec![false, false]);
    }

    #[test]
    fn any_resets_a_selection() {
        let mut state = FilterState::default();
        state
            .apply(FilterPatch {
                track: Some("ABM".to_string()),
                term: Some("2nd".to_string()),
                ..patch()
            })
            .unwrap();
        state
            .apply(FilterPatch {
                track: Some("any".to_string()),
                term: Some(String::new()),
                ..patch()
            })
            .unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn unknown_track_leaves_state_untouched() {
        let mut state = FilterState::default();
        let err = state
            .apply(FilterPatch {
                query: Some("jane".to_string()),
                track: Some("GAS".to_string()),
                ..patch()
            })
            .unwrap_err();
        assert!(matches!(err, DashboardError::InvalidFilter(_)));
        assert!(state.is_empty());
    }

    #[test]
    fn unrecognized_record_track_hidden_only_when_track_selected() {
        let mut records = sample();
        records.push(record("Reyes", "Lia", "GAS", 11, "1st"));

        let mut state = FilterState::default();
        assert_eq!(compute_visibility(&records, &state), vec![true, true, true]);

        state.track = Selection::Only(Track::Stem);
        assert_eq!(compute_visibility(&records, &state), vec![true, false, false]);
    }

    #[test]
    fn predicates_combine_with_and() {
        let mut records = sample();
        records.push(record("Dizon", "Jan", "STEM", 12, "1st"));

        let mut state = FilterState::default();
        state
            .apply(FilterPatch {
                query: Some("ja".to_string()),
                track: Some("STEM".to_string()),
                level: Some("12".to_string()),
                term: None,
            })
            .unwrap();
        let visible = filter_records(&records, &state);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].display_name(), "Jan Dizon");
    }

    #[test]
    fn visibility_is_idempotent_and_empty_for_empty_set() {
        let state = FilterState {
            query: "doe".to_string(),
            ..FilterState::default()
        };
        let first = compute_visibility(&sample(), &state);
        assert_eq!(first, compute_visibility(&sample(), &state));
        assert!(compute_visibility(&[], &state).is_empty());
        assert!(filter_records(&[], &state).is_empty());
    }

    #[test]
    fn options_are_distinct_and_sorted() {
        let mut records = sample();
        records.push(record("Dizon", "Jan", "STEM", 11, "1st"));
        let options = FilterOptions::from_records(&records);
        assert_eq!(options.levels, vec!["11", "12"]);
        assert_eq!(options.terms, vec!["1st", "2nd"]);
    }
}
