use tracing::{info, warn};

use crate::detail::{self, DetailPanel};
use crate::error::DashboardError;
use crate::filter::{self, FilterOptions, FilterPatch, FilterState};
use crate::models::{CategoryTally, DetailView, EnrollmentRecord, SectionState};
use crate::recent::{self, DEFAULT_RECENT_LIMIT};
use crate::source::RecordSource;
use crate::tally;

/// One admin view session. Owns the working set, the active filters and the
/// detail popup; the presentation layer only reads from it and sends events.
#[derive(Debug)]
pub struct DashboardView {
    recent_limit: usize,
    records: SectionState<Vec<EnrollmentRecord>>,
    tally: SectionState<CategoryTally>,
    recent: SectionState<Vec<EnrollmentRecord>>,
    filter: FilterState,
    detail: DetailPanel,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_LIMIT)
    }
}

impl DashboardView {
    pub fn new(recent_limit: usize) -> Self {
        Self {
            recent_limit,
            records: SectionState::Pending,
            tally: SectionState::Pending,
            recent: SectionState::Pending,
            filter: FilterState::default(),
            detail: DetailPanel::Closed,
        }
    }

    /// Fetches the full set and the recent slice concurrently and replaces
    /// every section. A failed fetch only marks its own sections unavailable.
    pub async fn reload<S: RecordSource>(&mut self, source: &S) {
        let (all, recent) = tokio::join!(
            source.fetch_all(),
            recent::fetch_recent(source, self.recent_limit)
        );

        match all {
            Ok(records) => {
                info!(count = records.len(), "loaded enrollment records");
                self.tally = SectionState::Ready(tally::aggregate(&records));
                self.records = SectionState::Ready(records);
            }
            Err(err) => {
                warn!("enrollment records unavailable: {err}");
                self.tally = SectionState::Unavailable(err.to_string());
                self.records = SectionState::Unavailable(err.to_string());
            }
        }

        self.recent = SectionState::from_result(recent);
        self.detail = DetailPanel::Closed;
    }

    pub fn set_filter(&mut self, patch: FilterPatch) -> Result<(), DashboardError> {
        self.filter.apply(patch)
    }

    pub fn select(&mut self, index: usize) -> Result<(), DashboardError> {
        let record = self
            .working_set()
            .get(index)
            .ok_or(DashboardError::RecordNotFound(index))?;
        let view = detail::project(record);
        self.detail.open(view);
        Ok(())
    }

    pub fn dismiss(&mut self) {
        self.detail.dismiss();
    }

    pub fn tally(&self) -> &SectionState<CategoryTally> {
        &self.tally
    }

    pub fn recent(&self) -> &SectionState<Vec<EnrollmentRecord>> {
        &self.recent
    }

    pub fn roster(&self) -> &SectionState<Vec<EnrollmentRecord>> {
        &self.records
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.view()
    }

    pub fn working_set(&self) -> &[EnrollmentRecord] {
        self.records.ready().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn visibility(&self) -> Vec<bool> {
        filter::compute_visibility(self.working_set(), &self.filter)
    }

    /// Visible records paired with their working-set index.
    pub fn visible_records(&self) -> Vec<(usize, &EnrollmentRecord)> {
        self.working_set()
            .iter()
            .enumerate()
            .filter(|(_, record)| self.filter.matches(record))
            .collect()
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions::from_records(self.working_set())
    }
}
