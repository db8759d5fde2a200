use tracing::debug;

use crate::models::{DetailView, EnrollmentRecord};

pub fn project(record: &EnrollmentRecord) -> DetailView {
    DetailView {
        display_name: record.display_name(),
        track: record.track.clone(),
        level: record.level.to_string(),
        term: record.term.clone(),
        status: record.status.clone(),
    }
}

/// Visibility of the detail popup. Opening while already open swaps in the
/// new projection wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DetailPanel {
    #[default]
    Closed,
    Open(DetailView),
}

impl DetailPanel {
    pub fn open(&mut self, view: DetailView) {
        debug!(name = %view.display_name, "detail opened");
        *self = DetailPanel::Open(view);
    }

    /// Close button or a click outside the popup.
    pub fn dismiss(&mut self) {
        if self.is_open() {
            debug!("detail dismissed");
        }
        *self = DetailPanel::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self, DetailPanel::Open(_))
    }

    pub fn view(&self) -> Option<&DetailView> {
        match self {
            DetailPanel::Open(view) => Some(view),
            DetailPanel::Closed => None,
        }
    }
}
