use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::filter::{self, FilterOptions, FilterState, Selection};
use crate::models::{CategoryTally, DetailView, EnrollmentRecord, SectionState, Status, Track};
use crate::view::DashboardView;

fn ready_or_placeholder<'a, T>(
    output: &mut String,
    section: &'a SectionState<T>,
) -> Option<&'a T> {
    match section {
        SectionState::Pending => {
            let _ = writeln!(output, "Loading...");
            None
        }
        SectionState::Unavailable(reason) => {
            let _ = writeln!(output, "Unable to load this section ({reason}).");
            None
        }
        SectionState::Ready(value) => Some(value),
    }
}

pub fn render_tally(output: &mut String, section: &SectionState<CategoryTally>) {
    let _ = writeln!(output, "## Applicant Counts");
    let Some(tally) = ready_or_placeholder(output, section) else {
        return;
    };

    let _ = writeln!(output, "By strand ({} counted):", tally.track_total());
    for track in Track::ALL {
        let _ = writeln!(output, "- {track}: {}", tally.track(track));
    }
    let _ = writeln!(output, "By status ({} counted):", tally.status_total());
    for status in Status::ALL {
        let _ = writeln!(output, "- {status}: {}", tally.status(status));
    }
}

pub fn render_recent(output: &mut String, section: &SectionState<Vec<EnrollmentRecord>>) {
    let _ = writeln!(output, "## Recent Applications");
    let Some(recent) = ready_or_placeholder(output, section) else {
        return;
    };

    if recent.is_empty() {
        let _ = writeln!(output, "No applications yet.");
        return;
    }
    for record in recent {
        let _ = writeln!(
            output,
            "- {} ({}, grade {}, {} term): {}",
            record.display_name(),
            dash_if_blank(&record.track),
            record.level,
            record.term,
            dash_if_blank(&record.status)
        );
    }
}

pub fn render_roster(output: &mut String, view: &DashboardView) {
    let _ = writeln!(output, "## Roster");
    if ready_or_placeholder(output, view.roster()).is_none() {
        return;
    }

    let filter = view.filter();
    if !filter.is_empty() {
        let _ = writeln!(output, "Filters: {}", describe_filter(filter));
    }

    let visible = view.visible_records();
    if visible.is_empty() {
        let _ = writeln!(output, "No students match the current filters.");
        return;
    }

    let _ = writeln!(output, "| # | Name | Strand | Grade | Term | Status |");
    let _ = writeln!(output, "|---|------|--------|-------|------|--------|");
    for (index, record) in visible {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} | {} |",
            index,
            record.display_name(),
            dash_if_blank(&record.track),
            record.level,
            record.term,
            dash_if_blank(&record.status)
        );
    }
    let _ = writeln!(
        output,
        "Showing {} of {} students.",
        view.visibility().iter().filter(|visible| **visible).count(),
        view.working_set().len()
    );
}

pub fn render_detail(output: &mut String, detail: Option<&DetailView>) {
    let Some(detail) = detail else {
        return;
    };
    let _ = writeln!(output, "## {}", detail.display_name);
    let _ = writeln!(output, "- Strand: {}", dash_if_blank(&detail.track));
    let _ = writeln!(output, "- Grade level: {}", detail.level);
    let _ = writeln!(output, "- Term: {}", detail.term);
    let _ = writeln!(output, "- Status: {}", dash_if_blank(&detail.status));
}

pub fn build_summary(view: &DashboardView) -> String {
    let mut output = String::new();
    render_tally(&mut output, view.tally());
    let _ = writeln!(output);
    render_recent(&mut output, view.recent());
    output
}

pub fn build_report(view: &DashboardView, generated_at: DateTime<Utc>) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Enrollment Dashboard");
    let _ = writeln!(output, "Generated {}", generated_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(output);
    output.push_str(&build_summary(view));
    let _ = writeln!(output);
    render_roster(&mut output, view);
    output
}

fn describe_filter(filter: &FilterState) -> String {
    let mut parts = Vec::new();
    if !filter.query.is_empty() {
        parts.push(format!("name contains \"{}\"", filter.query));
    }
    if let Selection::Only(track) = &filter.track {
        parts.push(format!("strand {track}"));
    }
    if let Selection::Only(level) = &filter.level {
        parts.push(format!("grade {level}"));
    }
    if let Selection::Only(term) = &filter.term {
        parts.push(format!("term {term}"));
    }
    parts.join(", ")
}

fn dash_if_blank(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[derive(Serialize)]
struct RosterRow<'a> {
    index: usize,
    display_name: String,
    #[serde(flatten)]
    record: &'a EnrollmentRecord,
}

#[derive(Serialize)]
struct RosterJson<'a> {
    filter: &'a FilterState,
    options: FilterOptions,
    total: usize,
    matched: usize,
    visible: Vec<RosterRow<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

pub fn roster_json(view: &DashboardView) -> serde_json::Result<String> {
    let error = match view.roster() {
        SectionState::Unavailable(reason) => Some(reason.as_str()),
        _ => None,
    };
    let payload = RosterJson {
        filter: view.filter(),
        options: view.filter_options(),
        total: view.working_set().len(),
        matched: filter::filter_records(view.working_set(), view.filter()).len(),
        visible: view
            .visible_records()
            .into_iter()
            .map(|(index, record)| RosterRow {
                index,
                display_name: record.display_name(),
                record,
            })
            .collect(),
        error,
    };
    serde_json::to_string_pretty(&payload)
}
