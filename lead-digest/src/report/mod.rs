//! Report formatting
//!
//! Turns query rows into the HTML email body and, where configured, an
//! `.xlsx` spreadsheet. Missing values render as [`TEXT_PLACEHOLDER`] or
//! [`URL_PLACEHOLDER`].

mod html;
mod spreadsheet;

pub use html::{
    render_high_volume_posters, render_job_postings, render_lead_shortfall, subject_for,
    ReportMeta,
};
pub use spreadsheet::{poster_rows, write_spreadsheet, xlsx_mime, Cell, SpreadsheetRow};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::db::JobPosting;

/// Shown for missing text values
pub const TEXT_PLACEHOLDER: &str = "N/A";

/// Shown for missing link targets
pub const URL_PLACEHOLDER: &str = "#";

/// Formatting failures
#[derive(Debug, Error)]
pub enum ReportError {
    /// HTML template failed to render
    #[error("failed to render report template: {0}")]
    Template(#[from] askama::Error),

    /// Spreadsheet could not be built or saved
    #[error("failed to write spreadsheet: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    /// Output directory could not be created
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The reports this service produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    /// Postings from one source on one day
    JobPostings,
    /// Leads below their daily job target
    LeadShortfall,
    /// Posters with many distinct titles in one day
    HighVolumePosters,
}

impl ReportKind {
    /// Every report, in display order
    pub const ALL: [Self; 3] = [Self::JobPostings, Self::LeadShortfall, Self::HighVolumePosters];

    /// Name used in routes, CLI arguments and logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::JobPostings => "job-postings",
            Self::LeadShortfall => "lead-shortfall",
            Self::HighVolumePosters => "high-volume-posters",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown report '{s}' (expected one of: {})",
                    Self::ALL.map(|kind| kind.as_str()).join(", ")
                )
            })
    }
}

/// Postings grouped under the person who posted them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosterActivity {
    /// Poster display name, from their first posting that has one
    pub poster_name: Option<String>,
    /// Poster profile URL
    pub profile_url: String,
    /// Number of distinct job titles posted
    pub distinct_titles: usize,
    /// The postings themselves, in query order
    pub postings: Vec<JobPosting>,
}

/// Group postings by poster profile, ordered by profile URL
#[must_use]
pub fn group_by_poster(jobs: Vec<JobPosting>) -> Vec<PosterActivity> {
    let mut groups: BTreeMap<String, (PosterActivity, BTreeSet<String>)> = BTreeMap::new();

    for job in jobs {
        let profile = job.posted_by_profile.clone().unwrap_or_default();
        let (group, titles) = groups.entry(profile.clone()).or_insert_with(|| {
            (
                PosterActivity {
                    poster_name: None,
                    profile_url: profile,
                    distinct_titles: 0,
                    postings: Vec::new(),
                },
                BTreeSet::new(),
            )
        });

        if group.poster_name.is_none() {
            group.poster_name.clone_from(&job.poster_full_name);
        }
        if let Some(title) = &job.title {
            titles.insert(title.clone());
        }
        group.postings.push(job);
    }

    groups
        .into_values()
        .map(|(mut group, titles)| {
            group.distinct_titles = titles.len();
            group
        })
        .collect()
}

pub(crate) fn text_or_placeholder(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(TEXT_PLACEHOLDER)
        .to_string()
}

pub(crate) fn url_or_placeholder(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(URL_PLACEHOLDER)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(profile: &str, name: Option<&str>, title: &str) -> JobPosting {
        JobPosting {
            title: Some(title.to_string()),
            poster_full_name: name.map(str::to_string),
            posted_by_profile: Some(profile.to_string()),
            ..JobPosting::default()
        }
    }

    #[test]
    fn test_report_kind_round_trips_names() {
        for kind in ReportKind::ALL {
            assert_eq!(kind.as_str().parse::<ReportKind>().unwrap(), kind);
        }
        assert_eq!("Lead-Shortfall".parse::<ReportKind>().unwrap(), ReportKind::LeadShortfall);
    }

    #[test]
    fn test_unknown_report_lists_choices() {
        let err = "weekly".parse::<ReportKind>().unwrap_err();
        assert!(err.contains("job-postings, lead-shortfall, high-volume-posters"));
    }

    #[test]
    fn test_group_by_poster_counts_distinct_titles() {
        let jobs = vec![
            posting("https://in/b", Some("Bea"), "Engineer"),
            posting("https://in/a", None, "Designer"),
            posting("https://in/b", Some("Bea"), "Engineer"),
            posting("https://in/a", Some("Ann"), "Writer"),
            posting("https://in/b", Some("Bea"), "Manager"),
        ];

        let groups = group_by_poster(jobs);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].profile_url, "https://in/a");
        assert_eq!(groups[0].poster_name.as_deref(), Some("Ann"));
        assert_eq!(groups[0].distinct_titles, 2);
        assert_eq!(groups[1].postings.len(), 3);
        assert_eq!(groups[1].distinct_titles, 2);
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(text_or_placeholder(None), "N/A");
        assert_eq!(text_or_placeholder(Some("  ")), "N/A");
        assert_eq!(text_or_placeholder(Some("Acme")), "Acme");
        assert_eq!(url_or_placeholder(None), "#");
        assert_eq!(url_or_placeholder(Some("")), "#");
    }
}
