//! Rows read by the report queries

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A job posting row
///
/// Every column is nullable in the jobs table; formatting substitutes
/// placeholders for missing values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct JobPosting {
    /// Hiring company
    pub company: Option<String>,
    /// Job title
    pub title: Option<String>,
    /// Posting URL
    pub url: Option<String>,
    /// Company page URL
    pub company_url: Option<String>,
    /// Name of the person who posted the job
    pub poster_full_name: Option<String>,
    /// Profile URL of the person who posted the job
    pub posted_by_profile: Option<String>,
    /// Source tag, e.g. `LINKEDIN`
    pub source: Option<String>,
}

/// A lead with the number of jobs recorded for it on the report date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LeadActivity {
    /// Lead display name
    pub lead_name: Option<String>,
    /// Lead email address
    pub lead_email: Option<String>,
    /// Identifier in the upstream CRM
    pub external_id: Option<String>,
    /// Jobs recorded on the report date
    pub jobs_today: i64,
}

/// A lead below its daily target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadShortfall {
    /// Lead display name
    pub lead_name: Option<String>,
    /// Lead email address
    pub lead_email: Option<String>,
    /// Identifier in the upstream CRM
    pub external_id: Option<String>,
    /// Jobs recorded on the report date
    pub jobs_today: i64,
    /// Target in effect for this run
    pub threshold: i64,
    /// Jobs still needed to reach the target, never negative
    pub shortfall: i64,
}

impl LeadShortfall {
    /// Compute the shortfall of `activity` against `threshold`
    #[must_use]
    pub fn from_activity(activity: LeadActivity, threshold: i64) -> Self {
        Self {
            shortfall: threshold.saturating_sub(activity.jobs_today).max(0),
            lead_name: activity.lead_name,
            lead_email: activity.lead_email,
            external_id: activity.external_id,
            jobs_today: activity.jobs_today,
            threshold,
        }
    }
}
