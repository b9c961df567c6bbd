//! HTML email bodies and subject lines

use askama::Template;
use chrono::{DateTime, Datelike, Local, NaiveDate};

use super::{text_or_placeholder, url_or_placeholder, PosterActivity, ReportError, ReportKind};
use crate::db::{JobPosting, LeadShortfall, HIGH_VOLUME_TITLE_CUTOFF};

/// Values shared by every report layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMeta {
    /// Name shown in the header, subject and footer
    pub app_name: String,
    /// Link behind the dashboard button
    pub dashboard_url: String,
    /// Date the report covers, `YYYY-MM-DD`
    pub report_date: String,
    /// When the report was generated
    pub generated_at: String,
    /// Copyright year
    pub year: i32,
}

impl ReportMeta {
    /// Describe a report covering `report_date`, generated at `now`
    #[must_use]
    pub fn new(
        app_name: impl Into<String>,
        dashboard_url: impl Into<String>,
        report_date: NaiveDate,
        now: DateTime<Local>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            dashboard_url: url_or_placeholder(Some(&dashboard_url.into())),
            report_date: report_date.format("%Y-%m-%d").to_string(),
            generated_at: now.format("%Y-%m-%d %H:%M %:z").to_string(),
            year: now.year(),
        }
    }
}

/// A posting with every field filled in for display
struct JobRow {
    index: usize,
    company: String,
    company_url: String,
    title: String,
    url: String,
    poster_name: String,
    poster_profile: String,
    source: String,
}

impl JobRow {
    fn new(index: usize, job: &JobPosting) -> Self {
        Self {
            index,
            company: text_or_placeholder(job.company.as_deref()),
            company_url: url_or_placeholder(job.company_url.as_deref()),
            title: text_or_placeholder(job.title.as_deref()),
            url: url_or_placeholder(job.url.as_deref()),
            poster_name: text_or_placeholder(job.poster_full_name.as_deref()),
            poster_profile: url_or_placeholder(job.posted_by_profile.as_deref()),
            source: text_or_placeholder(job.source.as_deref()),
        }
    }
}

struct LeadRow {
    index: usize,
    name: String,
    email: String,
    external_id: String,
    jobs_today: i64,
    shortfall: i64,
}

struct PosterSection {
    index: usize,
    name: String,
    profile_url: String,
    distinct_titles: usize,
    rows: Vec<JobRow>,
}

#[derive(Template)]
#[template(path = "reports/job_postings.html")]
struct JobPostingsTemplate<'a> {
    meta: &'a ReportMeta,
    source_tag: &'a str,
    count: usize,
    rows: Vec<JobRow>,
}

#[derive(Template)]
#[template(path = "reports/lead_shortfall.html")]
struct LeadShortfallTemplate<'a> {
    meta: &'a ReportMeta,
    threshold: i64,
    count: usize,
    total_shortfall: i64,
    rows: Vec<LeadRow>,
}

#[derive(Template)]
#[template(path = "reports/high_volume_posters.html")]
struct HighVolumePostersTemplate<'a> {
    meta: &'a ReportMeta,
    cutoff: i64,
    posters_count: usize,
    jobs_count: usize,
    posters: Vec<PosterSection>,
}

/// Render the job-postings body
///
/// # Errors
///
/// Returns [`ReportError::Template`] if rendering fails.
pub fn render_job_postings(
    meta: &ReportMeta,
    source_tag: &str,
    jobs: &[JobPosting],
) -> Result<String, ReportError> {
    let template = JobPostingsTemplate {
        meta,
        source_tag,
        count: jobs.len(),
        rows: jobs
            .iter()
            .enumerate()
            .map(|(i, job)| JobRow::new(i + 1, job))
            .collect(),
    };
    Ok(template.render()?)
}

/// Render the lead-shortfall body
///
/// # Errors
///
/// Returns [`ReportError::Template`] if rendering fails.
pub fn render_lead_shortfall(
    meta: &ReportMeta,
    threshold: i64,
    leads: &[LeadShortfall],
) -> Result<String, ReportError> {
    let template = LeadShortfallTemplate {
        meta,
        threshold,
        count: leads.len(),
        total_shortfall: leads
            .iter()
            .fold(0i64, |total, lead| total.saturating_add(lead.shortfall)),
        rows: leads
            .iter()
            .enumerate()
            .map(|(i, lead)| LeadRow {
                index: i + 1,
                name: text_or_placeholder(lead.lead_name.as_deref()),
                email: text_or_placeholder(lead.lead_email.as_deref()),
                external_id: text_or_placeholder(lead.external_id.as_deref()),
                jobs_today: lead.jobs_today,
                shortfall: lead.shortfall,
            })
            .collect(),
    };
    Ok(template.render()?)
}

/// Render the high-volume-posters body
///
/// # Errors
///
/// Returns [`ReportError::Template`] if rendering fails.
pub fn render_high_volume_posters(
    meta: &ReportMeta,
    posters: &[PosterActivity],
) -> Result<String, ReportError> {
    let template = HighVolumePostersTemplate {
        meta,
        cutoff: HIGH_VOLUME_TITLE_CUTOFF,
        posters_count: posters.len(),
        jobs_count: posters.iter().map(|p| p.postings.len()).sum(),
        posters: posters
            .iter()
            .enumerate()
            .map(|(i, poster)| PosterSection {
                index: i + 1,
                name: text_or_placeholder(poster.poster_name.as_deref()),
                profile_url: url_or_placeholder(Some(&poster.profile_url)),
                distinct_titles: poster.distinct_titles,
                rows: poster
                    .postings
                    .iter()
                    .enumerate()
                    .map(|(j, job)| JobRow::new(j + 1, job))
                    .collect(),
            })
            .collect(),
    };
    Ok(template.render()?)
}

/// Subject line with the app name, item count and report date
#[must_use]
pub fn subject_for(kind: ReportKind, meta: &ReportMeta, count: usize, threshold: i64) -> String {
    let app = &meta.app_name;
    let date = &meta.report_date;
    match kind {
        ReportKind::JobPostings => format!("{app}: {count} Job Posting(s) - {date}"),
        ReportKind::LeadShortfall => {
            format!("{app}: {count} Lead(s) Below {threshold} Jobs - {date}")
        }
        ReportKind::HighVolumePosters => {
            format!("{app}: {count} High-Volume Poster(s) - {date}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // Older escapers also encode `/`
    fn normalized(html: &str) -> String {
        html.replace("&#x2f;", "/")
    }

    fn meta() -> ReportMeta {
        let now = Local.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        ReportMeta::new(
            "LinkedIn Job Postings Report",
            "https://dashboard.example.com/",
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            now,
        )
    }

    #[test]
    fn test_missing_fields_render_placeholders() {
        let jobs = vec![JobPosting {
            title: Some("Backend Engineer".to_string()),
            ..JobPosting::default()
        }];

        let html = normalized(&render_job_postings(&meta(), "LINKEDIN", &jobs).unwrap());

        assert!(html.contains("Backend Engineer"));
        assert!(html.contains(">N/A</a>"));
        assert!(html.contains(r##"href="#""##));
        assert!(html.contains("Total job postings: 1"));
    }

    #[test]
    fn test_fields_are_escaped() {
        let jobs = vec![JobPosting {
            company: Some("<script>alert(1)</script>".to_string()),
            ..JobPosting::default()
        }];

        let html = normalized(&render_job_postings(&meta(), "LINKEDIN", &jobs).unwrap());

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_lead_shortfall_body() {
        let leads = vec![LeadShortfall {
            lead_name: Some("Priya".to_string()),
            lead_email: None,
            external_id: Some("ext-7".to_string()),
            jobs_today: 59,
            threshold: 60,
            shortfall: 1,
        }];

        let html = normalized(&render_lead_shortfall(&meta(), 60, &leads).unwrap());

        assert!(html.contains("Total leads below target: 1"));
        assert!(html.contains("Daily target: 60 jobs"));
        assert!(html.contains("<td>N/A</td>"));
        assert!(html.contains("ext-7"));
    }

    #[test]
    fn test_total_shortfall_saturates() {
        let lead = |jobs_today| LeadShortfall {
            lead_name: None,
            lead_email: None,
            external_id: None,
            jobs_today,
            threshold: i64::MAX,
            shortfall: i64::MAX - jobs_today,
        };

        let html = render_lead_shortfall(&meta(), i64::MAX, &[lead(0), lead(1)]).unwrap();

        assert!(html.contains(&format!("Total shortfall: {} jobs", i64::MAX)));
    }

    #[test]
    fn test_high_volume_body_lists_each_poster() {
        let posters = vec![PosterActivity {
            poster_name: None,
            profile_url: "https://linkedin.example/in/bea".to_string(),
            distinct_titles: 3,
            postings: vec![JobPosting::default(); 3],
        }];

        let html = normalized(&render_high_volume_posters(&meta(), &posters).unwrap());

        assert!(html.contains("High-volume posters: 1"));
        assert!(html.contains("Total postings: 3"));
        assert!(html.contains("(3 distinct titles)"));
        assert!(html.contains("https://linkedin.example/in/bea"));
    }

    #[test]
    fn test_subjects_carry_count_and_date() {
        let meta = meta();
        assert_eq!(
            subject_for(ReportKind::JobPostings, &meta, 12, 60),
            "LinkedIn Job Postings Report: 12 Job Posting(s) - 2026-10-18"
        );
        assert!(subject_for(ReportKind::LeadShortfall, &meta, 3, 60).contains("3 Lead(s) Below 60 Jobs"));
    }

    #[test]
    fn test_footer_shows_year_and_dashboard() {
        let html = normalized(&render_job_postings(&meta(), "LINKEDIN", &[JobPosting::default()]).unwrap());
        assert!(html.contains("2026 LinkedIn Job Postings Report"));
        assert!(html.contains("https://dashboard.example.com/"));
    }
}
