//! Report query construction
//!
//! Each builder returns a [`ReportQuery`]: fixed SQL text with `$n`
//! placeholders and the ordered values to bind. Caller input only ever
//! reaches the database as a bind value.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::{postgres::PgRow, FromRow, PgConnection, Postgres};

/// Posters with more distinct titles than this in the window are high-volume
pub const HIGH_VOLUME_TITLE_CUTOFF: i64 = 2;

const JOB_POSTINGS_SQL: &str = r#"
    SELECT company, title, url, company_url, poster_full_name, posted_by_profile, source
    FROM public.karmafy_job
    WHERE source = $1
      AND DATE("datePosted") = $2
      AND posted_by_profile IS NOT NULL
      AND posted_by_profile <> ''
    ORDER BY company, title
"#;

const LEAD_SHORTFALL_SQL: &str = r#"
    SELECT l.name AS lead_name,
           l.email AS lead_email,
           l.external_id,
           COUNT(j.id) AS jobs_today
    FROM public.karmafy_lead l
    LEFT JOIN public.karmafy_job j
           ON j.lead_id = l.id
          AND DATE(j."createdAt") = $1
    GROUP BY l.id, l.name, l.email, l.external_id
    HAVING COUNT(j.id) < $2
    ORDER BY jobs_today ASC, l.name
"#;

const HIGH_VOLUME_POSTERS_SQL: &str = r#"
    SELECT j.company, j.title, j.url, j.company_url,
           j.poster_full_name, j.posted_by_profile, j.source
    FROM public.karmafy_job j
    WHERE j."createdAt" >= $1
      AND j."createdAt" < $2
      AND j.posted_by_profile IS NOT NULL
      AND j.posted_by_profile <> ''
      AND (
          SELECT COUNT(DISTINCT same_poster.title)
          FROM public.karmafy_job same_poster
          WHERE same_poster.posted_by_profile = j.posted_by_profile
            AND same_poster."createdAt" >= $1
            AND same_poster."createdAt" < $2
      ) > $3
    ORDER BY j.posted_by_profile, j.company, j.title
"#;

/// A value bound to a query placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParam {
    /// Text value
    Text(String),
    /// Calendar date
    Date(NaiveDate),
    /// Timestamp without time zone
    Timestamp(NaiveDateTime),
    /// 64-bit integer
    Int(i64),
}

/// Parameterized SQL ready to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    sql: &'static str,
    params: Vec<QueryParam>,
}

impl ReportQuery {
    /// SQL text with `$n` placeholders
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        self.sql
    }

    /// Bind values in placeholder order
    #[must_use]
    pub fn params(&self) -> &[QueryParam] {
        &self.params
    }

    /// Postings from `source_tag` posted on `date` that name their poster
    #[must_use]
    pub fn job_postings_on(date: NaiveDate, source_tag: &str) -> Self {
        Self {
            sql: JOB_POSTINGS_SQL,
            params: vec![
                QueryParam::Text(source_tag.to_string()),
                QueryParam::Date(date),
            ],
        }
    }

    /// Leads whose job count on `date` is below `threshold`, lowest first
    #[must_use]
    pub fn lead_shortfall(date: NaiveDate, threshold: i64) -> Self {
        Self {
            sql: LEAD_SHORTFALL_SQL,
            params: vec![QueryParam::Date(date), QueryParam::Int(threshold)],
        }
    }

    /// Postings ingested in `window` by posters above `cutoff` distinct titles
    #[must_use]
    pub fn high_volume_posters(window: IngestionWindow, cutoff: i64) -> Self {
        Self {
            sql: HIGH_VOLUME_POSTERS_SQL,
            params: vec![
                QueryParam::Timestamp(window.start),
                QueryParam::Timestamp(window.end),
                QueryParam::Int(cutoff),
            ],
        }
    }

    /// Bind the parameters and fetch every row
    ///
    /// # Errors
    ///
    /// Returns the driver error if the query fails or a row cannot be decoded.
    pub async fn fetch_all<T>(&self, conn: &mut PgConnection) -> Result<Vec<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut query = sqlx::query_as::<Postgres, T>(self.sql);
        for param in &self.params {
            query = match param {
                QueryParam::Text(value) => query.bind(value.as_str()),
                QueryParam::Date(value) => query.bind(*value),
                QueryParam::Timestamp(value) => query.bind(*value),
                QueryParam::Int(value) => query.bind(*value),
            };
        }
        query.fetch_all(conn).await
    }
}

/// Half-open ingestion range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionWindow {
    /// Inclusive lower bound
    pub start: NaiveDateTime,
    /// Exclusive upper bound
    pub end: NaiveDateTime,
}

impl IngestionWindow {
    /// The whole calendar day `date`
    #[must_use]
    pub fn for_day(date: NaiveDate) -> Self {
        let start = date.and_time(NaiveTime::MIN);
        let end = date
            .checked_add_days(Days::new(1))
            .map_or(NaiveDateTime::MAX, |next| next.and_time(NaiveTime::MIN));
        Self { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn placeholder_count(sql: &str) -> usize {
        (1..=9).filter(|n| sql.contains(&format!("${n}"))).count()
    }

    #[test]
    fn test_job_postings_query_binds_date_and_source() {
        let query = ReportQuery::job_postings_on(date(2026, 10, 18), "LINKEDIN");

        assert_eq!(
            query.params(),
            &[
                QueryParam::Text("LINKEDIN".to_string()),
                QueryParam::Date(date(2026, 10, 18)),
            ]
        );
        assert_eq!(placeholder_count(query.sql()), query.params().len());
        assert!(query.sql().contains("posted_by_profile <> ''"));
        assert!(!query.sql().contains("2026"));
        assert!(!query.sql().contains("CURRENT_DATE"));
    }

    #[test]
    fn test_untrusted_text_never_reaches_sql() {
        let hostile = "LINKEDIN'; DROP TABLE karmafy_job; --";
        let query = ReportQuery::job_postings_on(date(2026, 1, 1), hostile);

        assert!(!query.sql().contains("DROP TABLE"));
        assert_eq!(query.params()[0], QueryParam::Text(hostile.to_string()));
    }

    #[test]
    fn test_lead_shortfall_query_uses_having_threshold() {
        let query = ReportQuery::lead_shortfall(date(2026, 10, 18), 60);

        assert!(query.sql().contains("LEFT JOIN"));
        assert!(query.sql().contains("HAVING COUNT(j.id) < $2"));
        assert!(query.sql().contains("ORDER BY jobs_today ASC"));
        assert_eq!(
            query.params(),
            &[QueryParam::Date(date(2026, 10, 18)), QueryParam::Int(60)]
        );
    }

    #[test]
    fn test_high_volume_query_uses_correlated_distinct_count() {
        let window = IngestionWindow::for_day(date(2026, 10, 18));
        let query = ReportQuery::high_volume_posters(window, HIGH_VOLUME_TITLE_CUTOFF);

        assert!(query.sql().contains("COUNT(DISTINCT same_poster.title)"));
        assert!(query.sql().contains(") > $3"));
        assert_eq!(placeholder_count(query.sql()), 3);
        assert_eq!(query.params()[2], QueryParam::Int(2));
    }

    #[test]
    fn test_builders_are_deterministic() {
        let a = ReportQuery::lead_shortfall(date(2026, 3, 1), 10);
        let b = ReportQuery::lead_shortfall(date(2026, 3, 1), 10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_ingestion_window_covers_one_day() {
        let window = IngestionWindow::for_day(date(2026, 12, 31));
        assert_eq!(window.start, date(2026, 12, 31).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(window.end, date(2027, 1, 1).and_hms_opt(0, 0, 0).unwrap());
    }
}
