//! Test doubles for the report pipeline
//!
//! - [`RecordingMailer`]: captures sent emails for assertions
//! - [`InMemoryReportSource`]: serves fixed rows without a database
//! - [`MailApiStub`]: a local token endpoint and Graph `sendMail` endpoint
//! - [`CapturedLogs`]: collects formatted `tracing` output
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use lead_digest::config::DigestConfig;
//! use lead_digest::db::LeadActivity;
//! use lead_digest::pipeline::ReportPipeline;
//! use lead_digest::testing::{InMemoryReportSource, RecordingMailer};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mailer = RecordingMailer::new();
//! let source = InMemoryReportSource::new().with_leads(vec![LeadActivity {
//!     jobs_today: 12,
//!     ..LeadActivity::default()
//! }]);
//!
//! let mut config = DigestConfig::default();
//! config.mail.recipient = "ops@example.com".to_string();
//!
//! let pipeline = ReportPipeline::new(Arc::new(config), Arc::new(source), Arc::new(mailer.clone()));
//! pipeline.lead_shortfall(None, Some(60)).await?;
//!
//! assert_eq!(mailer.sent_count(), 1);
//! # Ok(())
//! # }
//! ```

mod logs;
mod mailer;
mod source;
mod stub;

pub use logs::CapturedLogs;
pub use mailer::RecordingMailer;
pub use source::InMemoryReportSource;
pub use stub::{MailApiStub, RecordedSend, StubBehavior};
