//! lead-digest: scheduled job-posting and lead reports by email
//!
//! Each report follows the same pipeline:
//!
//! 1. **Query**: a parameterized read-only query against the jobs database
//! 2. **Format**: an HTML email body and, where configured, an `.xlsx` file
//! 3. **Authenticate**: an OAuth2 client-credentials token for the mail API
//! 4. **Send**: one message through Microsoft Graph `sendMail`
//!
//! Reports run from HTTP triggers (`lead-digest serve`), once from the
//! command line (`lead-digest run`), or on an in-process cron schedule
//! (`lead-digest schedule`).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use lead_digest::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     lead_digest::observability::init()?;
//!
//!     let config = DigestConfig::load(None)?;
//!     let state = AppState::from_config(config, false)?;
//!
//!     let summary = state
//!         .pipeline()
//!         .run(ReportKind::LeadShortfall, ReportRequest::default())
//!         .await?;
//!     println!("{}", summary.message());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod handlers;
pub mod health;
pub mod oauth2;
pub mod observability;
pub mod pipeline;
pub mod report;
pub mod schedule;
pub mod server;
pub mod state;
pub mod testing;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! ```rust
    //! use lead_digest::prelude::*;
    //! ```

    pub use crate::config::DigestConfig;
    pub use crate::db::{PgReportSource, ReportSource};
    pub use crate::email::{Email, EmailSender};
    pub use crate::error::DigestError;
    pub use crate::oauth2::TokenProvider;
    pub use crate::pipeline::{ReportPipeline, ReportRequest, ReportSummary};
    pub use crate::report::ReportKind;
    pub use crate::state::AppState;
}
