//! Email builder with fluent API

use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::{Attachment, EmailError};

/// An outgoing report email
///
/// Reports go to a single primary recipient with optional CC copies:
///
/// ```rust
/// use lead_digest::email::Email;
///
/// let email = Email::new()
///     .to("ops@example.com")
///     .cc("manager@example.com")
///     .subject("Daily Job Postings - 2026-10-18")
///     .html("<p>12 jobs posted today</p>");
///
/// assert!(email.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    /// Primary recipient
    pub to: Option<String>,

    /// CC recipients
    pub cc: Vec<String>,

    /// Email subject
    pub subject: Option<String>,

    /// HTML body
    pub html: Option<String>,

    /// Optional file attachment
    pub attachment: Option<Attachment>,
}

impl Email {
    /// Create a new empty email
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the primary recipient, replacing any previous one
    #[must_use]
    pub fn to(mut self, address: &str) -> Self {
        self.to = Some(address.trim().to_string());
        self
    }

    /// Add a CC recipient
    #[must_use]
    pub fn cc(mut self, address: &str) -> Self {
        self.cc.push(address.trim().to_string());
        self
    }

    /// Add several CC recipients, skipping blanks
    #[must_use]
    pub fn cc_all<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.cc.extend(
            addresses
                .into_iter()
                .map(|address| address.as_ref().trim().to_string())
                .filter(|address| !address.is_empty()),
        );
        self
    }

    /// Set the email subject
    #[must_use]
    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    /// Set the HTML body
    #[must_use]
    pub fn html(mut self, body: &str) -> Self {
        self.html = Some(body.to_string());
        self
    }

    /// Attach a file, replacing any previous attachment
    #[must_use]
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Check that the email can be sent
    ///
    /// # Errors
    ///
    /// Returns an error if the recipient, subject or body is missing, or if
    /// any address is not a valid email address.
    pub fn validate(&self) -> Result<(), EmailError> {
        let to = self.to.as_ref().ok_or(EmailError::NoRecipient)?;
        if to.is_empty() {
            return Err(EmailError::NoRecipient);
        }

        if let Some(invalid) = std::iter::once(to)
            .chain(&self.cc)
            .find(|address| !address.validate_email())
        {
            return Err(EmailError::InvalidAddress(invalid.clone()));
        }

        if self.subject.as_deref().is_none_or(str::is_empty) {
            return Err(EmailError::NoSubject);
        }

        if self.html.is_none() {
            return Err(EmailError::NoContent);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> Email {
        Email::new()
            .to("ops@example.com")
            .subject("Report")
            .html("<p>hi</p>")
    }

    #[test]
    fn test_email_builder() {
        let email = complete().cc("a@example.com");

        assert_eq!(email.to.as_deref(), Some("ops@example.com"));
        assert_eq!(email.cc, vec!["a@example.com"]);
        assert_eq!(email.subject.as_deref(), Some("Report"));
    }

    #[test]
    fn test_to_replaces_previous_recipient() {
        let email = complete().to("other@example.com");
        assert_eq!(email.to.as_deref(), Some("other@example.com"));
    }

    #[test]
    fn test_cc_all_skips_blanks() {
        let email = complete().cc_all(["a@example.com", " ", "b@example.com "]);
        assert_eq!(email.cc, vec!["a@example.com", "b@example.com"]);
    }

    #[test]
    fn test_email_validation_no_recipient() {
        let email = Email::new().subject("Report").html("<p>hi</p>");
        assert!(matches!(email.validate(), Err(EmailError::NoRecipient)));
    }

    #[test]
    fn test_email_validation_no_subject() {
        let email = Email::new().to("ops@example.com").html("<p>hi</p>");
        assert!(matches!(email.validate(), Err(EmailError::NoSubject)));
    }

    #[test]
    fn test_email_validation_no_content() {
        let email = Email::new().to("ops@example.com").subject("Report");
        assert!(matches!(email.validate(), Err(EmailError::NoContent)));
    }

    #[test]
    fn test_email_validation_bad_cc() {
        let email = complete().cc("not-an-address");
        assert!(matches!(
            email.validate(),
            Err(EmailError::InvalidAddress(address)) if address == "not-an-address"
        ));
    }

    #[test]
    fn test_email_validation_rejects_malformed_addresses() {
        for address in ["a b@example.com", "x@y,z", "ops@@example.com", "@example.com", "ops@"] {
            let email = complete().to(address);
            assert!(
                matches!(email.validate(), Err(EmailError::InvalidAddress(ref a)) if a == address),
                "{address} should be rejected"
            );
        }
    }

    #[test]
    fn test_email_validation_success() {
        assert!(complete().cc("a@example.com").validate().is_ok());
    }
}
