//! File attachments
//!
//! Attachments travel inline as base64 in the `sendMail` payload. The mail
//! API documents 4 MB as the inline limit; larger files are still sent, with
//! a warning, and the API decides.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::EmailError;

/// Inline attachment size above which a warning is logged
pub const ATTACHMENT_SOFT_LIMIT_BYTES: u64 = 4 * 1024 * 1024;

/// A base64-encoded file ready to send
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// File name shown to the recipient
    pub name: String,
    /// MIME type
    pub content_type: String,
    /// File content, base64 encoded
    pub content_base64: String,
    /// Size of the decoded content
    pub size: u64,
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl Attachment {
    /// Encode in-memory content
    #[must_use]
    pub fn from_bytes(name: impl Into<String>, content_type: &mime::Mime, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.essence_str().to_string(),
            content_base64: STANDARD.encode(bytes),
            size: bytes.len() as u64,
        }
    }

    /// Read and encode a file, warning past the default soft limit
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::Io`] if the file cannot be read.
    pub async fn from_path(path: &Path, content_type: &mime::Mime) -> Result<Self, EmailError> {
        Self::from_path_with_limit(path, content_type, ATTACHMENT_SOFT_LIMIT_BYTES).await
    }

    /// Read and encode a file, warning when it exceeds `soft_limit` bytes
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::Io`] if the file cannot be read.
    pub async fn from_path_with_limit(
        path: &Path,
        content_type: &mime::Mime,
        soft_limit: u64,
    ) -> Result<Self, EmailError> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map_or_else(|| "attachment".to_string(), |n| n.to_string_lossy().into_owned());

        let attachment = Self::from_bytes(name, content_type, &bytes);
        if attachment.exceeds_soft_limit(soft_limit) {
            tracing::warn!(
                file = %path.display(),
                size = attachment.size,
                limit = soft_limit,
                "Attachment exceeds the inline size limit; sending anyway"
            );
        }
        Ok(attachment)
    }

    /// Whether the decoded size is above `soft_limit`
    #[must_use]
    pub const fn exceeds_soft_limit(&self, soft_limit: u64) -> bool {
        self.size > soft_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CapturedLogs;

    #[test]
    fn test_from_bytes_encodes_base64() {
        let attachment = Attachment::from_bytes("a.txt", &mime::TEXT_PLAIN, b"hello");

        assert_eq!(attachment.content_base64, "aGVsbG8=");
        assert_eq!(attachment.size, 5);
        assert_eq!(attachment.content_type, "text/plain");
    }

    #[tokio::test]
    async fn test_from_path_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        tokio::fs::write(&path, b"PK\x03\x04").await.unwrap();

        let attachment = Attachment::from_path(&path, &mime::APPLICATION_OCTET_STREAM)
            .await
            .unwrap();

        assert_eq!(attachment.name, "report.xlsx");
        assert_eq!(attachment.size, 4);
    }

    #[tokio::test]
    async fn test_oversized_file_is_still_attached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        tokio::fs::write(&path, vec![0u8; 2048]).await.unwrap();

        let attachment =
            Attachment::from_path_with_limit(&path, &mime::APPLICATION_OCTET_STREAM, 1024)
                .await
                .unwrap();

        assert!(attachment.exceeds_soft_limit(1024));
        assert_eq!(attachment.size, 2048);
    }

    #[tokio::test]
    async fn test_file_over_inline_limit_logs_warning() {
        let logs = CapturedLogs::new();
        let _guard = logs.set_default(tracing::Level::WARN);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("high-volume-posters.xlsx");
        let size = ATTACHMENT_SOFT_LIMIT_BYTES + 1;
        tokio::fs::write(&path, vec![0u8; usize::try_from(size).unwrap()])
            .await
            .unwrap();

        let attachment = Attachment::from_path(&path, &mime::APPLICATION_OCTET_STREAM)
            .await
            .unwrap();

        assert_eq!(attachment.size, size);
        assert!(logs.contains("Attachment exceeds the inline size limit"));
        assert!(logs.contains(&format!("size={size}")));
        assert!(logs.contains("high-volume-posters.xlsx"));
    }

    #[tokio::test]
    async fn test_file_at_inline_limit_logs_nothing() {
        let logs = CapturedLogs::new();
        let _guard = logs.set_default(tracing::Level::WARN);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        tokio::fs::write(&path, vec![0u8; 1024]).await.unwrap();

        Attachment::from_path_with_limit(&path, &mime::APPLICATION_OCTET_STREAM, 1024)
            .await
            .unwrap();

        assert!(logs.contents().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = Attachment::from_path(Path::new("/nonexistent/x.xlsx"), &mime::TEXT_PLAIN)
            .await
            .unwrap_err();
        assert!(matches!(err, EmailError::Io(_)));
    }

    #[test]
    fn test_debug_omits_content() {
        let attachment = Attachment::from_bytes("a.txt", &mime::TEXT_PLAIN, b"secret payload");
        assert!(!format!("{attachment:?}").contains(&attachment.content_base64));
    }
}
