use std::future::Future;

use hindsight_types::content::AttachmentKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The recipient's privacy or permission settings refused this specific
    /// send. Callers fall back to a text-only notification.
    #[error("delivery rejected: {0}")]
    Rejected(String),
    /// Network or gateway failure. Logged, never retried.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Outbound half of the chat platform.
///
/// Implemented by the gateway HTTP client in production and by a scripted
/// fake in tests. Rich-text rendering and media-group assembly happen on the
/// bridge side; bodies passed here are already HTML.
pub trait ChatTransport: Send + Sync {
    /// Send a text notification. Returns the id of the sent message so a
    /// follow-up can reply to it.
    fn send_text(
        &self,
        recipient: i64,
        body: &str,
        reply_to: Option<i64>,
    ) -> impl Future<Output = Result<i64, DeliveryError>> + Send;

    /// Resend a stored attachment, optionally captioned and/or as a reply.
    fn send_attachment(
        &self,
        recipient: i64,
        kind: AttachmentKind,
        attachment: &str,
        caption: Option<&str>,
        reply_to: Option<i64>,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;

    /// Send a side-by-side group of attachments sharing one caption, used
    /// when both the old and the new version of an attachment must be shown.
    fn send_comparison_group(
        &self,
        recipient: i64,
        items: &[(AttachmentKind, String)],
        caption: &str,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}
