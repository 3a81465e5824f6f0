use anyhow::{Result, bail};
use hindsight_types::content::MediaKind;

/// One row per active delegated connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub owner_id: i64,
    /// SHA-256 hex of the current raw connection id, unique across owners.
    pub connection_key: String,
    /// Optional alternate destination for notifications.
    pub relay_channel_id: Option<i64>,
    pub locale: String,
}

impl Owner {
    /// Where this owner's notifications go.
    pub fn notify_target(&self) -> i64 {
        self.relay_channel_id.unwrap_or(self.owner_id)
    }
}

/// Encrypted snapshot of one tracked inbound message.
///
/// All payload strings are ciphertext produced by the connection's
/// `ContentCipher`; the store never sees plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowRecord {
    pub connection_key: String,
    pub message_id: i64,
    pub payload: ShadowPayload,
}

/// Kind and subtype are fixed at insert time; an edit may only replace the
/// text/caption cipher, and the attachment cipher for media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShadowPayload {
    Text {
        text: String,
    },
    Media {
        subtype: MediaKind,
        attachment: String,
        caption: Option<String>,
    },
    Sticker {
        attachment: String,
    },
}

impl ShadowPayload {
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Media { .. } => "media",
            Self::Sticker { .. } => "sticker",
        }
    }

    /// Flatten to the (text_cipher, media_cipher, media_subtype) columns.
    pub fn columns(&self) -> (Option<&str>, Option<&str>, Option<&'static str>) {
        match self {
            Self::Text { text } => (Some(text), None, None),
            Self::Media {
                subtype,
                attachment,
                caption,
            } => (caption.as_deref(), Some(attachment), Some(subtype.as_str())),
            Self::Sticker { attachment } => (None, Some(attachment), None),
        }
    }

    pub fn from_columns(
        kind: &str,
        text_cipher: Option<String>,
        media_cipher: Option<String>,
        media_subtype: Option<String>,
    ) -> Result<Self> {
        match kind {
            "text" => {
                let Some(text) = text_cipher else {
                    bail!("text record without text_cipher");
                };
                Ok(Self::Text { text })
            }
            "media" => {
                let Some(attachment) = media_cipher else {
                    bail!("media record without media_cipher");
                };
                let Some(subtype) = media_subtype.as_deref().and_then(MediaKind::parse) else {
                    bail!("media record with missing or unknown subtype {media_subtype:?}");
                };
                Ok(Self::Media {
                    subtype,
                    attachment,
                    caption: text_cipher,
                })
            }
            "sticker" => {
                let Some(attachment) = media_cipher else {
                    bail!("sticker record without media_cipher");
                };
                Ok(Self::Sticker { attachment })
            }
            other => bail!("unknown shadow record kind '{other}'"),
        }
    }
}
