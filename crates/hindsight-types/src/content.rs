use serde::{Deserialize, Serialize};

/// Media subtypes the bridge can deliver inside a `Media` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
    Animation,
    Voice,
    Audio,
    VideoNote,
}

impl MediaKind {
    /// Whether the platform lets this subtype carry a caption that can be
    /// edited after the fact. Animations and video notes cannot.
    pub fn supports_caption(self) -> bool {
        matches!(self, Self::Photo | Self::Video | Self::Voice | Self::Audio)
    }

    /// Whether the platform can deliver an edit event for this subtype at
    /// all. Video notes are immutable once sent.
    pub fn editable(self) -> bool {
        !matches!(self, Self::VideoNote)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Animation => "animation",
            Self::Voice => "voice",
            Self::Audio => "audio",
            Self::VideoNote => "video_note",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "photo" => Some(Self::Photo),
            "video" => Some(Self::Video),
            "animation" => Some(Self::Animation),
            "voice" => Some(Self::Voice),
            "audio" => Some(Self::Audio),
            "video_note" => Some(Self::VideoNote),
            _ => None,
        }
    }
}

/// Discriminated message payload as delivered by the bridge.
///
/// Closed set: anything the bridge sends with an unknown `type` tag lands on
/// `Unsupported` and is dropped by the reconciler instead of silently
/// matching some other arm.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text {
        /// Rich-text body, already rendered to HTML by the bridge.
        body: String,
    },
    Media {
        kind: MediaKind,
        /// Opaque attachment reference, resendable through the bridge.
        attachment: String,
        caption: Option<String>,
    },
    Sticker {
        attachment: String,
    },
    /// Live location updates carry no payload worth storing; only the fact
    /// of the change is reported.
    Location,
    #[serde(other)]
    Unsupported,
}

/// Attachment kinds the outbound transport can (re)send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Media(MediaKind),
    Sticker,
}

impl AttachmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Media(kind) => kind.as_str(),
            Self::Sticker => "sticker",
        }
    }
}

/// Who the tracked chat belongs to, as far as notifications are concerned.
/// `link` is a ready-made profile URL built by the bridge (it knows the
/// platform's URL scheme and the peer's privacy settings); `None` means the
/// peer cannot be linked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRef {
    pub id: i64,
    pub display_name: String,
    pub link: Option<String>,
}
