use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use hindsight_crypto::{CipherError, ContentCipher, connection_key};
use hindsight_db::Database;
use hindsight_db::models::{Owner, ShadowPayload, ShadowRecord};
use hindsight_types::content::{AttachmentKind, ChatRef, MediaKind, MessageContent};
use hindsight_types::events::InboundEvent;

use crate::locale;
use crate::render;
use crate::transport::{ChatTransport, DeliveryError};
use crate::warnings::WarnWindow;

/// How long a privacy-fallback explanation stays suppressed per connection.
const FALLBACK_NOTICE_TTL: Duration = Duration::from_secs(60 * 60);
const FALLBACK_NOTICE_CAP: usize = 1024;

/// Drives the shadow store from inbound transport events: snapshots new
/// messages, diffs edits and deletions against the stored snapshot, and
/// notifies the connection's owner.
///
/// Mutate-then-notify is the contract on every path: the store commit
/// happens first, and a failed send never rolls it back.
pub struct Reconciler<T: ChatTransport> {
    db: Arc<Database>,
    transport: T,
    fallback_notices: Mutex<WarnWindow>,
}

/// Decrypted shadow payload, only ever held transiently while rendering.
enum PlainPayload {
    Text(String),
    Media {
        subtype: MediaKind,
        attachment: String,
        caption: Option<String>,
    },
    Sticker(String),
}

impl<T: ChatTransport> Reconciler<T> {
    pub fn new(db: Arc<Database>, transport: T) -> Self {
        Self {
            db,
            transport,
            fallback_notices: Mutex::new(WarnWindow::new(
                FALLBACK_NOTICE_TTL,
                FALLBACK_NOTICE_CAP,
            )),
        }
    }

    /// Process one event. Failures are logged here and never escape: one
    /// bad event must not take down the event loop.
    pub async fn handle_event(&self, event: InboundEvent) {
        let result = match event {
            InboundEvent::ConnectionEstablished {
                owner_id,
                raw_connection_id,
                enabled,
                locale,
            } => {
                self.on_connection(owner_id, &raw_connection_id, enabled, locale)
                    .await
            }
            InboundEvent::MessageReceived {
                raw_connection_id,
                message_id,
                author_id,
                chat: _,
                content,
            } => {
                self.on_message(&raw_connection_id, message_id, author_id, content)
                    .await
            }
            InboundEvent::MessageEdited {
                raw_connection_id,
                message_id,
                editor_id,
                chat,
                new_content,
            } => {
                self.on_edit(&raw_connection_id, message_id, editor_id, &chat, new_content)
                    .await
            }
            InboundEvent::MessagesDeleted {
                raw_connection_id,
                message_ids,
                chat,
            } => self.on_delete(&raw_connection_id, &message_ids, &chat).await,
        };

        if let Err(e) = result {
            error!("event handling failed: {e:#}");
        }
    }

    async fn on_connection(
        &self,
        owner_id: i64,
        raw_connection_id: &str,
        enabled: bool,
        locale: String,
    ) -> Result<()> {
        let key = connection_key(raw_connection_id);

        if !enabled {
            if let Some(owner) = self.db.get_owner(owner_id)? {
                let purged = self.db.delete_all(&owner.connection_key)?;
                self.db.delete_owner(owner_id)?;
                info!("connection revoked by owner {owner_id}, purged {purged} records");
            }
            return Ok(());
        }

        match self.db.get_owner(owner_id)? {
            None => {
                let owner = Owner {
                    owner_id,
                    connection_key: key,
                    relay_channel_id: None,
                    locale,
                };
                if self.db.add_owner(&owner)? {
                    info!("new connection for owner {owner_id}");
                    let texts = locale::texts(&owner.locale);
                    self.try_send_text(owner.notify_target(), texts.greeting, None)
                        .await;
                }
            }
            Some(owner) if owner.connection_key != key => {
                // New raw id: ciphertext under the old key is unreadable now.
                self.db.update_connection_key(owner_id, &key)?;
                let purged = self.db.delete_all(&owner.connection_key)?;
                info!("owner {owner_id} reconnected, purged {purged} stale records");
            }
            Some(_) => {}
        }

        Ok(())
    }

    async fn on_message(
        &self,
        raw_connection_id: &str,
        message_id: i64,
        author_id: i64,
        content: MessageContent,
    ) -> Result<()> {
        let key = connection_key(raw_connection_id);
        let Some(owner) = self.db.get_owner_by_connection(&key)? else {
            debug!("message {message_id} for unknown connection, ignoring");
            return Ok(());
        };

        // The owner's own outgoing messages are never tracked.
        if author_id == owner.owner_id {
            return Ok(());
        }

        let cipher = ContentCipher::new(raw_connection_id);
        let payload = match content {
            MessageContent::Text { body } => ShadowPayload::Text {
                text: cipher.encrypt(&body)?,
            },
            MessageContent::Media {
                kind,
                attachment,
                caption,
            } => ShadowPayload::Media {
                subtype: kind,
                attachment: cipher.encrypt(&attachment)?,
                caption: caption.map(|c| cipher.encrypt(&c)).transpose()?,
            },
            MessageContent::Sticker { attachment } => ShadowPayload::Sticker {
                attachment: cipher.encrypt(&attachment)?,
            },
            // Location payloads are never snapshotted; only their change
            // events are reported.
            MessageContent::Location => return Ok(()),
            MessageContent::Unsupported => {
                debug!("unsupported content type in message {message_id}, dropping");
                return Ok(());
            }
        };

        // Duplicate ids and storage faults are logged by the store; either
        // way this event is done.
        self.db.insert_record(&ShadowRecord {
            connection_key: key,
            message_id,
            payload,
        });
        Ok(())
    }

    async fn on_edit(
        &self,
        raw_connection_id: &str,
        message_id: i64,
        editor_id: i64,
        chat: &ChatRef,
        new_content: MessageContent,
    ) -> Result<()> {
        let key = connection_key(raw_connection_id);
        let Some(owner) = self.db.get_owner_by_connection(&key)? else {
            return Ok(());
        };
        if editor_id == owner.owner_id {
            return Ok(());
        }

        let texts = locale::texts(&owner.locale);
        let recipient = owner.notify_target();

        // Location changes carry no stored state to diff against.
        if matches!(new_content, MessageContent::Location) {
            let notice = render::location_changed(texts, chat);
            self.try_send_text(recipient, &notice, None).await;
            return Ok(());
        }

        let Some(record) = self.db.get_record(&key, message_id)? else {
            // Edits of untracked messages (pre-dating us, or of a kind that
            // was never persisted) are expected.
            return Ok(());
        };

        let cipher = ContentCipher::new(raw_connection_id);

        match (&record.payload, new_content) {
            (ShadowPayload::Text { text }, MessageContent::Text { body }) => {
                let old = cipher.decrypt(text)?;

                self.db.update_record(&ShadowRecord {
                    connection_key: record.connection_key.clone(),
                    message_id: record.message_id,
                    payload: ShadowPayload::Text {
                        text: cipher.encrypt(&body)?,
                    },
                })?;

                let notice = render::edited(texts, chat, &old, &body);
                self.try_send_text(recipient, &notice, None).await;
            }

            (
                ShadowPayload::Media {
                    subtype,
                    attachment,
                    caption,
                },
                MessageContent::Media {
                    kind: new_kind,
                    attachment: new_attachment,
                    caption: new_caption,
                },
            ) => {
                let subtype = *subtype;
                if !subtype.editable() {
                    warn!(
                        "edit event for non-editable {} message {message_id}, dropping",
                        subtype.as_str()
                    );
                    return Ok(());
                }

                let old_attachment = cipher.decrypt(attachment)?;
                let old_caption = caption.as_deref().map(|c| cipher.decrypt(c)).transpose()?;
                let attachment_changed = old_attachment != new_attachment;

                self.db.update_record(&ShadowRecord {
                    connection_key: record.connection_key.clone(),
                    message_id: record.message_id,
                    payload: ShadowPayload::Media {
                        subtype,
                        attachment: if attachment_changed {
                            cipher.encrypt(&new_attachment)?
                        } else {
                            attachment.clone()
                        },
                        caption: new_caption.as_deref().map(|c| cipher.encrypt(c)).transpose()?,
                    },
                })?;

                if subtype.supports_caption() {
                    let notice = render::edited(
                        texts,
                        chat,
                        old_caption.as_deref().unwrap_or_default(),
                        new_caption.as_deref().unwrap_or_default(),
                    );
                    if attachment_changed {
                        // The recipient needs both versions to see what
                        // changed; the caption diff rides along as context.
                        let items = [
                            (AttachmentKind::Media(subtype), old_attachment),
                            (AttachmentKind::Media(new_kind), new_attachment),
                        ];
                        self.try_send_comparison(recipient, &items, &notice).await;
                    } else {
                        self.try_send_attachment(
                            recipient,
                            AttachmentKind::Media(subtype),
                            &old_attachment,
                            Some(&notice),
                            None,
                        )
                        .await;
                    }
                } else if attachment_changed {
                    let notice = render::edited_attachment(texts, chat);
                    let items = [
                        (AttachmentKind::Media(subtype), old_attachment),
                        (AttachmentKind::Media(new_kind), new_attachment),
                    ];
                    self.try_send_comparison(recipient, &items, &notice).await;
                }
                // Caption-only change on a caption-less subtype: persisted
                // above, nothing to report.
            }

            (ShadowPayload::Sticker { .. }, _) => {
                warn!("edit event for sticker message {message_id}, dropping");
            }

            (payload, _) => {
                warn!(
                    "edit event for message {message_id} does not match stored kind {}, dropping",
                    payload.kind_str()
                );
            }
        }

        Ok(())
    }

    async fn on_delete(
        &self,
        raw_connection_id: &str,
        message_ids: &[i64],
        chat: &ChatRef,
    ) -> Result<()> {
        let key = connection_key(raw_connection_id);
        let Some(owner) = self.db.get_owner_by_connection(&key)? else {
            return Ok(());
        };

        let cipher = ContentCipher::new(raw_connection_id);
        let texts = locale::texts(&owner.locale);
        let recipient = owner.notify_target();

        for &message_id in message_ids {
            let Some(record) = self.db.get_record(&key, message_id)? else {
                // An untracked id means the batch is stale or already
                // processed; the rest is skipped wholesale.
                debug!("message {message_id} not tracked, aborting delete batch");
                return Ok(());
            };

            // Decrypt up front so an unreadable record aborts before the
            // snapshot is gone.
            let payload = decrypt_payload(&cipher, &record.payload)?;

            // Remove before notifying: a duplicate delete event then finds
            // nothing and no-ops instead of double-reporting.
            self.db.delete_record(&key, message_id)?;

            match payload {
                PlainPayload::Text(body) => {
                    let notice = render::deleted(texts, chat, Some(&body));
                    self.try_send_text(recipient, &notice, None).await;
                }

                PlainPayload::Media {
                    subtype: MediaKind::VideoNote,
                    attachment,
                    ..
                } => {
                    self.send_uncaptionable(
                        recipient,
                        AttachmentKind::Media(MediaKind::VideoNote),
                        &attachment,
                        texts,
                        chat,
                    )
                    .await;
                }

                PlainPayload::Media {
                    subtype,
                    attachment,
                    caption,
                } => {
                    let notice = render::deleted(texts, chat, caption.as_deref());
                    match self
                        .transport
                        .send_attachment(
                            recipient,
                            AttachmentKind::Media(subtype),
                            &attachment,
                            Some(&notice),
                            None,
                        )
                        .await
                    {
                        Ok(()) => {}
                        Err(DeliveryError::Rejected(reason)) => {
                            info!(
                                "attachment resend rejected for owner {}: {reason}",
                                owner.owner_id
                            );
                            self.privacy_fallback(recipient, &key, &notice, texts).await;
                        }
                        Err(e) => warn!("deletion notice delivery failed: {e}"),
                    }
                }

                PlainPayload::Sticker(attachment) => {
                    self.send_uncaptionable(
                        recipient,
                        AttachmentKind::Sticker,
                        &attachment,
                        texts,
                        chat,
                    )
                    .await;
                }
            }
        }

        Ok(())
    }

    /// Lead-in notice plus the attachment as a reply, for kinds that cannot
    /// carry a caption.
    async fn send_uncaptionable(
        &self,
        recipient: i64,
        kind: AttachmentKind,
        attachment: &str,
        texts: &locale::Texts,
        chat: &ChatRef,
    ) {
        let notice = render::deleted(texts, chat, None);
        let Some(lead) = self.try_send_text(recipient, &notice, None).await else {
            return;
        };
        self.try_send_attachment(recipient, kind, attachment, None, Some(lead))
            .await;
    }

    /// Text-only stand-in for a rejected attachment resend, with an
    /// explanatory follow-up sent at most once per connection per window.
    async fn privacy_fallback(
        &self,
        recipient: i64,
        key: &str,
        notice: &str,
        texts: &locale::Texts,
    ) {
        let Some(lead) = self.try_send_text(recipient, notice, None).await else {
            return;
        };

        let explain = match self.fallback_notices.lock() {
            Ok(mut notices) => notices.insert(key),
            Err(poisoned) => poisoned.into_inner().insert(key),
        };
        if explain {
            self.try_send_text(recipient, texts.privacy_fallback, Some(lead))
                .await;
        }
    }

    async fn try_send_text(&self, recipient: i64, body: &str, reply_to: Option<i64>) -> Option<i64> {
        match self.transport.send_text(recipient, body, reply_to).await {
            Ok(message_id) => Some(message_id),
            Err(e) => {
                warn!("notification delivery failed: {e}");
                None
            }
        }
    }

    async fn try_send_attachment(
        &self,
        recipient: i64,
        kind: AttachmentKind,
        attachment: &str,
        caption: Option<&str>,
        reply_to: Option<i64>,
    ) {
        if let Err(e) = self
            .transport
            .send_attachment(recipient, kind, attachment, caption, reply_to)
            .await
        {
            warn!("attachment delivery failed: {e}");
        }
    }

    async fn try_send_comparison(
        &self,
        recipient: i64,
        items: &[(AttachmentKind, String)],
        caption: &str,
    ) {
        if let Err(e) = self
            .transport
            .send_comparison_group(recipient, items, caption)
            .await
        {
            warn!("comparison delivery failed: {e}");
        }
    }
}

fn decrypt_payload(
    cipher: &ContentCipher,
    payload: &ShadowPayload,
) -> Result<PlainPayload, CipherError> {
    Ok(match payload {
        ShadowPayload::Text { text } => PlainPayload::Text(cipher.decrypt(text)?),
        ShadowPayload::Media {
            subtype,
            attachment,
            caption,
        } => PlainPayload::Media {
            subtype: *subtype,
            attachment: cipher.decrypt(attachment)?,
            caption: caption.as_deref().map(|c| cipher.decrypt(c)).transpose()?,
        },
        ShadowPayload::Sticker { attachment } => PlainPayload::Sticker(cipher.decrypt(attachment)?),
    })
}
