use crate::Database;
use crate::models::{Owner, ShadowPayload, ShadowRecord};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use tracing::error;

impl Database {
    // -- Owners --

    /// Insert-if-absent. Returns false when an owner with this id (or a
    /// colliding connection key) already exists.
    pub fn add_owner(&self, owner: &Owner) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO owners (owner_id, connection_key, relay_channel_id, locale)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    owner.owner_id,
                    owner.connection_key,
                    owner.relay_channel_id,
                    owner.locale
                ],
            )?;
            Ok(inserted > 0)
        })
    }

    pub fn get_owner(&self, owner_id: i64) -> Result<Option<Owner>> {
        self.with_conn(|conn| {
            query_owner(
                conn,
                "SELECT owner_id, connection_key, relay_channel_id, locale
                 FROM owners WHERE owner_id = ?1",
                rusqlite::params![owner_id],
            )
        })
    }

    /// The primary lookup: resolves whose shadow store an event touches.
    pub fn get_owner_by_connection(&self, connection_key: &str) -> Result<Option<Owner>> {
        self.with_conn(|conn| {
            query_owner(
                conn,
                "SELECT owner_id, connection_key, relay_channel_id, locale
                 FROM owners WHERE connection_key = ?1",
                rusqlite::params![connection_key],
            )
        })
    }

    /// Callers must follow up with `delete_all` on the old key: records
    /// stored under it are unreadable once the raw id changes.
    pub fn update_connection_key(&self, owner_id: i64, new_key: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE owners SET connection_key = ?1 WHERE owner_id = ?2",
                rusqlite::params![new_key, owner_id],
            )?;
            Ok(())
        })
    }

    pub fn delete_owner(&self, owner_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM owners WHERE owner_id = ?1", [owner_id])?;
            Ok(())
        })
    }

    // -- Shadow records --

    /// Returns false on a duplicate (connection_key, message_id) or any
    /// storage fault; the failure is logged here, never propagated.
    pub fn insert_record(&self, record: &ShadowRecord) -> bool {
        let (text_cipher, media_cipher, media_subtype) = record.payload.columns();
        let result = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO shadow_records
                     (connection_key, message_id, kind, text_cipher, media_cipher, media_subtype)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    record.connection_key,
                    record.message_id,
                    record.payload.kind_str(),
                    text_cipher,
                    media_cipher,
                    media_subtype
                ],
            )?;
            Ok(())
        });

        match result {
            Ok(()) => true,
            Err(e) => {
                error!(
                    "shadow record insert failed for message {}: {e}",
                    record.message_id
                );
                false
            }
        }
    }

    pub fn get_record(&self, connection_key: &str, message_id: i64) -> Result<Option<ShadowRecord>> {
        self.with_conn(|conn| query_record(conn, connection_key, message_id))
    }

    /// Persist an edit's mutation of the text/caption or attachment cipher.
    /// Kind and subtype never change.
    pub fn update_record(&self, record: &ShadowRecord) -> Result<()> {
        let (text_cipher, media_cipher, _) = record.payload.columns();
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE shadow_records SET text_cipher = ?1, media_cipher = ?2
                 WHERE connection_key = ?3 AND message_id = ?4",
                rusqlite::params![
                    text_cipher,
                    media_cipher,
                    record.connection_key,
                    record.message_id
                ],
            )?;
            Ok(())
        })
    }

    /// Idempotent: deleting an absent record is a no-op.
    pub fn delete_record(&self, connection_key: &str, message_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM shadow_records WHERE connection_key = ?1 AND message_id = ?2",
                rusqlite::params![connection_key, message_id],
            )?;
            Ok(())
        })
    }

    /// Bulk purge, used on reconnection and revocation. Returns the number
    /// of records removed.
    pub fn delete_all(&self, connection_key: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM shadow_records WHERE connection_key = ?1",
                [connection_key],
            )?;
            Ok(removed)
        })
    }
}

fn query_owner(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Option<Owner>> {
    let mut stmt = conn.prepare(sql)?;

    let row = stmt
        .query_row(params, |row| {
            Ok(Owner {
                owner_id: row.get(0)?,
                connection_key: row.get(1)?,
                relay_channel_id: row.get(2)?,
                locale: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_record(
    conn: &Connection,
    connection_key: &str,
    message_id: i64,
) -> Result<Option<ShadowRecord>> {
    let mut stmt = conn.prepare(
        "SELECT kind, text_cipher, media_cipher, media_subtype
         FROM shadow_records WHERE connection_key = ?1 AND message_id = ?2",
    )?;

    let columns = stmt
        .query_row(rusqlite::params![connection_key, message_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })
        .optional()?;

    let Some((kind, text_cipher, media_cipher, media_subtype)) = columns else {
        return Ok(None);
    };

    let payload = ShadowPayload::from_columns(&kind, text_cipher, media_cipher, media_subtype)?;
    Ok(Some(ShadowRecord {
        connection_key: connection_key.to_string(),
        message_id,
        payload,
    }))
}
