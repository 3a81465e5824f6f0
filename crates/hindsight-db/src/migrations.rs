use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS owners (
            owner_id            INTEGER PRIMARY KEY,
            connection_key      TEXT NOT NULL UNIQUE,
            relay_channel_id    INTEGER,
            locale              TEXT NOT NULL,
            created_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS shadow_records (
            connection_key  TEXT NOT NULL,
            message_id      INTEGER NOT NULL,
            kind            TEXT NOT NULL,
            text_cipher     TEXT,
            media_cipher    TEXT,
            media_subtype   TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(connection_key, message_id)
        );

        CREATE INDEX IF NOT EXISTS idx_shadow_records_connection
            ON shadow_records(connection_key);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
