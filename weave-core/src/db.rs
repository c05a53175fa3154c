use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use crate::error::{Error, Result};
use crate::types::{ChatRecord, ChatSummary, Message};

/// Opens the chat history at `path`, creating it if needed.
///
/// Turns on WAL with a 5 s busy timeout, truncates a leftover WAL from an
/// unclean exit, then migrates the schema.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the file cannot be opened or any setup
/// statement fails.
pub async fn open_db(path: &str) -> Result<Connection, tokio_rusqlite::Error> {
    let conn = Connection::open(path).await?;
    conn.call(|db| {
        db.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA wal_checkpoint(TRUNCATE);",
        )?;
        db.busy_timeout(Duration::from_secs(5))?;
        crate::schema::migrate(db)?;
        Ok::<_, rusqlite::Error>(())
    })
    .await?;
    tracing::debug!(path, "chat history opened");
    Ok(conn)
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Writes the snapshot for chat `id`, replacing any earlier one.
///
/// `created_at` is kept from the first write; `updated_at` moves to now.
///
/// # Errors
///
/// Returns [`Error::Json`] if the messages cannot be encoded, or
/// [`Error::Db`] if the upsert transaction fails.
pub async fn save_chat(
    conn: &Connection,
    id: &str,
    title: &str,
    messages: &[Message],
) -> Result<()> {
    let encoded = serde_json::to_string(messages)?;
    let id = id.to_owned();
    let title = title.to_owned();

    conn.call(move |db| {
        let now = now_secs();
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO chats (id, title, messages, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(id)
             DO UPDATE SET title = excluded.title,
                           messages = excluded.messages,
                           updated_at = excluded.updated_at",
            rusqlite::params![&id, &title, &encoded, now],
        )?;
        tx.commit()?;
        Ok::<_, rusqlite::Error>(())
    })
    .await?;
    Ok(())
}

/// Loads the snapshot for chat `id`, or `None` if it was never saved.
///
/// # Errors
///
/// Returns [`Error::Db`] on query failure and [`Error::CorruptRecord`] when the
/// stored message list does not decode.
pub async fn load_chat(conn: &Connection, id: &str) -> Result<Option<ChatRecord>> {
    let key = id.to_owned();

    let row = conn
        .call(move |db| {
            let row = db
                .query_row(
                    "SELECT id, title, messages, created_at, updated_at
                     FROM chats WHERE id = ?1",
                    rusqlite::params![&key],
                    |r| {
                        Ok((
                            r.get::<_, String>(0)?,
                            r.get::<_, String>(1)?,
                            r.get::<_, String>(2)?,
                            r.get::<_, i64>(3)?,
                            r.get::<_, i64>(4)?,
                        ))
                    },
                )
                .optional()?;
            Ok::<_, rusqlite::Error>(row)
        })
        .await?;

    let Some((id, title, raw, created_at, updated_at)) = row else {
        return Ok(None);
    };
    let messages: Vec<Message> =
        serde_json::from_str(&raw).map_err(|e| Error::CorruptRecord {
            id: id.clone(),
            details: e.to_string(),
        })?;
    Ok(Some(ChatRecord { id, title, messages, created_at, updated_at }))
}

/// Lists stored chats, most recently updated first.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the query fails.
pub async fn list_chats(
    conn: &Connection,
    limit: usize,
) -> Result<Vec<ChatSummary>, tokio_rusqlite::Error> {
    let limit = limit as i64;
    conn.call(move |db| {
        let mut stmt = db.prepare(
            "SELECT id, title, updated_at FROM chats
             ORDER BY updated_at DESC, rowid DESC
             LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(rusqlite::params![limit], |r| {
                Ok(ChatSummary {
                    id: r.get(0)?,
                    title: r.get(1)?,
                    updated_at: r.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok::<_, rusqlite::Error>(rows)
    })
    .await
}
