//! Chat history schema and its migrations.
//!
//! Migrations are applied in order; `schema_version` records how many have run.

const VERSION_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL) STRICT;";

/// One entry per schema version, oldest first. Never edit a shipped entry.
///
/// v1: `chats` keeps one row per conversation keyed by the session UUID text,
/// with the whole message list as JSON, replaced on every save.
const MIGRATIONS: &[&str] = &["
    CREATE TABLE IF NOT EXISTS chats (
        id          TEXT    PRIMARY KEY,
        title       TEXT    NOT NULL DEFAULT 'New Chat',
        messages    TEXT    NOT NULL,
        created_at  INTEGER NOT NULL,
        updated_at  INTEGER NOT NULL
    ) STRICT;
    CREATE INDEX IF NOT EXISTS chats_updated_at ON chats(updated_at DESC);
"];

/// Latest schema version this build knows about.
pub const CURRENT_VERSION: i64 = MIGRATIONS.len() as i64;

/// Brings `db` up to [`CURRENT_VERSION`]. Running it again is a no-op.
///
/// Each pending migration commits in its own `BEGIN IMMEDIATE` transaction.
///
/// # Errors
///
/// Returns `rusqlite::Error` when a statement fails.
pub fn migrate(db: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    db.execute_batch(VERSION_TABLE)?;
    let applied: i64 = db.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;

    for (idx, sql) in MIGRATIONS.iter().enumerate().skip(applied.max(0) as usize) {
        let version = idx as i64 + 1;
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute_batch(sql)?;
        tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
        tx.commit()?;
        tracing::info!(version, "chat history schema migrated");
    }
    Ok(())
}
