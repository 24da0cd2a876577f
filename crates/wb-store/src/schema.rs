use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: i64 = 1;

pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS nlp_tasks (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            task_type       TEXT NOT NULL,
            input_text      TEXT NOT NULL,
            model_name      TEXT NOT NULL,
            results         TEXT,
            attention_data  TEXT,
            created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            processing_time REAL
        );

        CREATE TABLE IF NOT EXISTS model_metrics (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            model_name          TEXT NOT NULL,
            task_type           TEXT NOT NULL,
            avg_processing_time REAL NOT NULL DEFAULT 0,
            accuracy_score      REAL,
            total_requests      INTEGER NOT NULL DEFAULT 0,
            last_updated        TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            UNIQUE (model_name, task_type)
        );

        CREATE INDEX IF NOT EXISTS idx_task_created ON nlp_tasks(created_at);
        ",
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;

    tracing::debug!("schema v{SCHEMA_VERSION} ready");
    Ok(())
}

pub fn get_schema_version(conn: &Connection) -> Result<Option<i64>> {
    let mut stmt = conn.prepare("SELECT value FROM metadata WHERE key = 'schema_version'")?;
    let version = stmt
        .query_row([], |row| {
            let v: String = row.get(0)?;
            Ok(v.parse::<i64>().unwrap_or(0))
        })
        .ok();
    Ok(version)
}
