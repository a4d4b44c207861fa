use anyhow::Result;
use rusqlite::Connection;

/// Initialize database schema
///
/// # Errors
///
/// Returns an error if table or index creation fails
pub fn init_schema(conn: &Connection) -> Result<()> {
    // Study sessions table - one row per stopped session
    conn.execute(
        "CREATE TABLE IF NOT EXISTS study_sessions (
            id TEXT PRIMARY KEY,
            session_id TEXT,
            date TEXT NOT NULL,
            duration TEXT NOT NULL,
            username TEXT NOT NULL,
            focus_score REAL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_study_sessions_date ON study_sessions(date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_study_sessions_username ON study_sessions(username)",
        [],
    )?;

    // Settings table - single row of monitor preferences
    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            server_ip TEXT,
            server_port INTEGER NOT NULL,
            poll_interval_ms INTEGER NOT NULL,
            warning_dismiss_ms INTEGER NOT NULL,
            request_timeout_secs INTEGER NOT NULL,
            legacy_pings INTEGER NOT NULL DEFAULT 1,
            default_username TEXT
        )",
        [],
    )?;

    Ok(())
}
