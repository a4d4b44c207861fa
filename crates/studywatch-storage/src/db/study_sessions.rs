use anyhow::Result;
use chrono::Utc;
use rusqlite::params;

use super::Database;
use crate::models::StoredSessionRecord;

impl Database {
    /// Persist the outcome of a stopped session
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails
    pub fn save_session(&self, record: &StoredSessionRecord) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO study_sessions (id, session_id, date, duration, username, focus_score, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                uuid::Uuid::new_v4().to_string(),
                record.session_id,
                record.date,
                record.duration,
                record.username,
                record.focus_score,
                Utc::now().to_rfc3339(),
            ],
        )?;
        log::info!(
            "Saved session for {} on {} ({}, score: {:?})",
            record.username,
            record.date,
            record.duration,
            record.focus_score
        );
        Ok(())
    }

    /// List stored sessions, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn list_sessions(
        &self,
        username: Option<&str>,
        limit: usize,
    ) -> Result<Vec<StoredSessionRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT session_id, date, duration, username, focus_score
             FROM study_sessions
             WHERE ?1 IS NULL OR username = ?1
             ORDER BY rowid DESC
             LIMIT ?2",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = stmt
            .query_map(params![username, limit], Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// List stored sessions for a single date
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn get_sessions_for_date(
        &self,
        date: &str,
        username: Option<&str>,
    ) -> Result<Vec<StoredSessionRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT session_id, date, duration, username, focus_score
             FROM study_sessions
             WHERE date = ?1 AND (?2 IS NULL OR username = ?2)
             ORDER BY rowid ASC",
        )?;

        let records = stmt
            .query_map(params![date, username], Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Sum of recorded durations for a date, in seconds
    ///
    /// Rows whose duration is not `MM:SS` are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn total_duration_secs_for_date(&self, date: &str, username: Option<&str>) -> Result<u64> {
        let records = self.get_sessions_for_date(date, username)?;
        let total = records
            .iter()
            .filter_map(|record| {
                let secs = record.duration_secs();
                if secs.is_none() {
                    log::warn!("Skipping malformed duration '{}'", record.duration);
                }
                secs
            })
            .sum();
        Ok(total)
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<StoredSessionRecord> {
        Ok(StoredSessionRecord {
            session_id: row.get(0)?,
            date: row.get(1)?,
            duration: row.get(2)?,
            username: row.get(3)?,
            focus_score: row.get(4)?,
        })
    }
}
