use anyhow::Result;
use rusqlite::{params, OptionalExtension};

use super::helpers::{to_sql_integer, to_unsigned};
use super::Database;
use crate::models::Settings;

impl Database {
    /// Load settings, falling back to defaults when none were saved
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn get_settings(&self) -> Result<Settings> {
        let conn = self.conn()?;
        let result = conn
            .query_row(
                "SELECT server_ip, server_port, poll_interval_ms, warning_dismiss_ms,
                        request_timeout_secs, legacy_pings, default_username
                 FROM settings WHERE id = 1",
                [],
                |row| {
                    Ok(Settings {
                        server_ip: row.get(0)?,
                        server_port: to_unsigned(1, row.get(1)?)?,
                        poll_interval_ms: to_unsigned(2, row.get(2)?)?,
                        warning_dismiss_ms: to_unsigned(3, row.get(3)?)?,
                        request_timeout_secs: to_unsigned(4, row.get(4)?)?,
                        legacy_pings: row.get::<_, Option<i32>>(5)?.unwrap_or(1) != 0,
                        default_username: row.get(6)?,
                    })
                },
            )
            .optional()?;

        Ok(result.unwrap_or_default())
    }

    /// Save settings
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub fn update_settings(&self, settings: &Settings) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO settings (id, server_ip, server_port, poll_interval_ms, warning_dismiss_ms,
                                   request_timeout_secs, legacy_pings, default_username)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                server_ip = ?1,
                server_port = ?2,
                poll_interval_ms = ?3,
                warning_dismiss_ms = ?4,
                request_timeout_secs = ?5,
                legacy_pings = ?6,
                default_username = ?7",
            params![
                settings.server_ip,
                i64::from(settings.server_port),
                to_sql_integer(settings.poll_interval_ms),
                to_sql_integer(settings.warning_dismiss_ms),
                to_sql_integer(settings.request_timeout_secs),
                i32::from(settings.legacy_pings),
                settings.default_username,
            ],
        )?;
        log::debug!("Updated settings: {settings:?}");
        Ok(())
    }
}
