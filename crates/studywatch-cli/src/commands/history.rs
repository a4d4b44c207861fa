/// Session history and daily totals
use anyhow::Result;
use studywatch_core::{epoch_ms_now, local_date};
use studywatch_storage::{Database, StoredSessionRecord};
use tabled::{Table, Tabled};

use super::helpers::{format_score, format_total, truncate_str};

#[derive(Tabled)]
struct SessionRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Student")]
    username: String,
    #[tabled(rename = "Focus")]
    focus: String,
    #[tabled(rename = "Session")]
    session: String,
}

impl From<&StoredSessionRecord> for SessionRow {
    fn from(record: &StoredSessionRecord) -> Self {
        Self {
            date: record.date.clone(),
            duration: record.duration.clone(),
            username: record.username.clone(),
            focus: format_score(record.focus_score),
            session: record
                .session_id
                .as_deref()
                .map_or_else(|| "(local only)".to_string(), |id| truncate_str(id, 20)),
        }
    }
}

fn session_table(records: &[StoredSessionRecord]) -> String {
    let rows: Vec<SessionRow> = records.iter().map(SessionRow::from).collect();
    Table::new(rows).to_string()
}

pub fn show_history(
    db: &Database,
    username: Option<&str>,
    limit: usize,
    json: bool,
) -> Result<()> {
    let records = db.list_sessions(username, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No study sessions recorded yet.");
        return Ok(());
    }

    println!("{}", session_table(&records));
    Ok(())
}

pub fn show_day_total(db: &Database, username: Option<&str>, date: Option<&str>) -> Result<()> {
    let date = match date {
        Some(d) => {
            chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|_| anyhow::anyhow!("Invalid date: {d}. Use YYYY-MM-DD"))?;
            d.to_string()
        }
        None => local_date(epoch_ms_now()),
    };

    let records = db.get_sessions_for_date(&date, username)?;
    let total = db.total_duration_secs_for_date(&date, username)?;

    println!("Study time on {date}: {}", format_total(total));
    if !records.is_empty() {
        println!("{}", session_table(&records));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_for_local_only_session() {
        let record = StoredSessionRecord::new(
            None,
            "2024-03-01".to_string(),
            "25:00".to_string(),
            "ana".to_string(),
            None,
        );
        let row = SessionRow::from(&record);
        assert_eq!(row.session, "(local only)");
        assert_eq!(row.focus, "-");
    }

    #[test]
    fn test_table_lists_every_record() {
        let records = vec![
            StoredSessionRecord::new(
                Some("session_1".to_string()),
                "2024-03-01".to_string(),
                "25:00".to_string(),
                "ana".to_string(),
                Some(91.0),
            ),
            StoredSessionRecord::new(
                None,
                "2024-03-02".to_string(),
                "10:30".to_string(),
                "ben".to_string(),
                None,
            ),
        ];

        let table = session_table(&records);
        assert!(table.contains("session_1"));
        assert!(table.contains("91%"));
        assert!(table.contains("ben"));
        assert!(table.contains("(local only)"));
    }

    #[test]
    fn test_day_total_rejects_bad_date() {
        let db = Database::in_memory().unwrap();
        assert!(show_day_total(&db, None, Some("03/01/2024")).is_err());
        assert!(show_day_total(&db, Some("ana"), Some("2024-03-01")).is_ok());
    }
}
