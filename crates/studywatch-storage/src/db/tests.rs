use super::*;
use crate::models::{Settings, StoredSessionRecord};

fn record(date: &str, duration: &str, username: &str, score: Option<f64>) -> StoredSessionRecord {
    StoredSessionRecord::new(
        Some(format!("session_{date}")),
        date.to_string(),
        duration.to_string(),
        username.to_string(),
        score,
    )
}

#[test]
fn test_save_and_list_sessions_newest_first() {
    let db = Database::in_memory().unwrap();
    db.save_session(&record("2024-03-01", "10:00", "ana", Some(91.5)))
        .unwrap();
    db.save_session(&record("2024-03-02", "00:17", "ana", None))
        .unwrap();

    let sessions = db.list_sessions(None, 10).unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].date, "2024-03-02");
    assert_eq!(sessions[0].focus_score, None);
    assert_eq!(sessions[1].focus_score, Some(91.5));
}

#[test]
fn test_list_sessions_filters_by_username_and_limit() {
    let db = Database::in_memory().unwrap();
    db.save_session(&record("2024-03-01", "10:00", "ana", None))
        .unwrap();
    db.save_session(&record("2024-03-01", "05:00", "ben", None))
        .unwrap();
    db.save_session(&record("2024-03-02", "07:30", "ana", None))
        .unwrap();

    let ana = db.list_sessions(Some("ana"), 10).unwrap();
    assert_eq!(ana.len(), 2);
    assert!(ana.iter().all(|r| r.username == "ana"));

    let limited = db.list_sessions(None, 1).unwrap();
    assert_eq!(limited.len(), 1);
}

#[test]
fn test_session_without_remote_id_round_trips() {
    let db = Database::in_memory().unwrap();
    let stored = StoredSessionRecord::new(
        None,
        "2024-03-01".to_string(),
        "00:17".to_string(),
        "ana".to_string(),
        None,
    );
    db.save_session(&stored).unwrap();

    let sessions = db.list_sessions(Some("ana"), 1).unwrap();
    assert_eq!(sessions, vec![stored]);
}

#[test]
fn test_total_duration_for_date() {
    let db = Database::in_memory().unwrap();
    db.save_session(&record("2024-03-01", "10:00", "ana", None))
        .unwrap();
    db.save_session(&record("2024-03-01", "00:30", "ana", None))
        .unwrap();
    db.save_session(&record("2024-03-01", "05:00", "ben", None))
        .unwrap();
    db.save_session(&record("2024-03-02", "99:00", "ana", None))
        .unwrap();
    db.save_session(&record("2024-03-01", "garbage", "ana", None))
        .unwrap();

    assert_eq!(
        db.total_duration_secs_for_date("2024-03-01", Some("ana"))
            .unwrap(),
        630
    );
    assert_eq!(
        db.total_duration_secs_for_date("2024-03-01", None).unwrap(),
        930
    );
    assert_eq!(
        db.total_duration_secs_for_date("2024-01-01", None).unwrap(),
        0
    );
}

#[test]
fn test_settings_default_when_unsaved() {
    let db = Database::in_memory().unwrap();
    assert_eq!(db.get_settings().unwrap(), Settings::default());
}

#[test]
fn test_update_settings_round_trip() {
    let db = Database::in_memory().unwrap();
    let settings = Settings {
        server_ip: Some("192.168.0.12".to_string()),
        server_port: 8080,
        poll_interval_ms: 1500,
        warning_dismiss_ms: 5000,
        request_timeout_secs: 3,
        legacy_pings: false,
        default_username: Some("ana".to_string()),
    };
    db.update_settings(&settings).unwrap();
    assert_eq!(db.get_settings().unwrap(), settings);

    let changed = Settings {
        server_ip: None,
        ..settings
    };
    db.update_settings(&changed).unwrap();
    assert_eq!(db.get_settings().unwrap(), changed);
}

#[test]
fn test_database_persists_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("studywatch.db");

    {
        let db = Database::new(Some(path.clone())).unwrap();
        db.save_session(&record("2024-03-01", "01:00", "ana", Some(80.0)))
            .unwrap();
    }

    let reopened = Database::new(Some(path)).unwrap();
    let sessions = reopened.list_sessions(None, 10).unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].focus_score, Some(80.0));
}

#[test]
fn test_default_db_path_is_under_app_dir() {
    let path = Database::default_db_path();
    assert!(path.ends_with("studywatch/studywatch.db"));
}
