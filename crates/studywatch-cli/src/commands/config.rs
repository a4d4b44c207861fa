/// Configuration management command handlers
use anyhow::{Context, Result};
use studywatch_storage::{Database, Settings};

const VALID_KEYS: &str = "server.ip, server.port, server.timeout_secs, server.legacy_pings, \
                          session.poll_interval_ms, session.warning_dismiss_ms, user.name";

pub fn handle_config_get(db: &Database, key: &str) -> Result<()> {
    let settings = db.get_settings()?;
    match get_config_value(&settings, key)? {
        Some(v) => println!("{key} = {v}"),
        None => println!("{key} is not set"),
    }
    Ok(())
}

pub fn handle_config_set(db: &Database, key: &str, value: &str) -> Result<()> {
    let mut settings = db.get_settings()?;
    set_config_value(&mut settings, key, value)?;
    db.update_settings(&settings)?;
    println!("Set {key} = {value}");
    Ok(())
}

pub fn handle_config_list(db: &Database) -> Result<()> {
    let settings = db.get_settings()?;

    println!("Configuration:");
    println!("\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}");

    println!("\n[server]");
    println!(
        "  ip = {}",
        settings.server_ip.as_deref().unwrap_or("(default)")
    );
    println!("  port = {}", settings.server_port);
    println!("  timeout_secs = {}", settings.request_timeout_secs);
    println!("  legacy_pings = {}", settings.legacy_pings);
    println!("  -> {}", settings.base_url());

    println!("\n[session]");
    println!("  poll_interval_ms = {}", settings.poll_interval_ms);
    println!("  warning_dismiss_ms = {}", settings.warning_dismiss_ms);

    println!("\n[user]");
    println!(
        "  name = {}",
        settings.default_username.as_deref().unwrap_or("(not set)")
    );

    Ok(())
}

fn split_key(key: &str) -> Result<(&str, &str)> {
    key.split_once('.')
        .filter(|(section, field)| !section.is_empty() && !field.contains('.'))
        .ok_or_else(|| {
            anyhow::anyhow!("Invalid key format. Use: <section>.<key> (e.g., server.ip)")
        })
}

fn get_config_value(settings: &Settings, key: &str) -> Result<Option<String>> {
    let value = match split_key(key)? {
        ("server", "ip") => settings.server_ip.clone(),
        ("server", "port") => Some(settings.server_port.to_string()),
        ("server", "timeout_secs") => Some(settings.request_timeout_secs.to_string()),
        ("server", "legacy_pings") => Some(settings.legacy_pings.to_string()),
        ("session", "poll_interval_ms") => Some(settings.poll_interval_ms.to_string()),
        ("session", "warning_dismiss_ms") => Some(settings.warning_dismiss_ms.to_string()),
        ("user", "name") => settings.default_username.clone(),
        _ => anyhow::bail!("Unknown key: {key}. Valid keys: {VALID_KEYS}"),
    };
    Ok(value)
}

fn set_config_value(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    let value = value.trim();
    match split_key(key)? {
        ("server", "ip") => settings.server_ip = non_empty(value),
        ("server", "port") => {
            settings.server_port = value
                .parse()
                .with_context(|| format!("Invalid port: {value}"))?;
        }
        ("server", "timeout_secs") => {
            settings.request_timeout_secs = parse_positive(value, key)?;
        }
        ("server", "legacy_pings") => {
            settings.legacy_pings = value
                .parse()
                .with_context(|| format!("Expected true or false, got: {value}"))?;
        }
        ("session", "poll_interval_ms") => {
            settings.poll_interval_ms = parse_positive(value, key)?;
        }
        ("session", "warning_dismiss_ms") => {
            settings.warning_dismiss_ms = parse_positive(value, key)?;
        }
        ("user", "name") => settings.default_username = non_empty(value),
        _ => anyhow::bail!("Unknown key: {key}. Valid keys: {VALID_KEYS}"),
    }
    Ok(())
}

fn parse_positive(value: &str, key: &str) -> Result<u64> {
    let parsed: u64 = value
        .parse()
        .with_context(|| format!("Invalid number for {key}: {value}"))?;
    if parsed == 0 {
        anyhow::bail!("{key} must be greater than zero");
    }
    Ok(parsed)
}

/// An empty value clears an optional setting
fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let mut settings = Settings::default();
        set_config_value(&mut settings, "server.ip", "192.168.1.20").unwrap();
        set_config_value(&mut settings, "server.port", "8080").unwrap();
        set_config_value(&mut settings, "user.name", "ana").unwrap();

        assert_eq!(
            get_config_value(&settings, "server.ip").unwrap().as_deref(),
            Some("192.168.1.20")
        );
        assert_eq!(settings.base_url(), "http://192.168.1.20:8080");
        assert_eq!(
            get_config_value(&settings, "user.name").unwrap().as_deref(),
            Some("ana")
        );
    }

    #[test]
    fn test_empty_value_clears_optional_setting() {
        let mut settings = Settings::default();
        set_config_value(&mut settings, "server.ip", "10.0.0.5").unwrap();
        set_config_value(&mut settings, "server.ip", "").unwrap();
        assert_eq!(settings.server_ip, None);
        assert_eq!(get_config_value(&settings, "server.ip").unwrap(), None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut settings = Settings::default();
        assert!(set_config_value(&mut settings, "server.port", "99999").is_err());
        assert!(set_config_value(&mut settings, "session.poll_interval_ms", "0").is_err());
        assert!(set_config_value(&mut settings, "server.legacy_pings", "maybe").is_err());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_bad_keys_rejected() {
        let settings = Settings::default();
        assert!(get_config_value(&settings, "server").is_err());
        assert!(get_config_value(&settings, "server.ip.extra").is_err());
        assert!(get_config_value(&settings, "plane.api_key").is_err());
    }

    #[test]
    fn test_set_persists_through_database() {
        let db = Database::in_memory().unwrap();
        handle_config_set(&db, "session.warning_dismiss_ms", "5000").unwrap();
        handle_config_set(&db, "server.legacy_pings", "false").unwrap();

        let settings = db.get_settings().unwrap();
        assert_eq!(settings.warning_dismiss_ms, 5000);
        assert!(!settings.legacy_pings);
    }
}
