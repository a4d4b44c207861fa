//! Helper utility functions for CLI commands

/// Safely truncate a string to a maximum number of characters (not bytes).
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Render a number of seconds as `Xh Ym`
pub fn format_total(secs: u64) -> String {
    let minutes = secs / 60;
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Focus score as shown to the student, or a dash when the service never sent one
pub fn format_score(score: Option<f64>) -> String {
    score.map_or_else(|| "-".to_string(), |s| format!("{s:.0}%"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_short() {
        assert_eq!(truncate_str("session_1", 12), "session_1");
    }

    #[test]
    fn test_truncate_str_long() {
        assert_eq!(truncate_str("session_1700000000000", 10), "session_17...");
    }

    #[test]
    fn test_format_total() {
        assert_eq!(format_total(0), "0h 0m");
        assert_eq!(format_total(59), "0h 0m");
        assert_eq!(format_total(930), "0h 15m");
        assert_eq!(format_total(7_509), "2h 5m");
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(None), "-");
        assert_eq!(format_score(Some(82.6)), "83%");
    }
}
