/// Live study session driven from the terminal
use anyhow::{Context, Result};
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;
use studywatch_core::{
    AchievementChecker, BackgroundTier, Collaborators, CompletionNotifier, ControllerConfig,
    FocusMetrics, Intent, SessionController, SessionDisplay, WarningDirective,
};
use studywatch_remote::FocusServiceClient;
use studywatch_storage::Database;
use tokio::sync::mpsc;

use super::helpers::{format_score, format_total};

/// Prints session updates to stdout
struct TerminalDisplay;

impl SessionDisplay for TerminalDisplay {
    fn show_metrics(&self, metrics: &FocusMetrics) {
        println!(
            "Focus {:>3.0}% | streak {} min | session {} | today {}",
            metrics.focus_score,
            metrics.focused_streak_mins,
            metrics.session_time,
            format_total(metrics.today_total_ms / 1000)
        );
    }

    fn show_warning(&self, warning: &WarningDirective) {
        let banner = match warning.background_tier {
            BackgroundTier::Critical => "!!!",
            BackgroundTier::Moderate => "!!",
            BackgroundTier::Minor => "!",
        };
        let bell = if warning.haptic_alert { "\u{7}" } else { "" };
        println!("{bell}{banner} {}", warning.text().replace('\n', " "));
    }

    fn hide_warning(&self) {
        log::debug!("Warning cleared");
    }

    fn connectivity_notice(&self, message: &str) {
        eprintln!("{message}");
    }
}

struct ConsoleNotifier;

impl CompletionNotifier for ConsoleNotifier {
    fn session_complete(&self, duration: &str, focus_score: Option<f64>) {
        println!(
            "Study session complete! Duration {duration}, focus score {}",
            format_score(focus_score)
        );
    }
}

/// Achievements are evaluated by the focus service; this only records the hook
struct LoggingAchievements;

impl AchievementChecker for LoggingAchievements {
    fn check_achievements(&self, username: &str) {
        log::info!("Checking achievements for {username}");
    }
}

/// Map a line typed during a session to an intent
fn parse_command(line: &str) -> Option<Intent> {
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "pause" | "resume" => Some(Intent::TogglePause),
        "s" | "stop" | "q" | "quit" => Some(Intent::Stop),
        _ => None,
    }
}

pub async fn run_live_session(
    db: Database,
    username: Option<String>,
    server: Option<String>,
) -> Result<()> {
    let mut settings = db.get_settings()?;
    if let Some(server) = server {
        settings.server_ip = Some(server);
    }
    let username = username
        .or_else(|| settings.default_username.clone())
        .context("No student name. Pass --username or run: studywatch config set user.name <name>")?;

    let base_url = settings.base_url();
    let client = FocusServiceClient::new(
        &base_url,
        Duration::from_secs(settings.request_timeout_secs),
    )?;
    log::info!("Using focus service at {base_url}");

    let controller = SessionController::new(
        ControllerConfig::from_settings(&settings),
        Collaborators {
            service: Arc::new(client),
            store: Arc::new(db),
            display: Arc::new(TerminalDisplay),
            notifier: Arc::new(ConsoleNotifier),
            achievements: Arc::new(LoggingAchievements),
        },
    );

    let (tx, rx) = mpsc::channel(16);
    tx.send(Intent::Start { username }).await?;

    // Blocking stdin reader on its own thread so it never holds up runtime shutdown
    let input = tx.clone();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let Some(intent) = parse_command(&line) else {
                println!("Commands: p = pause/resume, s = stop");
                continue;
            };
            let stop = intent == Intent::Stop;
            if input.blocking_send(intent).is_err() || stop {
                break;
            }
        }
    });

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(Intent::Stop).await;
        }
    });

    println!("Session started. Type p to pause/resume, s to stop.");
    let stopped = controller.run(rx).await?;

    println!(
        "Saved {} session for {} on {} (focus score {})",
        stopped.record.duration,
        stopped.record.username,
        stopped.record.date,
        format_score(stopped.record.focus_score)
    );
    if !stopped.remote_confirmed {
        println!("Focus service did not confirm the stop; the session was saved locally.");
    }
    Ok(())
}
