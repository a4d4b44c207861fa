use serde::{Deserialize, Serialize};
use studywatch_remote::ActivityKind;

/// Severity at or above which a warning is critical and stays on screen
pub const CRITICAL_SEVERITY: f64 = 0.8;
/// Severity at or above which a warning is moderate
pub const MODERATE_SEVERITY: f64 = 0.6;
/// How long a non-critical warning stays visible
pub const DEFAULT_DISMISS_AFTER_MS: u64 = 7000;

/// Background colour band of a warning card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundTier {
    Critical,
    Moderate,
    Minor,
}

impl BackgroundTier {
    #[must_use]
    pub fn from_severity(severity: f64) -> Self {
        if severity >= CRITICAL_SEVERITY {
            Self::Critical
        } else if severity >= MODERATE_SEVERITY {
            Self::Moderate
        } else {
            Self::Minor
        }
    }
}

/// How a distraction should be presented
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarningDirective {
    pub emoji: &'static str,
    pub title: &'static str,
    pub message: &'static str,
    pub background_tier: BackgroundTier,
    pub auto_dismiss: bool,
    /// Zero when the warning is not auto-dismissed
    pub dismiss_after_ms: u64,
    /// Vibrate the device; only phone distractions ask for it
    pub haptic_alert: bool,
}

impl WarningDirective {
    /// Single-block text as shown on the warning card
    #[must_use]
    pub fn text(&self) -> String {
        format!("{} {}\n{}", self.emoji, self.title, self.message)
    }
}

struct WarningCopy {
    emoji: &'static str,
    title: &'static str,
    message: &'static str,
}

const fn copy_for(activity: ActivityKind) -> WarningCopy {
    match activity {
        ActivityKind::PhoneDistraction => WarningCopy {
            emoji: "\u{1F4F1}",
            title: "PHONE DETECTED!",
            message: "Put your phone away immediately!\nFocus on your studies!",
        },
        ActivityKind::Asleep => WarningCopy {
            emoji: "\u{1F634}",
            title: "WAKE UP!",
            message: "You're falling asleep!\nTake a break or splash water on your face!",
        },
        ActivityKind::LookingAway => WarningCopy {
            emoji: "\u{1F440}",
            title: "LOOKING AWAY!",
            message: "You've been distracted for too long.\nRefocus on your work!",
        },
        ActivityKind::FaceMissing => WarningCopy {
            emoji: "\u{274C}",
            title: "WHERE ARE YOU?",
            message: "Face not detected!\nReturn to your study desk!",
        },
        ActivityKind::Unknown => WarningCopy {
            emoji: "\u{26A0}\u{FE0F}",
            title: "DISTRACTED!",
            message: "You're not focused.\nGet back to studying!",
        },
    }
}

/// Maps distraction signals to warning directives.
///
/// Stateless apart from the dismiss delay; the same inputs always give the
/// same directive.
#[derive(Debug, Clone, Copy)]
pub struct DistractionClassifier {
    dismiss_after_ms: u64,
}

impl Default for DistractionClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_DISMISS_AFTER_MS)
    }
}

impl DistractionClassifier {
    #[must_use]
    pub const fn new(dismiss_after_ms: u64) -> Self {
        Self { dismiss_after_ms }
    }

    /// Classify a distraction.
    ///
    /// Auto-dismiss depends only on the 0.8 severity threshold, never on the tier.
    #[must_use]
    pub fn classify(&self, activity: ActivityKind, severity: f64) -> WarningDirective {
        let copy = copy_for(activity);
        let auto_dismiss = severity < CRITICAL_SEVERITY;

        WarningDirective {
            emoji: copy.emoji,
            title: copy.title,
            message: copy.message,
            background_tier: BackgroundTier::from_severity(severity),
            auto_dismiss,
            dismiss_after_ms: if auto_dismiss { self.dismiss_after_ms } else { 0 },
            haptic_alert: activity == ActivityKind::PhoneDistraction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [ActivityKind; 5] = [
        ActivityKind::PhoneDistraction,
        ActivityKind::Asleep,
        ActivityKind::LookingAway,
        ActivityKind::FaceMissing,
        ActivityKind::Unknown,
    ];

    #[test]
    fn test_critical_severity_stays_on_screen() {
        let warning = DistractionClassifier::default().classify(ActivityKind::Asleep, 0.9);
        assert_eq!(warning.background_tier, BackgroundTier::Critical);
        assert!(!warning.auto_dismiss);
        assert_eq!(warning.dismiss_after_ms, 0);
    }

    #[test]
    fn test_moderate_severity_auto_dismisses() {
        let warning = DistractionClassifier::default().classify(ActivityKind::LookingAway, 0.7);
        assert_eq!(warning.background_tier, BackgroundTier::Moderate);
        assert!(warning.auto_dismiss);
        assert_eq!(warning.dismiss_after_ms, 7000);
    }

    #[test]
    fn test_minor_severity_auto_dismisses() {
        let warning = DistractionClassifier::default().classify(ActivityKind::FaceMissing, 0.3);
        assert_eq!(warning.background_tier, BackgroundTier::Minor);
        assert!(warning.auto_dismiss);
        assert_eq!(warning.dismiss_after_ms, 7000);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(BackgroundTier::from_severity(0.8), BackgroundTier::Critical);
        assert_eq!(BackgroundTier::from_severity(0.799), BackgroundTier::Moderate);
        assert_eq!(BackgroundTier::from_severity(0.6), BackgroundTier::Moderate);
        assert_eq!(BackgroundTier::from_severity(0.599), BackgroundTier::Minor);
        assert_eq!(BackgroundTier::from_severity(0.0), BackgroundTier::Minor);
    }

    #[test]
    fn test_auto_dismiss_follows_threshold_only() {
        let classifier = DistractionClassifier::default();
        for kind in ALL_KINDS {
            for severity in [0.0, 0.3, 0.59, 0.6, 0.79, 0.8, 0.95, 1.0] {
                let warning = classifier.classify(kind, severity);
                assert_eq!(warning.auto_dismiss, severity < 0.8, "{kind} @ {severity}");
            }
        }
    }

    #[test]
    fn test_haptic_only_for_phone() {
        let classifier = DistractionClassifier::default();
        assert!(classifier.classify(ActivityKind::PhoneDistraction, 0.9).haptic_alert);
        assert!(classifier.classify(ActivityKind::PhoneDistraction, 0.1).haptic_alert);

        for kind in ALL_KINDS.into_iter().filter(|k| *k != ActivityKind::PhoneDistraction) {
            for severity in [0.1, 0.7, 0.9] {
                assert!(!classifier.classify(kind, severity).haptic_alert);
            }
        }
    }

    #[test]
    fn test_unrecognised_activity_uses_default_copy() {
        let classifier = DistractionClassifier::default();
        let fallback = classifier.classify(ActivityKind::Unknown, 0.5);
        assert_eq!(fallback.title, "DISTRACTED!");
    }

    #[test]
    fn test_copy_table() {
        let classifier = DistractionClassifier::default();
        assert_eq!(
            classifier.classify(ActivityKind::PhoneDistraction, 0.9).title,
            "PHONE DETECTED!"
        );
        assert_eq!(classifier.classify(ActivityKind::Asleep, 0.9).title, "WAKE UP!");
        assert_eq!(
            classifier.classify(ActivityKind::LookingAway, 0.9).title,
            "LOOKING AWAY!"
        );
        assert_eq!(
            classifier.classify(ActivityKind::FaceMissing, 0.9).text(),
            "\u{274C} WHERE ARE YOU?\nFace not detected!\nReturn to your study desk!"
        );
    }

    #[test]
    fn test_same_input_same_directive() {
        let classifier = DistractionClassifier::new(5000);
        let first = classifier.classify(ActivityKind::LookingAway, 0.65);
        let second = classifier.classify(ActivityKind::LookingAway, 0.65);
        assert_eq!(first, second);
        assert_eq!(first.dismiss_after_ms, 5000);
    }
}
