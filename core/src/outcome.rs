//! Result envelopes for transitions with best-effort side effects.
//!
//! A workflow commits its primary state change first, then runs the
//! post-transition effects one by one. Effect failures never undo the
//! transition; they are collected here and returned to the caller.

use serde::{Deserialize, Serialize};

/// How a single effect ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectOutcome {
    /// The external call succeeded.
    Succeeded,
    /// The external call failed; see `error`.
    Failed,
    /// Nothing to do (e.g. no calendar event to delete).
    Skipped,
}

/// One executed effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectReport {
    /// Kebab-case effect name, e.g. `create-calendar-event`.
    pub effect: String,
    /// Result.
    pub outcome: EffectOutcome,
    /// Failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EffectReport {
    /// A successful effect.
    #[must_use]
    pub fn succeeded(effect: &str) -> Self {
        Self {
            effect: effect.to_string(),
            outcome: EffectOutcome::Succeeded,
            error: None,
        }
    }

    /// A failed effect.
    #[must_use]
    pub fn failed(effect: &str, error: impl ToString) -> Self {
        Self {
            effect: effect.to_string(),
            outcome: EffectOutcome::Failed,
            error: Some(error.to_string()),
        }
    }

    /// A skipped effect.
    #[must_use]
    pub fn skipped(effect: &str) -> Self {
        Self {
            effect: effect.to_string(),
            outcome: EffectOutcome::Skipped,
            error: None,
        }
    }
}

/// Lookup helpers over a list of reports.
pub trait EffectReports {
    /// Whether the named effect ran and succeeded.
    fn succeeded(&self, effect: &str) -> bool;

    /// Whether any effect failed.
    fn any_failed(&self) -> bool;
}

impl EffectReports for [EffectReport] {
    fn succeeded(&self, effect: &str) -> bool {
        self.iter()
            .any(|r| r.effect == effect && r.outcome == EffectOutcome::Succeeded)
    }

    fn any_failed(&self) -> bool {
        self.iter().any(|r| r.outcome == EffectOutcome::Failed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn serializes_compactly() {
        let ok = serde_json::to_value(EffectReport::succeeded("send-confirmation-email")).unwrap();
        assert_eq!(ok, serde_json::json!({"effect": "send-confirmation-email", "outcome": "succeeded"}));

        let failed = serde_json::to_value(EffectReport::failed("create-calendar-event", "timeout")).unwrap();
        assert_eq!(failed["error"], "timeout");
    }

    #[test]
    fn lookups() {
        let reports = vec![
            EffectReport::failed("create-calendar-event", "down"),
            EffectReport::succeeded("send-confirmation-email"),
        ];
        assert!(reports.succeeded("send-confirmation-email"));
        assert!(!reports.succeeded("create-calendar-event"));
        assert!(reports.any_failed());
    }
}
