//! Canonical node status domain.
//!
//! The cluster reports node status as a free-form string whose vocabulary
//! and casing are not stable across versions (`ACTIVE`, `syncing`,
//! `Degraded`, ...).  Everything is folded into the closed set
//! [`CanonicalStatus`] before any counting or display, so a new upstream
//! status shows up as `Unknown` instead of being mis-reported or dropped.

use serde::Serialize;
use std::fmt;

/// The closed status domain every raw status string maps into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CanonicalStatus {
    /// Node is serving normally.
    Active,
    /// Node is reachable but degraded (e.g. catching up on replication).
    Warning,
    /// Node is down or has been stopped.
    Failed,
    /// Vocabulary this build does not recognize.
    Unknown,
}

impl CanonicalStatus {
    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            CanonicalStatus::Active => "Active",
            CanonicalStatus::Warning => "Warning",
            CanonicalStatus::Failed => "Failed",
            CanonicalStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a raw status string to its canonical state.
///
/// Total and case-insensitive: every input lands on exactly one canonical
/// state, with unrecognized vocabulary falling through to `Unknown`.
/// `inactive` counts as a warning (the node is registered but not
/// serving); `unregistered` is deliberately left as `Unknown`.
pub fn normalize(raw: &str) -> CanonicalStatus {
    match raw.trim().to_ascii_lowercase().as_str() {
        "active" | "running" => CanonicalStatus::Active,
        "warning" | "degraded" | "syncing" | "inactive" => CanonicalStatus::Warning,
        "failed" | "down" | "stopped" => CanonicalStatus::Failed,
        _ => CanonicalStatus::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_active_vocabulary() {
        assert_eq!(normalize("active"), CanonicalStatus::Active);
        assert_eq!(normalize("running"), CanonicalStatus::Active);
    }

    #[test]
    fn test_normalize_warning_vocabulary() {
        assert_eq!(normalize("warning"), CanonicalStatus::Warning);
        assert_eq!(normalize("degraded"), CanonicalStatus::Warning);
        assert_eq!(normalize("syncing"), CanonicalStatus::Warning);
        assert_eq!(normalize("inactive"), CanonicalStatus::Warning);
    }

    #[test]
    fn test_normalize_failed_vocabulary() {
        assert_eq!(normalize("failed"), CanonicalStatus::Failed);
        assert_eq!(normalize("down"), CanonicalStatus::Failed);
        assert_eq!(normalize("stopped"), CanonicalStatus::Failed);
    }

    #[test]
    fn test_normalize_is_case_insensitive() {
        assert_eq!(normalize("ACTIVE"), CanonicalStatus::Active);
        assert_eq!(normalize("Syncing"), CanonicalStatus::Warning);
        assert_eq!(normalize("SYNCING"), CanonicalStatus::Warning);
        assert_eq!(normalize("FaIlEd"), CanonicalStatus::Failed);
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(normalize("  active "), CanonicalStatus::Active);
        assert_eq!(normalize("\tdown\n"), CanonicalStatus::Failed);
    }

    #[test]
    fn test_normalize_unknown_fallback_is_total() {
        assert_eq!(normalize(""), CanonicalStatus::Unknown);
        assert_eq!(normalize("UNREGISTERED"), CanonicalStatus::Unknown);
        assert_eq!(normalize("rebooting"), CanonicalStatus::Unknown);
        assert_eq!(normalize("状態不明"), CanonicalStatus::Unknown);
    }

    #[test]
    fn test_labels() {
        assert_eq!(CanonicalStatus::Active.label(), "Active");
        assert_eq!(CanonicalStatus::Unknown.to_string(), "Unknown");
    }
}
