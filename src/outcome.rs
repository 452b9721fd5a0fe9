//! Resolution results and decision traces.
//!
//! A [`ResolutionResult`] classifies what should happen to one item
//! specific. It is plain data: the engine never performs the write it
//! describes. The accompanying trace lists the decision steps actually
//! taken, in order.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::confidence::Confidence;

/// Value written to the listing when a sourced field has no data.
pub const DOES_NOT_APPLY: &str = "Does Not Apply";

/// What the caller should do with the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    WriteAndLock,
    WriteListing,
    WriteDoesNotApply,
    Skip,
    SkipLowConfidence,
    LeaveBlank,
    Escalate,
    Error,
}

impl Action {
    /// Stable identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WriteAndLock => "write-and-lock",
            Self::WriteListing => "write-listing",
            Self::WriteDoesNotApply => "write-does-not-apply",
            Self::Skip => "skip",
            Self::SkipLowConfidence => "skip-low-confidence",
            Self::LeaveBlank => "leave-blank",
            Self::Escalate => "escalate",
            Self::Error => "error",
        }
    }

    /// True when the action carries a value to be written somewhere.
    #[must_use]
    pub const fn writes(self) -> bool {
        matches!(
            self,
            Self::WriteAndLock | Self::WriteListing | Self::WriteDoesNotApply
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the caller should send the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Destination {
    StructuredStore,
    ListingOnly,
    TaskTracker,
    #[default]
    None,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StructuredStore => write!(f, "structured-store"),
            Self::ListingOnly => write!(f, "listing-only"),
            Self::TaskTracker => write!(f, "task-tracker"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Outcome of resolving one (prefix, attribute) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub action: Action,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    pub destination: Destination,

    /// A physical lock is applied with the write.
    pub locked: bool,

    /// A human-review task must be created.
    pub escalated: bool,

    /// Confidence consulted by the decision, when one was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,

    /// Stable task identity for escalations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_key: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ResolutionResult {
    fn bare(action: Action, destination: Destination) -> Self {
        Self {
            action,
            value: None,
            destination,
            locked: false,
            escalated: false,
            confidence: None,
            task_key: None,
            note: None,
        }
    }

    /// Write to the structured store and lock.
    #[must_use]
    pub fn write_and_lock(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            locked: true,
            ..Self::bare(Action::WriteAndLock, Destination::StructuredStore)
        }
    }

    /// Write to the listing, unlocked.
    #[must_use]
    pub fn write_listing(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::bare(Action::WriteListing, Destination::ListingOnly)
        }
    }

    /// Write [`DOES_NOT_APPLY`] to the listing only.
    #[must_use]
    pub fn does_not_apply() -> Self {
        Self {
            value: Some(DOES_NOT_APPLY.to_string()),
            ..Self::bare(Action::WriteDoesNotApply, Destination::ListingOnly)
        }
    }

    #[must_use]
    pub fn skip() -> Self {
        Self::bare(Action::Skip, Destination::None)
    }

    #[must_use]
    pub fn skip_low_confidence() -> Self {
        Self::bare(Action::SkipLowConfidence, Destination::None)
    }

    #[must_use]
    pub fn leave_blank() -> Self {
        Self::bare(Action::LeaveBlank, Destination::None)
    }

    /// Hand the field to a human via the task tracker.
    #[must_use]
    pub fn escalate(task_key: Uuid) -> Self {
        Self {
            escalated: true,
            task_key: Some(task_key),
            ..Self::bare(Action::Escalate, Destination::TaskTracker)
        }
    }

    #[must_use]
    pub fn error() -> Self {
        Self::bare(Action::Error, Destination::None)
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = Some(confidence);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.action, Action::Error)
    }

    #[must_use]
    pub const fn is_escalation(&self) -> bool {
        self.escalated
    }
}

/// Severity tag of a trace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
    Action,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
            Self::Action => write!(f, "ACTION"),
        }
    }
}

/// One decision step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub severity: Severity,
    pub message: String,
}

impl TraceEntry {
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// A result together with the trace that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub result: ResolutionResult,
    pub trace: Vec<TraceEntry>,
}

impl Resolution {
    /// Severities of the trace, in order.
    #[must_use]
    pub fn severities(&self) -> Vec<Severity> {
        self.trace.iter().map(|e| e.severity).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_identifiers_are_stable() {
        let json = serde_json::to_string(&Action::SkipLowConfidence).unwrap();
        assert_eq!(json, "\"skip-low-confidence\"");
        assert_eq!(Action::WriteDoesNotApply.as_str(), "write-does-not-apply");
        assert_eq!(
            serde_json::to_string(&Destination::StructuredStore).unwrap(),
            "\"structured-store\""
        );
    }

    #[test]
    fn only_write_actions_write() {
        assert!(Action::WriteAndLock.writes());
        assert!(Action::WriteDoesNotApply.writes());
        assert!(!Action::LeaveBlank.writes());
        assert!(!Action::Escalate.writes());
    }

    #[test]
    fn does_not_apply_targets_listing() {
        let r = ResolutionResult::does_not_apply();
        assert_eq!(r.value.as_deref(), Some(DOES_NOT_APPLY));
        assert_eq!(r.destination, Destination::ListingOnly);
        assert!(!r.locked);
    }

    #[test]
    fn escalation_is_unlocked() {
        let r = ResolutionResult::escalate(Uuid::nil());
        assert!(r.is_escalation());
        assert!(!r.locked);
        assert_eq!(r.destination, Destination::TaskTracker);
    }

    #[test]
    fn skipped_optionals_are_omitted_from_json() {
        let json = serde_json::to_value(ResolutionResult::leave_blank()).unwrap();
        assert!(json.get("value").is_none());
        assert_eq!(json["action"], "leave-blank");
        assert_eq!(json["destination"], "none");
    }

    #[test]
    fn trace_entry_display() {
        let e = TraceEntry::new(Severity::Warning, "careful");
        assert_eq!(e.to_string(), "[WARNING] careful");
        assert_eq!(serde_json::to_value(&e).unwrap()["severity"], "WARNING");
    }
}
