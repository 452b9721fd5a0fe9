//! Decision-trace recording.
//!
//! Every step is kept in order for the caller and mirrored to `tracing`
//! so hosts with a subscriber see the same decisions in their logs.

use crate::outcome::{Severity, TraceEntry};
use crate::rule::RuleCode;

pub(crate) struct TraceRecorder<'a> {
    prefix: &'a str,
    attribute: &'a str,
    rule: RuleCode,
    entries: Vec<TraceEntry>,
}

impl<'a> TraceRecorder<'a> {
    pub(crate) fn new(prefix: &'a str, attribute: &'a str, rule: RuleCode) -> Self {
        Self {
            prefix,
            attribute,
            rule,
            entries: Vec::with_capacity(8),
        }
    }

    pub(crate) fn record(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        let (prefix, attribute, rule) = (self.prefix, self.attribute, self.rule.as_str());
        match severity {
            Severity::Info | Severity::Action => {
                tracing::debug!(prefix, attribute, rule, severity = %severity, "{message}");
            }
            Severity::Success => tracing::info!(prefix, attribute, rule, "{message}"),
            Severity::Warning => tracing::warn!(prefix, attribute, rule, "{message}"),
            Severity::Error => tracing::error!(prefix, attribute, rule, "{message}"),
        }
        self.entries.push(TraceEntry::new(severity, message));
    }

    pub(crate) fn info(&mut self, message: impl Into<String>) {
        self.record(Severity::Info, message);
    }

    pub(crate) fn success(&mut self, message: impl Into<String>) {
        self.record(Severity::Success, message);
    }

    pub(crate) fn warning(&mut self, message: impl Into<String>) {
        self.record(Severity::Warning, message);
    }

    pub(crate) fn error(&mut self, message: impl Into<String>) {
        self.record(Severity::Error, message);
    }

    pub(crate) fn action(&mut self, message: impl Into<String>) {
        self.record(Severity::Action, message);
    }

    pub(crate) fn into_entries(self) -> Vec<TraceEntry> {
        self.entries
    }
}
