//! Error types for the rule engine.
//!
//! All errors are strongly typed using thiserror so callers can pattern
//! match on the exact refusal. A missing fixed value is deliberately not
//! an error here: it is reported through the `error` action of a
//! [`ResolutionResult`](crate::outcome::ResolutionResult).

use std::path::PathBuf;

use thiserror::Error;

/// Validation errors that occur during input validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Confidence value {value} is out of range [0, 100]")]
    ConfidenceOutOfRange {
        value: i64,
    },

    #[error("Required field '{field}' is missing")]
    MissingField {
        field: String,
    },

    #[error("Unknown rule code '{code}'")]
    UnknownRuleCode {
        code: String,
    },

    #[error("Invalid registry entry '{prefix}': {reason}")]
    InvalidRegistryEntry {
        prefix: String,
        reason: String,
    },

    #[error("Malformed IPN '{ipn}'")]
    InvalidIpn {
        ipn: String,
    },
}

/// Refusals produced by the resolution engine before any rule runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Prefix unregistered or attribute not bound for it.
    #[error("Invalid request for prefix '{prefix}'{}: {reason}", attribute_suffix(.attribute))]
    InvalidRequest {
        prefix: String,
        attribute: Option<String>,
        reason: String,
    },

    /// The prefix is excluded; nothing may be resolved for it.
    #[error("Prefix '{prefix}' is excluded: {reason}")]
    ExcludedPrefix {
        prefix: String,
        reason: String,
    },
}

fn attribute_suffix(attribute: &Option<String>) -> String {
    attribute
        .as_ref()
        .map(|a| format!(" attribute '{a}'"))
        .unwrap_or_default()
}

impl ResolveError {
    pub(crate) fn unknown_prefix(prefix: &str) -> Self {
        Self::InvalidRequest {
            prefix: prefix.to_string(),
            attribute: None,
            reason: "prefix is not registered".to_string(),
        }
    }

    pub(crate) fn unbound_attribute(prefix: &str, attribute: &str) -> Self {
        Self::InvalidRequest {
            prefix: prefix.to_string(),
            attribute: Some(attribute.to_string()),
            reason: "attribute has no rule bound for this prefix".to_string(),
        }
    }
}

/// Failures while loading reference data.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse reference data: {message}")]
    Parse {
        message: String,
    },
}

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl RulesError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a resolve refusal.
    #[must_use]
    pub const fn is_resolve(&self) -> bool {
        matches!(self, Self::Resolve(_))
    }

    /// Returns true if this is a config error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this error is retryable.
    ///
    /// Only reading reference data from disk can succeed on a second try;
    /// the engine itself never retries.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Config(ConfigError::Io { .. }))
    }
}

/// Result type alias for crate operations.
pub type RulesResult<T> = Result<T, RulesError>;
