//! Resolution requests.
//!
//! A request carries everything one `resolve` call needs; the engine keeps
//! no selection state between calls.

use serde::{Deserialize, Serialize};

use crate::confidence::Confidence;
use crate::error::{ResolveError, RulesError, ValidationError};
use crate::registry::{Ipn, PartTypeRegistry};

/// One (prefix, attribute, confidence) resolution request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolutionRequest {
    pub prefix: String,
    pub attribute: String,
    pub confidence: Confidence,
}

impl ResolutionRequest {
    #[must_use]
    pub fn new(prefix: impl Into<String>, attribute: impl Into<String>, confidence: Confidence) -> Self {
        Self {
            prefix: prefix.into(),
            attribute: attribute.into(),
            confidence,
        }
    }

    /// Starts a validating builder.
    #[must_use]
    pub fn builder() -> ResolutionRequestBuilder {
        ResolutionRequestBuilder::default()
    }

    /// Request for the part type governing `ipn`.
    ///
    /// Dotted IPNs use their dot-number variant entry when registered.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed IPN and
    /// `ResolveError::InvalidRequest` when no registered prefix governs it.
    pub fn for_ipn(
        registry: &PartTypeRegistry,
        ipn: &str,
        attribute: impl Into<String>,
        confidence: Confidence,
    ) -> Result<Self, RulesError> {
        let ipn = Ipn::parse(ipn)?;
        let prefix = registry
            .prefix_for_ipn(&ipn)
            .ok_or_else(|| ResolveError::unknown_prefix(ipn.base_prefix()))?;
        Ok(Self::new(prefix, attribute, confidence))
    }
}

/// Builder for [`ResolutionRequest`].
///
/// # Example
/// ```
/// use listing_rules::ResolutionRequest;
///
/// let request = ResolutionRequest::builder()
///     .prefix("663")
///     .attribute("Fitment Type")
///     .confidence(82)
///     .build()
///     .unwrap();
/// assert_eq!(request.confidence.value(), 82);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResolutionRequestBuilder {
    prefix: Option<String>,
    attribute: Option<String>,
    confidence: Option<i64>,
}

impl ResolutionRequestBuilder {
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Confidence percentage, validated on build.
    #[must_use]
    pub fn confidence(mut self, confidence: impl Into<i64>) -> Self {
        self.confidence = Some(confidence.into());
        self
    }

    /// Build the request.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - prefix, attribute or confidence is missing or blank
    /// - confidence is outside [0, 100]
    pub fn build(self) -> Result<ResolutionRequest, ValidationError> {
        let prefix = required("prefix", self.prefix)?;
        let attribute = required("attribute", self.attribute)?;
        let confidence = self.confidence.ok_or_else(|| ValidationError::MissingField {
            field: "confidence".to_string(),
        })?;
        Ok(ResolutionRequest {
            prefix,
            attribute,
            confidence: Confidence::try_from(confidence)?,
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField {
            field: field.to_string(),
        }),
    }
}
