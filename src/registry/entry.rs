use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::rule::RuleCode;

/// Reason recorded for excluded entries that do not state one.
pub const DEFAULT_EXCLUSION_REASON: &str = "excluded per policy";

/// Rule bindings for one part-type prefix.
///
/// Dot-number variants are separate entries under their own key
/// (e.g. `"663."`), never a runtime override of the parent prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartTypeEntry {
    pub prefix: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default)]
    pub excluded: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default)]
    pub is_dot_number_variant: bool,

    /// Attribute name → rule code.
    #[serde(default)]
    pub attribute_rules: BTreeMap<String, RuleCode>,
}

impl PartTypeEntry {
    /// Creates an active entry with no bindings.
    #[must_use]
    pub fn new(prefix: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            name: name.into(),
            category: None,
            excluded: false,
            reason: None,
            is_dot_number_variant: false,
            attribute_rules: BTreeMap::new(),
        }
    }

    /// Creates an excluded entry.
    #[must_use]
    pub fn excluded(prefix: impl Into<String>, name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            excluded: true,
            reason: Some(reason.into()),
            ..Self::new(prefix, name)
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn dot_number_variant(mut self) -> Self {
        self.is_dot_number_variant = true;
        self
    }

    #[must_use]
    pub fn bind(mut self, attribute: impl Into<String>, code: RuleCode) -> Self {
        self.attribute_rules.insert(attribute.into(), code);
        self
    }

    /// Rule bound to `attribute`, if any.
    #[must_use]
    pub fn rule_code_for(&self, attribute: &str) -> Option<RuleCode> {
        self.attribute_rules.get(attribute).copied()
    }

    /// The stated exclusion reason, or the policy default.
    #[must_use]
    pub fn exclusion_reason(&self) -> &str {
        self.reason.as_deref().unwrap_or(DEFAULT_EXCLUSION_REASON)
    }

    /// Check the entry's structural invariants.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidRegistryEntry` when the prefix or
    /// an attribute name is blank, an excluded entry carries bindings, or
    /// a dot-number variant key carries no dot.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidRegistryEntry {
            prefix: self.prefix.clone(),
            reason: reason.to_string(),
        };

        if self.prefix.trim().is_empty() {
            return Err(invalid("prefix cannot be empty"));
        }
        if self.excluded && !self.attribute_rules.is_empty() {
            return Err(invalid("excluded entries cannot bind attributes"));
        }
        if self.is_dot_number_variant && !self.prefix.contains('.') {
            return Err(invalid("dot-number variant key must contain '.'"));
        }
        if self.attribute_rules.keys().any(|a| a.trim().is_empty()) {
            return Err(invalid("attribute names cannot be empty"));
        }
        Ok(())
    }
}
