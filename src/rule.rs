//! The rule catalog: the eight resolution strategies and their metadata.
//!
//! Rule codes form a closed enum so every dispatch over them is checked
//! for exhaustiveness at compile time. Metadata is static and shared.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Where a rule's successful writes land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DestinationClass {
    /// The structured master-data store.
    StructuredStore,
    /// The marketplace listing only.
    ListingOnly,
    /// Nothing is written.
    None,
}

/// Stable rule identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RuleCode {
    /// Fixed.
    #[serde(rename = "F")]
    Fixed,
    /// Fixed source, variable value.
    #[serde(rename = "FsV")]
    FixedSourceVariable,
    /// Variable, then fixed.
    #[serde(rename = "VF")]
    VariableFixed,
    /// Variable, listing only.
    #[serde(rename = "V1")]
    VariableListing,
    /// Variable, IPN interpretation.
    #[serde(rename = "V2")]
    VariableIpn,
    /// Variable or blank.
    #[serde(rename = "VB")]
    VariableBlank,
    /// Variable, then manual, then fixed.
    #[serde(rename = "VMF")]
    VariableManualFixed,
    /// Manual, then fixed.
    #[serde(rename = "MF")]
    ManualFixed,
}

impl RuleCode {
    /// All codes in catalog order.
    pub const ALL: [Self; 8] = [
        Self::Fixed,
        Self::FixedSourceVariable,
        Self::VariableFixed,
        Self::VariableListing,
        Self::VariableIpn,
        Self::VariableBlank,
        Self::VariableManualFixed,
        Self::ManualFixed,
    ];

    /// Returns the short stable identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "F",
            Self::FixedSourceVariable => "FsV",
            Self::VariableFixed => "VF",
            Self::VariableListing => "V1",
            Self::VariableIpn => "V2",
            Self::VariableBlank => "VB",
            Self::VariableManualFixed => "VMF",
            Self::ManualFixed => "MF",
        }
    }

    /// Returns the catalog metadata for this code.
    #[must_use]
    pub fn rule_type(self) -> &'static RuleType {
        match self {
            Self::Fixed => &FIXED,
            Self::FixedSourceVariable => &FIXED_SOURCE_VARIABLE,
            Self::VariableFixed => &VARIABLE_FIXED,
            Self::VariableListing => &VARIABLE_LISTING,
            Self::VariableIpn => &VARIABLE_IPN,
            Self::VariableBlank => &VARIABLE_BLANK,
            Self::VariableManualFixed => &VARIABLE_MANUAL_FIXED,
            Self::ManualFixed => &MANUAL_FIXED,
        }
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownRuleCode {
                code: s.to_string(),
            })
    }
}

/// Metadata describing one resolution strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleType {
    pub code: RuleCode,
    pub name: &'static str,
    pub description: &'static str,
    pub destination_class: DestinationClass,
    /// Successful writes apply a physical lock.
    pub locks: bool,
    pub uses_inference: bool,
    /// May create a human-review task.
    pub escalates: bool,
    /// The field may legitimately stay blank.
    pub optional: bool,
    /// Dot-number variants never run this rule.
    pub skips_dot_numbers: bool,
}

static FIXED: RuleType = RuleType {
    code: RuleCode::Fixed,
    name: "Fixed",
    description: "Known value for prefix. Write and lock immediately.",
    destination_class: DestinationClass::StructuredStore,
    locks: true,
    uses_inference: false,
    escalates: false,
    optional: false,
    skips_dot_numbers: false,
};

static FIXED_SOURCE_VARIABLE: RuleType = RuleType {
    code: RuleCode::FixedSourceVariable,
    name: "Fixed Source → Variable",
    description: "Pull from the master record. If missing, write \"Does Not Apply\" to the listing only.",
    destination_class: DestinationClass::ListingOnly,
    locks: false,
    uses_inference: false,
    escalates: false,
    optional: false,
    skips_dot_numbers: false,
};

static VARIABLE_FIXED: RuleType = RuleType {
    code: RuleCode::VariableFixed,
    name: "Variable → Fixed",
    description: "Inference determines the value. At or above threshold, write and lock. Dot-number IPNs are skipped.",
    destination_class: DestinationClass::StructuredStore,
    locks: true,
    uses_inference: true,
    escalates: false,
    optional: false,
    skips_dot_numbers: true,
};

static VARIABLE_LISTING: RuleType = RuleType {
    code: RuleCode::VariableListing,
    name: "Variable (Listing-Only)",
    description: "Inference sources from inventory, title and condition. Listing only, never locked.",
    destination_class: DestinationClass::ListingOnly,
    locks: false,
    uses_inference: true,
    escalates: false,
    optional: false,
    skips_dot_numbers: false,
};

static VARIABLE_IPN: RuleType = RuleType {
    code: RuleCode::VariableIpn,
    name: "Variable (IPN Interpretation)",
    description: "Inference interprets the IPN via external lookup. Listing only.",
    destination_class: DestinationClass::ListingOnly,
    locks: false,
    uses_inference: true,
    escalates: false,
    optional: false,
    skips_dot_numbers: false,
};

static VARIABLE_BLANK: RuleType = RuleType {
    code: RuleCode::VariableBlank,
    name: "Variable / Blank",
    description: "Optional field. Filled when confident, otherwise left blank. Never locked.",
    destination_class: DestinationClass::ListingOnly,
    locks: false,
    uses_inference: true,
    escalates: false,
    optional: true,
    skips_dot_numbers: false,
};

static VARIABLE_MANUAL_FIXED: RuleType = RuleType {
    code: RuleCode::VariableManualFixed,
    name: "Variable → Manual → Fixed",
    description: "Inference tries first. Below threshold, a review task is created; locked after manual entry.",
    destination_class: DestinationClass::StructuredStore,
    locks: true,
    uses_inference: true,
    escalates: true,
    optional: false,
    skips_dot_numbers: false,
};

static MANUAL_FIXED: RuleType = RuleType {
    code: RuleCode::ManualFixed,
    name: "Manual → Fixed",
    description: "Always human research. A task is created immediately; locked after entry.",
    destination_class: DestinationClass::StructuredStore,
    locks: true,
    uses_inference: false,
    escalates: true,
    optional: false,
    skips_dot_numbers: false,
};

/// Read-only access to the rule catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleCatalog;

impl RuleCatalog {
    /// Metadata for a known code.
    #[must_use]
    pub fn rule_type(code: RuleCode) -> &'static RuleType {
        code.rule_type()
    }

    /// Metadata for a code given as its stable identifier.
    ///
    /// Returns `None` for identifiers outside the catalog.
    #[must_use]
    pub fn rule_type_by_code(code: &str) -> Option<&'static RuleType> {
        code.parse::<RuleCode>().ok().map(RuleCode::rule_type)
    }

    /// All rule types in catalog order.
    pub fn all() -> impl Iterator<Item = &'static RuleType> {
        RuleCode::ALL.into_iter().map(RuleCode::rule_type)
    }
}
