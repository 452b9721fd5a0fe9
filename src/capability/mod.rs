//! Lookup capabilities consumed by the engine.
//!
//! The engine never constructs these itself. Callers supply them per
//! call, either as the in-memory tables in [`memory`] or as any closure
//! of the matching shape. Anything that performs real I/O (inference,
//! data stores) must be awaited by the caller before or during the
//! synchronous call.

pub mod memory;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors a value generator may report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    /// The generator could not produce a value.
    #[error("Value generator unavailable: {reason}")]
    Unavailable { reason: String },

    /// The generator produced an empty value.
    #[error("Value generator returned an empty value")]
    Empty,
}

/// Static value configured for a (prefix, attribute) pair.
///
/// Must be deterministic for a given pair.
pub trait FixedValueLookup: Send + Sync {
    fn fixed_value(&self, prefix: &str, attribute: &str) -> Option<String>;
}

/// Master part record for a prefix.
///
/// The engine passes the normalized prefix (dot-number separator removed).
pub trait MasterRecordLookup: Send + Sync {
    fn master_record(&self, prefix: &str) -> Option<MasterRecord>;
}

/// Inference-backed value generation.
///
/// All non-determinism lives here, never in the engine.
pub trait ValueGenerator: Send + Sync {
    /// Produce a value for `attribute` on part type `prefix`.
    ///
    /// # Errors
    ///
    /// Returns a [`GeneratorError`] when no usable value can be produced.
    fn generate(&self, attribute: &str, prefix: &str) -> Result<String, GeneratorError>;

    /// Produce a value by interpreting the part number itself.
    ///
    /// Defaults to [`generate`](Self::generate) for generators without a
    /// dedicated interpretation path.
    ///
    /// # Errors
    ///
    /// Returns a [`GeneratorError`] when no usable value can be produced.
    fn interpret_ipn(&self, attribute: &str, prefix: &str) -> Result<String, GeneratorError> {
        self.generate(attribute, prefix)
    }
}

impl<F> FixedValueLookup for F
where
    F: Fn(&str, &str) -> Option<String> + Send + Sync,
{
    fn fixed_value(&self, prefix: &str, attribute: &str) -> Option<String> {
        self(prefix, attribute)
    }
}

impl<F> MasterRecordLookup for F
where
    F: Fn(&str) -> Option<MasterRecord> + Send + Sync,
{
    fn master_record(&self, prefix: &str) -> Option<MasterRecord> {
        self(prefix)
    }
}

impl<F> ValueGenerator for F
where
    F: Fn(&str, &str) -> Result<String, GeneratorError> + Send + Sync,
{
    fn generate(&self, attribute: &str, prefix: &str) -> Result<String, GeneratorError> {
        self(attribute, prefix)
    }
}

/// The capability set for one call.
#[derive(Clone, Copy)]
pub struct Capabilities<'a> {
    pub fixed_values: &'a dyn FixedValueLookup,
    pub master_records: &'a dyn MasterRecordLookup,
    pub generator: &'a dyn ValueGenerator,
}

impl<'a> Capabilities<'a> {
    #[must_use]
    pub fn new(
        fixed_values: &'a dyn FixedValueLookup,
        master_records: &'a dyn MasterRecordLookup,
        generator: &'a dyn ValueGenerator,
    ) -> Self {
        Self {
            fixed_values,
            master_records,
            generator,
        }
    }
}

impl std::fmt::Debug for Capabilities<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}

/// An item-specific value already stored on a master record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredValue {
    pub value: String,
    #[serde(default)]
    pub locked: bool,
}

/// Source fields a master record exposes to the fixed-source rule.
///
/// The mapping from attribute names is closed: only these attributes are
/// ever sourced from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceField {
    Weight,
    Dimensions,
}

impl SourceField {
    /// Source field backing an attribute, if the attribute has one.
    #[must_use]
    pub fn for_attribute(attribute: &str) -> Option<Self> {
        match attribute {
            "Weight" => Some(Self::Weight),
            "Dimensions" => Some(Self::Dimensions),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Weight => "weight",
            Self::Dimensions => "dimensions",
        }
    }
}

/// A master part record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterRecord {
    pub ipn: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Shipping weight in pounds.
    #[serde(default)]
    pub weight: Option<f64>,

    #[serde(default)]
    pub dimensions: Option<String>,

    #[serde(default)]
    pub locked_fields: Vec<String>,

    /// Item-specific values already written and possibly locked.
    #[serde(default)]
    pub item_specifics: BTreeMap<String, StoredValue>,
}

impl MasterRecord {
    #[must_use]
    pub fn new(ipn: impl Into<String>) -> Self {
        Self {
            ipn: ipn.into(),
            title: None,
            category: None,
            weight: None,
            dimensions: None,
            locked_fields: Vec::new(),
            item_specifics: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    #[must_use]
    pub fn with_dimensions(mut self, dimensions: impl Into<String>) -> Self {
        self.dimensions = Some(dimensions.into());
        self
    }

    /// Formatted value of a source field, if present and non-empty.
    #[must_use]
    pub fn source_value(&self, field: SourceField) -> Option<String> {
        match field {
            SourceField::Weight => self
                .weight
                .filter(|w| w.is_finite() && *w > 0.0)
                .map(|w| format!("{w} lbs")),
            SourceField::Dimensions => self
                .dimensions
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        }
    }

    /// True when a source field is physically locked on the record.
    #[must_use]
    pub fn is_field_locked(&self, field: SourceField) -> bool {
        self.locked_fields.iter().any(|f| f == field.name())
    }

    /// Locked item-specific value for `attribute`, if any.
    #[must_use]
    pub fn locked_value(&self, attribute: &str) -> Option<&str> {
        self.item_specifics
            .get(attribute)
            .filter(|v| v.locked)
            .map(|v| v.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_is_formatted_in_pounds() {
        let rec = MasterRecord::new("450-9012").with_weight(5.2);
        assert_eq!(rec.source_value(SourceField::Weight).as_deref(), Some("5.2 lbs"));
        assert_eq!(rec.source_value(SourceField::Dimensions), None);
    }

    #[test]
    fn zero_weight_and_blank_dimensions_are_absent() {
        let rec = MasterRecord::new("663-7891")
            .with_weight(0.0)
            .with_dimensions("  ");
        assert_eq!(rec.source_value(SourceField::Weight), None);
        assert_eq!(rec.source_value(SourceField::Dimensions), None);
    }

    #[test]
    fn source_mapping_is_closed() {
        assert_eq!(SourceField::for_attribute("Weight"), Some(SourceField::Weight));
        assert_eq!(SourceField::for_attribute("Dimensions"), Some(SourceField::Dimensions));
        assert_eq!(SourceField::for_attribute("weight"), None);
        assert_eq!(SourceField::for_attribute("Brand"), None);
    }

    #[test]
    fn locked_values_and_fields() {
        let mut rec = MasterRecord::new("116-5423");
        rec.locked_fields.push("weight".to_string());
        rec.item_specifics.insert(
            "Brand".to_string(),
            StoredValue {
                value: "ACDelco".to_string(),
                locked: true,
            },
        );
        rec.item_specifics.insert(
            "Warranty".to_string(),
            StoredValue {
                value: "1 Year".to_string(),
                locked: false,
            },
        );
        assert!(rec.is_field_locked(SourceField::Weight));
        assert!(!rec.is_field_locked(SourceField::Dimensions));
        assert_eq!(rec.locked_value("Brand"), Some("ACDelco"));
        assert_eq!(rec.locked_value("Warranty"), None);
    }

    #[test]
    fn closures_are_capabilities() {
        let fixed = |p: &str, a: &str| (p == "663" && a == "Brand").then(|| "Dorman".to_string());
        assert_eq!(fixed.fixed_value("663", "Brand").as_deref(), Some("Dorman"));
        assert_eq!(fixed.fixed_value("450", "Brand"), None);

        let failing = |_: &str, _: &str| -> Result<String, GeneratorError> { Err(GeneratorError::Empty) };
        assert_eq!(failing.generate("Brand", "663"), Err(GeneratorError::Empty));
    }
}
