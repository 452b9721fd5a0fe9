//! In-memory capability implementations.
//!
//! These back the reference data set and tests. They are deterministic:
//! the same inputs always produce the same outputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    FixedValueLookup, GeneratorError, MasterRecord, MasterRecordLookup, ValueGenerator,
};

/// Fallback when neither a scripted response nor a default exists.
pub const GENERIC_GENERATED_VALUE: &str = "AI-Generated-Value";

/// Fixed values keyed by prefix, then attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixedValueTable {
    values: BTreeMap<String, BTreeMap<String, String>>,
}

impl FixedValueTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(
        mut self,
        prefix: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.values
            .entry(prefix.into())
            .or_default()
            .insert(attribute.into(), value.into());
        self
    }
}

impl FixedValueLookup for FixedValueTable {
    fn fixed_value(&self, prefix: &str, attribute: &str) -> Option<String> {
        self.values
            .get(prefix)?
            .get(attribute)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }
}

/// Ordered master records; the first record whose IPN begins with the
/// requested prefix wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MasterPartsTable {
    records: Vec<MasterRecord>,
}

impl MasterPartsTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_record(mut self, record: MasterRecord) -> Self {
        self.records.push(record);
        self
    }

    #[must_use]
    pub fn records(&self) -> &[MasterRecord] {
        &self.records
    }
}

impl MasterRecordLookup for MasterPartsTable {
    fn master_record(&self, prefix: &str) -> Option<MasterRecord> {
        self.records
            .iter()
            .find(|r| r.ipn.starts_with(prefix))
            .cloned()
    }
}

/// Deterministic stand-in for an inference service.
///
/// Lookup order: scripted response for (attribute, prefix), then a
/// per-attribute default, then [`GENERIC_GENERATED_VALUE`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptedGenerator {
    /// Attribute → prefix → value.
    responses: BTreeMap<String, BTreeMap<String, String>>,
}

impl ScriptedGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_response(
        mut self,
        attribute: impl Into<String>,
        prefix: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.responses
            .entry(attribute.into())
            .or_default()
            .insert(prefix.into(), value.into());
        self
    }

    fn default_for(attribute: &str, prefix: &str) -> String {
        match attribute {
            "Manufacturer Part Number" => {
                let digest = blake3::hash(prefix.as_bytes()).to_hex();
                format!("MPN-{}", digest.as_str()[..8].to_ascii_uppercase())
            }
            "Fitment Type" => "Direct Replacement".to_string(),
            "Placement on Vehicle" => "Front".to_string(),
            "Condition" => "New".to_string(),
            "Material" => "Ceramic".to_string(),
            "Engine Type" => "V6 3.5L".to_string(),
            "Warranty" => "1 Year".to_string(),
            _ => GENERIC_GENERATED_VALUE.to_string(),
        }
    }
}

impl ValueGenerator for ScriptedGenerator {
    fn generate(&self, attribute: &str, prefix: &str) -> Result<String, GeneratorError> {
        let value = self
            .responses
            .get(attribute)
            .and_then(|by_prefix| by_prefix.get(prefix))
            .cloned()
            .unwrap_or_else(|| Self::default_for(attribute, prefix));
        if value.trim().is_empty() {
            return Err(GeneratorError::Empty);
        }
        Ok(value)
    }
}
