//! Static reference data.
//!
//! The registry, fixed values, master records and scripted inference
//! responses are loaded once from a JSON document and then shared
//! read-only. The crate embeds a reference data set; deployments can load
//! their own from disk.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::capability::memory::{FixedValueTable, MasterPartsTable, ScriptedGenerator};
use crate::capability::Capabilities;
use crate::engine::ResolutionEngine;
use crate::error::ConfigError;
use crate::registry::PartTypeRegistry;

const BUILTIN_REFERENCE: &str = include_str!("../data/reference.json");

/// A complete, validated data set for the engine and its capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub registry: PartTypeRegistry,

    #[serde(default)]
    pub fixed_values: FixedValueTable,

    #[serde(default)]
    pub master_records: MasterPartsTable,

    #[serde(default)]
    pub ai_responses: ScriptedGenerator,
}

impl ReferenceData {
    /// The reference data set embedded in the crate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the embedded document is invalid.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json(BUILTIN_REFERENCE)
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON, unknown rule codes
    /// or registry entries that break their invariants.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let data: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        data.log_loaded();
        Ok(data)
    }

    /// Read, parse and validate a JSON document from disk.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read and
    /// `ConfigError::Parse` as [`from_json`](Self::from_json) does.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Capabilities backed by this data set.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities<'_> {
        Capabilities::new(&self.fixed_values, &self.master_records, &self.ai_responses)
    }

    /// An engine over a shared copy of the registry.
    #[must_use]
    pub fn engine(&self) -> ResolutionEngine {
        ResolutionEngine::new(Arc::new(self.registry.clone()))
    }

    fn log_loaded(&self) {
        tracing::info!(
            fingerprint = %self.registry.fingerprint(),
            prefixes = self.registry.len(),
            master_records = self.master_records.records().len(),
            "reference data loaded"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{FixedValueLookup, MasterRecordLookup};
    use crate::rule::RuleCode;

    #[test]
    fn builtin_data_is_valid() {
        let data = ReferenceData::builtin().unwrap();
        assert_eq!(data.registry.len(), 7);
        assert_eq!(data.registry.active_entries().count(), 4);
        assert_eq!(
            data.registry.rule_code_for("663.", "Manufacturer Part Number"),
            Some(RuleCode::VariableBlank)
        );
        assert_eq!(
            data.fixed_values.fixed_value("450", "Brand").as_deref(),
            Some("Motorcraft")
        );
        assert_eq!(data.master_records.master_record("450").unwrap().weight, Some(5.2));
    }

    #[test]
    fn excluded_entries_carry_reason() {
        let data = ReferenceData::builtin().unwrap();
        for prefix in ["900", "950", "999"] {
            let entry = data.registry.part_type_entry(prefix).unwrap();
            assert!(entry.excluded);
            assert!(entry.attribute_rules.is_empty());
            assert_eq!(entry.exclusion_reason(), "excluded per policy");
        }
    }

    #[test]
    fn minimal_document_defaults_capabilities() {
        let data = ReferenceData::from_json(r#"{ "registry": [] }"#).unwrap();
        assert!(data.registry.is_empty());
        assert!(data.master_records.records().is_empty());
    }

    #[test]
    fn invalid_documents_are_parse_errors() {
        let unknown_code = r#"{ "registry": [
            { "prefix": "1", "name": "n", "attribute_rules": { "Brand": "QQ" } }
        ] }"#;
        assert!(matches!(
            ReferenceData::from_json(unknown_code),
            Err(ConfigError::Parse { .. })
        ));

        let excluded_with_rules = r#"{ "registry": [
            { "prefix": "9", "name": "n", "excluded": true, "attribute_rules": { "Brand": "F" } }
        ] }"#;
        let err = ReferenceData::from_json(excluded_with_rules).unwrap_err();
        assert!(err.to_string().contains("excluded entries cannot bind attributes"));
    }
}
