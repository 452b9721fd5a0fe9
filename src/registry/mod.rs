//! The part-type registry: which rule governs each attribute of a prefix.
//!
//! The registry is immutable once built and can be shared freely between
//! threads. Construction validates every entry so that lookups never see
//! an excluded entry with bindings or a duplicated prefix.

mod entry;
mod ipn;

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;
use crate::rule::RuleCode;

pub use entry::{PartTypeEntry, DEFAULT_EXCLUSION_REASON};
pub use ipn::{normalize_prefix, Ipn};

/// Ordered, validated collection of [`PartTypeEntry`] values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartTypeRegistry {
    entries: Vec<PartTypeEntry>,
    index: HashMap<String, usize>,
}

impl PartTypeRegistry {
    /// Build a registry from entries, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidRegistryEntry` if any entry is
    /// invalid or a prefix appears twice.
    pub fn from_entries(entries: Vec<PartTypeEntry>) -> Result<Self, ValidationError> {
        let mut index = HashMap::with_capacity(entries.len());
        for (pos, entry) in entries.iter().enumerate() {
            entry.validate()?;
            if index.insert(entry.prefix.clone(), pos).is_some() {
                return Err(ValidationError::InvalidRegistryEntry {
                    prefix: entry.prefix.clone(),
                    reason: "duplicate prefix".to_string(),
                });
            }
        }
        Ok(Self { entries, index })
    }

    /// Entry registered under `prefix`.
    #[must_use]
    pub fn part_type_entry(&self, prefix: &str) -> Option<&PartTypeEntry> {
        self.index.get(prefix).map(|&pos| &self.entries[pos])
    }

    /// Rule bound to (`prefix`, `attribute`).
    #[must_use]
    pub fn rule_code_for(&self, prefix: &str, attribute: &str) -> Option<RuleCode> {
        self.part_type_entry(prefix)?.rule_code_for(attribute)
    }

    /// Registry key governing an IPN.
    ///
    /// A dotted IPN uses its dot-number variant entry when one is
    /// registered and falls back to the base prefix otherwise.
    #[must_use]
    pub fn prefix_for_ipn(&self, ipn: &Ipn) -> Option<&str> {
        if let Some(key) = ipn.dot_variant_key() {
            if let Some(entry) = self.part_type_entry(&key) {
                return Some(entry.prefix.as_str());
            }
        }
        self.part_type_entry(ipn.base_prefix())
            .map(|e| e.prefix.as_str())
    }

    /// Registered prefixes in registry order.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.prefix.as_str())
    }

    /// Entries that are not excluded.
    pub fn active_entries(&self) -> impl Iterator<Item = &PartTypeEntry> {
        self.entries.iter().filter(|e| !e.excluded)
    }

    #[must_use]
    pub fn entries(&self) -> &[PartTypeEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stable digest of the registry contents (hex).
    ///
    /// Two registries with the same entries in the same order share a
    /// fingerprint, which identifies the data set in logs.
    ///
    /// # Panics
    ///
    /// Never in practice: entries serialize to JSON without fallible keys.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_vec(&self.entries)
            .expect("registry entries contain only string keys and plain values");
        blake3::hash(&canonical).to_hex().to_string()
    }
}

impl Serialize for PartTypeRegistry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PartTypeRegistry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<PartTypeEntry>::deserialize(deserializer)?;
        Self::from_entries(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PartTypeRegistry {
        PartTypeRegistry::from_entries(vec![
            PartTypeEntry::new("663", "Brake Components")
                .bind("Brand", RuleCode::Fixed)
                .bind("Manufacturer Part Number", RuleCode::VariableFixed),
            PartTypeEntry::new("663.", "Dot-Number IPN")
                .dot_number_variant()
                .bind("Manufacturer Part Number", RuleCode::VariableBlank),
            PartTypeEntry::new("450", "Engine Components").bind("Engine Type", RuleCode::VariableIpn),
            PartTypeEntry::excluded("900", "Excluded", "never ingest"),
        ])
        .unwrap()
    }

    #[test]
    fn looks_up_codes() {
        let reg = sample();
        assert_eq!(reg.rule_code_for("663", "Brand"), Some(RuleCode::Fixed));
        assert_eq!(
            reg.rule_code_for("663.", "Manufacturer Part Number"),
            Some(RuleCode::VariableBlank)
        );
        assert_eq!(reg.rule_code_for("663", "Color"), None);
        assert_eq!(reg.rule_code_for("123", "Brand"), None);
    }

    #[test]
    fn rejects_duplicate_prefix() {
        let err = PartTypeRegistry::from_entries(vec![
            PartTypeEntry::new("663", "a"),
            PartTypeEntry::new("663", "b"),
        ])
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidRegistryEntry { .. }));
    }

    #[test]
    fn dotted_ipn_prefers_variant_entry() {
        let reg = sample();
        let dotted = Ipn::parse("663.1234").unwrap();
        assert_eq!(reg.prefix_for_ipn(&dotted), Some("663."));

        let plain = Ipn::parse("663-7891").unwrap();
        assert_eq!(reg.prefix_for_ipn(&plain), Some("663"));

        let engine_dotted = Ipn::parse("450.77").unwrap();
        assert_eq!(reg.prefix_for_ipn(&engine_dotted), Some("450"));

        let unknown = Ipn::parse("111-1").unwrap();
        assert_eq!(reg.prefix_for_ipn(&unknown), None);
    }

    #[test]
    fn active_entries_skip_excluded() {
        let reg = sample();
        assert_eq!(reg.len(), 4);
        let active: Vec<_> = reg.active_entries().map(|e| e.prefix.as_str()).collect();
        assert_eq!(active, vec!["663", "663.", "450"]);
        assert_eq!(reg.prefixes().last(), Some("900"));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = sample();
        let b = sample();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let c = PartTypeRegistry::from_entries(vec![PartTypeEntry::new("663", "x")]).unwrap();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn json_decode_validates() {
        let bad = r#"[{ "prefix": "900", "name": "x", "excluded": true,
                        "attribute_rules": { "Brand": "F" } }]"#;
        assert!(serde_json::from_str::<PartTypeRegistry>(bad).is_err());

        let json = serde_json::to_string(&sample()).unwrap();
        let decoded: PartTypeRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, sample());
    }
}
