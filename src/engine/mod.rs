//! The resolution engine.
//!
//! Given a request and a capability set, the engine selects the rule bound
//! to the (prefix, attribute) pair and runs exactly one of the eight
//! procedures. It is synchronous, keeps no state between calls and never
//! performs the writes it describes.

mod procedures;
mod request;
mod trace;

use std::sync::Arc;

use uuid::Uuid;

use crate::capability::Capabilities;
use crate::confidence::Confidence;
use crate::error::ResolveError;
use crate::outcome::Resolution;
use crate::registry::{PartTypeEntry, PartTypeRegistry};
use crate::rule::RuleCode;

pub use request::{ResolutionRequest, ResolutionRequestBuilder};

use procedures::RuleInput;
use trace::TraceRecorder;

/// Namespace for escalation task keys.
pub const TASK_NAMESPACE: Uuid = Uuid::from_u128(0x5d1c_2b8e_7a4f_4c3e_9b61_0e8d_4f2a_7c15);

/// Stateless rule-dispatch engine over a shared registry.
#[derive(Debug, Clone)]
pub struct ResolutionEngine {
    registry: Arc<PartTypeRegistry>,
}

impl ResolutionEngine {
    /// Create an engine over `registry`.
    #[must_use]
    pub fn new(registry: Arc<PartTypeRegistry>) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &PartTypeRegistry {
        &self.registry
    }

    /// Resolve one item specific.
    ///
    /// # Errors
    ///
    /// - `ResolveError::InvalidRequest` if the prefix is not registered or
    ///   the attribute is not bound for it.
    /// - `ResolveError::ExcludedPrefix` if the prefix is excluded. This is
    ///   checked before the attribute and before any rule logic.
    pub fn resolve(
        &self,
        request: &ResolutionRequest,
        caps: Capabilities<'_>,
    ) -> Result<Resolution, ResolveError> {
        let entry = self.active_entry(&request.prefix)?;
        let code = entry
            .rule_code_for(&request.attribute)
            .ok_or_else(|| ResolveError::unbound_attribute(&request.prefix, &request.attribute))?;

        Ok(Self::dispatch(entry, code, request, caps))
    }

    /// Resolve every attribute bound to `prefix`, sorted by attribute name.
    ///
    /// # Errors
    ///
    /// Fails as [`resolve`](Self::resolve) does for unknown or excluded
    /// prefixes.
    pub fn resolve_all(
        &self,
        prefix: &str,
        confidence: Confidence,
        caps: Capabilities<'_>,
    ) -> Result<Vec<(String, Resolution)>, ResolveError> {
        let entry = self.active_entry(prefix)?;
        Ok(entry
            .attribute_rules
            .iter()
            .map(|(attribute, &code)| {
                let request = ResolutionRequest::new(prefix, attribute.as_str(), confidence);
                (attribute.clone(), Self::dispatch(entry, code, &request, caps))
            })
            .collect())
    }

    fn active_entry(&self, prefix: &str) -> Result<&PartTypeEntry, ResolveError> {
        let entry = self.registry.part_type_entry(prefix).ok_or_else(|| {
            tracing::warn!(prefix, "resolution refused: prefix not registered");
            ResolveError::unknown_prefix(prefix)
        })?;

        if entry.excluded {
            let reason = entry.exclusion_reason();
            tracing::warn!(prefix, reason, "resolution refused: prefix excluded");
            return Err(ResolveError::ExcludedPrefix {
                prefix: prefix.to_string(),
                reason: reason.to_string(),
            });
        }
        Ok(entry)
    }

    fn dispatch(
        entry: &PartTypeEntry,
        code: RuleCode,
        request: &ResolutionRequest,
        caps: Capabilities<'_>,
    ) -> Resolution {
        let rule = code.rule_type();
        let mut trace = TraceRecorder::new(&request.prefix, &request.attribute, code);
        trace.info(format!(
            "Processing: {} for prefix {}",
            request.attribute, request.prefix
        ));
        trace.info(format!("Rule type: {code} ({})", rule.name));
        if entry.is_dot_number_variant {
            trace.warning("Dot-number IPN detected, special handling applies");
        }

        let input = RuleInput {
            prefix: &request.prefix,
            attribute: &request.attribute,
            entry,
            confidence: request.confidence,
            caps,
        };

        let result = match code {
            RuleCode::Fixed => procedures::fixed(&input, &mut trace),
            RuleCode::FixedSourceVariable => procedures::fixed_source_variable(&input, &mut trace),
            RuleCode::VariableFixed => procedures::variable_fixed(&input, &mut trace),
            RuleCode::VariableListing => procedures::variable_listing(&input, &mut trace),
            RuleCode::VariableIpn => procedures::variable_ipn(&input, &mut trace),
            RuleCode::VariableBlank => procedures::variable_blank(&input, &mut trace),
            RuleCode::VariableManualFixed => procedures::variable_manual_fixed(&input, &mut trace),
            RuleCode::ManualFixed => procedures::manual_fixed(&input, &mut trace),
        };

        Resolution {
            result,
            trace: trace.into_entries(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::capability::memory::{FixedValueTable, MasterPartsTable, ScriptedGenerator};
    use crate::capability::{GeneratorError, MasterRecord, ValueGenerator};
    use crate::outcome::{Action, Destination, Severity, DOES_NOT_APPLY};

    struct CountingGenerator {
        calls: AtomicUsize,
    }

    impl CountingGenerator {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ValueGenerator for CountingGenerator {
        fn generate(&self, attribute: &str, _prefix: &str) -> Result<String, GeneratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("generated {attribute}"))
        }
    }

    fn registry() -> Arc<PartTypeRegistry> {
        Arc::new(
            PartTypeRegistry::from_entries(vec![
                PartTypeEntry::new("663", "Brake Components")
                    .bind("Brand", RuleCode::Fixed)
                    .bind("Warranty", RuleCode::Fixed)
                    .bind("Weight", RuleCode::FixedSourceVariable)
                    .bind("Manufacturer Part Number", RuleCode::VariableFixed)
                    .bind("Condition", RuleCode::VariableListing)
                    .bind("Engine Type", RuleCode::VariableIpn)
                    .bind("Material", RuleCode::VariableBlank)
                    .bind("Fitment Type", RuleCode::VariableManualFixed)
                    .bind("Country of Manufacture", RuleCode::ManualFixed),
                PartTypeEntry::new("663.", "Dot-Number IPN")
                    .dot_number_variant()
                    .bind("Manufacturer Part Number", RuleCode::VariableFixed)
                    .bind("Weight", RuleCode::FixedSourceVariable),
                PartTypeEntry::excluded("900", "Excluded", "excluded per policy"),
            ])
            .unwrap(),
        )
    }

    struct Fixture {
        fixed: FixedValueTable,
        records: MasterPartsTable,
        generator: CountingGenerator,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                fixed: FixedValueTable::new().with_value("663", "Brand", "Dorman"),
                records: MasterPartsTable::new().with_record(MasterRecord::new("663-7891").with_weight(1.8)),
                generator: CountingGenerator::new(),
            }
        }

        fn caps(&self) -> Capabilities<'_> {
            Capabilities::new(&self.fixed, &self.records, &self.generator)
        }
    }

    fn run(fx: &Fixture, prefix: &str, attribute: &str, confidence: u8) -> Result<Resolution, ResolveError> {
        let engine = ResolutionEngine::new(registry());
        let request = ResolutionRequest::new(prefix, attribute, Confidence::new(confidence).unwrap());
        engine.resolve(&request, fx.caps())
    }

    #[test]
    fn unknown_prefix_and_attribute_are_invalid_requests() {
        let fx = Fixture::new();
        assert!(matches!(
            run(&fx, "123", "Brand", 80),
            Err(ResolveError::InvalidRequest { attribute: None, .. })
        ));
        assert!(matches!(
            run(&fx, "663", "Color", 80),
            Err(ResolveError::InvalidRequest { attribute: Some(_), .. })
        ));
    }

    #[test]
    fn excluded_prefix_refused_before_attribute_check() {
        let fx = Fixture::new();
        let err = run(&fx, "900", "Anything", 100).unwrap_err();
        assert_eq!(
            err,
            ResolveError::ExcludedPrefix {
                prefix: "900".to_string(),
                reason: "excluded per policy".to_string(),
            }
        );
        assert_eq!(fx.generator.calls(), 0);
    }

    #[test]
    fn fixed_missing_value_is_error_action() {
        let fx = Fixture::new();
        let res = run(&fx, "663", "Warranty", 80).unwrap();
        assert_eq!(res.result.action, Action::Error);
        assert_eq!(res.result.value, None);
        assert_eq!(res.result.note.as_deref(), Some("missing fixed-value configuration"));
        assert_eq!(res.trace.last().unwrap().severity, Severity::Error);
    }

    #[test]
    fn dot_variant_fsv_normalizes_prefix() {
        let fx = Fixture::new();
        let res = run(&fx, "663.", "Weight", 10).unwrap();
        assert_eq!(res.result.action, Action::WriteListing);
        assert_eq!(res.result.value.as_deref(), Some("1.8 lbs"));
        assert_eq!(res.trace[2].severity, Severity::Warning);
    }

    #[test]
    fn fsv_without_record_writes_does_not_apply() {
        let mut fx = Fixture::new();
        fx.records = MasterPartsTable::new();
        let res = run(&fx, "663", "Weight", 90).unwrap();
        assert_eq!(res.result.action, Action::WriteDoesNotApply);
        assert_eq!(res.result.value.as_deref(), Some(DOES_NOT_APPLY));
        assert_eq!(res.result.destination, Destination::ListingOnly);
        assert!(res.result.note.unwrap().contains("never to the structured store"));
    }

    #[test]
    fn vf_dot_variant_skips_without_inference() {
        let fx = Fixture::new();
        let res = run(&fx, "663.", "Manufacturer Part Number", 100).unwrap();
        assert_eq!(res.result.action, Action::Skip);
        assert_eq!(res.result.confidence, None);
        assert_eq!(fx.generator.calls(), 0);
    }

    #[test]
    fn vf_low_confidence_does_not_generate() {
        let fx = Fixture::new();
        let res = run(&fx, "663", "Manufacturer Part Number", 74).unwrap();
        assert_eq!(res.result.action, Action::SkipLowConfidence);
        assert_eq!(res.result.note.as_deref(), Some("confidence 74% below the 75% threshold (margin -1)"));
        assert_eq!(fx.generator.calls(), 0);
    }

    #[test]
    fn v2_uses_interpretation_path() {
        let fx = Fixture::new();
        let res = run(&fx, "663", "Engine Type", 0).unwrap();
        assert_eq!(res.result.action, Action::WriteListing);
        assert_eq!(res.result.value.as_deref(), Some("generated Engine Type"));
        assert_eq!(fx.generator.calls(), 1);
    }

    #[test]
    fn generation_failures_map_per_rule() {
        let failing = |_: &str, _: &str| -> Result<String, GeneratorError> {
            Err(GeneratorError::Unavailable {
                reason: "offline".to_string(),
            })
        };
        let fixed = FixedValueTable::new();
        let records = MasterPartsTable::new();
        let caps = Capabilities::new(&fixed, &records, &failing);
        let engine = ResolutionEngine::new(registry());
        let full = Confidence::full();

        let action = |attribute: &str| {
            engine
                .resolve(&ResolutionRequest::new("663", attribute, full), caps)
                .unwrap()
                .result
                .action
        };

        assert_eq!(action("Manufacturer Part Number"), Action::Error);
        assert_eq!(action("Condition"), Action::Error);
        assert_eq!(action("Engine Type"), Action::Error);
        assert_eq!(action("Material"), Action::LeaveBlank);
        assert_eq!(action("Fitment Type"), Action::Escalate);
    }

    #[test]
    fn task_keys_are_stable_per_field() {
        let fx = Fixture::new();
        let a = run(&fx, "663", "Country of Manufacture", 5).unwrap();
        let b = run(&fx, "663", "Country of Manufacture", 95).unwrap();
        let c = run(&fx, "663", "Fitment Type", 5).unwrap();
        assert!(a.result.task_key.is_some());
        assert_eq!(a.result.task_key, b.result.task_key);
        assert_ne!(a.result.task_key, c.result.task_key);
    }

    #[test]
    fn resolve_all_covers_every_binding() {
        let fx = Fixture::new();
        let engine = ResolutionEngine::new(registry());
        let all = engine
            .resolve_all("663", Confidence::new(80).unwrap(), fx.caps())
            .unwrap();
        assert_eq!(all.len(), 9);
        let attributes: Vec<_> = all.iter().map(|(a, _)| a.as_str()).collect();
        let mut sorted = attributes.clone();
        sorted.sort_unstable();
        assert_eq!(attributes, sorted);

        assert!(matches!(
            engine.resolve_all("900", Confidence::zero(), fx.caps()),
            Err(ResolveError::ExcludedPrefix { .. })
        ));
    }

    #[test]
    fn default_scripted_generator_is_usable() {
        let fixed = FixedValueTable::new();
        let records = MasterPartsTable::new();
        let generator = ScriptedGenerator::new();
        let engine = ResolutionEngine::new(registry());
        let res = engine
            .resolve(
                &ResolutionRequest::new("663", "Condition", Confidence::zero()),
                Capabilities::new(&fixed, &records, &generator),
            )
            .unwrap();
        assert_eq!(res.result.value.as_deref(), Some("New"));
    }
}
