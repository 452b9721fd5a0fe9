//! The eight rule procedures.
//!
//! Each procedure is a pure function of its input and the supplied
//! capabilities. Every branch ends in a defined result; none of them can
//! fail the call.

use uuid::Uuid;

use crate::capability::{Capabilities, GeneratorError, SourceField};
use crate::confidence::{Confidence, CONFIDENCE_THRESHOLD};
use crate::outcome::ResolutionResult;
use crate::registry::{normalize_prefix, PartTypeEntry};

use super::trace::TraceRecorder;
use super::TASK_NAMESPACE;

/// Everything a procedure may consult.
pub(crate) struct RuleInput<'a> {
    pub prefix: &'a str,
    pub attribute: &'a str,
    pub entry: &'a PartTypeEntry,
    pub confidence: Confidence,
    pub caps: Capabilities<'a>,
}

impl RuleInput<'_> {
    fn task_key(&self) -> Uuid {
        Uuid::new_v5(
            &TASK_NAMESPACE,
            format!("{}/{}", self.prefix, self.attribute).as_bytes(),
        )
    }

    fn generate(&self) -> Result<String, GeneratorError> {
        checked(self.caps.generator.generate(self.attribute, self.prefix))
    }

    fn interpret_ipn(&self) -> Result<String, GeneratorError> {
        checked(self.caps.generator.interpret_ipn(self.attribute, self.prefix))
    }

    fn log_threshold(&self, trace: &mut TraceRecorder<'_>) {
        trace.info(format!("Confidence threshold: {CONFIDENCE_THRESHOLD}%"));
        trace.info(format!("Supplied confidence: {}", self.confidence));
    }
}

fn checked(generated: Result<String, GeneratorError>) -> Result<String, GeneratorError> {
    match generated {
        Ok(v) if v.trim().is_empty() => Err(GeneratorError::Empty),
        other => other,
    }
}

fn lock_steps(value: &str, confidence: Option<Confidence>, trace: &mut TraceRecorder<'_>) {
    match confidence {
        Some(c) => trace.success(format!("Inference confident ({c}): \"{value}\"")),
        None => trace.success(format!("Found fixed value: \"{value}\"")),
    }
    trace.action("Writing to structured store");
    trace.action("Applying physical field lock");
    trace.success("Field locked");
}

fn generation_failed(err: &GeneratorError, trace: &mut TraceRecorder<'_>) -> ResolutionResult {
    trace.error(format!("Value generation failed: {err}"));
    ResolutionResult::error().with_note(format!("value generation failed: {err}"))
}

/// F: write and lock the configured value.
pub(crate) fn fixed(input: &RuleInput<'_>, trace: &mut TraceRecorder<'_>) -> ResolutionResult {
    trace.action("Rule F: looking up fixed value");

    match input.caps.fixed_values.fixed_value(input.prefix, input.attribute) {
        Some(value) => {
            lock_steps(&value, None, trace);
            ResolutionResult::write_and_lock(value)
        }
        None => {
            trace.error("No fixed value defined for this prefix/attribute combination");
            ResolutionResult::error().with_note("missing fixed-value configuration")
        }
    }
}

/// FsV: copy the master-record value to the listing, or "Does Not Apply".
pub(crate) fn fixed_source_variable(
    input: &RuleInput<'_>,
    trace: &mut TraceRecorder<'_>,
) -> ResolutionResult {
    trace.action("Rule FsV: checking master record for source value");

    let normalized = normalize_prefix(input.prefix);
    let record = input.caps.master_records.master_record(&normalized);
    let field = SourceField::for_attribute(input.attribute);

    if record.is_none() {
        trace.info(format!("No master record found for prefix {normalized}"));
    }
    if field.is_none() {
        trace.info(format!("'{}' has no master-record source field", input.attribute));
    }

    let sourced = record
        .as_ref()
        .zip(field)
        .and_then(|(rec, f)| rec.source_value(f).map(|v| (rec, f, v)));

    match sourced {
        Some((rec, f, value)) => {
            trace.success(format!("Found source value: \"{value}\""));
            if rec.is_field_locked(f) {
                trace.info(format!("Source field '{}' is locked on record {}", f.name(), rec.ipn));
            }
            if let Some(existing) = rec.locked_value(input.attribute) {
                trace.info(format!(
                    "'{}' already locked on record {} as \"{existing}\"",
                    input.attribute, rec.ipn
                ));
            }
            trace.action("Writing to listing");
            ResolutionResult::write_listing(value).with_note("sourced from master record")
        }
        None => {
            trace.warning("Source value not found in master record");
            trace.action("Writing \"Does Not Apply\" to listing only");
            ResolutionResult::does_not_apply().with_note(
                "value missing from source: \"Does Not Apply\" written to the listing only, never to the structured store",
            )
        }
    }
}

/// VF: write and lock when confident; dot-number variants are skipped.
pub(crate) fn variable_fixed(
    input: &RuleInput<'_>,
    trace: &mut TraceRecorder<'_>,
) -> ResolutionResult {
    if input.entry.is_dot_number_variant {
        trace.warning("Rule VF: skipping dot-number IPN");
        trace.info("Dot-number IPNs are excluded from VF rules by policy");
        return ResolutionResult::skip().with_note("dot-number IPN: VF rule skipped by policy");
    }

    trace.action("Rule VF: running inference");
    input.log_threshold(trace);

    let confidence = input.confidence;
    if !confidence.meets_threshold() {
        trace.warning(format!(
            "Confidence too low ({confidence} < {CONFIDENCE_THRESHOLD}%)"
        ));
        trace.info("No action taken, field remains unset");
        return ResolutionResult::skip_low_confidence()
            .with_confidence(confidence)
            .with_note(below_threshold_note(confidence));
    }

    match input.generate() {
        Ok(value) => {
            lock_steps(&value, Some(confidence), trace);
            ResolutionResult::write_and_lock(value).with_confidence(confidence)
        }
        Err(err) => generation_failed(&err, trace).with_confidence(confidence),
    }
}

/// V1: inferred value, listing only, never locked.
pub(crate) fn variable_listing(
    input: &RuleInput<'_>,
    trace: &mut TraceRecorder<'_>,
) -> ResolutionResult {
    trace.action("Rule V1: inferring value from inventory, title and condition");

    match input.generate() {
        Ok(value) => {
            trace.success(format!("Inference determined value: \"{value}\""));
            trace.action("Writing to listing");
            trace.info("Field will not be locked (listing-only value)");
            ResolutionResult::write_listing(value)
                .with_note("listing-only value, never persisted to the structured store")
        }
        Err(err) => generation_failed(&err, trace),
    }
}

/// V2: IPN interpretation, listing only, never locked.
pub(crate) fn variable_ipn(input: &RuleInput<'_>, trace: &mut TraceRecorder<'_>) -> ResolutionResult {
    trace.action("Rule V2: interpreting IPN via external lookup");

    match input.interpret_ipn() {
        Ok(value) => {
            trace.success(format!("External lookup result: \"{value}\""));
            trace.action("Writing to listing");
            ResolutionResult::write_listing(value)
                .with_note("IPN interpretation, listing-only value never persisted to the structured store")
        }
        Err(err) => generation_failed(&err, trace),
    }
}

/// VB: optional field, filled when confident and otherwise left blank.
pub(crate) fn variable_blank(
    input: &RuleInput<'_>,
    trace: &mut TraceRecorder<'_>,
) -> ResolutionResult {
    trace.action("Rule VB: attempting optional field");
    trace.info(format!("Supplied confidence: {}", input.confidence));

    let confidence = input.confidence;
    if !confidence.meets_threshold() {
        trace.info(format!("Confidence not sufficient ({confidence})"));
        trace.action("Leaving field blank (optional field)");
        return ResolutionResult::leave_blank()
            .with_confidence(confidence)
            .with_note("optional field left blank: not an error, no penalty");
    }

    match input.generate() {
        Ok(value) => {
            trace.success(format!("Inference confident ({confidence}): \"{value}\""));
            trace.action("Writing to listing");
            ResolutionResult::write_listing(value)
                .with_confidence(confidence)
                .with_note("optional field filled by inference")
        }
        Err(err) => {
            trace.warning(format!("Value generation failed: {err}"));
            trace.action("Leaving field blank (optional field)");
            ResolutionResult::leave_blank()
                .with_confidence(confidence)
                .with_note("optional field left blank after generation failure: not an error, no penalty")
        }
    }
}

/// VMF: write and lock when confident, otherwise escalate for manual entry.
pub(crate) fn variable_manual_fixed(
    input: &RuleInput<'_>,
    trace: &mut TraceRecorder<'_>,
) -> ResolutionResult {
    trace.action("Rule VMF: inference attempts first");
    input.log_threshold(trace);

    let confidence = input.confidence;
    if confidence.meets_threshold() {
        match input.generate() {
            Ok(value) => {
                lock_steps(&value, Some(confidence), trace);
                return ResolutionResult::write_and_lock(value).with_confidence(confidence);
            }
            Err(err) => trace.warning(format!("Value generation failed: {err}")),
        }
    } else {
        trace.warning(format!(
            "Confidence too low ({confidence} < {CONFIDENCE_THRESHOLD}%)"
        ));
    }

    let title = format!("Review {} for prefix {}", input.attribute, input.prefix);
    trace.action("Requesting manual review task");
    trace.success(format!("Review task requested: \"{title}\""));
    trace.info("Awaiting manual entry; field will be locked after human input");
    ResolutionResult::escalate(input.task_key())
        .with_confidence(confidence)
        .with_note(format!(
            "escalated to manual review (\"{title}\"); field will be locked only after manual entry"
        ))
}

/// MF: always escalate; inference is never consulted.
pub(crate) fn manual_fixed(input: &RuleInput<'_>, trace: &mut TraceRecorder<'_>) -> ResolutionResult {
    let title = format!("Research {} for prefix {}", input.attribute, input.prefix);
    trace.action("Rule MF: manual-only field, always requires human research");
    trace.action("Requesting research task");
    trace.success(format!("Research task requested: \"{title}\""));
    trace.info("Awaiting manual entry; field will be locked after human input");
    ResolutionResult::escalate(input.task_key()).with_note(format!(
        "manual-only field: always requires human research (\"{title}\")"
    ))
}

fn below_threshold_note(confidence: Confidence) -> String {
    format!(
        "confidence {confidence} below the {CONFIDENCE_THRESHOLD}% threshold (margin {})",
        confidence.margin()
    )
}
