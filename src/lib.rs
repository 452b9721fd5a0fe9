//! # listing-rules - Item-Specific Resolution Engine
//!
//! Decides, for one listing attribute ("item specific") on one part-type
//! family, how the attribute's value is obtained and where it goes. Every
//! (prefix, attribute) pair is bound to one of eight rules, from static
//! lookup through inference to mandatory human escalation.
//!
//! ## Core Concepts
//!
//! - **Rule catalog**: the eight strategies and their write/lock/escalation metadata
//! - **Part-type registry**: per-prefix bindings from attribute to rule
//! - **Resolution engine**: stateless dispatch producing a result and a decision trace
//! - **Capabilities**: caller-supplied fixed-value, master-record and value-generation lookups
//!
//! ## Usage
//!
//! ```rust
//! use listing_rules::{Action, ReferenceData, ResolutionRequest};
//!
//! let data = ReferenceData::builtin()?;
//! let engine = data.engine();
//!
//! let request = ResolutionRequest::builder()
//!     .prefix("663")
//!     .attribute("Brand")
//!     .confidence(80)
//!     .build()?;
//!
//! let resolution = engine.resolve(&request, data.capabilities())?;
//! assert_eq!(resolution.result.action, Action::WriteAndLock);
//! assert_eq!(resolution.result.value.as_deref(), Some("Dorman"));
//! # Ok::<(), listing_rules::RulesError>(())
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod capability;
pub mod confidence;
pub mod config;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod registry;
pub mod rule;

pub use capability::memory::{FixedValueTable, MasterPartsTable, ScriptedGenerator};
pub use capability::{
	Capabilities, FixedValueLookup, GeneratorError, MasterRecord, MasterRecordLookup, SourceField,
	StoredValue, ValueGenerator,
};
pub use confidence::{Confidence, CONFIDENCE_THRESHOLD};
pub use config::ReferenceData;
pub use engine::{ResolutionEngine, ResolutionRequest, ResolutionRequestBuilder};
pub use error::{ConfigError, ResolveError, RulesError, RulesResult, ValidationError};
pub use outcome::{
	Action, Destination, Resolution, ResolutionResult, Severity, TraceEntry, DOES_NOT_APPLY,
};
pub use registry::{Ipn, PartTypeEntry, PartTypeRegistry};
pub use rule::{DestinationClass, RuleCatalog, RuleCode, RuleType};
