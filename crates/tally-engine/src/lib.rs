//! tally-engine
//!
//! The registry-driven scoring pipeline. One submission flows through
//! resolution (platform fields to canonical items), recoding (answer text
//! to integers), validation, scoring (with reverse scoring and proration),
//! interpretation, and event assembly. Every rule comes from the measure
//! and binding specs; there are no measure-specific code paths.

pub mod builder;
pub mod collector;
pub mod domain;
pub mod domains;
pub mod error;
pub mod intake;
pub mod interpret;
pub mod pipeline;
pub mod recode;
pub mod resolve;
pub mod score;
pub mod validate;

pub use builder::{EventBuilder, EventContext};
pub use collector::DiagnosticsCollector;
pub use domain::{DomainProcessor, DomainRouter, ProcessOptions};
pub use error::EngineError;
pub use intake::{IntakeOptions, process_form_submission};
pub use interpret::Interpreter;
pub use pipeline::{Pipeline, PipelineConfig};
pub use recode::{RecodedItem, RecodedSection, Recoder};
pub use resolve::{ResolutionOutcome, Resolver, SectionResolution};
pub use score::{ScaleScore, ScoringEngine, ScoringOutcome};
pub use validate::Validator;
