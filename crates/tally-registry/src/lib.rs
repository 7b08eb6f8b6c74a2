//! tally-registry
//!
//! Measure and form-binding specifications as pure data, and the read-only
//! filesystem registries that serve them. Specs are loaded once at startup,
//! validated against their JSON Schemas and semantic invariants, and never
//! re-read during processing.

pub mod error;
pub mod mappings;
pub mod schema;
pub mod spec;
pub mod store;

pub use error::RegistryError;
pub use mappings::ItemMapStore;
pub use store::{BindingRegistry, MeasureRegistry};
