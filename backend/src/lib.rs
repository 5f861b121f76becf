//! Scenario Forge Core - Rust Engine
//!
//! Deterministic generator of synthetic financial-crime scenarios for
//! testing anti-money-laundering systems.
//!
//! # Architecture
//!
//! - **patterns**: Catalog of laundering topologies (templates)
//! - **synthesis**: Template + seed → transaction graph
//! - **labels**: Intent label, jurisdictions, provenance
//! - **integrity**: Canonical hashing and sealing
//! - **narrative**: Plain-English walkthrough of a scenario
//! - **export**: JSON, CSV and Markdown serialization
//! - **orchestrator**: Pipeline tying the stages together
//! - **graph**: Transaction multigraph and cycle detection
//! - **rng**: Deterministic random number generation
//! - **core**: Synthetic clock
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 minor units
//! 2. All randomness is deterministic (seeded RNG)
//! 3. Sealed scenarios are immutable; edits produce a new seal
//! 4. Every export carries the artificial-data warning
//!
//! # Example
//!
//! ```
//! use scenario_forge_core_rs::{generate, ExportFormat};
//!
//! let a = generate("cross_chain_laundering", Some(42)).unwrap();
//! let b = generate("cross_chain_laundering", Some(42)).unwrap();
//! assert_eq!(a.integrity_hash(), b.integrity_hash());
//!
//! let json = a.export(ExportFormat::Json).unwrap();
//! assert!(!json.is_empty());
//! ```

// Module declarations
pub mod core;
pub mod export;
pub mod graph;
pub mod integrity;
pub mod labels;
pub mod models;
pub mod narrative;
pub mod orchestrator;
pub mod patterns;
pub mod rng;
pub mod synthesis;

// Re-exports for convenience
pub use crate::core::clock::SyntheticClock;
pub use export::{CsvTables, ExportFormat, Exporter};
pub use graph::{SccFinder, TransactionGraph};
pub use integrity::IntegrityStamper;
pub use labels::LabelAttacher;
pub use models::{
    IntentLabel, Jurisdiction, LabeledGraph, NodeRole, Provenance, RegulatoryTier, RiskSummary,
    Scenario, TransactionEdge, TransactionNode, ARTIFICIAL_DATA_WARNING,
};
pub use narrative::NarrativeGenerator;
pub use orchestrator::{ForgeError, GenerateOptions, ScenarioForge};
pub use patterns::{PatternLibrary, ScenarioTemplate};
pub use rng::RngManager;
pub use synthesis::{GraphSynthesizer, SynthesisParams};

/// Generate a sealed scenario from the built-in pattern library
///
/// A `None` seed draws a fresh one, recorded in the scenario's provenance.
///
/// # Errors
/// - `UnknownPattern` if no built-in template has that name
/// - `ParameterRange` if the template cannot be instantiated
pub fn generate(pattern_name: &str, seed: Option<u64>) -> Result<Scenario, ForgeError> {
    ScenarioForge::new(PatternLibrary::builtin()).generate(pattern_name, seed)
}
