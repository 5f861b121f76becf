//! Scenario forge - generation pipeline
//!
//! Runs the stages that turn a pattern name into a sealed scenario:
//!
//! ```text
//! 1. Look up the template in the pattern library
//! 2. Resolve the seed (caller-supplied or drawn from a UUID)
//! 3. Synthesize the transaction graph
//! 4. Attach labels, jurisdictions and provenance
//! 5. Seal: integrity hash, then narrative
//! ```
//!
//! The forge only borrows the library, so one library can serve any number
//! of forges across threads.
//!
//! # Example
//!
//! ```
//! use scenario_forge_core_rs::orchestrator::{GenerateOptions, ScenarioForge};
//! use scenario_forge_core_rs::PatternLibrary;
//!
//! let forge = ScenarioForge::new(PatternLibrary::builtin());
//! let a = forge.generate("cross_chain_laundering", Some(42)).unwrap();
//! let b = forge
//!     .generate_with("cross_chain_laundering", GenerateOptions::seeded(42))
//!     .unwrap();
//! assert_eq!(a.integrity_hash(), b.integrity_hash());
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::labels::LabelAttacher;
use crate::integrity::IntegrityStamper;
use crate::models::Scenario;
use crate::patterns::{AmountRange, CountRange, PatternLibrary};
use crate::synthesis::{GraphSynthesizer, SynthesisParams};

/// Errors raised anywhere in the generation pipeline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForgeError {
    #[error("Unknown pattern: {name}")]
    UnknownPattern { name: String },

    #[error("Parameter out of range for template '{template}': {reason}")]
    ParameterRange { template: String, reason: String },

    #[error("Unsupported export format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Integrity seal violation: expected {expected}, computed {actual}")]
    IntegritySealViolation { expected: String, actual: String },

    #[error("Malformed graph: {0}")]
    MalformedGraph(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ForgeError {
    fn from(err: std::io::Error) -> Self {
        ForgeError::Io(err.to_string())
    }
}

/// Per-call generation overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Fixed seed; `None` draws a fresh one
    pub seed: Option<u64>,
    /// Narrower edge-count range (must overlap the template's)
    pub edge_count: Option<CountRange>,
    /// Replacement source amount range
    pub amount: Option<AmountRange>,
    /// Provenance timestamp; defaults to now
    pub generated_at: Option<DateTime<Utc>>,
}

impl GenerateOptions {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn with_edge_count(mut self, range: CountRange) -> Self {
        self.edge_count = Some(range);
        self
    }

    pub fn with_amount(mut self, range: AmountRange) -> Self {
        self.amount = Some(range);
        self
    }

    pub fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }
}

/// Generation entry point bound to a pattern library
#[derive(Debug, Clone, Copy)]
pub struct ScenarioForge<'lib> {
    library: &'lib PatternLibrary,
}

impl<'lib> ScenarioForge<'lib> {
    pub fn new(library: &'lib PatternLibrary) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &'lib PatternLibrary {
        self.library
    }

    /// Generate a sealed scenario from a named pattern
    ///
    /// # Errors
    /// - `UnknownPattern` if the name is not in the library
    /// - `ParameterRange` if the template cannot be instantiated
    pub fn generate(&self, pattern_name: &str, seed: Option<u64>) -> Result<Scenario, ForgeError> {
        self.generate_with(
            pattern_name,
            GenerateOptions {
                seed,
                ..GenerateOptions::default()
            },
        )
    }

    /// Generate with explicit overrides
    pub fn generate_with(
        &self,
        pattern_name: &str,
        options: GenerateOptions,
    ) -> Result<Scenario, ForgeError> {
        let template = self.library.lookup(pattern_name)?;
        let seed = options.seed.unwrap_or_else(fresh_seed);
        tracing::debug!(
            pattern = %template.id,
            seed,
            seeded = options.seed.is_some(),
            "resolved template and seed"
        );

        let mut params = SynthesisParams::new(seed);
        if let Some(range) = options.edge_count {
            params = params.with_edge_count(range);
        }
        if let Some(range) = options.amount {
            params = params.with_amount(range);
        }

        let graph = GraphSynthesizer::synthesize_with(template, &params)?;
        let generated_at = options.generated_at.unwrap_or_else(Utc::now);
        let labeled = LabelAttacher::attach_at(&graph, template, seed, generated_at)?;
        let scenario = IntegrityStamper::seal(labeled)?;

        tracing::debug!(
            scenario_id = %scenario.scenario_id(),
            pattern = %template.id,
            seed,
            nodes = scenario.graph().node_count(),
            edges = scenario.graph().edge_count(),
            integrity_hash = %scenario.integrity_hash(),
            "generated scenario"
        );
        Ok(scenario)
    }
}

/// Seed drawn from a random UUID when the caller supplies none
fn fresh_seed() -> u64 {
    let bytes = uuid::Uuid::new_v4().into_bytes();
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(seed)
}
