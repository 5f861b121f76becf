//! Domain models for scenario generation

pub mod jurisdiction;
pub mod scenario;
pub mod transaction;

// Re-exports
pub use jurisdiction::{Jurisdiction, RegulatoryTier};
pub use scenario::{
    IntentLabel, LabeledGraph, Provenance, RiskSummary, Scenario, ARTIFICIAL_DATA_WARNING,
    GENERATOR_NAME,
};
pub use transaction::{NodeRole, TransactionEdge, TransactionNode, FULL_BPS};
