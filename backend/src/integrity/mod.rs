//! Integrity sealing
//!
//! A scenario's hash is SHA-256 over a canonical JSON document:
//!
//! - nodes sorted by id, edges sorted by `(source, dest, timestamp, id)`
//! - object keys sorted recursively
//! - label, template, weaknesses and provenance included
//! - `provenance.generated_at` excluded, so a replayed seed reproduces the
//!   same hash
//!
//! Insertion order of nodes and edges therefore never affects the hash.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::models::{IntentLabel, LabeledGraph, Scenario, TransactionEdge, TransactionNode};
use crate::narrative::NarrativeGenerator;
use crate::orchestrator::ForgeError;

/// Hex SHA-256 of a value's canonical JSON form (keys sorted recursively)
pub fn canonical_digest<T: Serialize>(value: &T) -> Result<String, ForgeError> {
    let value = serde_json::to_value(value)
        .map_err(|e| ForgeError::Serialization(format!("canonical form: {}", e)))?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value))
        .map_err(|e| ForgeError::Serialization(format!("canonical form: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Provenance fields covered by the hash
#[derive(Serialize)]
struct SealedProvenance<'a> {
    generator: &'a str,
    generator_version: &'a str,
    template_id: &'a str,
    template_version: &'a str,
    seed: u64,
    artificial_data_warning: &'a str,
}

#[derive(Serialize)]
struct SealedContent<'a> {
    template: &'a str,
    nodes: Vec<&'a TransactionNode>,
    edges: Vec<&'a TransactionEdge>,
    label: IntentLabel,
    aml_weaknesses: Vec<&'a str>,
    provenance: SealedProvenance<'a>,
}

impl<'a> SealedContent<'a> {
    fn of(labeled: &'a LabeledGraph) -> Self {
        let provenance = labeled.provenance();
        let mut aml_weaknesses: Vec<&str> =
            labeled.aml_weaknesses().iter().map(String::as_str).collect();
        aml_weaknesses.sort_unstable();

        Self {
            template: labeled.template(),
            nodes: labeled.graph().sorted_nodes(),
            edges: labeled.graph().sorted_edges(),
            label: labeled.label(),
            aml_weaknesses,
            provenance: SealedProvenance {
                generator: &provenance.generator,
                generator_version: &provenance.generator_version,
                template_id: &provenance.template_id,
                template_version: &provenance.template_version,
                seed: provenance.seed,
                artificial_data_warning: &provenance.artificial_data_warning,
            },
        }
    }
}

/// Computes, applies and checks integrity seals
pub struct IntegrityStamper;

impl IntegrityStamper {
    /// Hash of the sealed content of a labeled graph
    pub fn stamp(labeled: &LabeledGraph) -> Result<String, ForgeError> {
        canonical_digest(&SealedContent::of(labeled))
    }

    /// Seal a labeled graph into an immutable scenario and render its narrative
    pub fn seal(labeled: LabeledGraph) -> Result<Scenario, ForgeError> {
        let hash = Self::stamp(&labeled)?;
        let scenario = Scenario::sealed(labeled, hash);
        let narrative = NarrativeGenerator::render(&scenario)?;
        tracing::debug!(
            pattern = %scenario.template(),
            integrity_hash = %scenario.integrity_hash(),
            "sealed scenario"
        );
        Ok(scenario.attach_narrative(narrative))
    }

    /// Recompute the hash of a sealed scenario and compare
    ///
    /// # Errors
    /// `IntegritySealViolation` on mismatch
    pub fn verify(scenario: &Scenario) -> Result<(), ForgeError> {
        let actual = Self::stamp(scenario.labeled())?;
        if actual != scenario.integrity_hash() {
            tracing::warn!(
                scenario_id = %scenario.scenario_id(),
                "integrity hash mismatch"
            );
            return Err(ForgeError::IntegritySealViolation {
                expected: scenario.integrity_hash().to_string(),
                actual,
            });
        }
        Ok(())
    }
}
