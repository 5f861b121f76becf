//! Label attachment
//!
//! Produces a [`LabeledGraph`]: an augmented copy of the synthesized graph
//! carrying the template's intent label, a jurisdiction per node, the AML
//! weaknesses the pattern exploits, and provenance. The input graph is never
//! modified.
//!
//! Jurisdiction draws use their own stream derived from the seed, so they
//! are reproducible and independent of the synthesis draws.

use chrono::{DateTime, Utc};

use crate::graph::TransactionGraph;
use crate::models::{LabeledGraph, Provenance};
use crate::orchestrator::ForgeError;
use crate::patterns::ScenarioTemplate;
use crate::rng::{RngManager, LABEL_STREAM};

/// Annotates graphs with labels and provenance
pub struct LabelAttacher;

impl LabelAttacher {
    /// Attach labels, stamping provenance with the current time
    pub fn attach(
        graph: &TransactionGraph,
        template: &ScenarioTemplate,
        seed: u64,
    ) -> Result<LabeledGraph, ForgeError> {
        Self::attach_at(graph, template, seed, Utc::now())
    }

    /// Attach labels with an explicit generation timestamp
    ///
    /// # Errors
    /// `ParameterRange` if the graph references a slot the template lacks
    /// or the jurisdiction pool is empty
    pub fn attach_at(
        graph: &TransactionGraph,
        template: &ScenarioTemplate,
        seed: u64,
        generated_at: DateTime<Utc>,
    ) -> Result<LabeledGraph, ForgeError> {
        if template.jurisdictions.is_empty() {
            return Err(ForgeError::ParameterRange {
                template: template.id.clone(),
                reason: "jurisdiction pool is empty".to_string(),
            });
        }

        let mut rng = RngManager::derive(seed, LABEL_STREAM);
        let mut labeled = graph.clone();

        for node in labeled.nodes_mut() {
            let slot = template
                .slots
                .iter()
                .find(|s| s.name == node.slot())
                .ok_or_else(|| ForgeError::ParameterRange {
                    template: template.id.clone(),
                    reason: format!("node {} belongs to unknown slot {}", node.id(), node.slot()),
                })?;

            // Pinned codes were checked against the pool at registration
            let pinned = slot
                .jurisdiction
                .as_deref()
                .and_then(|code| template.jurisdiction(code));
            let jurisdiction = match pinned {
                Some(j) => j.clone(),
                None => template.jurisdictions[rng.pick_index(template.jurisdictions.len())].clone(),
            };
            node.set_jurisdiction(jurisdiction);
        }

        let provenance = Provenance::new(&template.id, &template.version, seed, generated_at);
        tracing::debug!(pattern = %template.id, seed, label = %template.intent, "attached labels");

        Ok(LabeledGraph::new(
            &template.id,
            labeled,
            template.intent,
            template.aml_weaknesses.clone(),
            provenance,
        ))
    }
}
