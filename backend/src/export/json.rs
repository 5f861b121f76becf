//! JSON document export and import
//!
//! The document is self-describing: it carries the graph, labels,
//! provenance, hash and narrative. Importing rebuilds the scenario and
//! re-derives its hash and narrative; any difference from the stored values
//! is a seal violation.

use serde::{Deserialize, Serialize};

use crate::graph::TransactionGraph;
use crate::integrity::{canonical_digest, IntegrityStamper};
use crate::models::{
    IntentLabel, LabeledGraph, Provenance, Scenario, TransactionEdge, TransactionNode,
    ARTIFICIAL_DATA_WARNING,
};
use crate::orchestrator::ForgeError;

#[derive(Debug, Serialize, Deserialize)]
struct ScenarioDocument {
    scenario_id: String,
    template: String,
    label: IntentLabel,
    nodes: Vec<TransactionNode>,
    edges: Vec<TransactionEdge>,
    aml_weaknesses: Vec<String>,
    provenance: Provenance,
    integrity_hash: String,
    narrative: String,
    warning: String,
}

pub(crate) fn export(scenario: &Scenario) -> Result<Vec<u8>, ForgeError> {
    let graph = scenario.graph();
    let document = ScenarioDocument {
        scenario_id: scenario.scenario_id(),
        template: scenario.template().to_string(),
        label: scenario.label(),
        nodes: graph.nodes().to_vec(),
        edges: graph.edges().to_vec(),
        aml_weaknesses: scenario.aml_weaknesses().to_vec(),
        provenance: scenario.provenance().clone(),
        integrity_hash: scenario.integrity_hash().to_string(),
        narrative: scenario.narrative().to_string(),
        warning: ARTIFICIAL_DATA_WARNING.to_string(),
    };

    serde_json::to_vec_pretty(&document)
        .map_err(|e| ForgeError::Serialization(format!("scenario document: {}", e)))
}

/// Parse a JSON export back into a sealed scenario
///
/// # Errors
/// - `Serialization` if the bytes are not a scenario document
/// - `MalformedGraph` if nodes and edges do not form a valid graph
/// - `IntegritySealViolation` if the hash or narrative does not match
pub fn import(bytes: &[u8]) -> Result<Scenario, ForgeError> {
    let document: ScenarioDocument = serde_json::from_slice(bytes)
        .map_err(|e| ForgeError::Serialization(format!("scenario document: {}", e)))?;

    if document.warning != ARTIFICIAL_DATA_WARNING {
        return Err(ForgeError::Serialization(
            "document is missing the artificial data warning".to_string(),
        ));
    }

    let mut graph = TransactionGraph::new();
    for node in document.nodes {
        graph.add_node(node)?;
    }
    for edge in document.edges {
        if edge.amount() <= 0 {
            return Err(ForgeError::MalformedGraph(format!(
                "edge {} has non-positive amount",
                edge.id()
            )));
        }
        if edge.fee() < 0 {
            return Err(ForgeError::MalformedGraph(format!(
                "edge {} has negative fee",
                edge.id()
            )));
        }
        graph.add_edge(edge)?;
    }
    graph.validate(true)?;

    let labeled = LabeledGraph::new(
        &document.template,
        graph,
        document.label,
        document.aml_weaknesses,
        document.provenance,
    );

    let actual = IntegrityStamper::stamp(&labeled)?;
    if actual != document.integrity_hash {
        tracing::warn!(expected = %document.integrity_hash, actual = %actual, "imported scenario fails its seal");
        return Err(ForgeError::IntegritySealViolation {
            expected: document.integrity_hash,
            actual,
        });
    }

    let scenario = IntegrityStamper::seal(labeled)?;
    if scenario.narrative() != document.narrative {
        tracing::warn!(scenario_id = %scenario.scenario_id(), "imported narrative was altered");
        return Err(ForgeError::IntegritySealViolation {
            expected: canonical_digest(&scenario.narrative())?,
            actual: canonical_digest(&document.narrative)?,
        });
    }

    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate;
    use serde_json::Value;

    fn exported(name: &str, seed: u64) -> (Scenario, Value) {
        let scenario = generate(name, Some(seed)).unwrap();
        let value = serde_json::from_slice(&export(&scenario).unwrap()).unwrap();
        (scenario, value)
    }

    #[test]
    fn test_round_trip_preserves_scenario() {
        let scenario = generate("nft_wash_trading", Some(31)).unwrap();
        let restored = import(&export(&scenario).unwrap()).unwrap();
        assert_eq!(restored, scenario);
    }

    #[test]
    fn test_edited_amount_breaks_seal() {
        let (_, mut value) = exported("cross_chain_laundering", 42);
        value["edges"][0]["amount"] = Value::from(1);
        let err = import(&serde_json::to_vec(&value).unwrap()).unwrap_err();
        assert!(matches!(err, ForgeError::IntegritySealViolation { .. }));
    }

    #[test]
    fn test_edited_fee_breaks_seal() {
        let (scenario, mut value) = exported("mixer_ransomware_liquidation", 5);
        let idx = scenario
            .graph()
            .edges()
            .iter()
            .position(|e| e.fee() > 0)
            .unwrap();
        value["edges"][idx]["fee"] = Value::from(0);
        let err = import(&serde_json::to_vec(&value).unwrap()).unwrap_err();
        assert!(matches!(err, ForgeError::IntegritySealViolation { .. }));
    }

    #[test]
    fn test_negative_fee_is_malformed() {
        let (_, mut value) = exported("smurfing", 8);
        value["edges"][0]["fee"] = Value::from(-1);
        let err = import(&serde_json::to_vec(&value).unwrap()).unwrap_err();
        assert!(matches!(err, ForgeError::MalformedGraph(_)));
    }

    #[test]
    fn test_edited_narrative_breaks_seal() {
        let (_, mut value) = exported("smurfing", 8);
        value["narrative"] = Value::from("Nothing to see here.");
        let err = import(&serde_json::to_vec(&value).unwrap()).unwrap_err();
        assert!(matches!(err, ForgeError::IntegritySealViolation { .. }));
    }

    #[test]
    fn test_dangling_edge_is_malformed() {
        let (_, mut value) = exported("smurfing", 8);
        value["edges"][0]["dest_id"] = Value::from("n9999");
        let err = import(&serde_json::to_vec(&value).unwrap()).unwrap_err();
        assert!(matches!(err, ForgeError::MalformedGraph(_)));
    }

    #[test]
    fn test_garbage_is_a_serialization_error() {
        let err = import(b"not json").unwrap_err();
        assert!(matches!(err, ForgeError::Serialization(_)));
    }
}
