//! Tests for integrity sealing and immutability
//!
//! CRITICAL: The hash depends on content only, never on insertion order or
//! on when the scenario was generated.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use scenario_forge_core_rs::{
    generate, ForgeError, GenerateOptions, IntegrityStamper, IntentLabel, LabeledGraph,
    PatternLibrary, RngManager, Scenario, ScenarioForge, TransactionGraph,
};

fn shuffled<T: Clone>(items: &[T], rng: &mut RngManager) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = rng.pick_index(i + 1);
        out.swap(i, j);
    }
    out
}

/// Rebuild a scenario's labeled graph with nodes and edges in another order
fn reordered(scenario: &Scenario, shuffle_seed: u64) -> LabeledGraph {
    let mut rng = RngManager::new(shuffle_seed);
    let mut graph = TransactionGraph::new();
    for node in shuffled(scenario.graph().nodes(), &mut rng) {
        graph.add_node(node).unwrap();
    }
    for edge in shuffled(scenario.graph().edges(), &mut rng) {
        graph.add_edge(edge).unwrap();
    }
    LabeledGraph::new(
        scenario.template(),
        graph,
        scenario.label(),
        scenario.aml_weaknesses().to_vec(),
        scenario.provenance().clone(),
    )
}

#[test]
fn test_cross_chain_seed_42_is_reproducible() {
    let a = generate("cross_chain_laundering", Some(42)).unwrap();
    let b = generate("cross_chain_laundering", Some(42)).unwrap();
    assert_eq!(a.integrity_hash(), b.integrity_hash());
    assert_eq!(a.scenario_id(), b.scenario_id());
    assert_eq!(a.integrity_hash().len(), 64);
}

#[test]
fn test_generation_timestamp_is_outside_the_seal() {
    let forge = ScenarioForge::new(PatternLibrary::builtin());
    let first = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    let second = Utc.with_ymd_and_hms(2030, 3, 1, 9, 0, 0).unwrap();

    let a = forge
        .generate_with("smurfing", GenerateOptions::seeded(10).generated_at(first))
        .unwrap();
    let b = forge
        .generate_with("smurfing", GenerateOptions::seeded(10).generated_at(second))
        .unwrap();

    assert_ne!(a.provenance().generated_at, b.provenance().generated_at);
    assert_eq!(a.integrity_hash(), b.integrity_hash());
}

#[test]
fn test_amend_produces_new_seal_and_keeps_original() {
    let original = generate("round_tripping", Some(4)).unwrap();
    let amended = original
        .amend(|draft| {
            draft.set_label(IntentLabel::Laundering);
            draft.add_weakness("Beneficial ownership opacity");
        })
        .unwrap();

    assert_eq!(original.label(), IntentLabel::TaxEvasion);
    assert_eq!(amended.label(), IntentLabel::Laundering);
    assert_ne!(original.integrity_hash(), amended.integrity_hash());
    assert!(original.verify().is_ok());
    assert!(amended.verify().is_ok());
    assert!(amended.narrative().contains("labeled `laundering`"));
}

#[test]
fn test_noop_amend_keeps_hash() {
    let original = generate("nft_wash_trading", Some(4)).unwrap();
    let same = original.amend(|_| {}).unwrap();
    assert_eq!(original, same);
}

#[test]
fn test_tampered_export_is_rejected() {
    let scenario = generate("sanctions_evasion_jurisdiction_hopping", Some(19)).unwrap();
    let mut doc: serde_json::Value =
        serde_json::from_slice(&scenario.export("json".parse().unwrap()).unwrap()).unwrap();
    doc["label"] = serde_json::Value::from("false_positive_trap");

    let err = Scenario::from_json(&serde_json::to_vec(&doc).unwrap()).unwrap_err();
    match err {
        ForgeError::IntegritySealViolation { expected, actual } => {
            assert_eq!(expected, scenario.integrity_hash());
            assert_ne!(actual, expected);
        }
        other => panic!("expected a seal violation, got {:?}", other),
    }
}

#[test]
fn test_tampered_provenance_seed_is_rejected() {
    let scenario = generate("smurfing", Some(19)).unwrap();
    let mut doc: serde_json::Value =
        serde_json::from_slice(&scenario.export("json".parse().unwrap()).unwrap()).unwrap();
    doc["provenance"]["seed"] = serde_json::Value::from(20u64);

    let err = Scenario::from_json(&serde_json::to_vec(&doc).unwrap()).unwrap_err();
    assert!(matches!(err, ForgeError::IntegritySealViolation { .. }));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Insertion order of nodes and edges never changes the hash.
    #[test]
    fn hash_ignores_insertion_order(seed in 0u64..1_000, shuffle_seed in any::<u64>(), index in 0usize..7) {
        let library = PatternLibrary::builtin();
        let names = library.names();
        let scenario = ScenarioForge::new(library)
            .generate(names[index % names.len()], Some(seed))
            .unwrap();

        let hash = IntegrityStamper::stamp(&reordered(&scenario, shuffle_seed)).unwrap();
        prop_assert_eq!(hash, scenario.integrity_hash().to_string());
    }
}
