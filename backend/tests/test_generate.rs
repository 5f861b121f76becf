//! End-to-end generation tests

use std::collections::BTreeSet;
use std::thread;

use scenario_forge_core_rs::patterns::{builtin, CountRange};
use scenario_forge_core_rs::{
    generate, ForgeError, IntentLabel, PatternLibrary, ScenarioForge, ScenarioTemplate,
};

#[test]
fn test_every_builtin_generates_and_verifies() {
    for name in PatternLibrary::builtin().names() {
        let scenario = generate(name, Some(2024)).unwrap();
        assert_eq!(scenario.template(), name);
        assert!(scenario.verify().is_ok(), "{} does not verify", name);
        assert!(scenario
            .graph()
            .nodes()
            .iter()
            .all(|n| n.jurisdiction().is_some()));
    }
}

#[test]
fn test_labels_per_pattern() {
    let cases = [
        ("cross_chain_laundering", IntentLabel::Laundering),
        ("smurfing", IntentLabel::Laundering),
        ("round_tripping", IntentLabel::TaxEvasion),
        ("mixer_ransomware_liquidation", IntentLabel::RansomwareLiquidation),
        ("sanctions_evasion_jurisdiction_hopping", IntentLabel::SanctionsEvasion),
        ("false_positive_payroll", IntentLabel::FalsePositiveTrap),
    ];
    for (name, label) in cases {
        assert_eq!(generate(name, Some(1)).unwrap().label(), label, "{}", name);
    }
}

#[test]
fn test_unknown_pattern() {
    let err = generate("does_not_exist", Some(1)).unwrap_err();
    assert!(matches!(err, ForgeError::UnknownPattern { ref name } if name == "does_not_exist"));
}

#[test]
fn test_risk_summary() {
    let scenario = generate("cross_chain_laundering", Some(42)).unwrap();
    let summary = scenario.risk_summary();

    assert_eq!(summary.total_transactions, scenario.graph().edge_count());
    assert_eq!(summary.entities_involved, scenario.graph().node_count());
    assert!(summary.chains.len() > 1);
    assert!(summary.total_amount > 0);
    assert!(!summary.cyclic);
    assert_eq!(summary.aml_weaknesses_count, scenario.aml_weaknesses().len());
}

#[test]
fn test_concurrent_generation_matches_serial() {
    let library = PatternLibrary::builtin();
    let names = library.names();
    let serial: Vec<String> = names
        .iter()
        .map(|name| generate(name, Some(7)).unwrap().integrity_hash().to_string())
        .collect();

    let parallel: Vec<String> = thread::scope(|scope| {
        let handles: Vec<_> = names
            .iter()
            .map(|name| {
                scope.spawn(move || {
                    ScenarioForge::new(library)
                        .generate(name, Some(7))
                        .unwrap()
                        .integrity_hash()
                        .to_string()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(serial, parallel);
}

#[test]
fn test_distinct_seeds_give_distinct_hashes() {
    let hashes: BTreeSet<String> = (0..20)
        .map(|seed| generate("smurfing", Some(seed)).unwrap().integrity_hash().to_string())
        .collect();
    assert_eq!(hashes.len(), 20);
}

#[test]
fn test_custom_library_from_json() {
    let mut template: ScenarioTemplate = builtin::cross_chain_laundering();
    template.id = "cross_chain_laundering_wide".to_string();
    template.edge_count = CountRange::new(6, 8);
    let json = serde_json::to_string(&vec![template]).unwrap();

    let library = PatternLibrary::from_json_str(&json).unwrap();
    let forge = ScenarioForge::new(&library);
    let scenario = forge.generate("cross_chain_laundering_wide", Some(42)).unwrap();

    assert!((6..=8).contains(&scenario.graph().edge_count()));
    assert!(scenario.scenario_id().starts_with("cross_chain_laundering_wide-"));
    assert!(forge.generate("smurfing", Some(1)).is_err());
}
