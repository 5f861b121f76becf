//! Tests for JSON, CSV and Markdown export

use std::fs;

use scenario_forge_core_rs::{
    generate, ExportFormat, ForgeError, Scenario, ARTIFICIAL_DATA_WARNING,
};

fn json_of(scenario: &Scenario) -> serde_json::Value {
    serde_json::from_slice(&scenario.export(ExportFormat::Json).unwrap()).unwrap()
}

#[test]
fn test_json_has_all_top_level_keys() {
    let scenario = generate("cross_chain_laundering", Some(42)).unwrap();
    let doc = json_of(&scenario);

    for key in [
        "template",
        "nodes",
        "edges",
        "label",
        "provenance",
        "integrity_hash",
        "narrative",
        "aml_weaknesses",
        "warning",
    ] {
        assert!(doc.get(key).is_some(), "missing key {}", key);
    }
    assert_eq!(doc["template"], "cross_chain_laundering");
    assert_eq!(doc["label"], "laundering");
    assert_eq!(doc["warning"], ARTIFICIAL_DATA_WARNING);
    assert_eq!(doc["provenance"]["seed"], 42);
    assert_eq!(
        doc["nodes"].as_array().unwrap().len(),
        scenario.graph().node_count()
    );
}

#[test]
fn test_json_round_trip() {
    let scenario = generate("mixer_ransomware_liquidation", Some(99)).unwrap();
    let bytes = scenario.export(ExportFormat::Json).unwrap();
    let restored = Scenario::from_json(&bytes).unwrap();

    assert_eq!(restored.integrity_hash(), scenario.integrity_hash());
    assert_eq!(restored.label(), scenario.label());
    assert_eq!(restored.graph().sorted_nodes(), scenario.graph().sorted_nodes());
    assert_eq!(restored.graph().sorted_edges(), scenario.graph().sorted_edges());
    assert_eq!(restored.narrative(), scenario.narrative());
}

#[test]
fn test_same_scenario_same_bytes() {
    let a = generate("smurfing", Some(5)).unwrap();
    let b = generate("smurfing", Some(5)).unwrap();
    assert_eq!(
        a.export(ExportFormat::Csv).unwrap(),
        b.export(ExportFormat::Csv).unwrap()
    );
}

#[test]
fn test_csv_sections() {
    let scenario = generate("false_positive_payroll", Some(3)).unwrap();
    let text = String::from_utf8(scenario.export(ExportFormat::Csv).unwrap()).unwrap();
    let sections: Vec<&str> = text.split("\n\n").collect();

    assert_eq!(sections.len(), 3);
    assert!(sections[0].contains(scenario.integrity_hash()));
    assert!(sections[0].contains(ARTIFICIAL_DATA_WARNING));
    assert_eq!(sections[1].lines().count(), scenario.graph().node_count() + 1);
    assert_eq!(
        sections[2].trim_end().lines().count(),
        scenario.graph().edge_count() + 1
    );
}

#[test]
fn test_csv_tables_match_combined_export() {
    let scenario = generate("nft_wash_trading", Some(8)).unwrap();
    let tables = scenario.export_csv_tables().unwrap();
    let combined = scenario.export(ExportFormat::Csv).unwrap();

    let mut expected = tables.manifest.clone();
    expected.push(b'\n');
    expected.extend_from_slice(&tables.nodes);
    expected.push(b'\n');
    expected.extend_from_slice(&tables.edges);
    assert_eq!(combined, expected);
}

#[test]
fn test_unsupported_format_string() {
    let err = "xml".parse::<ExportFormat>().unwrap_err();
    assert_eq!(
        err,
        ForgeError::UnsupportedFormat {
            format: "xml".to_string()
        }
    );
}

#[test]
fn test_write_to_dir() {
    let scenario = generate("round_tripping", Some(1)).unwrap();
    let dir = std::env::temp_dir().join(format!("scenario-forge-{}", uuid::Uuid::new_v4()));

    let csv_files = scenario.write_to_dir(&dir, ExportFormat::Csv).unwrap();
    assert_eq!(csv_files.len(), 3);
    let id = scenario.scenario_id();
    for suffix in ["_manifest.csv", "_nodes.csv", "_edges.csv"] {
        let path = dir.join(format!("{}{}", id, suffix));
        assert!(csv_files.contains(&path));
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }

    let json_files = scenario.write_to_dir(&dir, ExportFormat::Json).unwrap();
    assert_eq!(json_files, vec![dir.join(format!("{}.json", id))]);
    let restored = Scenario::from_json(&fs::read(&json_files[0]).unwrap()).unwrap();
    assert_eq!(restored.integrity_hash(), scenario.integrity_hash());

    fs::remove_dir_all(&dir).unwrap();
}
