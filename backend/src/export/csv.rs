//! CSV tables
//!
//! Three tables, each with a header row:
//!
//! - manifest: one metadata row (ids, hash, seed, warning)
//! - nodes: `id, role, slot, jurisdiction, actor`
//! - edges: `id, source_id, dest_id, amount, fee, currency, chain, timestamp`
//!
//! Rows are in canonical order (nodes by id, edges by source, destination,
//! timestamp, id), so equal scenarios produce equal bytes.

use serde::Serialize;

use crate::models::Scenario;
use crate::orchestrator::ForgeError;

/// The three CSV documents of one scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTables {
    pub manifest: Vec<u8>,
    pub nodes: Vec<u8>,
    pub edges: Vec<u8>,
}

#[derive(Serialize)]
struct ManifestRow<'a> {
    scenario_id: String,
    template: &'a str,
    template_version: &'a str,
    label: &'a str,
    seed: u64,
    generator: &'a str,
    generator_version: &'a str,
    generated_at: String,
    integrity_hash: &'a str,
    warning: &'a str,
}

#[derive(Serialize)]
struct NodeRow<'a> {
    id: &'a str,
    role: &'a str,
    slot: &'a str,
    jurisdiction: &'a str,
    actor: &'a str,
}

#[derive(Serialize)]
struct EdgeRow<'a> {
    id: &'a str,
    source_id: &'a str,
    dest_id: &'a str,
    amount: i64,
    fee: i64,
    currency: &'a str,
    chain: &'a str,
    timestamp: String,
}

fn write_rows<R: Serialize>(rows: impl IntoIterator<Item = R>) -> Result<Vec<u8>, ForgeError> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| ForgeError::Export(format!("csv row: {}", e)))?;
    }
    writer
        .into_inner()
        .map_err(|e| ForgeError::Export(format!("csv flush: {}", e)))
}

pub(crate) fn tables(scenario: &Scenario) -> Result<CsvTables, ForgeError> {
    let provenance = scenario.provenance();
    let manifest = write_rows([ManifestRow {
        scenario_id: scenario.scenario_id(),
        template: scenario.template(),
        template_version: &provenance.template_version,
        label: scenario.label().as_str(),
        seed: provenance.seed,
        generator: &provenance.generator,
        generator_version: &provenance.generator_version,
        generated_at: provenance.generated_at.to_rfc3339(),
        integrity_hash: scenario.integrity_hash(),
        warning: &provenance.artificial_data_warning,
    }])?;

    let graph = scenario.graph();
    let nodes = write_rows(graph.sorted_nodes().into_iter().map(|n| NodeRow {
        id: n.id(),
        role: n.role().as_str(),
        slot: n.slot(),
        jurisdiction: n.jurisdiction().map(|j| j.code.as_str()).unwrap_or(""),
        actor: n.actor(),
    }))?;

    let edges = write_rows(graph.sorted_edges().into_iter().map(|e| EdgeRow {
        id: e.id(),
        source_id: e.source_id(),
        dest_id: e.dest_id(),
        amount: e.amount(),
        fee: e.fee(),
        currency: e.currency(),
        chain: e.chain(),
        timestamp: e.timestamp().to_rfc3339(),
    }))?;

    Ok(CsvTables {
        manifest,
        nodes,
        edges,
    })
}

/// All three tables in one document, separated by blank lines
pub(crate) fn export(scenario: &Scenario) -> Result<Vec<u8>, ForgeError> {
    let tables = tables(scenario)?;
    let mut out = tables.manifest;
    out.push(b'\n');
    out.extend_from_slice(&tables.nodes);
    out.push(b'\n');
    out.extend_from_slice(&tables.edges);
    Ok(out)
}
