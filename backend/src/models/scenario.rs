//! Scenario model
//!
//! A scenario moves through two states:
//!
//! 1. [`LabeledGraph`]: synthesized and annotated, still editable
//! 2. [`Scenario`]: sealed by the integrity stamper, read-only
//!
//! A sealed scenario exposes no mutating accessors. Changes go through
//! [`Scenario::amend`], which edits a copy and seals it again under a new
//! hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use super::jurisdiction::Jurisdiction;
use crate::export::{CsvTables, ExportFormat, Exporter};
use crate::graph::TransactionGraph;
use crate::integrity::IntegrityStamper;
use crate::orchestrator::ForgeError;

/// Marker carried by every export
pub const ARTIFICIAL_DATA_WARNING: &str = "ARTIFICIAL_DATA_DO_NOT_USE_FOR_REAL_CASES";

/// Generator name recorded in provenance
pub const GENERATOR_NAME: &str = "scenario_forge";

/// What the scenario is meant to depict
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentLabel {
    Laundering,
    SanctionsEvasion,
    RansomwareLiquidation,
    TaxEvasion,
    /// Legitimate activity that rule-based monitoring tends to flag
    FalsePositiveTrap,
}

impl IntentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentLabel::Laundering => "laundering",
            IntentLabel::SanctionsEvasion => "sanctions_evasion",
            IntentLabel::RansomwareLiquidation => "ransomware_liquidation",
            IntentLabel::TaxEvasion => "tax_evasion",
            IntentLabel::FalsePositiveTrap => "false_positive_trap",
        }
    }

    /// Human-readable form used in narratives
    pub fn describe(&self) -> &'static str {
        match self {
            IntentLabel::Laundering => "money laundering",
            IntentLabel::SanctionsEvasion => "sanctions evasion",
            IntentLabel::RansomwareLiquidation => "ransomware liquidation",
            IntentLabel::TaxEvasion => "tax evasion",
            IntentLabel::FalsePositiveTrap => "a false-positive trap",
        }
    }

    /// True for every label except the false-positive trap
    pub fn is_illicit(&self) -> bool {
        !matches!(self, IntentLabel::FalsePositiveTrap)
    }
}

impl fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How and when a scenario was generated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub generator: String,
    pub generator_version: String,
    pub template_id: String,
    pub template_version: String,
    /// Wall-clock time of generation (not covered by the integrity hash)
    pub generated_at: DateTime<Utc>,
    /// Seed that reproduces the graph and labels
    pub seed: u64,
    pub artificial_data_warning: String,
}

impl Provenance {
    pub fn new(
        template_id: &str,
        template_version: &str,
        seed: u64,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            generator: GENERATOR_NAME.to_string(),
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            template_id: template_id.to_string(),
            template_version: template_version.to_string(),
            generated_at,
            seed,
            artificial_data_warning: ARTIFICIAL_DATA_WARNING.to_string(),
        }
    }
}

/// Annotated graph awaiting its seal
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledGraph {
    template: String,
    graph: TransactionGraph,
    label: IntentLabel,
    aml_weaknesses: Vec<String>,
    provenance: Provenance,
}

impl LabeledGraph {
    pub fn new(
        template: &str,
        graph: TransactionGraph,
        label: IntentLabel,
        aml_weaknesses: Vec<String>,
        provenance: Provenance,
    ) -> Self {
        Self {
            template: template.to_string(),
            graph,
            label,
            aml_weaknesses,
            provenance,
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn graph(&self) -> &TransactionGraph {
        &self.graph
    }

    pub fn label(&self) -> IntentLabel {
        self.label
    }

    pub fn aml_weaknesses(&self) -> &[String] {
        &self.aml_weaknesses
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn set_label(&mut self, label: IntentLabel) {
        self.label = label;
    }

    /// Record an additional weakness (duplicates are ignored)
    pub fn add_weakness(&mut self, weakness: &str) {
        if !self.aml_weaknesses.iter().any(|w| w == weakness) {
            self.aml_weaknesses.push(weakness.to_string());
        }
    }

    /// Replace a node's jurisdiction tag
    ///
    /// # Errors
    /// `MalformedGraph` if the node does not exist
    pub fn retag_node(&mut self, node_id: &str, jurisdiction: Jurisdiction) -> Result<(), ForgeError> {
        let node = self
            .graph
            .nodes_mut()
            .find(|n| n.id() == node_id)
            .ok_or_else(|| ForgeError::MalformedGraph(format!("unknown node {}", node_id)))?;
        node.set_jurisdiction(jurisdiction);
        Ok(())
    }
}

/// Aggregate statistics over a scenario graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummary {
    pub total_transactions: usize,
    pub entities_involved: usize,
    pub time_span_days: f64,
    /// Sum of credited amounts, saturating at `i64::MAX`
    pub total_amount: i64,
    /// Sum of fees withheld along the way
    pub total_fees: i64,
    pub currencies: Vec<String>,
    pub chains: Vec<String>,
    pub jurisdictions: Vec<String>,
    pub aml_weaknesses_count: usize,
    pub cyclic: bool,
}

/// A sealed, immutable scenario
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    labeled: LabeledGraph,
    integrity_hash: String,
    narrative: String,
}

impl Scenario {
    /// Only the integrity stamper creates sealed scenarios
    pub(crate) fn sealed(labeled: LabeledGraph, integrity_hash: String) -> Self {
        Self {
            labeled,
            integrity_hash,
            narrative: String::new(),
        }
    }

    pub(crate) fn attach_narrative(mut self, narrative: String) -> Self {
        self.narrative = narrative;
        self
    }

    /// Stable identifier: template name plus hash prefix
    pub fn scenario_id(&self) -> String {
        let prefix: String = self.integrity_hash.chars().take(12).collect();
        format!("{}-{}", self.labeled.template, prefix)
    }

    pub fn template(&self) -> &str {
        self.labeled.template()
    }

    pub fn graph(&self) -> &TransactionGraph {
        self.labeled.graph()
    }

    pub fn label(&self) -> IntentLabel {
        self.labeled.label()
    }

    pub fn aml_weaknesses(&self) -> &[String] {
        self.labeled.aml_weaknesses()
    }

    pub fn provenance(&self) -> &Provenance {
        self.labeled.provenance()
    }

    pub fn integrity_hash(&self) -> &str {
        &self.integrity_hash
    }

    pub fn narrative(&self) -> &str {
        &self.narrative
    }

    /// Borrow the sealed content
    pub fn labeled(&self) -> &LabeledGraph {
        &self.labeled
    }

    /// Serialize to JSON or CSV
    pub fn export(&self, format: ExportFormat) -> Result<Vec<u8>, ForgeError> {
        Exporter::export(self, format)
    }

    /// Manifest, nodes and edges as separate CSV documents
    pub fn export_csv_tables(&self) -> Result<CsvTables, ForgeError> {
        Exporter::export_csv_tables(self)
    }

    /// Write export files into a directory
    pub fn write_to_dir(&self, dir: &Path, format: ExportFormat) -> Result<Vec<PathBuf>, ForgeError> {
        Exporter::write_to_dir(self, dir, format)
    }

    /// Rebuild a scenario from a JSON export, verifying its seal
    ///
    /// # Errors
    /// `IntegritySealViolation` if any sealed field was altered
    pub fn from_json(bytes: &[u8]) -> Result<Scenario, ForgeError> {
        crate::export::json::import(bytes)
    }

    /// Recompute the hash and compare it with the sealed one
    pub fn verify(&self) -> Result<(), ForgeError> {
        IntegrityStamper::verify(self)
    }

    /// Edit a copy of this scenario and seal the result
    ///
    /// The original is untouched; the returned scenario carries a new hash.
    ///
    /// # Example
    /// ```
    /// use scenario_forge_core_rs::{generate, IntentLabel};
    ///
    /// let original = generate("smurfing", Some(7)).unwrap();
    /// let amended = original
    ///     .amend(|draft| draft.set_label(IntentLabel::TaxEvasion))
    ///     .unwrap();
    /// assert_ne!(original.integrity_hash(), amended.integrity_hash());
    /// assert_eq!(original.label(), IntentLabel::Laundering);
    /// ```
    pub fn amend<F>(&self, edit: F) -> Result<Scenario, ForgeError>
    where
        F: FnOnce(&mut LabeledGraph),
    {
        let mut draft = self.labeled.clone();
        edit(&mut draft);
        draft.graph().validate(true)?;
        IntegrityStamper::seal(draft)
    }

    /// Aggregate statistics used by narratives and reports
    pub fn risk_summary(&self) -> RiskSummary {
        let graph = self.graph();
        let edges = graph.edges();

        let time_span_days = match (
            edges.iter().map(|e| e.timestamp()).min(),
            edges.iter().map(|e| e.timestamp()).max(),
        ) {
            (Some(first), Some(last)) => {
                let minutes = (last - first).num_minutes() as f64;
                (minutes / (24.0 * 60.0) * 100.0).round() / 100.0
            }
            _ => 0.0,
        };

        let currencies: BTreeSet<String> = edges.iter().map(|e| e.currency().to_string()).collect();
        let chains: BTreeSet<String> = edges.iter().map(|e| e.chain().to_string()).collect();
        let jurisdictions: BTreeSet<String> = graph
            .nodes()
            .iter()
            .filter_map(|n| n.jurisdiction().map(|j| j.code.clone()))
            .collect();

        RiskSummary {
            total_transactions: edges.len(),
            entities_involved: graph.node_count(),
            time_span_days,
            total_amount: edges.iter().fold(0i64, |acc, e| acc.saturating_add(e.amount())),
            total_fees: edges.iter().fold(0i64, |acc, e| acc.saturating_add(e.fee())),
            currencies: currencies.into_iter().collect(),
            chains: chains.into_iter().collect(),
            jurisdictions: jurisdictions.into_iter().collect(),
            aml_weaknesses_count: self.aml_weaknesses().len(),
            cyclic: graph.has_cycle(),
        }
    }
}
